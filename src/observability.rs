use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservations created.
pub const BOOKINGS_TOTAL: &str = "reservo_bookings_total";

/// Counter: reservations modified.
pub const MODIFICATIONS_TOTAL: &str = "reservo_modifications_total";

/// Counter: reservations cancelled.
pub const CANCELLATIONS_TOTAL: &str = "reservo_cancellations_total";

/// Counter: create/modify attempts rejected for interval overlap.
pub const CONFLICTS_TOTAL: &str = "reservo_booking_conflicts_total";

// ── USE metrics (resource state) ────────────────────────────────

/// Gauge: registered rooms.
pub const ROOMS_ACTIVE: &str = "reservo_rooms_active";

/// Install the Prometheus metrics exporter on the given port. No-op if the
/// port is `None` (metric macros then record into the void, which is free).
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
