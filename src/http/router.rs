//! Router configuration: routes plus middleware (CORS, compression, tracing).

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; restrict when fronted by a real deployment.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Room registry
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms", post(handlers::add_room))
        .route("/rooms/{id}", patch(handlers::update_room))
        .route("/rooms/available", get(handlers::available_rooms))
        // Reservation lifecycle
        .route("/reservations", get(handlers::list_reservations))
        .route("/reservations", post(handlers::create_reservation))
        .route(
            "/reservations/{id}",
            get(handlers::get_reservation)
                .put(handlers::modify_reservation)
                .delete(handlers::cancel_reservation),
        )
        .route(
            "/reservations/by-room/{room_id}",
            get(handlers::reservations_by_room),
        )
        .route(
            "/reservations/by-date/{date}",
            get(handlers::reservations_by_date),
        )
        // Availability checker
        .route("/availability", get(handlers::check_availability));

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .route("/export/reservations.csv", get(handlers::export_csv))
        .route("/export/reservations.json", get(handlers::export_json))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use std::sync::Arc;

    #[test]
    fn router_builds() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(&dir.path().join("router.wal"), 10_000).unwrap();
        let _router = create_router(AppState::new(Arc::new(engine)));
    }
}
