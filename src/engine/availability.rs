use crate::model::*;

use super::EngineError;

// ── Conflict detection ────────────────────────────────────────────

/// First reservation whose slot overlaps `slot`, skipping the reservation
/// identified by `exclude` (so a modify never collides with its own
/// pre-image). `reservations` is expected to already be filtered to one room
/// and one date.
pub fn find_conflict<'a>(
    reservations: &'a [Reservation],
    slot: &Slot,
    exclude: Option<ReservationId>,
) -> Option<&'a Reservation> {
    reservations
        .iter()
        .find(|r| exclude != Some(r.id) && r.slot().overlaps(slot))
}

/// True when `slot` can be booked in `room` on `date` under the pairwise
/// no-overlap rule.
pub fn slot_is_free(
    room: &RoomState,
    date: chrono::NaiveDate,
    slot: &Slot,
    exclude: Option<ReservationId>,
) -> bool {
    find_conflict(room.on_date(date), slot, exclude).is_none()
}

/// Reject empty or inverted slots before any availability check runs.
pub(crate) fn validate_slot(slot: &Slot) -> Result<(), EngineError> {
    if slot.start >= slot.end {
        return Err(EngineError::Validation("start time must precede end time"));
    }
    Ok(())
}
