use chrono::NaiveDate;

use crate::model::*;

use super::availability::{slot_is_free, validate_slot};
use super::{Engine, EngineError};

impl Engine {
    pub fn room_exists(&self, id: RoomId) -> bool {
        self.get_room_state(&id).is_some()
    }

    pub async fn get_room(&self, id: RoomId) -> Option<Room> {
        let rs = self.get_room_state(&id)?;
        let guard = rs.read().await;
        Some(guard.room())
    }

    /// All registered rooms, sorted by id.
    pub async fn list_rooms(&self) -> Vec<Room> {
        let mut rooms = Vec::new();
        for rs in self.room_states() {
            let guard = rs.read().await;
            rooms.push(guard.room());
        }
        rooms.sort_by_key(|r| r.id);
        rooms
    }

    /// The availability predicate: can `slot` be booked in `room_id` on
    /// `date`? `exclude` names a reservation to ignore (a modify passes its
    /// own id so the pre-image never counts as a conflict); `None` excludes
    /// nothing. A missing room is an error, never a silent `true`.
    pub async fn check_availability(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        slot: Slot,
        exclude: Option<ReservationId>,
    ) -> Result<bool, EngineError> {
        validate_slot(&slot)?;
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::RoomNotFound(room_id))?;
        let guard = rs.read().await;
        Ok(slot_is_free(&guard, date, &slot, exclude))
    }

    pub async fn get_reservation(&self, id: ReservationId) -> Option<Reservation> {
        let room_id = self.room_for_reservation(&id)?;
        let rs = self.get_room_state(&room_id)?;
        let guard = rs.read().await;
        guard.reservation(id).copied()
    }

    /// Every reservation across all rooms, sorted by `(date, start, id)`.
    pub async fn list_reservations(&self) -> Vec<Reservation> {
        let mut all = Vec::new();
        for rs in self.room_states() {
            let guard = rs.read().await;
            all.extend_from_slice(&guard.reservations);
        }
        all.sort_by_key(|r| (r.date, r.start, r.id));
        all
    }

    /// Reservations of one room, sorted by `(date, start)`.
    /// `RoomNotFound` for an unregistered room.
    pub async fn reservations_by_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<Reservation>, EngineError> {
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::RoomNotFound(room_id))?;
        let guard = rs.read().await;
        Ok(guard.reservations.clone())
    }

    /// Reservations across all rooms on one date, sorted by `(start, id)`.
    pub async fn reservations_by_date(&self, date: NaiveDate) -> Vec<Reservation> {
        let mut hits = Vec::new();
        for rs in self.room_states() {
            let guard = rs.read().await;
            hits.extend_from_slice(guard.on_date(date));
        }
        hits.sort_by_key(|r| (r.start, r.id));
        hits
    }

    /// Rooms with no conflicting reservation in the given window, sorted by
    /// id (the "rooms free at a given time" listing).
    pub async fn available_rooms(
        &self,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<Vec<Room>, EngineError> {
        validate_slot(&slot)?;
        let mut free = Vec::new();
        for rs in self.room_states() {
            let guard = rs.read().await;
            if slot_is_free(&guard, date, &slot, None) {
                free.push(guard.room());
            }
        }
        free.sort_by_key(|r| r.id);
        Ok(free)
    }
}
