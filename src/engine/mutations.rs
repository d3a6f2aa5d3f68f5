use chrono::NaiveDate;
use tracing::info;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::availability::{find_conflict, validate_slot};
use super::{Engine, EngineError};

impl Engine {
    // ── Room registry ────────────────────────────────────────

    /// Register a room. Name uniqueness (case-sensitive exact match) is
    /// enforced atomically via the name index before insertion.
    pub async fn add_room(&self, name: String, capacity: u32) -> Result<RoomId, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation("room name must not be empty"));
        }
        if name.len() > MAX_ROOM_NAME_LEN {
            return Err(EngineError::LimitExceeded("room name too long"));
        }
        if capacity == 0 {
            return Err(EngineError::Validation("room capacity must be positive"));
        }
        if self.room_count() >= MAX_ROOMS {
            return Err(EngineError::LimitExceeded("too many rooms"));
        }

        let id = self.alloc_room_id();
        if !self.claim_name(&name, id) {
            return Err(EngineError::DuplicateName(name));
        }

        let event = Event::RoomAdded {
            id,
            name: name.clone(),
            capacity,
        };
        if let Err(e) = self.wal_append(&event).await {
            self.release_name(&name);
            return Err(e);
        }
        self.insert_room_state(RoomState::new(id, name, capacity));
        metrics::gauge!(observability::ROOMS_ACTIVE).set(self.room_count() as f64);
        info!(room = id, "room added");
        self.maybe_compact().await;
        Ok(id)
    }

    /// Partial update: `None` (or a blank name / zero capacity, as the CLI
    /// and HTTP adapters map them) keeps the current value. Renaming into an
    /// already-registered name is rejected.
    pub async fn update_room(
        &self,
        id: RoomId,
        name: Option<String>,
        capacity: Option<u32>,
    ) -> Result<(), EngineError> {
        let rs = self
            .get_room_state(&id)
            .ok_or(EngineError::RoomNotFound(id))?;
        let mut guard = rs.write().await;

        let new_name = match name {
            Some(n) if !n.trim().is_empty() && n != guard.name => {
                if n.len() > MAX_ROOM_NAME_LEN {
                    return Err(EngineError::LimitExceeded("room name too long"));
                }
                if !self.claim_name(&n, id) {
                    return Err(EngineError::DuplicateName(n));
                }
                Some(n)
            }
            _ => None,
        };
        let resolved_name = new_name.clone().unwrap_or_else(|| guard.name.clone());
        let resolved_capacity = match capacity {
            Some(c) if c > 0 => c,
            _ => guard.capacity,
        };

        let event = Event::RoomUpdated {
            id,
            name: resolved_name.clone(),
            capacity: resolved_capacity,
        };
        if let Err(e) = self.wal_append(&event).await {
            if let Some(n) = &new_name {
                self.release_name(n);
            }
            return Err(e);
        }
        if let Some(n) = new_name {
            self.release_name(&guard.name);
            guard.name = n;
        }
        guard.capacity = resolved_capacity;
        drop(guard);
        info!(room = id, "room updated");
        self.maybe_compact().await;
        Ok(())
    }

    // ── Reservation lifecycle ────────────────────────────────

    /// Book `slot` in `room_id` on `date`. The room's write lock is held
    /// across check, WAL append and insert.
    pub async fn create_reservation(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<ReservationId, EngineError> {
        validate_slot(&slot)?;
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::RoomNotFound(room_id))?;
        let mut guard = rs.write().await;
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_ROOM {
            return Err(EngineError::LimitExceeded("too many reservations on room"));
        }
        if let Some(hit) = find_conflict(guard.on_date(date), &slot, None) {
            metrics::counter!(observability::CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Conflict(hit.id));
        }

        let id = self.alloc_reservation_id();
        let event = Event::ReservationBooked {
            id,
            room_id,
            date,
            start: slot.start,
            end: slot.end,
        };
        self.wal_append(&event).await?;
        guard.insert_reservation(Reservation {
            id,
            room_id,
            date,
            start: slot.start,
            end: slot.end,
        });
        drop(guard);
        self.index_reservation(id, room_id);
        metrics::counter!(observability::BOOKINGS_TOTAL).increment(1);
        info!(reservation = id, room = room_id, %date, "reservation created");
        self.maybe_compact().await;
        Ok(id)
    }

    /// Overwrite all fields of an existing reservation (room, date, slot may
    /// all change in one operation). The availability check excludes the
    /// reservation's own pre-image; on conflict the stored reservation is
    /// left untouched.
    pub async fn modify_reservation(
        &self,
        id: ReservationId,
        room_id: RoomId,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<(), EngineError> {
        validate_slot(&slot)?;
        let old_room = self
            .room_for_reservation(&id)
            .ok_or(EngineError::ReservationNotFound(id))?;

        let event = Event::ReservationModified {
            id,
            room_id,
            date,
            start: slot.start,
            end: slot.end,
        };
        let updated = Reservation {
            id,
            room_id,
            date,
            start: slot.start,
            end: slot.end,
        };

        if old_room == room_id {
            let rs = self
                .get_room_state(&room_id)
                .ok_or(EngineError::RoomNotFound(room_id))?;
            let mut guard = rs.write().await;
            if guard.reservation(id).is_none() {
                return Err(EngineError::ReservationNotFound(id));
            }
            if let Some(hit) = find_conflict(guard.on_date(date), &slot, Some(id)) {
                metrics::counter!(observability::CONFLICTS_TOTAL).increment(1);
                return Err(EngineError::Conflict(hit.id));
            }
            self.wal_append(&event).await?;
            guard.remove_reservation(id);
            guard.insert_reservation(updated);
        } else {
            let (mut old_guard, mut new_guard) = self.lock_room_pair(old_room, room_id).await?;
            if old_guard.reservation(id).is_none() {
                return Err(EngineError::ReservationNotFound(id));
            }
            if new_guard.reservations.len() >= MAX_RESERVATIONS_PER_ROOM {
                return Err(EngineError::LimitExceeded("too many reservations on room"));
            }
            if let Some(hit) = find_conflict(new_guard.on_date(date), &slot, Some(id)) {
                metrics::counter!(observability::CONFLICTS_TOTAL).increment(1);
                return Err(EngineError::Conflict(hit.id));
            }
            self.wal_append(&event).await?;
            old_guard.remove_reservation(id);
            new_guard.insert_reservation(updated);
            self.index_reservation(id, room_id);
        }

        metrics::counter!(observability::MODIFICATIONS_TOTAL).increment(1);
        info!(reservation = id, room = room_id, %date, "reservation modified");
        self.maybe_compact().await;
        Ok(())
    }

    /// Cancel a reservation; `ReservationNotFound` if it does not exist.
    pub async fn cancel_reservation(&self, id: ReservationId) -> Result<(), EngineError> {
        let room_id = self
            .room_for_reservation(&id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::ReservationNotFound(id))?;
        let mut guard = rs.write().await;
        if guard.reservation(id).is_none() {
            return Err(EngineError::ReservationNotFound(id));
        }

        let event = Event::ReservationCancelled { id };
        self.wal_append(&event).await?;
        guard.remove_reservation(id);
        drop(guard);
        self.unindex_reservation(&id);
        metrics::counter!(observability::CANCELLATIONS_TOTAL).increment(1);
        info!(reservation = id, room = room_id, "reservation cancelled");
        self.maybe_compact().await;
        Ok(())
    }
}
