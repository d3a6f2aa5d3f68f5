use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Store-assigned integer identifiers.
pub type RoomId = u64;
pub type ReservationId = u64;

/// Half-open time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    /// Interval order is not checked here; the engine and adapter
    /// boundaries reject `end <= start` before constructing a slot.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Two slots overlap iff `NOT (end1 <= start2 OR start1 >= end2)`.
    /// Back-to-back slots (one ends exactly where the other begins) do not.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Parse `HH:MM:SS` or `HH:MM` (both accepted by the CLI menu and HTML forms).
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

/// A booking of one room for one date and one time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub date: NaiveDate,
    #[serde(rename = "start_time")]
    pub start: NaiveTime,
    #[serde(rename = "end_time")]
    pub end: NaiveTime,
}

impl Reservation {
    pub fn slot(&self) -> Slot {
        Slot::new(self.start, self.end)
    }
}

/// One room's registry entry plus its committed reservations, sorted by
/// `(date, start)`. Committed reservations on a date never overlap, so the
/// sort key is unique within one room.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub reservations: Vec<Reservation>,
}

impl RoomState {
    pub fn new(id: RoomId, name: String, capacity: u32) -> Self {
        Self {
            id,
            name,
            capacity,
            reservations: Vec::new(),
        }
    }

    pub fn room(&self) -> Room {
        Room {
            id: self.id,
            name: self.name.clone(),
            capacity: self.capacity,
        }
    }

    /// Insert maintaining the `(date, start)` sort order.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&(reservation.date, reservation.start), |r| (r.date, r.start))
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    /// Remove a reservation by id.
    pub fn remove_reservation(&mut self, id: ReservationId) -> Option<Reservation> {
        if let Some(pos) = self.reservations.iter().position(|r| r.id == id) {
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    /// All reservations on `date`, via binary search over the sorted vec.
    pub fn on_date(&self, date: NaiveDate) -> &[Reservation] {
        let lo = self.reservations.partition_point(|r| r.date < date);
        let hi = self.reservations.partition_point(|r| r.date <= date);
        &self.reservations[lo..hi]
    }
}

/// The WAL record format — one flat event per committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoomAdded {
        id: RoomId,
        name: String,
        capacity: u32,
    },
    /// Carries the fully resolved new values (partial updates are resolved
    /// against current state before logging).
    RoomUpdated {
        id: RoomId,
        name: String,
        capacity: u32,
    },
    ReservationBooked {
        id: ReservationId,
        room_id: RoomId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    ReservationModified {
        id: ReservationId,
        room_id: RoomId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    ReservationCancelled {
        id: ReservationId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn reservation(id: ReservationId, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Reservation {
        Reservation {
            id,
            room_id: 1,
            date,
            start,
            end,
        }
    }

    #[test]
    fn slot_overlap_formula() {
        let a = Slot::new(t(9, 0), t(10, 0));
        let b = Slot::new(t(9, 30), t(10, 30));
        let c = Slot::new(t(10, 0), t(11, 0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // back-to-back, half-open
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn slot_containment_overlaps() {
        let outer = Slot::new(t(8, 0), t(12, 0));
        let inner = Slot::new(t(9, 0), t(10, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn parse_times_both_forms() {
        assert_eq!(parse_time_of_day("09:30:00"), Some(t(9, 30)));
        assert_eq!(parse_time_of_day("09:30"), Some(t(9, 30)));
        assert_eq!(parse_time_of_day("9h30"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
    }

    #[test]
    fn parse_date_format() {
        assert_eq!(parse_date("2024-05-01"), Some(d(1)));
        assert_eq!(parse_date("01/05/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn reservations_stay_sorted() {
        let mut rs = RoomState::new(1, "Alpha".into(), 10);
        rs.insert_reservation(reservation(3, d(2), t(9, 0), t(10, 0)));
        rs.insert_reservation(reservation(1, d(1), t(14, 0), t(15, 0)));
        rs.insert_reservation(reservation(2, d(1), t(9, 0), t(10, 0)));
        let order: Vec<_> = rs.reservations.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn on_date_slices_single_day() {
        let mut rs = RoomState::new(1, "Alpha".into(), 10);
        rs.insert_reservation(reservation(1, d(1), t(9, 0), t(10, 0)));
        rs.insert_reservation(reservation(2, d(2), t(9, 0), t(10, 0)));
        rs.insert_reservation(reservation(3, d(2), t(11, 0), t(12, 0)));
        rs.insert_reservation(reservation(4, d(3), t(9, 0), t(10, 0)));

        let day = rs.on_date(d(2));
        assert_eq!(day.len(), 2);
        assert!(day.iter().all(|r| r.date == d(2)));
        assert!(rs.on_date(d(4)).is_empty());
    }

    #[test]
    fn remove_preserves_order() {
        let mut rs = RoomState::new(1, "Alpha".into(), 10);
        rs.insert_reservation(reservation(1, d(1), t(9, 0), t(10, 0)));
        rs.insert_reservation(reservation(2, d(1), t(10, 0), t(11, 0)));
        rs.insert_reservation(reservation(3, d(1), t(11, 0), t(12, 0)));
        assert!(rs.remove_reservation(2).is_some());
        assert!(rs.remove_reservation(2).is_none());
        let order: Vec<_> = rs.reservations.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::ReservationBooked {
            id: 7,
            room_id: 2,
            date: d(1),
            start: t(9, 0),
            end: t(10, 30),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn reservation_json_field_names() {
        let r = reservation(1, d(1), t(9, 0), t(10, 0));
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["start_time"], "09:00:00");
        assert_eq!(json["end_time"], "10:00:00");
        assert_eq!(json["date"], "2024-05-01");
    }
}
