mod availability;
mod error;
mod mutations;
mod queries;

pub use availability::{find_conflict, slot_is_free};
pub use error::EngineError;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedRwLockWriteGuard, RwLock};

use crate::model::*;
use crate::wal::Wal;

pub type SharedRoomState = Arc<RwLock<RoomState>>;

/// The booking engine: room registry, reservation store, availability checker
/// and reservation lifecycle in one place, consumed by both the CLI menu and
/// the HTTP adapter.
///
/// Every create/modify holds the target room's write lock across the
/// availability check, the WAL append and the state mutation, so two
/// concurrent requests for the same slot cannot both observe "available"
/// (the check-then-act race is closed by per-room mutual exclusion).
pub struct Engine {
    rooms: DashMap<RoomId, SharedRoomState>,
    wal: Mutex<Wal>,
    /// Reverse lookup: reservation id → room id.
    reservation_index: DashMap<ReservationId, RoomId>,
    /// Room name → room id; enforces case-sensitive name uniqueness.
    names: DashMap<String, RoomId>,
    next_room_id: AtomicU64,
    next_reservation_id: AtomicU64,
    compact_threshold: u64,
}

impl Engine {
    /// Open the WAL at `wal_path`, replay it into memory and return a ready
    /// engine. Id counters resume past the highest replayed ids.
    pub fn new(wal_path: &Path, compact_threshold: u64) -> io::Result<Self> {
        let events = Wal::replay(wal_path)?;
        let wal = Wal::open(wal_path)?;

        let engine = Self {
            rooms: DashMap::new(),
            wal: Mutex::new(wal),
            reservation_index: DashMap::new(),
            names: DashMap::new(),
            next_room_id: AtomicU64::new(1),
            next_reservation_id: AtomicU64::new(1),
            compact_threshold,
        };

        // Replay is single-owner: try_write always succeeds (no contention).
        for event in &events {
            engine.apply_replayed(event);
        }
        metrics::gauge!(crate::observability::ROOMS_ACTIVE).set(engine.rooms.len() as f64);

        Ok(engine)
    }

    fn apply_replayed(&self, event: &Event) {
        match event {
            Event::RoomAdded { id, name, capacity } => {
                self.names.insert(name.clone(), *id);
                self.rooms.insert(
                    *id,
                    Arc::new(RwLock::new(RoomState::new(*id, name.clone(), *capacity))),
                );
                bump_counter(&self.next_room_id, *id);
            }
            Event::RoomUpdated { id, name, capacity } => {
                if let Some(entry) = self.rooms.get(id) {
                    let rs = entry.value().clone();
                    drop(entry);
                    let mut guard = rs.try_write().expect("replay: uncontended write");
                    if guard.name != *name {
                        self.names.remove(&guard.name);
                        self.names.insert(name.clone(), *id);
                        guard.name = name.clone();
                    }
                    guard.capacity = *capacity;
                }
            }
            Event::ReservationBooked {
                id,
                room_id,
                date,
                start,
                end,
            } => {
                if let Some(entry) = self.rooms.get(room_id) {
                    let rs = entry.value().clone();
                    drop(entry);
                    let mut guard = rs.try_write().expect("replay: uncontended write");
                    guard.insert_reservation(Reservation {
                        id: *id,
                        room_id: *room_id,
                        date: *date,
                        start: *start,
                        end: *end,
                    });
                    self.reservation_index.insert(*id, *room_id);
                    bump_counter(&self.next_reservation_id, *id);
                }
            }
            Event::ReservationModified {
                id,
                room_id,
                date,
                start,
                end,
            } => {
                if let Some(old_room) = self.reservation_index.get(id).map(|e| *e.value())
                    && let Some(entry) = self.rooms.get(&old_room)
                {
                    let rs = entry.value().clone();
                    drop(entry);
                    let mut guard = rs.try_write().expect("replay: uncontended write");
                    guard.remove_reservation(*id);
                }
                if let Some(entry) = self.rooms.get(room_id) {
                    let rs = entry.value().clone();
                    drop(entry);
                    let mut guard = rs.try_write().expect("replay: uncontended write");
                    guard.insert_reservation(Reservation {
                        id: *id,
                        room_id: *room_id,
                        date: *date,
                        start: *start,
                        end: *end,
                    });
                    self.reservation_index.insert(*id, *room_id);
                }
            }
            Event::ReservationCancelled { id } => {
                if let Some((_, room_id)) = self.reservation_index.remove(id)
                    && let Some(entry) = self.rooms.get(&room_id)
                {
                    let rs = entry.value().clone();
                    drop(entry);
                    let mut guard = rs.try_write().expect("replay: uncontended write");
                    guard.remove_reservation(*id);
                }
            }
        }
    }

    /// Durably log an event. In-memory state is only mutated after this
    /// returns `Ok`, so a storage failure never leaves phantom bookings.
    pub(super) async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let mut wal = self.wal.lock().await;
        wal.append(event).map_err(|e| EngineError::Wal(e.to_string()))
    }

    #[cfg(test)]
    pub(super) async fn fail_next_wal_append(&self) {
        self.wal.lock().await.fail_next_append();
    }

    pub fn get_room_state(&self, id: &RoomId) -> Option<SharedRoomState> {
        self.rooms.get(id).map(|e| e.value().clone())
    }

    pub(super) fn insert_room_state(&self, state: RoomState) {
        self.rooms.insert(state.id, Arc::new(RwLock::new(state)));
    }

    pub fn room_for_reservation(&self, id: &ReservationId) -> Option<RoomId> {
        self.reservation_index.get(id).map(|e| *e.value())
    }

    pub(super) fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub(super) fn room_name_taken(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub(super) fn claim_name(&self, name: &str, id: RoomId) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(id);
                true
            }
        }
    }

    pub(super) fn release_name(&self, name: &str) {
        self.names.remove(name);
    }

    pub(super) fn alloc_room_id(&self) -> RoomId {
        self.next_room_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(super) fn alloc_reservation_id(&self) -> ReservationId {
        self.next_reservation_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(super) fn index_reservation(&self, id: ReservationId, room_id: RoomId) {
        self.reservation_index.insert(id, room_id);
    }

    pub(super) fn unindex_reservation(&self, id: &ReservationId) {
        self.reservation_index.remove(id);
    }

    /// Snapshot of all room Arcs, detached from the map so no shard lock is
    /// held across the async read locks taken by callers.
    pub(super) fn room_states(&self) -> Vec<SharedRoomState> {
        self.rooms.iter().map(|e| e.value().clone()).collect()
    }

    /// Write-lock two distinct rooms in ascending-id order (deadlock
    /// avoidance for cross-room modifies). Returns guards in `(a, b)` caller
    /// order.
    pub(super) async fn lock_room_pair(
        &self,
        a: RoomId,
        b: RoomId,
    ) -> Result<
        (
            OwnedRwLockWriteGuard<RoomState>,
            OwnedRwLockWriteGuard<RoomState>,
        ),
        EngineError,
    > {
        debug_assert_ne!(a, b);
        let rs_a = self
            .get_room_state(&a)
            .ok_or(EngineError::RoomNotFound(a))?;
        let rs_b = self
            .get_room_state(&b)
            .ok_or(EngineError::RoomNotFound(b))?;
        if a < b {
            let ga = rs_a.write_owned().await;
            let gb = rs_b.write_owned().await;
            Ok((ga, gb))
        } else {
            let gb = rs_b.write_owned().await;
            let ga = rs_a.write_owned().await;
            Ok((ga, gb))
        }
    }

    // ── WAL compaction ───────────────────────────────────────

    /// Rewrite the WAL with only the events needed to recreate current state.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let events = self.snapshot_events().await;
        let path = {
            let wal = self.wal.lock().await;
            wal.path().to_path_buf()
        };
        // Slow phase outside the WAL lock, fast atomic swap under it.
        Wal::write_compact_file(&path, &events).map_err(|e| EngineError::Wal(e.to_string()))?;
        let mut wal = self.wal.lock().await;
        wal.swap_compact_file()
            .map_err(|e| EngineError::Wal(e.to_string()))
    }

    /// Compact inline once enough appends have accumulated. Called after
    /// mutations with all room locks released; failures are logged, never
    /// surfaced — the appended log is still correct, just longer.
    pub(super) async fn maybe_compact(&self) {
        let due = {
            let wal = self.wal.lock().await;
            wal.appends_since_compact() >= self.compact_threshold
        };
        if !due {
            return;
        }
        if let Err(e) = self.compact_wal().await {
            tracing::warn!("WAL compaction failed: {e}");
        }
    }

    async fn snapshot_events(&self) -> Vec<Event> {
        let mut rooms = Vec::new();
        for rs in self.room_states() {
            let guard = rs.read_owned().await;
            rooms.push(guard);
        }
        rooms.sort_by_key(|g| g.id);

        let mut events = Vec::new();
        for guard in &rooms {
            events.push(Event::RoomAdded {
                id: guard.id,
                name: guard.name.clone(),
                capacity: guard.capacity,
            });
            for r in &guard.reservations {
                events.push(Event::ReservationBooked {
                    id: r.id,
                    room_id: r.room_id,
                    date: r.date,
                    start: r.start,
                    end: r.end,
                });
            }
        }
        events
    }
}

/// Advance an id counter past a replayed id.
fn bump_counter(counter: &AtomicU64, seen: u64) {
    counter.fetch_max(seen + 1, Ordering::Relaxed);
}
