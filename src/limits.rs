//! Hard caps protecting the in-memory state and the WAL from unbounded input.

pub const MAX_ROOMS: usize = 10_000;
pub const MAX_ROOM_NAME_LEN: usize = 120;
pub const MAX_RESERVATIONS_PER_ROOM: usize = 50_000;
