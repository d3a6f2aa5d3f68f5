use crate::model::{ReservationId, RoomId};

/// Outcomes of booking operations. Validation/NotFound/Conflict/DuplicateName
/// are expected, recoverable results; `Wal` is a storage failure that
/// propagates unchanged to the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Validation(&'static str),
    RoomNotFound(RoomId),
    ReservationNotFound(ReservationId),
    /// The requested interval overlaps this existing reservation.
    Conflict(ReservationId),
    DuplicateName(String),
    LimitExceeded(&'static str),
    Wal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "invalid input: {msg}"),
            EngineError::RoomNotFound(id) => write!(f, "room not found: {id}"),
            EngineError::ReservationNotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::Conflict(id) => {
                write!(f, "slot conflicts with existing reservation: {id}")
            }
            EngineError::DuplicateName(name) => {
                write!(f, "room name already registered: {name:?}")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Wal(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
