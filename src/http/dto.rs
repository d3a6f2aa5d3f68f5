//! Request and response bodies for the JSON API.
//!
//! Dates and times travel as strings (`YYYY-MM-DD`, `HH:MM` or `HH:MM:SS`)
//! and are parsed here so handlers only ever see validated chrono values.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::{self, Reservation, ReservationId, Room, RoomId, Slot};

use super::error::AppError;

pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    model::parse_date(s)
        .ok_or_else(|| AppError::BadRequest(format!("invalid date {s:?}, expected YYYY-MM-DD")))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, AppError> {
    model::parse_time_of_day(s)
        .ok_or_else(|| AppError::BadRequest(format!("invalid time {s:?}, expected HH:MM[:SS]")))
}

/// Parse and order-check a time window. Inverted or empty intervals are
/// rejected here so no malformed `Slot` ever reaches the engine.
fn parse_slot(start: &str, end: &str) -> Result<Slot, AppError> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    if start >= end {
        return Err(AppError::BadRequest(format!(
            "start time {start} must precede end time {end}"
        )));
    }
    Ok(Slot::new(start, end))
}

// ── Requests ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddRoomRequest {
    pub name: String,
    pub capacity: u32,
}

/// Partial update: omitted fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub room_id: RoomId,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl CreateReservationRequest {
    pub fn parse(&self) -> Result<(NaiveDate, Slot), AppError> {
        Ok((
            parse_date(&self.date)?,
            parse_slot(&self.start_time, &self.end_time)?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct ModifyReservationRequest {
    pub room_id: RoomId,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl ModifyReservationRequest {
    pub fn parse(&self) -> Result<(NaiveDate, Slot), AppError> {
        Ok((
            parse_date(&self.date)?,
            parse_slot(&self.start_time, &self.end_time)?,
        ))
    }
}

/// Query string for `/v1/availability` and `/v1/rooms/available`.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub room_id: Option<RoomId>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Reservation to ignore during the check (self-exclusion for modifies).
    pub exclude: Option<ReservationId>,
}

impl AvailabilityQuery {
    pub fn parse(&self) -> Result<(NaiveDate, Slot), AppError> {
        Ok((
            parse_date(&self.date)?,
            parse_slot(&self.start_time, &self.end_time)?,
        ))
    }
}

// ── Responses ────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomListResponse {
    pub rooms: Vec<Room>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rooms: usize,
}
