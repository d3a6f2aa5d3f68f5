//! HTTP request handlers. Thin wrappers: parse, call the engine, shape the
//! response. All booking rules live in the engine.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
};

use crate::export;
use crate::model::{ReservationId, RoomId};

use super::dto::*;
use super::error::AppError;
use super::render;
use super::state::AppState;

type HandlerResult<T> = Result<Json<T>, AppError>;

// ── Overview and health ──────────────────────────────────

/// HTML overview: all rooms and all reservations in two tables.
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let rooms = state.engine.list_rooms().await;
    let reservations = state.engine.list_reservations().await;
    Html(render::home_page(&rooms, &reservations))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        rooms: state.engine.list_rooms().await.len(),
    })
}

// ── Rooms ────────────────────────────────────────────────

pub async fn list_rooms(State(state): State<AppState>) -> Json<RoomListResponse> {
    let rooms = state.engine.list_rooms().await;
    let total = rooms.len();
    Json(RoomListResponse { rooms, total })
}

pub async fn add_room(
    State(state): State<AppState>,
    Json(req): Json<AddRoomRequest>,
) -> HandlerResult<IdResponse> {
    let id = state.engine.add_room(req.name, req.capacity).await?;
    Ok(Json(IdResponse { id }))
}

pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<RoomId>,
    Json(req): Json<UpdateRoomRequest>,
) -> HandlerResult<crate::model::Room> {
    state.engine.update_room(id, req.name, req.capacity).await?;
    let room = state
        .engine
        .get_room(id)
        .await
        .ok_or(AppError::Internal("room vanished after update".to_string()))?;
    Ok(Json(room))
}

/// Rooms with no conflicting reservation in the requested window.
pub async fn available_rooms(
    State(state): State<AppState>,
    Query(q): Query<AvailabilityQuery>,
) -> HandlerResult<RoomListResponse> {
    let (date, slot) = q.parse()?;
    let rooms = state.engine.available_rooms(date, slot).await?;
    let total = rooms.len();
    Ok(Json(RoomListResponse { rooms, total }))
}

// ── Reservations ─────────────────────────────────────────

pub async fn list_reservations(State(state): State<AppState>) -> Json<ReservationListResponse> {
    let reservations = state.engine.list_reservations().await;
    let total = reservations.len();
    Json(ReservationListResponse {
        reservations,
        total,
    })
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<ReservationId>,
) -> HandlerResult<crate::model::Reservation> {
    state
        .engine
        .get_reservation(id)
        .await
        .map(Json)
        .ok_or_else(|| crate::engine::EngineError::ReservationNotFound(id).into())
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> HandlerResult<IdResponse> {
    let (date, slot) = req.parse()?;
    let id = state
        .engine
        .create_reservation(req.room_id, date, slot)
        .await?;
    Ok(Json(IdResponse { id }))
}

pub async fn modify_reservation(
    State(state): State<AppState>,
    Path(id): Path<ReservationId>,
    Json(req): Json<ModifyReservationRequest>,
) -> HandlerResult<crate::model::Reservation> {
    let (date, slot) = req.parse()?;
    state
        .engine
        .modify_reservation(id, req.room_id, date, slot)
        .await?;
    state
        .engine
        .get_reservation(id)
        .await
        .map(Json)
        .ok_or(AppError::Internal(
            "reservation vanished after modify".to_string(),
        ))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<ReservationId>,
) -> Result<Response, AppError> {
    state.engine.cancel_reservation(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT.into_response())
}

pub async fn reservations_by_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> HandlerResult<ReservationListResponse> {
    let reservations = state.engine.reservations_by_room(room_id).await?;
    let total = reservations.len();
    Ok(Json(ReservationListResponse {
        reservations,
        total,
    }))
}

pub async fn reservations_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> HandlerResult<ReservationListResponse> {
    let date = parse_date(&date)?;
    let reservations = state.engine.reservations_by_date(date).await;
    let total = reservations.len();
    Ok(Json(ReservationListResponse {
        reservations,
        total,
    }))
}

// ── Availability ─────────────────────────────────────────

pub async fn check_availability(
    State(state): State<AppState>,
    Query(q): Query<AvailabilityQuery>,
) -> HandlerResult<AvailabilityResponse> {
    let room_id = q
        .room_id
        .ok_or_else(|| AppError::BadRequest("missing room_id".to_string()))?;
    let (date, slot) = q.parse()?;
    let available = state
        .engine
        .check_availability(room_id, date, slot, q.exclude)
        .await?;
    Ok(Json(AvailabilityResponse { available }))
}

// ── Exports ──────────────────────────────────────────────

pub async fn export_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let reservations = state.engine.list_reservations().await;
    let body = export::to_csv(&reservations).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"reservations.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn export_json(State(state): State<AppState>) -> Result<Response, AppError> {
    let reservations = state.engine.list_reservations().await;
    let body = export::to_json(&reservations).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"reservations.json\"",
            ),
        ],
        body,
    )
        .into_response())
}
