//! End-to-end tests against the router, driven through tower's `oneshot`
//! without binding a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use reservo::engine::Engine;
use reservo::http::{AppState, create_router};

/// Fresh app over a throwaway WAL. The TempDir must outlive the router.
fn app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(&dir.path().join("http.wal"), 10_000).unwrap();
    let router = create_router(AppState::new(Arc::new(engine)));
    (dir, router)
}

async fn send_json(router: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn add_room(router: &Router, name: &str, capacity: u32) -> u64 {
    let (status, body) = send_json(
        router,
        "POST",
        "/v1/rooms",
        json!({"name": name, "capacity": capacity}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_u64().unwrap()
}

async fn book(router: &Router, room_id: u64, date: &str, start: &str, end: &str) -> (StatusCode, Value) {
    send_json(
        router,
        "POST",
        "/v1/reservations",
        json!({"room_id": room_id, "date": date, "start_time": start, "end_time": end}),
    )
    .await
}

#[tokio::test]
async fn health_reports_room_count() {
    let (_dir, router) = app();
    let (status, body) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rooms"], 0);
}

#[tokio::test]
async fn add_and_list_rooms() {
    let (_dir, router) = app();
    let a = add_room(&router, "Alpha", 10).await;
    let b = add_room(&router, "Beta", 4).await;
    assert_ne!(a, b);

    let (status, body) = get_json(&router, "/v1/rooms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["rooms"][0]["name"], "Alpha");
    assert_eq!(body["rooms"][1]["capacity"], 4);
}

#[tokio::test]
async fn duplicate_room_name_is_409() {
    let (_dir, router) = app();
    add_room(&router, "Alpha", 10).await;

    let (status, body) = send_json(
        &router,
        "POST",
        "/v1/rooms",
        json!({"name": "Alpha", "capacity": 20}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_NAME");
}

#[tokio::test]
async fn patch_room_updates_given_fields_only() {
    let (_dir, router) = app();
    let id = add_room(&router, "Alpha", 10).await;

    let (status, body) = send_json(
        &router,
        "PATCH",
        &format!("/v1/rooms/{id}"),
        json!({"capacity": 25}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alpha");
    assert_eq!(body["capacity"], 25);
}

#[tokio::test]
async fn create_reservation_then_conflict_is_409() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;

    let (status, body) = book(&router, room, "2024-05-01", "09:00", "10:00").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_u64().is_some());

    let (status, body) = book(&router, room, "2024-05-01", "09:30", "10:30").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // back-to-back booking is not a conflict
    let (status, _) = book(&router, room, "2024-05-01", "10:00", "11:00").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn availability_endpoint() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    book(&router, room, "2024-05-01", "09:00", "10:00").await;

    let (status, body) = get_json(
        &router,
        &format!("/v1/availability?room_id={room}&date=2024-05-01&start_time=09:30&end_time=10:30"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, body) = get_json(
        &router,
        &format!("/v1/availability?room_id={room}&date=2024-05-01&start_time=10:00&end_time=11:00"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);

    let (status, body) = get_json(
        &router,
        "/v1/availability?room_id=999&date=2024-05-01&start_time=09:00&end_time=10:00",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn availability_with_exclusion_ignores_own_booking() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    let (_, body) = book(&router, room, "2024-05-01", "09:00", "10:00").await;
    let id = body["id"].as_u64().unwrap();

    let (status, body) = get_json(
        &router,
        &format!(
            "/v1/availability?room_id={room}&date=2024-05-01&start_time=09:00&end_time=10:00&exclude={id}"
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn modify_into_conflict_leaves_reservation_unchanged() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    book(&router, room, "2024-05-01", "09:00", "10:00").await;
    let (_, body) = book(&router, room, "2024-05-01", "11:00", "12:00").await;
    let id = body["id"].as_u64().unwrap();

    let (status, body) = send_json(
        &router,
        "PUT",
        &format!("/v1/reservations/{id}"),
        json!({"room_id": room, "date": "2024-05-01", "start_time": "09:30", "end_time": "10:30"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, stored) = get_json(&router, &format!("/v1/reservations/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["start_time"], "11:00:00");
    assert_eq!(stored["end_time"], "12:00:00");
}

#[tokio::test]
async fn modify_moves_reservation_to_another_room() {
    let (_dir, router) = app();
    let a = add_room(&router, "Alpha", 10).await;
    let b = add_room(&router, "Beta", 10).await;
    let (_, body) = book(&router, a, "2024-05-01", "09:00", "10:00").await;
    let id = body["id"].as_u64().unwrap();

    let (status, updated) = send_json(
        &router,
        "PUT",
        &format!("/v1/reservations/{id}"),
        json!({"room_id": b, "date": "2024-05-02", "start_time": "14:00", "end_time": "15:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["room_id"].as_u64(), Some(b));

    let (_, by_room) = get_json(&router, &format!("/v1/reservations/by-room/{a}")).await;
    assert_eq!(by_room["total"], 0);
    let (_, by_room) = get_json(&router, &format!("/v1/reservations/by-room/{b}")).await;
    assert_eq!(by_room["total"], 1);
}

#[tokio::test]
async fn cancel_then_reservation_is_gone() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    let (_, body) = book(&router, room, "2024-05-01", "09:00", "10:00").await;
    let id = body["id"].as_u64().unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/reservations/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&router, &format!("/v1/reservations/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the slot is free again
    let (status, _) = book(&router, room, "2024-05-01", "09:00", "10:00").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn listings_by_date_and_available_rooms() {
    let (_dir, router) = app();
    let a = add_room(&router, "Alpha", 10).await;
    let b = add_room(&router, "Beta", 10).await;
    book(&router, a, "2024-05-01", "09:00", "10:00").await;
    book(&router, b, "2024-05-02", "09:00", "10:00").await;

    let (status, body) = get_json(&router, "/v1/reservations/by-date/2024-05-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = get_json(
        &router,
        "/v1/rooms/available?date=2024-05-01&start_time=09:00&end_time=10:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["rooms"][0]["name"], "Beta");
}

#[tokio::test]
async fn malformed_date_is_400() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;

    let (status, body) = book(&router, room, "05/01/2024", "09:00", "10:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    // inverted interval is a validation error too
    let (status, _) = book(&router, room, "2024-05-01", "10:00", "09:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_interval_is_400_on_every_endpoint() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    let (_, body) = book(&router, room, "2024-05-01", "09:00", "10:00").await;
    let id = body["id"].as_u64().unwrap();

    let (status, body) = book(&router, room, "2024-05-01", "10:00", "09:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    // empty interval (start == end) is rejected the same way
    let (status, _) = book(&router, room, "2024-05-01", "09:00", "09:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &router,
        "PUT",
        &format!("/v1/reservations/{id}"),
        json!({"room_id": room, "date": "2024-05-01", "start_time": "12:00", "end_time": "11:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(
        &router,
        &format!("/v1/availability?room_id={room}&date=2024-05-01&start_time=10:00&end_time=09:00"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(
        &router,
        "/v1/rooms/available?date=2024-05-01&start_time=10:00&end_time=09:00",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the stored reservation is untouched by the rejected modify
    let (_, stored) = get_json(&router, &format!("/v1/reservations/{id}")).await;
    assert_eq!(stored["start_time"], "09:00:00");
}

#[tokio::test]
async fn csv_export_contains_rows() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    book(&router, room, "2024-05-01", "09:00", "10:00").await;

    let request = Request::builder()
        .uri("/export/reservations.csv")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("id,room_id,date,start_time,end_time"));
    assert!(text.contains("2024-05-01,09:00:00,10:00:00"));
}

#[tokio::test]
async fn json_export_is_downloadable() {
    let (_dir, router) = app();
    let room = add_room(&router, "Alpha", 10).await;
    book(&router, room, "2024-05-01", "09:00", "10:00").await;

    let request = Request::builder()
        .uri("/export/reservations.json")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["start_time"], "09:00:00");
}

#[tokio::test]
async fn home_page_lists_rooms() {
    let (_dir, router) = app();
    add_room(&router, "Velvet Lounge", 12).await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Velvet Lounge"));
    assert!(html.contains("<h2>Reservations</h2>"));
}
