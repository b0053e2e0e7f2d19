// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP API tests for the entity collections.

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, json_request};

fn track_body(name: &str, users: Value) -> Value {
    json!({
        "name": name,
        "start": { "lat": 43.2627, "lng": -2.9253 },
        "end": { "lat": 43.3183, "lng": -1.9812 },
        "distance": 12.5,
        "slope": 3.2,
        "activity": "running",
        "users": users,
    })
}

/// Send a request and return the status and JSON body (if any).
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(json_request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_full_entity_flow() {
    let (app, _state) = create_test_app();

    // Create a user
    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "Ane", "activity": "running" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Created");
    let user_id = body["result"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["result"]["stats"]["weekly"]["km"], 0.0);

    // Create a track completed by that user
    let (status, body) = send(
        &app,
        "POST",
        "/tracks",
        Some(track_body("Bilbao-Donostia", json!([user_id]))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let track_id = body["result"]["id"].as_str().unwrap().to_string();

    // The user lists the track
    let (status, body) = send(&app, "GET", &format!("/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["tracks"], json!([track_id]));

    // Create a group with a session
    let (status, body) = send(
        &app,
        "POST",
        "/groups",
        Some(json!({
            "name": "Climbers",
            "users": [user_id],
            "records": [
                { "date": "2024-05-01", "tracks": [track_id], "users": [user_id], "km": 12.5 }
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["result"]["ranking"], json!([user_id]));

    // Create a challenge on the track
    let (status, _) = send(
        &app,
        "POST",
        "/challenges",
        Some(json!({ "name": "Coast", "activity": "running", "tracks": [track_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Lookup by name
    let (status, body) = send(&app, "GET", "/tracks?name=Bilbao-Donostia", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], json!(track_id));

    // List
    let (status, body) = send(&app, "GET", "/challenges", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"].as_array().unwrap().len(), 1);

    // Patch by id
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tracks/{}", track_id),
        Some(json!({ "score": 4.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Updated");
    assert_eq!(body["result"]["score"], 4.5);

    // Patch by name
    let (status, body) = send(
        &app,
        "PATCH",
        "/users?name=Ane",
        Some(json!({ "activity": "cycling" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["activity"], "cycling");

    // Delete the user; the track no longer lists them
    let (status, body) = send(&app, "DELETE", "/users?name=Ane", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");

    let (_, body) = send(&app, "GET", &format!("/tracks/{}", track_id), None).await;
    assert_eq!(body["result"]["users"], json!([]));

    let (status, _) = send(&app, "GET", &format!("/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Delete the track by id
    let (status, _) = send(&app, "DELETE", &format!("/tracks/{}", track_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/challenges?name=Coast", None).await;
    assert_eq!(body["result"]["tracks"], json!([]));
}

#[tokio::test]
async fn test_unknown_entity_returns_404() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, "GET", "/groups/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&app, "DELETE", "/tracks?name=Nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_selector_returns_400() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, "DELETE", "/users", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = send(&app, "PATCH", "/users", Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dangling_reference_returns_422() {
    let (app, _state) = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/tracks",
        Some(track_body("Ghost", json!(["nobody"]))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "dangling_reference");

    let (_, body) = send(&app, "GET", "/tracks", None).await;
    assert_eq!(body["result"], json!([]));
}

#[tokio::test]
async fn test_duplicate_name_returns_409() {
    let (app, _state) = create_test_app();
    let user = json!({ "name": "Ane", "activity": "running" });

    let (status, _) = send(&app, "POST", "/users", Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/users", Some(user)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_unknown_route_returns_501() {
    let (app, _state) = create_test_app();

    let (status, _) = send(&app, "GET", "/leaderboards", None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}
