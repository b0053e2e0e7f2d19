// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use trail_graph::config::Config;
use trail_graph::db::{Db, FirestoreDb};
use trail_graph::models::{Activity, Coordinate, Track};
use trail_graph::routes::create_router;
use trail_graph::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore connection against the emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> Db {
    Db::Firestore(
        FirestoreDb::new("test-project")
            .await
            .expect("Failed to connect to Firestore emulator"),
    )
}

/// Create a test app backed by in-memory storage.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), Db::new_memory()));
    (create_router(state.clone()), state)
}

/// Build a request with an optional JSON body.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A track payload with no references.
#[allow(dead_code)]
pub fn sample_track(name: &str) -> Track {
    Track::new(
        String::new(),
        name,
        Coordinate {
            lat: 43.2627,
            lng: -2.9253,
        },
        Coordinate {
            lat: 43.3183,
            lng: -1.9812,
        },
        12.5,
        3.2,
        Activity::Running,
    )
}

/// Generate a unique suffix for test isolation.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string()
}
