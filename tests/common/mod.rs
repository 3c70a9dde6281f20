// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use wodsync::config::Config;
use wodsync::db::MemoryStore;
use wodsync::models::{
    ConnectionStatus, GymProviderConnection, ProviderCredential, ProviderEvent,
};
use wodsync::routes::create_router;
use wodsync::services::signature::{canonical_payload, sign};
use wodsync::services::DispatchService;
use wodsync::AppState;

pub const TEST_SECRET: &str = "test-webhook-secret";

/// Create a test app backed by the in-memory store.
/// Returns the router and the store for seeding and assertions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemoryStore>) {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let dispatch = DispatchService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        config.max_concurrent_deliveries,
    );
    let state = Arc::new(AppState { config, dispatch });
    (create_router(state), store)
}

/// Seed a provider credential.
#[allow(dead_code)]
pub fn seed_credential(store: &MemoryStore, provider_id: &str, secret: Option<&str>) {
    store.put_credential(ProviderCredential {
        provider_id: provider_id.to_string(),
        webhook_secret: secret.map(|s| s.to_string()),
    });
}

/// Seed an active gym connection.
#[allow(dead_code)]
pub fn seed_connection(
    store: &MemoryStore,
    id: &str,
    gym_id: &str,
    provider_id: &str,
    auto_publish: bool,
    target_group_ids: &[&str],
) {
    store.put_connection(
        id,
        GymProviderConnection {
            gym_id: gym_id.to_string(),
            provider_id: provider_id.to_string(),
            status: ConnectionStatus::Active,
            auto_publish,
            target_group_ids: target_group_ids.iter().map(|g| g.to_string()).collect(),
            last_workout_received_at: None,
        },
    );
}

/// A sample event body for the given kind and external id.
#[allow(dead_code)]
pub fn sample_event(kind: &str, external_id: &str) -> serde_json::Value {
    serde_json::json!({
        "event": kind,
        "timestamp": "2026-01-05T08:00:00Z",
        "provider": {"id": "p1", "name": "Forge Programming"},
        "workout": {
            "externalId": external_id,
            "title": "Fran",
            "description": "21-15-9 thrusters and pull-ups",
            "scheduledDate": "2026-01-06",
            "components": [
                {"type": "wod", "title": "Fran", "description": "21-15-9...", "scoringType": "fortime"}
            ]
        }
    })
}

/// Sign an event body the way a provider would: HMAC over the
/// canonical serialization, attached as the `signature` field.
#[allow(dead_code)]
pub fn signed_body(mut event_json: serde_json::Value, secret: &str) -> String {
    let event: ProviderEvent =
        serde_json::from_value(event_json.clone()).expect("test event must parse");
    let canonical = canonical_payload(&event).expect("canonical serialization");
    event_json["signature"] = serde_json::json!(sign(&canonical, secret));
    event_json.to_string()
}

/// POST a body to the webhook endpoint, returning status and parsed JSON.
#[allow(dead_code)]
pub async fn post_webhook(app: axum::Router, body: String) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/providers/webhook")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
