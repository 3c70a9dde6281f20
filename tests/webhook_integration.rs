// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration tests for provider webhook ingestion and fan-out.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{
    create_test_app, post_webhook, sample_event, seed_connection, seed_credential, signed_body,
    TEST_SECRET,
};
use tower::ServiceExt;

#[tokio::test]
async fn test_webhook_health_check() {
    let (app, _store) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/providers/webhook")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_missing_external_id_is_rejected_without_side_effects() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let mut event = sample_event("workout.created", "ext-1");
    event["workout"]
        .as_object_mut()
        .unwrap()
        .remove("externalId");

    let (status, json) = post_webhook(app, event.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    // Validation happens before any storage access.
    assert_eq!(store.workout_count(), 0);
    assert!(store.connection("c1").unwrap().last_workout_received_at.is_none());
}

#[tokio::test]
async fn test_empty_external_id_is_rejected() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);

    let mut event = sample_event("workout.created", "ext-1");
    event["workout"]["externalId"] = serde_json::json!("");

    let (status, json) = post_webhook(app, event.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let (app, _store) = create_test_app();

    let event = sample_event("workout.created", "ext-1");
    let (status, json) = post_webhook(app, event.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Unknown provider");
}

#[tokio::test]
async fn test_invalid_signature_is_rejected() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", Some(TEST_SECRET));
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let mut event = sample_event("workout.created", "ext-1");
    event["signature"] = serde_json::json!("0".repeat(64));

    let (status, json) = post_webhook(app, event.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid signature");
    assert_eq!(store.workout_count(), 0);
}

#[tokio::test]
async fn test_tampered_payload_fails_verification() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", Some(TEST_SECRET));
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let body = signed_body(sample_event("workout.created", "ext-1"), TEST_SECRET);
    // Mutate the payload after signing.
    let tampered = body.replace("Fran", "Grace");

    let (status, json) = post_webhook(app, tampered).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid signature");
}

#[tokio::test]
async fn test_signed_event_is_accepted() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", Some(TEST_SECRET));
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let body = signed_body(sample_event("workout.created", "ext-1"), TEST_SECRET);
    let (status, json) = post_webhook(app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
    assert_eq!(store.workout_count(), 1);
}

#[tokio::test]
async fn test_no_secret_configured_skips_verification() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    // Unsigned event: allowed because no secret is registered.
    let (status, json) = post_webhook(app, sample_event("workout.created", "ext-1").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_no_active_connections() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);

    let (status, json) = post_webhook(app, sample_event("workout.created", "ext-1").to_string()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No active connections for this provider");
}

#[tokio::test]
async fn test_fan_out_with_publish_flags() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-pub", "p1", true, &["g-all"]);
    seed_connection(&store, "c2", "gym-draft", "p1", false, &[]);

    let (status, json) = post_webhook(app, sample_event("workout.created", "ext-1").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    for result in results {
        let workout_id = result["workoutId"].as_str().expect("fresh workoutId");
        let record = store.workout(workout_id).unwrap();
        match result["gymId"].as_str().unwrap() {
            "gym-pub" => {
                assert!(record.is_published);
                assert_eq!(record.published_to_group_ids, ["g-all"]);
            }
            "gym-draft" => {
                assert!(!record.is_published);
                assert!(record.published_to_group_ids.is_empty());
            }
            other => panic!("unexpected gym {}", other),
        }
    }

    // Delivery is recorded on both connections.
    assert!(store.connection("c1").unwrap().last_workout_received_at.is_some());
    assert!(store.connection("c2").unwrap().last_workout_received_at.is_some());
}

#[tokio::test]
async fn test_redelivery_is_idempotent() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let (status, json) =
        post_webhook(app.clone(), sample_event("workout.created", "ext-1").to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let workout_id = json["results"][0]["workoutId"].as_str().unwrap().to_string();
    let first = store.workout(&workout_id).unwrap();

    // Redeliver with updated content.
    let mut update = sample_event("workout.updated", "ext-1");
    update["workout"]["title"] = serde_json::json!("Fran (scaled)");
    let (status, json) = post_webhook(app, update.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Same record, not a second one.
    assert_eq!(store.workout_count(), 1);
    assert_eq!(json["results"][0]["workoutId"], workout_id.as_str());

    let second = store.workout(&workout_id).unwrap();
    assert_eq!(second.received_at, first.received_at);
    assert_eq!(second.title, "Fran (scaled)");
}

#[tokio::test]
async fn test_delete_removes_record() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let (_, json) =
        post_webhook(app.clone(), sample_event("workout.created", "ext-1").to_string()).await;
    let workout_id = json["results"][0]["workoutId"].as_str().unwrap().to_string();

    let (status, json) = post_webhook(app, sample_event("workout.deleted", "ext-1").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"][0]["workoutId"], workout_id.as_str());
    assert_eq!(store.workout_count(), 0);
}

#[tokio::test]
async fn test_delete_of_absent_record_is_a_successful_noop() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);

    let (status, json) =
        post_webhook(app, sample_event("workout.deleted", "never-seen").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let result = &json["results"][0];
    assert_eq!(result["gymId"], "gym-1");
    assert!(result.get("workoutId").is_none());
    assert!(result.get("error").is_none());
}

#[tokio::test]
async fn test_one_failing_tenant_does_not_abort_the_others() {
    let (app, store) = create_test_app();
    seed_credential(&store, "p1", None);
    seed_connection(&store, "c1", "gym-1", "p1", false, &[]);
    seed_connection(&store, "c2", "gym-2", "p1", false, &[]);
    seed_connection(&store, "c3", "gym-3", "p1", false, &[]);
    store.fail_writes_for_gym("gym-2");

    let (status, json) = post_webhook(app, sample_event("workout.created", "ext-1").to_string()).await;

    // The call succeeds at the transport level despite the failure.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    let errored: Vec<&serde_json::Value> = results
        .iter()
        .filter(|r| r.get("error").is_some())
        .collect();
    assert_eq!(errored.len(), 1);
    assert_eq!(errored[0]["gymId"], "gym-2");

    // The two healthy tenants got their records.
    assert_eq!(store.workout_count(), 2);
}
