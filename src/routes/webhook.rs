// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for external programming providers.

use crate::error::AppError;
use crate::services::DeliveryResult;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Json, State},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/providers/webhook", get(health).post(receive))
}

/// Successful fan-out response. Per-connection failures ride inside
/// `results`; `success` stays true once dispatch has begun.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<DeliveryResult>,
}

/// Health check response.
#[derive(Serialize)]
struct WebhookHealth {
    status: String,
    message: String,
    timestamp: String,
}

/// Receive a provider event and fan it out (POST).
///
/// The body is taken as raw bytes: the signature check needs the event
/// re-serialized exactly, so parsing stays inside the dispatch service
/// rather than in an extractor.
async fn receive(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let report = state.dispatch.handle(&body).await?;
    Ok(Json(WebhookResponse {
        success: true,
        message: report.message,
        results: report.results,
    }))
}

/// Webhook health check (GET).
async fn health() -> Json<WebhookHealth> {
    Json(WebhookHealth {
        status: "ok".to_string(),
        message: "Webhook endpoint is active".to_string(),
        timestamp: format_utc_rfc3339(chrono::Utc::now()),
    })
}
