// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fan-out orchestrator for inbound provider events.
//!
//! One authenticated event is delivered independently to every gym
//! actively subscribed to the sending provider. Parse, authentication
//! and recipient resolution abort the whole request on failure; once
//! per-connection dispatch begins, failures are confined to the
//! connection they occurred on and reported in the result list.

use crate::db::{ConnectionRegistry, CredentialStore, WorkoutStore};
use crate::error::AppError;
use crate::models::{ConnectionRecord, EventKind, ProviderEvent};
use crate::services::signature;
use crate::services::upsert::{self, WritePlan};
use crate::time_utils::format_utc_rfc3339;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// Outcome of one connection's delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub gym_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated outcome of a fan-out.
#[derive(Debug)]
pub struct DeliveryReport {
    pub message: String,
    pub results: Vec<DeliveryResult>,
}

/// Fan-out orchestrator. Stateless between requests; all state lives
/// behind the storage collaborators.
#[derive(Clone)]
pub struct DispatchService {
    credentials: Arc<dyn CredentialStore>,
    connections: Arc<dyn ConnectionRegistry>,
    workouts: Arc<dyn WorkoutStore>,
    max_concurrent: usize,
}

impl DispatchService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        connections: Arc<dyn ConnectionRegistry>,
        workouts: Arc<dyn WorkoutStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            credentials,
            connections,
            workouts,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Process one inbound webhook body end to end.
    pub async fn handle(&self, raw_body: &[u8]) -> Result<DeliveryReport, AppError> {
        let event: ProviderEvent = serde_json::from_slice(raw_body)
            .map_err(|e| AppError::Validation(format!("Invalid payload: {}", e)))?;
        event
            .validate()
            .map_err(|_| AppError::Validation("Missing required fields".to_string()))?;

        self.authenticate(&event).await?;

        let recipients = self
            .connections
            .list_active_connections(&event.provider.id)
            .await?;
        if recipients.is_empty() {
            return Err(AppError::NoActiveConnections);
        }

        tracing::info!(
            provider_id = %event.provider.id,
            event = ?event.event,
            external_id = %event.workout.external_id,
            recipients = recipients.len(),
            "Dispatching provider event"
        );

        // Connections are independent: no shared state, no ordering
        // requirement on the result list.
        let results: Vec<DeliveryResult> = stream::iter(recipients)
            .map(|connection| {
                let event = &event;
                async move {
                    let gym_id = connection.connection.gym_id.clone();
                    match self.deliver_one(event, &connection).await {
                        Ok(workout_id) => DeliveryResult {
                            gym_id,
                            workout_id,
                            error: None,
                        },
                        Err(err) => {
                            tracing::warn!(
                                gym_id = %gym_id,
                                error = %err,
                                "Delivery failed for connection"
                            );
                            DeliveryResult {
                                gym_id,
                                workout_id: None,
                                error: Some(err.to_string()),
                            }
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        Ok(DeliveryReport {
            message: format!("Processed workout for {} gym(s)", results.len()),
            results,
        })
    }

    /// Steps 1b/2: credential lookup and signature verification.
    async fn authenticate(&self, event: &ProviderEvent) -> Result<(), AppError> {
        let credential = self
            .credentials
            .get_credential(&event.provider.id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(provider_id = %event.provider.id, "Webhook from unknown provider");
                AppError::UnknownProvider
            })?;

        // No registered secret means verification is skipped for this
        // provider (documented onboarding state), not rejected.
        let Some(secret) = credential.webhook_secret.as_deref() else {
            return Ok(());
        };

        let claimed = event.signature.as_deref().unwrap_or("");
        let canonical = signature::canonical_payload(event)?;
        if !signature::verify(&canonical, claimed, secret) {
            tracing::warn!(
                provider_id = %event.provider.id,
                "Webhook signature mismatch"
            );
            return Err(AppError::InvalidSignature);
        }
        Ok(())
    }

    /// Deliver the event to a single connection.
    ///
    /// Returns the stored workout id, or `None` for a delete that found
    /// nothing to remove.
    async fn deliver_one(
        &self,
        event: &ProviderEvent,
        connection: &ConnectionRecord,
    ) -> Result<Option<String>, AppError> {
        let now = format_utc_rfc3339(chrono::Utc::now());
        let existing = self
            .workouts
            .find_by_external_id_and_gym(
                &event.workout.external_id,
                &connection.connection.gym_id,
            )
            .await?;

        let plan = upsert::plan(event, connection, existing.as_ref(), &now)?;

        let workout_id = match plan {
            WritePlan::Create(record) => Some(self.workouts.create(&record).await?),
            WritePlan::Update { workout_id, record } => {
                self.workouts.update(&workout_id, &record).await?;
                Some(workout_id)
            }
            WritePlan::Delete { workout_id } => {
                self.workouts.delete(&workout_id).await?;
                Some(workout_id)
            }
            WritePlan::Noop => None,
        };

        // Deletes don't count as receiving programming.
        if event.event != EventKind::Deleted {
            self.connections
                .touch_last_received(&connection.id, &now)
                .await?;
        }

        Ok(workout_id)
    }
}
