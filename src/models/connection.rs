// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Provider credentials and gym/provider subscription records.

use serde::{Deserialize, Serialize};

/// Shared-secret credential registered for a provider at onboarding.
/// Read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredential {
    pub provider_id: String,
    /// When absent, signature verification is skipped for this provider
    /// (documented allow-all policy, not an error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
}

/// Subscription status of a gym/provider connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Inactive,
}

/// A gym's subscription to a provider's programming.
///
/// This service only ever mutates `last_workout_received_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymProviderConnection {
    pub gym_id: String,
    pub provider_id: String,
    pub status: ConnectionStatus,
    /// Publish incoming workouts immediately to the target groups
    pub auto_publish: bool,
    pub target_group_ids: Vec<String>,
    /// Last delivery timestamp (RFC3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_workout_received_at: Option<String>,
}

/// A connection together with its document id.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub id: String,
    pub connection: GymProviderConnection,
}
