// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tenant-scoped workout record for storage.

use crate::models::event::{ComponentType, ScoringType};
use serde::{Deserialize, Serialize};

/// A workout component as persisted, with a stable positional id
/// assigned at ingestion time (`comp-0`, `comp-1`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_type: Option<ScoringType>,
}

/// Stored externally-programmed workout.
///
/// Uniquely identified by `(external_id, gym_id)` — the idempotency key
/// for redelivered events. `received_at` is set on first creation and
/// never overwritten by later updates; `updated_at` is refreshed on
/// every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalWorkout {
    /// Provider-side workout ID
    pub external_id: String,
    /// Provider that sent the workout
    pub provider_id: String,
    pub provider_name: String,
    /// Gym/provider connection this delivery flowed through
    pub connection_id: String,
    /// Tenant (gym) that owns this record
    pub gym_id: String,
    pub title: String,
    pub description: String,
    /// Scheduled date (RFC3339)
    pub scheduled_date: String,
    pub components: Vec<StoredComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_notes: Option<String>,
    /// Publish state, taken from the connection's autoPublish config
    /// at write time
    pub is_published: bool,
    pub published_to_group_ids: Vec<String>,
    /// First time this (externalId, gymId) pair was received (RFC3339).
    /// Immutable once set.
    pub received_at: String,
    /// Last write time (RFC3339)
    pub updated_at: String,
}

/// A stored workout together with its document id.
#[derive(Debug, Clone)]
pub struct StoredWorkout {
    pub id: String,
    pub record: ExternalWorkout,
}
