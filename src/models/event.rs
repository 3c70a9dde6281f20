// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inbound webhook payload from an external programming provider.
//!
//! The `signature` field is excluded from serialization so that
//! re-serializing an event yields exactly the canonical bytes the
//! provider signed (stable field order, absent optionals omitted).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Webhook event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "workout.created")]
    Created,
    #[serde(rename = "workout.updated")]
    Updated,
    #[serde(rename = "workout.deleted")]
    Deleted,
}

/// Provider identity as claimed by the sender. Verified against the
/// credential store before anything is trusted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProviderRef {
    #[validate(length(min = 1))]
    pub id: String,
    pub name: String,
}

/// Component type within a programmed workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Warmup,
    Wod,
    Lift,
    Skill,
    Cooldown,
}

/// Scoring scheme for a component, when the provider specifies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringType {
    Fortime,
    Emom,
    Amrap,
}

/// One ordered component of the workout (warmup, WOD, lift, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutComponent {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_type: Option<ScoringType>,
}

/// The workout body of an event.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPayload {
    #[validate(length(min = 1))]
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub scheduled_date: String,
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
    pub components: Vec<WorkoutComponent>,
}

/// Full webhook event as posted by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProviderEvent {
    pub event: EventKind,
    pub timestamp: String,
    #[validate(nested)]
    pub provider: ProviderRef,
    #[validate(nested)]
    pub workout: WorkoutPayload,
    /// HMAC tag over the canonical payload. Never serialized back out.
    #[serde(skip_serializing, default)]
    pub signature: Option<String>,
}
