// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! The orchestrator only sees the three collaborator traits below, so
//! tests run against the in-memory store while production uses
//! Firestore.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{ConnectionRecord, ExternalWorkout, ProviderCredential, StoredWorkout};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const PROVIDER_CREDENTIALS: &str = "providerCredentials";
    pub const GYM_PROVIDER_CONNECTIONS: &str = "gymProviderConnections";
    pub const EXTERNAL_WORKOUTS: &str = "externalProgrammedWorkouts";
}

/// Read-only lookup of provider webhook credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential registered for a provider, if any.
    async fn get_credential(
        &self,
        provider_id: &str,
    ) -> Result<Option<ProviderCredential>, AppError>;
}

/// Gym/provider subscription registry.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// All connections for a provider with active status.
    async fn list_active_connections(
        &self,
        provider_id: &str,
    ) -> Result<Vec<ConnectionRecord>, AppError>;

    /// Record a delivery on a connection.
    async fn touch_last_received(&self, connection_id: &str, at: &str) -> Result<(), AppError>;
}

/// Tenant-scoped workout storage.
///
/// `(external_id, gym_id)` is the idempotency key; implementations must
/// resolve it to at most one record.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn find_by_external_id_and_gym(
        &self,
        external_id: &str,
        gym_id: &str,
    ) -> Result<Option<StoredWorkout>, AppError>;

    /// Store a new record, returning its id.
    async fn create(&self, record: &ExternalWorkout) -> Result<String, AppError>;

    async fn update(&self, workout_id: &str, record: &ExternalWorkout) -> Result<(), AppError>;

    async fn delete(&self, workout_id: &str) -> Result<(), AppError>;
}
