// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store implementing the storage traits.
//!
//! Used by the integration tests and for local development without a
//! Firestore emulator. Write failures can be injected per gym to
//! exercise the partial-failure path of the dispatcher.

use crate::db::{ConnectionRegistry, CredentialStore, WorkoutStore};
use crate::error::AppError;
use crate::models::{
    ConnectionRecord, ConnectionStatus, ExternalWorkout, GymProviderConnection,
    ProviderCredential, StoredWorkout,
};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory implementation of all three storage collaborators.
#[derive(Default)]
pub struct MemoryStore {
    credentials: DashMap<String, ProviderCredential>,
    connections: DashMap<String, GymProviderConnection>,
    workouts: DashMap<String, ExternalWorkout>,
    next_id: AtomicU64,
    /// Gyms whose workout writes should fail with a storage error.
    failing_gyms: DashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider credential.
    pub fn put_credential(&self, credential: ProviderCredential) {
        self.credentials
            .insert(credential.provider_id.clone(), credential);
    }

    /// Register a connection under the given document id.
    pub fn put_connection(&self, id: &str, connection: GymProviderConnection) {
        self.connections.insert(id.to_string(), connection);
    }

    /// Make every workout write for `gym_id` fail (test hook).
    pub fn fail_writes_for_gym(&self, gym_id: &str) {
        self.failing_gyms.insert(gym_id.to_string());
    }

    /// Snapshot of a connection by id.
    pub fn connection(&self, id: &str) -> Option<GymProviderConnection> {
        self.connections.get(id).map(|c| c.clone())
    }

    /// Snapshot of a workout by id.
    pub fn workout(&self, id: &str) -> Option<ExternalWorkout> {
        self.workouts.get(id).map(|w| w.clone())
    }

    /// Number of stored workout records.
    pub fn workout_count(&self) -> usize {
        self.workouts.len()
    }

    fn check_writable(&self, gym_id: &str) -> Result<(), AppError> {
        if self.failing_gyms.contains(gym_id) {
            return Err(AppError::Database(format!(
                "Injected write failure for gym {}",
                gym_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_credential(
        &self,
        provider_id: &str,
    ) -> Result<Option<ProviderCredential>, AppError> {
        Ok(self.credentials.get(provider_id).map(|c| c.clone()))
    }
}

#[async_trait]
impl ConnectionRegistry for MemoryStore {
    async fn list_active_connections(
        &self,
        provider_id: &str,
    ) -> Result<Vec<ConnectionRecord>, AppError> {
        let mut records: Vec<ConnectionRecord> = self
            .connections
            .iter()
            .filter(|entry| {
                entry.provider_id == provider_id && entry.status == ConnectionStatus::Active
            })
            .map(|entry| ConnectionRecord {
                id: entry.key().clone(),
                connection: entry.value().clone(),
            })
            .collect();
        // DashMap iteration order is arbitrary; sort for stable tests.
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn touch_last_received(&self, connection_id: &str, at: &str) -> Result<(), AppError> {
        let mut entry = self.connections.get_mut(connection_id).ok_or_else(|| {
            AppError::Database(format!("Unknown connection {}", connection_id))
        })?;
        entry.last_workout_received_at = Some(at.to_string());
        Ok(())
    }
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn find_by_external_id_and_gym(
        &self,
        external_id: &str,
        gym_id: &str,
    ) -> Result<Option<StoredWorkout>, AppError> {
        Ok(self
            .workouts
            .iter()
            .find(|entry| entry.external_id == external_id && entry.gym_id == gym_id)
            .map(|entry| StoredWorkout {
                id: entry.key().clone(),
                record: entry.value().clone(),
            }))
    }

    async fn create(&self, record: &ExternalWorkout) -> Result<String, AppError> {
        self.check_writable(&record.gym_id)?;
        let id = format!("wod-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.workouts.insert(id.clone(), record.clone());
        Ok(id)
    }

    async fn update(&self, workout_id: &str, record: &ExternalWorkout) -> Result<(), AppError> {
        self.check_writable(&record.gym_id)?;
        let mut entry = self.workouts.get_mut(workout_id).ok_or_else(|| {
            AppError::Database(format!("Unknown workout {}", workout_id))
        })?;
        *entry = record.clone();
        Ok(())
    }

    async fn delete(&self, workout_id: &str) -> Result<(), AppError> {
        let Some(entry) = self.workouts.get(workout_id) else {
            // Deleting an absent record is a no-op.
            return Ok(());
        };
        let gym_id = entry.gym_id.clone();
        drop(entry);
        self.check_writable(&gym_id)?;
        self.workouts.remove(workout_id);
        Ok(())
    }
}
