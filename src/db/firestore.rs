// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Collections:
//! - `providerCredentials` (webhook secrets, keyed by providerId field)
//! - `gymProviderConnections` (gym subscriptions per provider)
//! - `externalProgrammedWorkouts` (tenant-scoped workout records)
//!
//! Workout documents use a deterministic id derived from
//! `(gymId, externalId)`, so a redelivered event always targets the
//! same document regardless of which replica processes it.

use crate::db::{collections, ConnectionRegistry, CredentialStore, WorkoutStore};
use crate::error::AppError;
use crate::models::{
    ConnectionRecord, ConnectionStatus, ExternalWorkout, GymProviderConnection,
    ProviderCredential, StoredWorkout,
};
use async_trait::async_trait;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Document id for a workout record, unique per (gym, external) pair.
fn workout_doc_id(external_id: &str, gym_id: &str) -> String {
    format!(
        "{}_{}",
        urlencoding::encode(gym_id),
        urlencoding::encode(external_id)
    )
}

/// Extract the bare document id from a full Firestore document name.
fn doc_id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait]
impl CredentialStore for FirestoreDb {
    async fn get_credential(
        &self,
        provider_id: &str,
    ) -> Result<Option<ProviderCredential>, AppError> {
        let credentials: Vec<ProviderCredential> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROVIDER_CREDENTIALS)
            .filter(|q| q.for_all([q.field("providerId").eq(provider_id)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(credentials.into_iter().next())
    }
}

#[async_trait]
impl ConnectionRegistry for FirestoreDb {
    async fn list_active_connections(
        &self,
        provider_id: &str,
    ) -> Result<Vec<ConnectionRecord>, AppError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::GYM_PROVIDER_CONNECTIONS)
            .filter(|q| {
                q.for_all([
                    q.field("providerId").eq(provider_id),
                    q.field("status").eq("active"),
                ])
            })
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc_id_from_name(&doc.name);
            let connection: GymProviderConnection =
                firestore::FirestoreDb::deserialize_doc_to(&doc)
                    .map_err(|e| AppError::Database(e.to_string()))?;
            // The query already filters on status; this guards against
            // stale index entries.
            if connection.status == ConnectionStatus::Active {
                records.push(ConnectionRecord { id, connection });
            }
        }
        Ok(records)
    }

    async fn touch_last_received(&self, connection_id: &str, at: &str) -> Result<(), AppError> {
        let client = self.get_client()?;

        let existing: Option<GymProviderConnection> = client
            .fluent()
            .select()
            .by_id_in(collections::GYM_PROVIDER_CONNECTIONS)
            .obj()
            .one(connection_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(mut connection) = existing else {
            return Err(AppError::Database(format!(
                "Connection {} disappeared during dispatch",
                connection_id
            )));
        };
        connection.last_workout_received_at = Some(at.to_string());

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::GYM_PROVIDER_CONNECTIONS)
            .document_id(connection_id)
            .object(&connection)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl WorkoutStore for FirestoreDb {
    async fn find_by_external_id_and_gym(
        &self,
        external_id: &str,
        gym_id: &str,
    ) -> Result<Option<StoredWorkout>, AppError> {
        let doc_id = workout_doc_id(external_id, gym_id);
        let record: Option<ExternalWorkout> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EXTERNAL_WORKOUTS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(record.map(|record| StoredWorkout { id: doc_id, record }))
    }

    async fn create(&self, record: &ExternalWorkout) -> Result<String, AppError> {
        let doc_id = workout_doc_id(&record.external_id, &record.gym_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXTERNAL_WORKOUTS)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc_id)
    }

    async fn update(&self, workout_id: &str, record: &ExternalWorkout) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXTERNAL_WORKOUTS)
            .document_id(workout_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, workout_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::EXTERNAL_WORKOUTS)
            .document_id(workout_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workout_doc_id_is_deterministic_and_safe() {
        assert_eq!(workout_doc_id("ext-1", "gym-1"), "gym-1_ext-1");
        // Slashes would otherwise split the document path.
        assert_eq!(workout_doc_id("a/b", "gym"), "gym_a%2Fb");
    }

    #[test]
    fn test_doc_id_from_name() {
        let name = "projects/p/databases/(default)/documents/externalProgrammedWorkouts/abc";
        assert_eq!(doc_id_from_name(name), "abc");
    }

    #[tokio::test]
    async fn test_mock_db_returns_error() {
        let db = FirestoreDb::new_mock();
        let result = db.get_credential("p1").await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
