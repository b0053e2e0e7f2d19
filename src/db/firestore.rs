// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Each entity kind lives in its own collection, keyed by entity id.
//! Reads go straight to Firestore; writes are always staged in a
//! [`WriteBatch`] and committed as a single transaction.

use crate::db::{Mutation, WriteBatch};
use crate::error::AppError;
use crate::models::{Entity, EntityDoc, EntityKind};

// Firestore limits batch/transaction writes to 500 operations.
const MAX_TRANSACTION_WRITES: usize = 500;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
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

        Ok(Self { client })
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// List every document of a collection.
    pub async fn find_all<E: Entity>(&self) -> Result<Vec<E>, AppError> {
        self.client
            .fluent()
            .select()
            .from(E::KIND.collection())
            .obj::<E>()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a document by id.
    pub async fn find_by_id<E: Entity>(&self, id: &str) -> Result<Option<E>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(E::KIND.collection())
            .obj::<E>()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a document by its unique name.
    pub async fn find_by_name<E: Entity>(&self, name: &str) -> Result<Option<E>, AppError> {
        let matches: Vec<E> = self
            .client
            .fluent()
            .select()
            .from(E::KIND.collection())
            .filter(|q| q.for_all([q.field("name").eq(name)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Commit every mutation of `batch` in one Firestore transaction.
    ///
    /// Either all documents are written or none are.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        let count = batch.len();
        if count > MAX_TRANSACTION_WRITES {
            return Err(AppError::Database(format!(
                "Write batch of {} documents exceeds the transaction limit of {}",
                count, MAX_TRANSACTION_WRITES
            )));
        }

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for mutation in batch {
            match mutation {
                Mutation::Upsert(EntityDoc::Track(track)) => {
                    self.stage_upsert(&mut transaction, &track)?
                }
                Mutation::Upsert(EntityDoc::User(user)) => {
                    self.stage_upsert(&mut transaction, &user)?
                }
                Mutation::Upsert(EntityDoc::Group(group)) => {
                    self.stage_upsert(&mut transaction, &group)?
                }
                Mutation::Upsert(EntityDoc::Challenge(challenge)) => {
                    self.stage_upsert(&mut transaction, &challenge)?
                }
                Mutation::Delete { kind, id } => {
                    self.stage_delete(&mut transaction, kind, &id)?
                }
            }
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(mutations = count, "Committed write batch");
        Ok(())
    }

    fn stage_upsert<E: Entity>(
        &self,
        transaction: &mut firestore::FirestoreTransaction<'_>,
        entity: &E,
    ) -> Result<(), AppError> {
        self.client
            .fluent()
            .update()
            .in_col(E::KIND.collection())
            .document_id(entity.id())
            .object(entity)
            .add_to_transaction(transaction)
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to add {} {} to transaction: {}",
                    E::KIND,
                    entity.id(),
                    e
                ))
            })?;
        Ok(())
    }

    fn stage_delete(
        &self,
        transaction: &mut firestore::FirestoreTransaction<'_>,
        kind: EntityKind,
        id: &str,
    ) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(kind.collection())
            .document_id(id)
            .add_to_transaction(transaction)
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to add deletion of {} {} to transaction: {}",
                    kind, id, e
                ))
            })?;
        Ok(())
    }
}
