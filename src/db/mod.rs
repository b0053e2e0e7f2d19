// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Db`] is the persistence collaborator handed to services: key and name
//! lookups over the four collections, plus atomic commit of a
//! [`WriteBatch`]. It is backed either by Firestore or by process memory.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{Challenge, Entity, EntityDoc, EntityId, EntityKind, Group, Track, User};

/// Collection names as constants.
pub mod collections {
    pub const TRACKS: &str = "tracks";
    pub const USERS: &str = "users";
    pub const GROUPS: &str = "groups";
    pub const CHALLENGES: &str = "challenges";
}

/// A single document write.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Upsert(EntityDoc),
    Delete { kind: EntityKind, id: EntityId },
}

/// Document writes that must land together.
#[derive(Debug, Default)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub fn upsert<E: Entity>(&mut self, entity: E) {
        self.mutations.push(Mutation::Upsert(entity.into_doc()));
    }

    pub fn upsert_doc(&mut self, doc: EntityDoc) {
        self.mutations.push(Mutation::Upsert(doc));
    }

    pub fn delete(&mut self, kind: EntityKind, id: impl Into<EntityId>) {
        self.mutations.push(Mutation::Delete {
            kind,
            id: id.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}

impl IntoIterator for WriteBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

/// Storage handle shared by services and handlers.
#[derive(Clone)]
pub enum Db {
    Memory(MemoryDb),
    Firestore(FirestoreDb),
}

impl Db {
    /// Open the backend selected in `config`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage_backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Db::Memory(MemoryDb::new()))
            }
            StorageBackend::Firestore => {
                let project_id = config.gcp_project_id.as_deref().ok_or_else(|| {
                    AppError::Database("GCP_PROJECT_ID is required for Firestore".to_string())
                })?;
                Ok(Db::Firestore(FirestoreDb::new(project_id).await?))
            }
        }
    }

    /// Fresh in-memory storage.
    pub fn new_memory() -> Self {
        Db::Memory(MemoryDb::new())
    }

    pub async fn find_all<E: Entity>(&self) -> Result<Vec<E>, AppError> {
        match self {
            Db::Memory(db) => Ok(db.find_all().await),
            Db::Firestore(db) => db.find_all().await,
        }
    }

    pub async fn find_by_id<E: Entity>(&self, id: &str) -> Result<Option<E>, AppError> {
        match self {
            Db::Memory(db) => Ok(db.find_by_id(id).await),
            Db::Firestore(db) => db.find_by_id(id).await,
        }
    }

    pub async fn find_by_name<E: Entity>(&self, name: &str) -> Result<Option<E>, AppError> {
        match self {
            Db::Memory(db) => Ok(db.find_by_name(name).await),
            Db::Firestore(db) => db.find_by_name(name).await,
        }
    }

    /// Look up a document of any kind.
    pub async fn find_doc(&self, kind: EntityKind, id: &str) -> Result<Option<EntityDoc>, AppError> {
        Ok(match kind {
            EntityKind::Track => self.find_by_id::<Track>(id).await?.map(EntityDoc::Track),
            EntityKind::User => self.find_by_id::<User>(id).await?.map(EntityDoc::User),
            EntityKind::Group => self.find_by_id::<Group>(id).await?.map(EntityDoc::Group),
            EntityKind::Challenge => self
                .find_by_id::<Challenge>(id)
                .await?
                .map(EntityDoc::Challenge),
        })
    }

    /// List every document of a collection.
    pub async fn find_all_docs(&self, kind: EntityKind) -> Result<Vec<EntityDoc>, AppError> {
        Ok(match kind {
            EntityKind::Track => docs(self.find_all::<Track>().await?),
            EntityKind::User => docs(self.find_all::<User>().await?),
            EntityKind::Group => docs(self.find_all::<Group>().await?),
            EntityKind::Challenge => docs(self.find_all::<Challenge>().await?),
        })
    }

    /// Apply all mutations atomically; nothing is written on error.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        match self {
            Db::Memory(db) => {
                db.commit(batch).await;
                Ok(())
            }
            Db::Firestore(db) => db.commit(batch).await,
        }
    }
}

fn docs<E: Entity>(entities: Vec<E>) -> Vec<EntityDoc> {
    entities.into_iter().map(Entity::into_doc).collect()
}
