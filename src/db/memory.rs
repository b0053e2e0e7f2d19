// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process storage backend.
//!
//! Used for local runs without GCP and by the test suite. All four
//! collections sit behind one lock, so a [`WriteBatch`] is applied
//! atomically with respect to every reader.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{Mutation, WriteBatch};
use crate::models::{Entity, EntityDoc, EntityKind};

/// Collections held in memory, in insertion order.
#[derive(Clone, Default)]
pub struct MemoryDb {
    collections: Arc<RwLock<HashMap<EntityKind, Vec<EntityDoc>>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_all<E: Entity>(&self) -> Vec<E> {
        let collections = self.collections.read().await;
        collections
            .get(&E::KIND)
            .map(|docs| docs.iter().cloned().filter_map(E::from_doc).collect())
            .unwrap_or_default()
    }

    pub async fn find_by_id<E: Entity>(&self, id: &str) -> Option<E> {
        self.find_where(|doc| doc.id() == id).await
    }

    pub async fn find_by_name<E: Entity>(&self, name: &str) -> Option<E> {
        self.find_where(|doc| doc.name() == name).await
    }

    async fn find_where<E: Entity>(&self, predicate: impl Fn(&EntityDoc) -> bool) -> Option<E> {
        let collections = self.collections.read().await;
        collections
            .get(&E::KIND)?
            .iter()
            .find(|doc| predicate(doc))
            .cloned()
            .and_then(E::from_doc)
    }

    /// Apply every mutation under a single write lock.
    pub async fn commit(&self, batch: WriteBatch) {
        let mut collections = self.collections.write().await;

        for mutation in batch {
            match mutation {
                Mutation::Upsert(doc) => {
                    let docs = collections.entry(doc.kind()).or_default();
                    match docs.iter_mut().find(|d| d.id() == doc.id()) {
                        Some(existing) => *existing = doc,
                        None => docs.push(doc),
                    }
                }
                Mutation::Delete { kind, id } => {
                    if let Some(docs) = collections.get_mut(&kind) {
                        docs.retain(|d| d.id() != id);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, User};

    fn user(id: &str, name: &str) -> User {
        User::new(id.to_string(), name, Activity::Running)
    }

    #[tokio::test]
    async fn test_commit_upserts_and_deletes() {
        let db = MemoryDb::new();

        let mut batch = WriteBatch::new();
        batch.upsert(user("u1", "Ana"));
        batch.upsert(user("u2", "Bo"));
        db.commit(batch).await;

        let mut renamed = user("u1", "Ana Maria");
        renamed.users.add("u2".to_string());
        let mut batch = WriteBatch::new();
        batch.upsert(renamed);
        batch.delete(EntityKind::User, "u2");
        db.commit(batch).await;

        let all: Vec<User> = db.find_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ana Maria");
        assert!(db.find_by_name::<User>("Ana").await.is_none());
        assert!(db.find_by_id::<User>("u2").await.is_none());
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let db = MemoryDb::new();
        let mut batch = WriteBatch::new();
        for (id, name) in [("z", "Zed"), ("a", "Amy"), ("m", "Mo")] {
            batch.upsert(user(id, name));
        }
        db.commit(batch).await;

        let names: Vec<String> = db
            .find_all::<User>()
            .await
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Zed", "Amy", "Mo"]);
    }
}
