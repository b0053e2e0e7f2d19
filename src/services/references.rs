// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reference integrity across the four collections.
//!
//! Relationships are stored on both sides (a track lists the users who
//! completed it, each of those users lists the track). This service keeps
//! the two sides in step on every create, update and delete:
//!
//! 1. Load the documents the change touches
//! 2. Reject ids that resolve to nothing (before anything is written)
//! 3. Add or prune the inverse reference on each touched document
//! 4. Re-rank every group that was touched
//! 5. Commit the entity and all touched documents as one [`WriteBatch`]
//!
//! Every step is a set insert or removal, so replaying an operation
//! converges to the same state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures_util::{stream, StreamExt};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{Db, WriteBatch};
use crate::error::{AppError, Result};
use crate::models::{DedupSet, Entity, EntityDoc, EntityId, EntityKind, Link};

/// Upper bound on concurrent lookups while resolving references.
const MAX_CONCURRENT_LOOKUPS: usize = 16;

/// Top-level fields a patch may not overwrite.
const PROTECTED_FIELDS: [&str; 3] = ["id", "ranking", "stats"];

/// How a request addresses an entity.
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a> {
    Id(&'a str),
    Name(&'a str),
}

/// Creates, updates and deletes entities while keeping inverse references
/// consistent.
#[derive(Clone)]
pub struct ReferenceService {
    db: Db,
    /// Serializes read-modify-write sequences within this process.
    write_lock: Arc<Mutex<()>>,
}

impl ReferenceService {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Insert a new entity and link it into everything it references.
    ///
    /// Fails with [`AppError::DanglingReference`] if any referenced id does
    /// not exist, and with [`AppError::Conflict`] if the name is taken. In
    /// both cases nothing is written.
    pub async fn create<E: Entity>(&self, mut entity: E) -> Result<E> {
        let _guard = self.write_lock.lock().await;

        if self.db.find_by_name::<E>(entity.name()).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "{} named '{}' already exists",
                E::KIND,
                entity.name()
            )));
        }

        entity.set_id(Uuid::new_v4().to_string());
        entity.prepare_new();
        entity.refresh();
        let created = entity.clone();
        let doc = entity.into_doc();

        let mut propagation = Propagation::new(&self.db);
        propagation.link(None, &doc).await?;
        let touched = propagation.touched();
        let mut batch = propagation.into_batch();
        batch.upsert_doc(doc);

        self.db.commit(batch).await?;

        tracing::info!(
            kind = %E::KIND,
            id = created.id(),
            name = created.name(),
            touched,
            "Entity created"
        );

        Ok(created)
    }

    /// Merge `patch` into an existing entity and reconcile its references.
    ///
    /// Ids added to a relationship field are validated and linked back; ids
    /// removed are pruned from the other side. The `id`, `ranking` and
    /// `stats` keys of the patch are ignored.
    pub async fn update<E: Entity>(&self, selector: Selector<'_>, patch: Value) -> Result<E> {
        let _guard = self.write_lock.lock().await;

        let existing: E = self.resolve(selector).await?;
        let mut updated = merge_patch(&existing, patch)?;

        if updated.name() != existing.name()
            && self.db.find_by_name::<E>(updated.name()).await?.is_some()
        {
            return Err(AppError::Conflict(format!(
                "{} named '{}' already exists",
                E::KIND,
                updated.name()
            )));
        }

        updated.refresh();
        let old_doc = existing.into_doc();
        let new_doc = updated.clone().into_doc();

        let mut propagation = Propagation::new(&self.db);
        propagation.link(Some(&old_doc), &new_doc).await?;
        let touched = propagation.touched();
        let mut batch = propagation.into_batch();
        batch.upsert_doc(new_doc);

        self.db.commit(batch).await?;

        tracing::info!(
            kind = %E::KIND,
            id = updated.id(),
            touched,
            "Entity updated"
        );

        Ok(updated)
    }

    /// Delete an entity and prune every reference to it.
    ///
    /// Returns the deleted entity. Group records a deleted user took part in
    /// are kept with their km; only the user's id is removed from them, and
    /// records are never merged.
    pub async fn delete<E: Entity>(&self, selector: Selector<'_>) -> Result<E> {
        let _guard = self.write_lock.lock().await;

        let existing: E = self.resolve(selector).await?;

        let mut propagation = Propagation::new(&self.db);
        propagation.unlink_everywhere(E::KIND, existing.id()).await?;
        let touched = propagation.touched();
        let mut batch = propagation.into_batch();
        batch.delete(E::KIND, existing.id());

        self.db.commit(batch).await?;

        tracing::info!(
            kind = %E::KIND,
            id = existing.id(),
            name = existing.name(),
            touched,
            "Entity deleted"
        );

        Ok(existing)
    }

    /// Look up an entity by id or name.
    pub async fn resolve<E: Entity>(&self, selector: Selector<'_>) -> Result<E> {
        let found = match selector {
            Selector::Id(id) => self.db.find_by_id::<E>(id).await?,
            Selector::Name(name) => self.db.find_by_name::<E>(name).await?,
        };

        found.ok_or_else(|| {
            let key = match selector {
                Selector::Id(id) => id,
                Selector::Name(name) => name,
            };
            AppError::NotFound(format!("{} {}", E::KIND, key))
        })
    }
}

/// Apply the top-level keys of a JSON object onto an entity.
fn merge_patch<E: Entity>(existing: &E, patch: Value) -> Result<E> {
    let Value::Object(fields) = patch else {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let mut merged = serde_json::to_value(existing).map_err(|e| AppError::Internal(e.into()))?;
    if let Value::Object(target) = &mut merged {
        for (key, value) in fields {
            if PROTECTED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            target.insert(key, value);
        }
    }

    serde_json::from_value(merged)
        .map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", E::KIND, e)))
}

/// Ids in `link` on `new` that are not on `old`.
fn link_diff(old: Option<&EntityDoc>, new: Option<&EntityDoc>, link: Link) -> Vec<EntityId> {
    let empty = DedupSet::new();
    let new_ids = new.and_then(|d| d.links(link)).unwrap_or(&empty);
    let old_ids = old.and_then(|d| d.links(link)).unwrap_or(&empty);
    new_ids.difference(old_ids).cloned().collect()
}

type DocKey = (EntityKind, EntityId);

/// Working copy of the documents touched by one operation.
///
/// Lookups are cached (misses included) so each document is read once and
/// every edit to it lands on the same copy.
struct Propagation<'a> {
    db: &'a Db,
    loaded: BTreeMap<DocKey, Option<EntityDoc>>,
    dirty: BTreeSet<DocKey>,
}

impl<'a> Propagation<'a> {
    fn new(db: &'a Db) -> Self {
        Self {
            db,
            loaded: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn touched(&self) -> usize {
        self.dirty.len()
    }

    /// Reconcile the relationship fields of `new` against `old` (`None`
    /// for a fresh entity).
    async fn link(&mut self, old: Option<&EntityDoc>, new: &EntityDoc) -> Result<()> {
        let kind = new.kind();
        let id = new.id().to_string();
        let is_self = |link: Link, target: &str| link.target() == kind && target == id;

        // Resolve everything first: nothing is edited until every added id
        // is known to exist.
        let mut plan: Vec<(Link, Vec<EntityId>, Vec<EntityId>)> = Vec::new();
        for link in Link::owned_by(kind) {
            let added: Vec<EntityId> = link_diff(old, Some(new), link)
                .into_iter()
                .filter(|t| !is_self(link, t.as_str()))
                .collect();
            let removed: Vec<EntityId> = link_diff(Some(new), old, link)
                .into_iter()
                .filter(|t| !is_self(link, t.as_str()))
                .collect();

            self.prefetch(link.target(), added.iter().chain(removed.iter()).cloned())
                .await?;

            if let Some(missing) = added
                .iter()
                .find(|t| !self.exists(link.target(), t.as_str()))
            {
                tracing::warn!(
                    kind = %kind,
                    id = %id,
                    field = ?link,
                    missing = %missing,
                    "Rejecting dangling reference"
                );
                return Err(AppError::DanglingReference {
                    kind: link.target(),
                    id: missing.clone(),
                });
            }

            plan.push((link, added, removed));
        }

        for (link, added, removed) in plan {
            let Some(inverse) = link.inverse() else {
                continue;
            };
            let target = link.target();

            for target_id in added {
                self.edit(target, &target_id, |doc| {
                    doc.links_mut(inverse).is_some_and(|ids| ids.add(id.clone()))
                });
            }
            for target_id in removed {
                self.edit(target, &target_id, |doc| {
                    doc.links_mut(inverse).is_some_and(|ids| ids.remove(&id))
                });
            }
        }

        Ok(())
    }

    /// Remove `id` from every field in any collection that can refer to a
    /// `kind` entity. Users are also taken out of group records.
    async fn unlink_everywhere(&mut self, kind: EntityKind, id: &str) -> Result<()> {
        let id = id.to_string();

        for link in Link::targeting(kind) {
            let owner = link.owner();
            self.prefetch_collection(owner).await?;

            for key in self.keys_of(owner) {
                if key.0 == kind && key.1 == id {
                    continue;
                }
                self.edit(key.0, &key.1, |doc| {
                    doc.links_mut(link).is_some_and(|ids| ids.remove(&id))
                });
            }
        }

        if kind == EntityKind::User {
            self.prefetch_collection(EntityKind::Group).await?;

            for key in self.keys_of(EntityKind::Group) {
                self.edit(key.0, &key.1, |doc| match doc {
                    EntityDoc::Group(group) => {
                        group.records.edit_each(|record| record.users.remove(&id))
                    }
                    _ => false,
                });
            }
        }

        self.dirty.remove(&(kind, id));
        Ok(())
    }

    /// Load documents not yet in the working copy.
    async fn prefetch(
        &mut self,
        kind: EntityKind,
        ids: impl Iterator<Item = EntityId>,
    ) -> Result<()> {
        let missing: Vec<EntityId> = ids
            .filter(|id| !self.loaded.contains_key(&(kind, id.clone())))
            .collect::<DedupSet<_>>()
            .into_iter()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let db = self.db;
        let fetched = stream::iter(missing)
            .map(move |id| async move {
                let doc = db.find_doc(kind, &id).await?;
                Ok::<_, AppError>((id, doc))
            })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect::<Vec<Result<(EntityId, Option<EntityDoc>)>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        for (id, doc) in fetched {
            self.loaded.insert((kind, id), doc);
        }
        Ok(())
    }

    /// Load a whole collection, keeping copies already in the working set.
    async fn prefetch_collection(&mut self, kind: EntityKind) -> Result<()> {
        for doc in self.db.find_all_docs(kind).await? {
            self.loaded
                .entry((kind, doc.id().to_string()))
                .or_insert(Some(doc));
        }
        Ok(())
    }

    fn exists(&self, kind: EntityKind, id: &str) -> bool {
        matches!(self.loaded.get(&(kind, id.to_string())), Some(Some(_)))
    }

    fn keys_of(&self, kind: EntityKind) -> Vec<DocKey> {
        self.loaded
            .iter()
            .filter(|(key, doc)| key.0 == kind && doc.is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Run `f` on a loaded document; it returns whether it changed anything.
    /// Documents that are not loaded (or don't exist) are skipped.
    fn edit(&mut self, kind: EntityKind, id: &str, f: impl FnOnce(&mut EntityDoc) -> bool) {
        let key = (kind, id.to_string());
        if let Some(Some(doc)) = self.loaded.get_mut(&key) {
            if f(doc) {
                self.dirty.insert(key);
            }
        }
    }

    /// Every changed document, with derived fields refreshed.
    fn into_batch(mut self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for key in &self.dirty {
            if let Some(Some(mut doc)) = self.loaded.remove(key) {
                doc.refresh();
                batch.upsert_doc(doc);
            }
        }
        batch
    }
}
