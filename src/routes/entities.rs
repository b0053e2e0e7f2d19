// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CRUD routes for the four entity collections.
//!
//! Each collection is served at `/{collection}` and `/{collection}/{id}`.
//! Writes go through [`ReferenceService`](crate::services::ReferenceService)
//! so inverse references stay consistent; reads go straight to storage.

use crate::error::{AppError, Result};
use crate::models::{Challenge, Entity, Group, Track, User};
use crate::services::Selector;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Collection routes for every entity kind.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(collection_routes::<Track>())
        .merge(collection_routes::<User>())
        .merge(collection_routes::<Group>())
        .merge(collection_routes::<Challenge>())
}

fn collection_routes<E: Entity>() -> Router<Arc<AppState>> {
    let base = format!("/{}", E::KIND.collection());
    let item = format!("{}/{{id}}", base);

    Router::new()
        .route(
            &base,
            get(list::<E>)
                .post(create::<E>)
                .patch(update_by_name::<E>)
                .delete(delete_by_name::<E>),
        )
        .route(
            &item,
            get(get_by_id::<E>)
                .patch(update_by_id::<E>)
                .delete(delete_by_id::<E>),
        )
}

#[derive(Deserialize)]
pub struct NameQuery {
    name: Option<String>,
}

impl NameQuery {
    fn require(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Missing id or 'name' parameter".to_string()))
    }
}

/// Envelope for successful responses.
#[derive(Serialize)]
pub struct EntityResponse<T> {
    pub message: String,
    pub result: T,
}

impl<T> EntityResponse<T> {
    fn new(message: &str, result: T) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            result,
        })
    }
}

/// A single entity (lookup by id or name) or a whole collection.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Found<E> {
    One(E),
    Many(Vec<E>),
}

// ─── Reads ───────────────────────────────────────────────────

/// List a collection, or look one entity up with `?name=`.
async fn list<E: Entity>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<EntityResponse<Found<E>>>> {
    if let Some(name) = query.name.as_deref() {
        let mut entity: E = state.references.resolve(Selector::Name(name)).await?;
        entity.refresh();
        return Ok(EntityResponse::new("Found", Found::One(entity)));
    }

    let mut entities: Vec<E> = state.db.find_all().await?;
    entities.iter_mut().for_each(E::refresh);

    tracing::debug!(kind = %E::KIND, count = entities.len(), "Listed collection");
    Ok(EntityResponse::new("Found", Found::Many(entities)))
}

async fn get_by_id<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EntityResponse<E>>> {
    let mut entity: E = state.references.resolve(Selector::Id(&id)).await?;
    entity.refresh();
    Ok(EntityResponse::new("Found", entity))
}

// ─── Writes ──────────────────────────────────────────────────

async fn create<E: Entity>(
    State(state): State<Arc<AppState>>,
    Json(entity): Json<E>,
) -> Result<(StatusCode, Json<EntityResponse<E>>)> {
    let created = state.references.create(entity).await?;
    Ok((StatusCode::CREATED, EntityResponse::new("Created", created)))
}

async fn update_by_id<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<EntityResponse<E>>> {
    let updated: E = state.references.update(Selector::Id(&id), patch).await?;
    Ok(EntityResponse::new("Updated", updated))
}

async fn update_by_name<E: Entity>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
    Json(patch): Json<Value>,
) -> Result<Json<EntityResponse<E>>> {
    let name = query.require()?;
    let updated: E = state.references.update(Selector::Name(name), patch).await?;
    Ok(EntityResponse::new("Updated", updated))
}

async fn delete_by_id<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EntityResponse<E>>> {
    let deleted: E = state.references.delete(Selector::Id(&id)).await?;
    Ok(EntityResponse::new("Deleted", deleted))
}

async fn delete_by_name<E: Entity>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<EntityResponse<E>>> {
    let name = query.require()?;
    let deleted: E = state.references.delete(Selector::Name(name)).await?;
    Ok(EntityResponse::new("Deleted", deleted))
}
