// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trail-Graph: users, tracks, groups and challenges for outdoor activities
//!
//! This crate provides the backend API that stores the four entity
//! collections, keeps the references between them consistent, and derives
//! group leaderboards from shared activity records.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::ReferenceService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub references: ReferenceService,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        let references = ReferenceService::new(db.clone());
        Self {
            config,
            db,
            references,
        }
    }
}
