// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod challenge;
pub mod dedup_set;
pub mod entity;
pub mod entry;
pub mod group;
pub mod stats;
pub mod track;
pub mod user;

pub use challenge::Challenge;
pub use dedup_set::DedupSet;
pub use entity::{Entity, EntityDoc, EntityId, EntityKind, Link};
pub use entry::{Entry, ExtendedEntry};
pub use group::Group;
pub use stats::{Stat, Stats};
pub use track::{Activity, Coordinate, Track};
pub use user::User;
