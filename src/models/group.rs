// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group model: members, shared records, and the derived leaderboard.

use serde::{Deserialize, Serialize};

use crate::models::{DedupSet, EntityId, ExtendedEntry, Stats};
use crate::services::ranking::rank_members;

/// A group of users training together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq + Default"))]
pub struct Group<K = EntityId> {
    #[serde(default)]
    pub id: K,
    pub name: String,
    /// Members
    #[serde(default)]
    pub users: DedupSet<K>,
    #[serde(default)]
    pub stats: Stats,
    /// Favorite tracks
    #[serde(default)]
    pub tracks: DedupSet<K>,
    /// Shared sessions. Read back as stored: sessions that lost a
    /// participant may compare equal and are still kept apart.
    #[serde(default, deserialize_with = "DedupSet::deserialize_verbatim")]
    pub records: DedupSet<ExtendedEntry<K>>,
    /// Members by descending cumulative km; a cache of
    /// `rank_members(records, users)` refreshed on every read and write.
    #[serde(default)]
    ranking: DedupSet<K>,
}

impl<K: PartialEq + Clone> Group<K> {
    pub fn new(id: K, name: impl Into<String>, users: impl IntoIterator<Item = K>) -> Self {
        Self {
            id,
            name: name.into(),
            users: users.into_iter().collect(),
            stats: Stats::default(),
            tracks: DedupSet::new(),
            records: DedupSet::new(),
            ranking: DedupSet::new(),
        }
    }

    /// Last computed leaderboard.
    pub fn ranking(&self) -> &DedupSet<K> {
        &self.ranking
    }

    /// Clear state a client may not set on a new group: stats start zeroed
    /// and repeated sessions in the payload collapse.
    pub fn prepare_new(&mut self) {
        self.stats = Stats::default();
        self.records = std::mem::take(&mut self.records).into_iter().collect();
    }

    /// Recompute the leaderboard from `records` and `users`.
    pub fn refresh_ranking(&mut self) -> &DedupSet<K> {
        self.ranking = rank_members(&self.records, &self.users);
        &self.ranking
    }
}
