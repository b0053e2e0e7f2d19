//! User model for storage and API.

use serde::{Deserialize, Serialize};

use crate::models::{Activity, DedupSet, Entry, EntityId, Stats};

/// A user of the app and everything they are linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq + Default"))]
pub struct User<K = EntityId> {
    /// Document ID (assigned on insert)
    #[serde(default)]
    pub id: K,
    /// Unique nickname
    pub name: String,
    pub activity: Activity,
    /// Friends (kept symmetric)
    #[serde(default)]
    pub users: DedupSet<K>,
    #[serde(default)]
    pub groups: DedupSet<K>,
    /// Favorite tracks
    #[serde(default)]
    pub tracks: DedupSet<K>,
    /// Active challenges
    #[serde(default)]
    pub challenges: DedupSet<K>,
    #[serde(default)]
    pub stats: Stats,
    /// Tracks done, grouped by date
    #[serde(default)]
    pub records: DedupSet<Entry<K>>,
}

impl<K> User<K> {
    pub fn new(id: K, name: impl Into<String>, activity: Activity) -> Self {
        Self {
            id,
            name: name.into(),
            activity,
            users: DedupSet::new(),
            groups: DedupSet::new(),
            tracks: DedupSet::new(),
            challenges: DedupSet::new(),
            stats: Stats::default(),
            records: DedupSet::new(),
        }
    }

    /// Stats on a new user always start as the zeroed default periods.
    pub fn prepare_new(&mut self) {
        self.stats = Stats::default();
    }
}
