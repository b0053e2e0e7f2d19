//! Challenge model.

use serde::{Deserialize, Serialize};

use crate::models::{Activity, DedupSet, EntityId};

/// A set of tracks to complete, with its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq + Default"))]
pub struct Challenge<K = EntityId> {
    #[serde(default)]
    pub id: K,
    pub name: String,
    pub activity: Activity,
    #[serde(default)]
    pub tracks: DedupSet<K>,
    /// Participants
    #[serde(default)]
    pub users: DedupSet<K>,
}

impl<K: PartialEq> Challenge<K> {
    pub fn new(
        id: K,
        name: impl Into<String>,
        activity: Activity,
        tracks: impl IntoIterator<Item = K>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            activity,
            tracks: tracks.into_iter().collect(),
            users: DedupSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_dedups_tracks() {
        let mut challenge = Challenge::new(0, "Tenerife", Activity::Cycling, [1, 2, 1]);
        assert_eq!(challenge.tracks.as_slice(), &[1, 2]);
        assert!(!challenge.tracks.add(2));
        assert!(!challenge.users.remove(&2));
    }
}
