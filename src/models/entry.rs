// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dated activity records kept by users and groups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DedupSet, EntityId};

/// One day of activity: the tracks completed on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq"))]
pub struct Entry<K = EntityId> {
    /// Day of the session (`YYYY-MM-DD`)
    pub date: NaiveDate,
    #[serde(default)]
    pub tracks: DedupSet<K>,
}

impl<K: PartialEq> Entry<K> {
    pub fn new(date: NaiveDate, tracks: impl IntoIterator<Item = K>) -> Self {
        Self {
            date,
            tracks: tracks.into_iter().collect(),
        }
    }
}

/// A group session: the tracks done, which members took part, and the
/// distance covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq"))]
pub struct ExtendedEntry<K = EntityId> {
    pub date: NaiveDate,
    #[serde(default)]
    pub tracks: DedupSet<K>,
    #[serde(default)]
    pub users: DedupSet<K>,
    /// Distance covered in the session (km), credited to every participant
    pub km: f64,
}

impl<K: PartialEq> ExtendedEntry<K> {
    pub fn new(
        date: NaiveDate,
        tracks: impl IntoIterator<Item = K>,
        users: impl IntoIterator<Item = K>,
        km: f64,
    ) -> Self {
        Self {
            date,
            tracks: tracks.into_iter().collect(),
            users: users.into_iter().collect(),
            km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_entries_with_same_tracks_in_any_order_are_duplicates() {
        let mut records: DedupSet<Entry<u32>> = DedupSet::new();
        assert!(records.add(Entry::new(day(1), [1, 2, 3])));
        assert!(!records.add(Entry::new(day(1), [3, 2, 1])));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_entries_differing_in_date_or_tracks_are_distinct() {
        let mut records: DedupSet<Entry<u32>> = DedupSet::new();
        records.add(Entry::new(day(1), [1, 2]));
        assert!(records.add(Entry::new(day(2), [1, 2])));
        assert!(records.add(Entry::new(day(1), [1])));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_extended_entry_equality_includes_users_and_km() {
        let a = ExtendedEntry::new(day(3), [7], [1, 2], 12.5);
        assert_eq!(a, ExtendedEntry::new(day(3), [7], [2, 1], 12.5));
        assert_ne!(a, ExtendedEntry::new(day(3), [7], [1, 2], 10.0));
        assert_ne!(a, ExtendedEntry::new(day(3), [7], [1], 12.5));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry: Entry = serde_json::from_str(r#"{"date":"2024-05-01","tracks":["t1","t1"]}"#)
            .expect("entry should parse");
        assert_eq!(entry.date, day(1));
        assert_eq!(entry.tracks.len(), 1);
    }
}
