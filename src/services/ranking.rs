// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group leaderboard computation.
//!
//! The ranking is a pure function of a group's records and its current
//! members, so it can be recomputed at any time and never drifts from
//! its inputs.

use crate::models::{DedupSet, ExtendedEntry};

/// Cumulative km per participant, in order of first appearance.
///
/// A user in `k` records is credited the sum of those `k` distances.
pub fn distance_totals<K: PartialEq + Clone>(
    records: &DedupSet<ExtendedEntry<K>>,
) -> Vec<(K, f64)> {
    let mut totals: Vec<(K, f64)> = Vec::new();
    for record in records {
        for user in &record.users {
            match totals.iter_mut().find(|(id, _)| id == user) {
                Some((_, km)) => *km += record.km,
                None => totals.push((user.clone(), record.km)),
            }
        }
    }
    totals
}

/// Current members ordered by descending cumulative km.
///
/// Ties keep first-appearance order. Members without records are left
/// out, as are former members who still appear in old records.
pub fn rank_members<K: PartialEq + Clone>(
    records: &DedupSet<ExtendedEntry<K>>,
    members: &DedupSet<K>,
) -> DedupSet<K> {
    let mut totals = distance_totals(records);
    // Stable sort keeps first-appearance order for equal totals.
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    totals
        .into_iter()
        .map(|(id, _)| id)
        .filter(|id| members.has(id))
        .collect()
}
