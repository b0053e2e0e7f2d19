// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Track model: a route between two points.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{DedupSet, EntityId};

/// Sport practiced on a track, by a user, or in a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Running,
    Cycling,
}

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// A route users can complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq + Default"))]
pub struct Track<K = EntityId> {
    /// Document ID (assigned on insert)
    #[serde(default)]
    pub id: K,
    /// Unique track name
    pub name: String,
    pub start: Coordinate,
    pub end: Coordinate,
    /// Length of the route (km)
    pub distance: f64,
    /// Average slope
    pub slope: f64,
    /// Users that have completed the track
    #[serde(default)]
    pub users: DedupSet<K>,
    pub activity: Activity,
    /// Review score
    #[serde(default)]
    pub score: f64,
}

impl<K> Track<K> {
    pub fn new(
        id: K,
        name: impl Into<String>,
        start: Coordinate,
        end: Coordinate,
        distance: f64,
        slope: f64,
        activity: Activity,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start,
            end,
            distance,
            slope,
            users: DedupSet::new(),
            activity,
            score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults() {
        let track: Track = serde_json::from_str(
            r#"{
                "name": "Test Track",
                "start": {"lat": 0, "lng": 0},
                "end": {"lat": 1, "lng": 1},
                "distance": 100,
                "slope": 3.1,
                "activity": "running"
            }"#,
        )
        .expect("track should parse");

        assert_eq!(track.id, "");
        assert!(track.users.is_empty());
        assert_eq!(track.score, 0.0);
        assert_eq!(track.activity, Activity::Running);
    }

    #[test]
    fn test_unknown_activity_is_rejected() {
        let result = serde_json::from_str::<Track>(
            r#"{"name":"x","start":{"lat":0,"lng":0},"end":{"lat":0,"lng":0},
                "distance":1,"slope":0,"activity":"swimming"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_numeric_keys() {
        let mut track: Track<u32> = Track::new(
            0,
            "Route to El Dorado",
            Coordinate { lat: 40.4167, lng: -3.70325 },
            Coordinate { lat: 52.520008, lng: 13.404954 },
            100.0,
            0.5,
            Activity::Cycling,
        );
        assert!(track.users.add(1));
        assert!(!track.users.add(1));
        assert!(track.users.remove(&1));
        assert!(track.users.is_empty());
    }
}
