//! Periodic distance and slope figures for users and groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const WEEKLY: &str = "weekly";
pub const MONTHLY: &str = "monthly";
pub const YEARLY: &str = "yearly";

/// Default periods every user and group starts with.
pub const DEFAULT_PERIODS: [&str; 3] = [WEEKLY, MONTHLY, YEARLY];

/// Distance (km) and slope accumulated over one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Stat {
    pub km: f64,
    pub slope: f64,
}

/// Figures keyed by period label.
///
/// The key set is fixed at construction; neither [`Stats::reset`] nor
/// [`Stats::add`] ever inserts or removes a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats {
    values: BTreeMap<String, Stat>,
}

impl Default for Stats {
    fn default() -> Self {
        Self::with_periods(DEFAULT_PERIODS)
    }
}

impl Stats {
    /// Zeroed figures for the given periods.
    pub fn with_periods<'a>(periods: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            values: periods
                .into_iter()
                .map(|p| (p.to_string(), Stat::default()))
                .collect(),
        }
    }

    pub fn get(&self, period: &str) -> Option<&Stat> {
        self.values.get(period)
    }

    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Add to one period. Returns `false` for a period this entity doesn't track.
    pub fn add(&mut self, period: &str, km: f64, slope: f64) -> bool {
        match self.values.get_mut(period) {
            Some(stat) => {
                stat.km += km;
                stat.slope += slope;
                true
            }
            None => false,
        }
    }

    /// Add to every tracked period.
    pub fn accumulate(&mut self, km: f64, slope: f64) {
        for stat in self.values.values_mut() {
            stat.km += km;
            stat.slope += slope;
        }
    }

    /// Zero every period in place.
    pub fn reset(&mut self) {
        for stat in self.values.values_mut() {
            *stat = Stat::default();
        }
    }
}
