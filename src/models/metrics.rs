//! Tracked progression metrics, lookback windows, and growth intervals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::serde_timestamp;

/// The four progression metrics carried by every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    BaseStats,
    Level,
    Mine,
    Treasury,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::BaseStats, Metric::Level, Metric::Mine, Metric::Treasury];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::BaseStats => "baseStats",
            Metric::Level => "level",
            Metric::Mine => "mine",
            Metric::Treasury => "treasury",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per tracked metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByMetric<T> {
    pub base_stats: T,
    pub level: T,
    pub mine: T,
    pub treasury: T,
}

impl<T> ByMetric<T> {
    /// Build by evaluating `f` once per metric, in [`Metric::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(Metric) -> T) -> Self {
        Self {
            base_stats: f(Metric::BaseStats),
            level: f(Metric::Level),
            mine: f(Metric::Mine),
            treasury: f(Metric::Treasury),
        }
    }

    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::BaseStats => &self.base_stats,
            Metric::Level => &self.level,
            Metric::Mine => &self.mine,
            Metric::Treasury => &self.treasury,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut T {
        match metric {
            Metric::BaseStats => &mut self.base_stats,
            Metric::Level => &mut self.level,
            Metric::Mine => &mut self.mine,
            Metric::Treasury => &mut self.treasury,
        }
    }
}

/// Trailing calendar lookback windows, in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindowKey {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "12")]
    Twelve,
}

impl WindowKey {
    pub const ALL: [WindowKey; 4] = [
        WindowKey::One,
        WindowKey::Three,
        WindowKey::Six,
        WindowKey::Twelve,
    ];

    pub fn months(&self) -> u32 {
        match self {
            WindowKey::One => 1,
            WindowKey::Three => 3,
            WindowKey::Six => 6,
            WindowKey::Twelve => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKey::One => "1",
            WindowKey::Three => "3",
            WindowKey::Six => "6",
            WindowKey::Twelve => "12",
        }
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown window: {} (expected 1, 3, 6 or 12)", s))
    }
}

/// One value per lookback window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByWindow<T> {
    #[serde(rename = "1")]
    pub one: T,
    #[serde(rename = "3")]
    pub three: T,
    #[serde(rename = "6")]
    pub six: T,
    #[serde(rename = "12")]
    pub twelve: T,
}

impl<T> ByWindow<T> {
    /// Build by evaluating `f` once per window, shortest first.
    pub fn from_fn(mut f: impl FnMut(WindowKey) -> T) -> Self {
        Self {
            one: f(WindowKey::One),
            three: f(WindowKey::Three),
            six: f(WindowKey::Six),
            twelve: f(WindowKey::Twelve),
        }
    }

    pub fn get(&self, key: WindowKey) -> &T {
        match key {
            WindowKey::One => &self.one,
            WindowKey::Three => &self.three,
            WindowKey::Six => &self.six,
            WindowKey::Twelve => &self.twelve,
        }
    }

    pub fn get_mut(&mut self, key: WindowKey) -> &mut T {
        match key {
            WindowKey::One => &mut self.one,
            WindowKey::Three => &mut self.three,
            WindowKey::Six => &mut self.six,
            WindowKey::Twelve => &mut self.twelve,
        }
    }
}

/// Growth of one metric between two observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalMetric {
    #[serde(with = "serde_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "serde_timestamp")]
    pub end_date: DateTime<Utc>,
    /// Rounded calendar days, never below 1
    pub days: i64,
    pub delta: f64,
    pub per_day: f64,
}

impl IntervalMetric {
    /// Create an interval; `days` is floored at 1 before `per_day` is derived.
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>, days: i64, delta: f64) -> Self {
        let days = days.max(1);
        Self {
            start_date,
            end_date,
            days,
            delta,
            per_day: delta / days as f64,
        }
    }
}

/// A lookback-window span. Same shape as an interval, but the start point
/// need not be adjacent to the end point.
pub type WindowMetric = IntervalMetric;
