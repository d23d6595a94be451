//! Consecutive-pair growth intervals.

use chrono::{DateTime, Utc};

use crate::models::{GuildSeriesPoint, IntervalMetric, PlayerSeriesPoint};

const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Anything with a position on the timeline.
pub trait SeriesPoint {
    fn date(&self) -> DateTime<Utc>;
}

impl SeriesPoint for PlayerSeriesPoint {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl SeriesPoint for GuildSeriesPoint {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Rounded calendar days between two instants, floored at 1.
pub fn diff_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds() as f64;
    ((millis / DAY_MS).round() as i64).max(1)
}

/// Interval spanning two arbitrary points of the same series.
pub fn span<P: SeriesPoint>(start: &P, end: &P, value: impl Fn(&P) -> f64) -> IntervalMetric {
    IntervalMetric::new(
        start.date(),
        end.date(),
        diff_days(start.date(), end.date()),
        value(end) - value(start),
    )
}

/// One interval per consecutive pair; `n` points yield `n - 1` intervals.
pub fn build_intervals<P: SeriesPoint>(points: &[P], value: impl Fn(&P) -> f64) -> Vec<IntervalMetric> {
    points
        .windows(2)
        .map(|pair| span(&pair[0], &pair[1], &value))
        .collect()
}

/// First interval with the highest per-day rate.
pub fn best_interval(intervals: &[IntervalMetric]) -> Option<IntervalMetric> {
    intervals
        .iter()
        .fold(None::<&IntervalMetric>, |best, i| match best {
            Some(b) if b.per_day >= i.per_day => Some(b),
            _ => Some(i),
        })
        .cloned()
}

/// First interval with the lowest per-day rate.
pub fn worst_interval(intervals: &[IntervalMetric]) -> Option<IntervalMetric> {
    intervals
        .iter()
        .fold(None::<&IntervalMetric>, |worst, i| match worst {
            Some(w) if w.per_day <= i.per_day => Some(w),
            _ => Some(i),
        })
        .cloned()
}

/// Intervals ordered by per-day rate, fastest first (stable).
pub fn sorted_by_rate_desc(intervals: &[IntervalMetric]) -> Vec<IntervalMetric> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| b.per_day.total_cmp(&a.per_day));
    sorted
}
