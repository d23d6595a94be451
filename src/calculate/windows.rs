//! Trailing calendar-window growth, anchored at a series' last observation.

use chrono::{DateTime, Months, Utc};

use super::intervals::span;
use crate::models::{ByMetric, ByWindow, PlayerSeriesPoint, WindowKey, WindowMetric};

/// The instant `window` calendar months before `end`.
///
/// Month subtraction clamps to the end of shorter months
/// (31 March minus one month is 28/29 February).
pub fn window_target(end: DateTime<Utc>, window: WindowKey) -> Option<DateTime<Utc>> {
    end.checked_sub_months(Months::new(window.months()))
}

/// Most recent point, excluding the last one, dated at or before the window
/// target.
pub fn find_window_start(
    points: &[PlayerSeriesPoint],
    window: WindowKey,
) -> Option<&PlayerSeriesPoint> {
    let (last, earlier) = points.split_last()?;
    let target = window_target(last.date, window)?;
    earlier.iter().rev().find(|p| p.date <= target)
}

/// Window metrics for every metric and window; absent where the series does
/// not reach back far enough.
pub fn build_window_metrics(
    points: &[PlayerSeriesPoint],
) -> ByMetric<ByWindow<Option<WindowMetric>>> {
    let starts = ByWindow::from_fn(|window| find_window_start(points, window));
    let last = points.last();

    ByMetric::from_fn(|metric| {
        ByWindow::from_fn(|window| {
            let start = (*starts.get(window))?;
            let end = last?;
            Some(span(start, end, |p: &PlayerSeriesPoint| p.value(metric)))
        })
    })
}
