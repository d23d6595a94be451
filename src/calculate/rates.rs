//! Day-weighted growth rates.

use crate::models::IntervalMetric;

/// Total delta over total days across all intervals.
///
/// Long intervals weigh proportionally more than short ones; this is not the
/// mean of the per-interval rates. Returns 0 for an empty list.
pub fn weighted_per_day(intervals: &[IntervalMetric]) -> f64 {
    let total_days: i64 = intervals.iter().map(|i| i.days).sum();
    if total_days == 0 {
        return 0.0;
    }
    let total_delta: f64 = intervals.iter().map(|i| i.delta).sum();
    total_delta / total_days as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::test_support::at;

    #[test]
    fn test_weighted_not_simple_mean() {
        let intervals = vec![
            IntervalMetric::new(at("2025-01-01"), at("2025-01-11"), 10, 50.0),
            IntervalMetric::new(at("2025-01-11"), at("2025-01-31"), 20, 150.0),
        ];
        let rate = weighted_per_day(&intervals);
        assert!((rate - 200.0 / 30.0).abs() < 1e-12);

        let simple_mean = (intervals[0].per_day + intervals[1].per_day) / 2.0;
        assert!((rate - simple_mean).abs() > 0.1);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(weighted_per_day(&[]), 0.0);
    }

    #[test]
    fn test_negative_growth() {
        let intervals = vec![IntervalMetric::new(
            at("2025-01-01"),
            at("2025-01-05"),
            4,
            -20.0,
        )];
        assert_eq!(weighted_per_day(&intervals), -5.0);
    }
}
