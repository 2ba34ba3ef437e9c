use serde::{Deserialize, Serialize};

use crate::error::NotAvailable;
use crate::per90::base_metric_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

/// Stats where a smaller number is the better season.
pub const LOWER_IS_BETTER: [&str; 5] = [
    "Goals Conceded",
    "Own Goals",
    "Fouls",
    "Hit Woodwork",
    "Big Chances Missed",
];

impl Direction {
    /// Direction for a metric name, with or without the per-90 suffix.
    pub fn for_metric(metric: &str) -> Self {
        if LOWER_IS_BETTER.contains(&base_metric_name(metric)) {
            Direction::LowerBetter
        } else {
            Direction::HigherBetter
        }
    }
}

/// One cohort's values for one metric, sorted ascending so a percent rank is a single
/// binary search.
#[derive(Debug, Clone)]
pub struct MetricColumn {
    sorted: Vec<f64>,
}

impl MetricColumn {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, NotAvailable> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Err(NotAvailable::EmptyCohort);
        }
        sorted.sort_by(f64::total_cmp);
        Ok(Self { sorted })
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Number of values `<= value`. Ties all count, so equal values share a rank.
    pub fn count_at_or_below(&self, value: f64) -> usize {
        self.sorted.partition_point(|v| *v <= value)
    }

    /// Percent rank in `[0, 1]`, flipped for lower-is-better metrics. A one-player
    /// cohort ranks its own value at 1.0 (0.0 inverted).
    ///
    /// Composite scores use this unfloored value, so they intentionally differ slightly
    /// from the whole-number [`percentile`](Self::percentile) shown on reports.
    pub fn fraction(&self, value: f64, direction: Direction) -> f64 {
        let rank = self.count_at_or_below(value) as f64 / self.sorted.len() as f64;
        match direction {
            Direction::HigherBetter => rank,
            Direction::LowerBetter => 1.0 - rank,
        }
    }

    /// Whole-number percentile in `[0, 100]`. The inverted form is exactly
    /// `100 - percentile` of the plain form.
    pub fn percentile(&self, value: f64, direction: Direction) -> u8 {
        let n = self.sorted.len();
        let count = self.count_at_or_below(value);
        let pct = (count * 100 / n) as u8;
        match direction {
            Direction::HigherBetter => pct,
            Direction::LowerBetter => 100 - pct,
        }
    }
}

/// Percentile of `value` among `values`. Non-finite entries in `values` are ignored.
pub fn percentile(
    values: &[f64],
    value: Option<f64>,
    direction: Direction,
) -> Result<u8, NotAvailable> {
    let column = MetricColumn::new(values.iter().copied())?;
    let value = value
        .filter(|v| v.is_finite())
        .ok_or(NotAvailable::NonNumeric)?;
    Ok(column.percentile(value, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOALS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

    #[test]
    fn forwards_goal_rates() {
        assert_eq!(percentile(&GOALS, Some(0.9), Direction::HigherBetter), Ok(100));
        assert_eq!(percentile(&GOALS, Some(0.1), Direction::HigherBetter), Ok(20));
        assert_eq!(percentile(&GOALS, Some(0.5), Direction::HigherBetter), Ok(60));
    }

    #[test]
    fn inverted_is_complement() {
        for v in GOALS {
            let plain = percentile(&GOALS, Some(v), Direction::HigherBetter).unwrap();
            let inv = percentile(&GOALS, Some(v), Direction::LowerBetter).unwrap();
            assert_eq!(inv, 100 - plain);
        }
    }

    #[test]
    fn ties_share_percentile() {
        let values = [1.0, 2.0, 2.0, 2.0, 5.0];
        assert_eq!(percentile(&values, Some(2.0), Direction::HigherBetter), Ok(80));
        assert_eq!(percentile(&values, Some(1.0), Direction::HigherBetter), Ok(20));
    }

    #[test]
    fn single_member_cohort() {
        assert_eq!(percentile(&[3.0], Some(3.0), Direction::HigherBetter), Ok(100));
        assert_eq!(percentile(&[3.0], Some(3.0), Direction::LowerBetter), Ok(0));
        let column = MetricColumn::new([3.0]).unwrap();
        assert_eq!(column.fraction(3.0, Direction::HigherBetter), 1.0);
        assert_eq!(column.fraction(3.0, Direction::LowerBetter), 0.0);
    }

    #[test]
    fn unavailable_cases() {
        assert_eq!(
            percentile(&[], Some(1.0), Direction::HigherBetter),
            Err(NotAvailable::EmptyCohort)
        );
        assert_eq!(
            percentile(&[f64::NAN], Some(1.0), Direction::HigherBetter),
            Err(NotAvailable::EmptyCohort)
        );
        assert_eq!(
            percentile(&GOALS, None, Direction::HigherBetter),
            Err(NotAvailable::NonNumeric)
        );
        assert_eq!(
            percentile(&GOALS, Some(f64::NAN), Direction::HigherBetter),
            Err(NotAvailable::NonNumeric)
        );
    }

    #[test]
    fn direction_from_metric_name() {
        assert_eq!(Direction::for_metric("Goals Conceded per90"), Direction::LowerBetter);
        assert_eq!(Direction::for_metric("Hit Woodwork"), Direction::LowerBetter);
        assert_eq!(Direction::for_metric("Goals per90"), Direction::HigherBetter);
        assert_eq!(Direction::for_metric("Saves %"), Direction::HigherBetter);
    }
}
