//! Daily case derivation and Gaussian rolling smoothing.
//!
//! Cumulative case counts are differenced into daily new cases, smoothed with
//! a centered 7-day Gaussian window (std 2) and front-truncated at the first
//! day whose smoothed value reaches a minimum case count.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Smoothed daily cases below this are considered too noisy to plot.
pub const DEFAULT_MIN_CASES: i64 = 20;

const WINDOW: usize = 7;
const STD_DEV: f64 = 2.0;

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<T> {
    pub date: NaiveDate,
    pub value: T,
}

impl<T> Point<T> {
    pub fn new(date: NaiveDate, value: T) -> Self {
        Self { date, value }
    }
}

pub type CumulativeCaseSeries = Vec<Point<i64>>;
pub type DailyDeltaSeries = Vec<Point<i64>>;
pub type SmoothedSeries = Vec<Point<i64>>;

/// Index-aligned daily and smoothed series returned by [`smooth`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmoothedCases {
    pub original: DailyDeltaSeries,
    pub smoothed: SmoothedSeries,
}

impl SmoothedCases {
    pub fn is_empty(&self) -> bool {
        self.smoothed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.smoothed.len()
    }
}

/// Symmetric Gaussian window weights, centered on the middle sample.
pub fn gaussian_weights() -> [f64; WINDOW] {
    let center = (WINDOW - 1) as f64 / 2.0;
    let mut weights = [0.0; WINDOW];
    for (k, w) in weights.iter_mut().enumerate() {
        let z = (k as f64 - center) / STD_DEV;
        *w = (-0.5 * z * z).exp();
    }
    weights
}

/// Centered Gaussian-weighted rolling mean.
///
/// Samples outside the series or `NaN` are skipped and the remaining weights
/// renormalised, so a single valid sample is enough to emit a value. A window
/// with no valid samples yields `NaN`.
pub fn gaussian_rolling_mean(values: &[f64]) -> Vec<f64> {
    let weights = gaussian_weights();
    let half = (WINDOW / 2) as isize;
    let n = values.len() as isize;

    (0..n)
        .map(|i| {
            let mut total = 0.0;
            let mut weight_sum = 0.0;
            for (k, w) in weights.iter().enumerate() {
                let j = i + k as isize - half;
                if j < 0 || j >= n {
                    continue;
                }
                let v = values[j as usize];
                if v.is_nan() {
                    continue;
                }
                total += w * v;
                weight_sum += w;
            }
            if weight_sum == 0.0 {
                f64::NAN
            } else {
                total / weight_sum
            }
        })
        .collect()
}

/// First differences of a cumulative series. The first date has no
/// predecessor and is dropped.
pub fn daily_deltas(cumulative: &[Point<i64>]) -> DailyDeltaSeries {
    cumulative
        .windows(2)
        .map(|pair| Point::new(pair[1].date, pair[1].value - pair[0].value))
        .collect()
}

/// Derives daily new cases from `cumulative` and smooths them.
///
/// Both returned series start at the first day whose smoothed value is at
/// least `min_cases`. When no day reaches it the result is empty, which is
/// not an error.
///
/// # Errors
///
/// [`Error::EmptySeries`] for fewer than two points, [`Error::Schema`] when
/// dates are not strictly increasing.
pub fn smooth(cumulative: &[Point<i64>], min_cases: i64) -> Result<SmoothedCases> {
    if cumulative.len() < 2 {
        return Err(Error::EmptySeries("cumulative cases".to_string()));
    }
    if let Some(pair) = cumulative.windows(2).find(|p| p[1].date <= p[0].date) {
        return Err(Error::Schema(format!(
            "case dates not strictly increasing at {}",
            pair[1].date
        )));
    }

    let original = daily_deltas(cumulative);

    // Upstream corrections show up as negative days; they are kept as-is.
    let negative = original.iter().filter(|p| p.value < 0).count();
    if negative > 0 {
        debug!(negative, "Negative daily case counts passed through");
    }

    let values: Vec<f64> = original.iter().map(|p| p.value as f64).collect();
    let smoothed: SmoothedSeries = gaussian_rolling_mean(&values)
        .into_iter()
        .zip(&original)
        .map(|(v, p)| Point::new(p.date, v.round_ties_even() as i64))
        .collect();

    let start = first_at_least(&smoothed, min_cases);

    Ok(SmoothedCases {
        original: original[start..].to_vec(),
        smoothed: smoothed[start..].to_vec(),
    })
}

/// Index of the first point with `value >= threshold`, or `len` if none.
fn first_at_least(series: &[Point<i64>], threshold: i64) -> usize {
    series
        .iter()
        .position(|p| p.value >= threshold)
        .unwrap_or(series.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap() + chrono::Duration::days(n)
    }

    fn cumulative(values: &[i64]) -> CumulativeCaseSeries {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Point::new(day(i as i64), *v))
            .collect()
    }

    fn values(series: &[Point<i64>]) -> Vec<i64> {
        series.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_weights_are_symmetric_and_peak_at_center() {
        let w = gaussian_weights();
        assert_eq!(w[3], 1.0);
        for k in 0..3 {
            assert!((w[k] - w[6 - k]).abs() < 1e-12);
            assert!(w[k] < w[k + 1]);
        }
        assert!((w[0] - (-1.125f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_daily_deltas_drop_first_day() {
        let deltas = daily_deltas(&cumulative(&[10, 12, 20]));
        assert_eq!(values(&deltas), vec![2, 8]);
        assert_eq!(deltas[0].date, day(1));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let input = cumulative(&[10, 10, 10, 15, 15, 20, 20, 28, 40, 40]);

        let all = smooth(&input, 0).unwrap();
        assert_eq!(values(&all.original), vec![0, 0, 5, 0, 5, 0, 8, 12, 0]);
        assert_eq!(values(&all.smoothed), vec![1, 2, 2, 2, 4, 4, 5, 6, 5]);

        let gated = smooth(&input, 5).unwrap();
        assert_eq!(values(&gated.original), vec![8, 12, 0]);
        assert_eq!(values(&gated.smoothed), vec![5, 6, 5]);
        assert_eq!(gated.smoothed[0].date, day(7));
        assert_eq!(gated.original[0].date, gated.smoothed[0].date);
    }

    #[test]
    fn test_constant_rate_is_preserved() {
        let input: Vec<i64> = (0..12).map(|i| 100 + 25 * i).collect();
        let result = smooth(&cumulative(&input), DEFAULT_MIN_CASES).unwrap();
        assert_eq!(result.len(), 11);
        assert!(result.smoothed.iter().all(|p| p.value == 25));
        assert!(result.original.iter().all(|p| p.value == 25));
    }

    #[test]
    fn test_truncation_is_first_index_at_threshold() {
        let input = cumulative(&[0, 1, 3, 10, 40, 100, 180, 260, 300, 320, 330]);
        let full = smooth(&input, 0).unwrap();
        let gated = smooth(&input, 20).unwrap();

        let expected = full.smoothed.iter().position(|p| p.value >= 20).unwrap();
        assert_eq!(gated.len(), full.len() - expected);
        assert!(gated.smoothed[0].value >= 20);
        assert!(full.smoothed[..expected].iter().all(|p| p.value < 20));
    }

    #[test]
    fn test_below_threshold_is_empty_not_error() {
        let result = smooth(&cumulative(&[1, 2, 3, 4]), DEFAULT_MIN_CASES).unwrap();
        assert!(result.is_empty());
        assert!(result.original.is_empty());
    }

    #[test]
    fn test_negative_deltas_pass_through() {
        let result = smooth(&cumulative(&[50, 40, 60]), -100).unwrap();
        assert_eq!(values(&result.original), vec![-10, 20]);
    }

    #[test]
    fn test_short_series_rejected() {
        let err = smooth(&cumulative(&[5]), 0).unwrap_err();
        assert!(matches!(err, Error::EmptySeries(_)));
    }

    #[test]
    fn test_unordered_dates_rejected() {
        let mut input = cumulative(&[1, 2, 3]);
        input.swap(1, 2);
        assert!(matches!(smooth(&input, 0), Err(Error::Schema(_))));
    }

    #[test]
    fn test_rolling_mean_skips_nan() {
        let out = gaussian_rolling_mean(&[f64::NAN, 4.0, f64::NAN]);
        assert!(out.iter().all(|v| (*v - 4.0).abs() < 1e-12));
        assert!(gaussian_rolling_mean(&[f64::NAN])[0].is_nan());
    }

    #[test]
    fn test_round_ties_to_even() {
        assert_eq!(2.5f64.round_ties_even(), 2.0);
        assert_eq!(3.5f64.round_ties_even(), 4.0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = cumulative(&[10, 30, 60]);
        let copy = input.clone();
        let _ = smooth(&input, 0).unwrap();
        assert_eq!(input, copy);
    }
}
