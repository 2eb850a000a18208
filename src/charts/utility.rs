use chrono::{Duration, NaiveDate};

/// Linear extension of a dated series one day past each end.
///
/// The slope comes from the two outermost points at each end, measured per
/// day. A single point extends flat.
pub fn extend_one_day(dates: &[NaiveDate], values: &[f64]) -> (Vec<NaiveDate>, Vec<f64>) {
    let n = dates.len().min(values.len());
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let slope = |a: usize, b: usize| -> f64 {
        let days = (dates[b] - dates[a]).num_days();
        if days == 0 {
            0.0
        } else {
            (values[b] - values[a]) / days as f64
        }
    };
    let (head_slope, tail_slope) = if n == 1 {
        (0.0, 0.0)
    } else {
        (slope(0, 1), slope(n - 2, n - 1))
    };

    let mut x = Vec::with_capacity(n + 2);
    let mut y = Vec::with_capacity(n + 2);
    x.push(dates[0] - Duration::days(1));
    y.push(values[0] - head_slope);
    x.extend_from_slice(&dates[..n]);
    y.extend_from_slice(&values[..n]);
    x.push(dates[n - 1] + Duration::days(1));
    y.push(values[n - 1] + tail_slope);
    (x, y)
}

/// Upper bound for a count axis: 10% headroom over the largest value.
pub fn count_axis_max<'a>(values: impl IntoIterator<Item = &'a Option<f64>>) -> f64 {
    let max = values
        .into_iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    if max <= 0.0 { 1.0 } else { (max * 11.0 / 10.0).ceil() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 16).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_extend_linear() {
        let (x, y) = extend_one_day(&[day(0), day(1), day(2)], &[1.0, 1.2, 1.6]);
        assert_eq!(x, vec![day(-1), day(0), day(1), day(2), day(3)]);
        let expected = [0.8, 1.0, 1.2, 1.6, 2.0];
        for (a, b) in y.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_extend_uses_per_day_slope() {
        let (_, y) = extend_one_day(&[day(0), day(2)], &[1.0, 2.0]);
        assert!((y[0] - 0.5).abs() < 1e-9);
        assert!((y[3] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_extend_single_point_is_flat() {
        let (x, y) = extend_one_day(&[day(0)], &[1.1]);
        assert_eq!(x, vec![day(-1), day(0), day(1)]);
        assert_eq!(y, vec![1.1, 1.1, 1.1]);
    }

    #[test]
    fn test_extend_empty() {
        let (x, y) = extend_one_day(&[], &[]);
        assert!(x.is_empty() && y.is_empty());
    }

    #[test]
    fn test_count_axis_max() {
        assert_eq!(count_axis_max(&[Some(100.0), None, Some(40.0)]), 110.0);
        assert_eq!(count_axis_max(&[None]), 1.0);
        assert_eq!(count_axis_max(&[Some(-5.0)]), 1.0);
    }
}
