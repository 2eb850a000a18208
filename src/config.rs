//! Chart assembly settings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::series::DEFAULT_MIN_CASES;

/// Reversed red-yellow-green scale used for Rt markers.
///
/// Values at or below `cmin` get `low_color`, `cmid` gets `mid_color` and
/// values at or above `cmax` get `high_color`; in between the channels are
/// interpolated linearly. Low Rt is green, high Rt is red.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub cmin: f64,
    pub cmid: f64,
    pub cmax: f64,
    pub low_color: [u8; 3],
    pub mid_color: [u8; 3],
    pub high_color: [u8; 3],
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            cmin: 0.75,
            cmid: 1.0,
            cmax: 1.25,
            low_color: [0, 104, 55],
            mid_color: [255, 255, 191],
            high_color: [165, 0, 38],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Earliest date on every X axis; earlier data predates reliable testing.
    pub plot_start: NaiveDate,
    /// Gate passed to the series smoother for the case panels.
    pub min_cases: i64,
    pub overview_columns: usize,
    pub overview_width: u32,
    pub overview_row_height: u32,
    pub detail_width: u32,
    pub detail_row_height: u32,
    pub rt_range: [f64; 2],
    pub color_scale: ColorScale,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            plot_start: NaiveDate::from_ymd_opt(2020, 3, 16).unwrap_or(NaiveDate::MIN),
            min_cases: DEFAULT_MIN_CASES,
            overview_columns: 4,
            overview_width: 1000,
            overview_row_height: 267,
            detail_width: 950,
            detail_row_height: 400,
            rt_range: [0.5, 1.5],
            color_scale: ColorScale::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_plot_start(mut self, plot_start: NaiveDate) -> Self {
        self.plot_start = plot_start;
        self
    }

    pub fn with_min_cases(mut self, min_cases: i64) -> Self {
        self.min_cases = min_cases;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.plot_start.to_string(), "2020-03-16");
        assert_eq!(config.min_cases, 20);
        assert_eq!(config.overview_columns, 4);
        assert_eq!(config.rt_range, [0.5, 1.5]);
    }

    #[test]
    fn test_builders() {
        let start = NaiveDate::from_ymd_opt(2020, 3, 24).unwrap();
        let config = DashboardConfig::default()
            .with_plot_start(start)
            .with_min_cases(5);
        assert_eq!(config.plot_start, start);
        assert_eq!(config.min_cases, 5);
    }
}
