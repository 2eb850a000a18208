use chrono::NaiveDate;

use super::color::value_color;
use super::types::{Panel, ReferenceLine, Trace};
use super::utility::extend_one_day;
use crate::config::DashboardConfig;
use crate::store::AreaResult;

pub(crate) const TICK_FORMAT: &str = "%m/%d";

const BAND_FILL: &str = "rgba(0, 0, 0, 0.1)";
const RT_LINE: &str = "rgba(0, 0, 0, 0.2)";
const MARKER_SIZE: f64 = 9.0;

/// Rt panel: credible band, colour-mapped point estimates and a reference
/// line at Rt = 1.
pub(crate) fn rt_panel(
    result: &AreaResult,
    title: String,
    (row, col): (usize, usize),
    x_range: [NaiveDate; 2],
    credible_interval: u8,
    config: &DashboardConfig,
) -> Panel {
    let dates = result.dates();
    let ml: Vec<f64> = result.rows.iter().map(|r| r.ml).collect();
    let low: Vec<f64> = result.rows.iter().map(|r| r.low).collect();
    let high: Vec<f64> = result.rows.iter().map(|r| r.high).collect();

    let (band_dates, high_ext) = extend_one_day(&dates, &high);
    let (_, low_ext) = extend_one_day(&dates, &low);

    let band_x: Vec<NaiveDate> = band_dates
        .iter()
        .chain(band_dates.iter().rev())
        .copied()
        .collect();
    let band_y: Vec<f64> = high_ext.iter().chain(low_ext.iter().rev()).copied().collect();

    let marker_colors = ml
        .iter()
        .map(|v| value_color(*v, &config.color_scale))
        .collect();

    Panel {
        title,
        row,
        col,
        x_range,
        y_range: config.rt_range,
        x_tick_format: TICK_FORMAT.to_string(),
        traces: vec![
            Trace::Band {
                name: format!("{credible_interval}% Credible Interval"),
                x: band_x,
                y: band_y,
                fill_color: BAND_FILL.to_string(),
            },
            Trace::Markers {
                name: "Rt".to_string(),
                x: dates,
                y: ml,
                line_color: RT_LINE.to_string(),
                marker_colors,
                marker_size: MARKER_SIZE,
            },
        ],
        reference_lines: vec![ReferenceLine {
            x0: x_range[0],
            x1: x_range[1],
            y: 1.0,
            opacity: 0.2,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResultRow;
    use chrono::Duration;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 20).unwrap() + Duration::days(n)
    }

    fn result() -> AreaResult {
        AreaResult::new(
            "Austin",
            vec![
                ResultRow::new(day(0), 1.2, 1.0, 1.4),
                ResultRow::new(day(1), 1.0, 0.9, 1.2),
                ResultRow::new(day(2), 0.8, 0.7, 1.0),
            ],
        )
        .unwrap()
    }

    fn panel() -> Panel {
        let config = DashboardConfig::default();
        rt_panel(
            &result(),
            "Austin".into(),
            (1, 2),
            [config.plot_start, day(3)],
            80,
            &config,
        )
    }

    #[test]
    fn test_band_is_closed_polygon() {
        let panel = panel();
        let Some(Trace::Band { name, x, y, .. }) = panel.trace("80% Credible Interval") else {
            panic!("missing band");
        };
        assert_eq!(name, "80% Credible Interval");
        // 3 rows + 1 day each side, there and back.
        assert_eq!(x.len(), 10);
        assert_eq!(x[0], day(-1));
        assert_eq!(x[4], day(3));
        assert_eq!(x[5], day(3));
        assert_eq!(x[9], day(-1));
        // Upper bound first, extrapolated: 1.4 - (1.2 - 1.4) = 1.6.
        assert!((y[0] - 1.6).abs() < 1e-9);
        // Lower bound comes back from the right end: 0.7 + (0.7 - 0.9) = 0.5.
        assert!((y[5] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_markers_colored_per_point() {
        let panel = panel();
        let Some(Trace::Markers { y, marker_colors, .. }) = panel.trace("Rt") else {
            panic!("missing markers");
        };
        assert_eq!(y, &vec![1.2, 1.0, 0.8]);
        assert_eq!(marker_colors.len(), 3);
        assert_eq!(marker_colors[1], "rgb(255, 255, 191)");
    }

    #[test]
    fn test_reference_line_spans_axis() {
        let panel = panel();
        assert_eq!(panel.reference_lines.len(), 1);
        let line = &panel.reference_lines[0];
        assert_eq!(line.y, 1.0);
        assert_eq!(line.x0, panel.x_range[0]);
        assert_eq!(line.x1, day(3));
        assert_eq!((panel.row, panel.col), (1, 2));
    }
}
