use chrono::{Duration, NaiveDate};
use tracing::warn;

use super::plotted_result;
use super::rt::{TICK_FORMAT, rt_panel};
use super::types::{DetailChartSpec, Layout, Panel, Trace};
use super::utility::count_axis_max;
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::series::{gaussian_rolling_mean, smooth};
use crate::store::{AreaResult, DashboardSnapshot};

const DETAIL_COLUMNS: usize = 2;

const DAILY_BAR: &str = "rgb(200, 200, 255)";
const TESTS_BAR: &str = "rgb(200, 200, 200)";
const MOVING_AVERAGE: &str = "royalblue";
const TESTS_AVERAGE: &str = "rgb(100, 100, 100)";
const TEST_ADJUSTED: &str = "rgb(255, 127, 14)";
const TEST_ADJUSTED_RAW: &str = "rgba(255, 127, 14, 0.3)";
const INFECTIONS: &str = "rgb(44, 160, 44)";
const BAR_OPACITY: f64 = 0.5;

/// Rt panel followed by the case panel and, when tests are reported, a
/// tests panel. All panels share one X range.
pub(crate) fn build(
    snapshot: &DashboardSnapshot,
    area: &str,
    config: &DashboardConfig,
) -> Result<DetailChartSpec> {
    let result = plotted_result(snapshot, area)?;
    let last = result
        .last_date()
        .ok_or_else(|| Error::EmptySeries(area.to_string()))?;
    let x_range = [config.plot_start, last + Duration::days(1)];

    let mut panels = vec![rt_panel(
        result,
        format!("{area} Area Rt"),
        (1, 1),
        x_range,
        snapshot.credible_interval,
        config,
    )];
    panels.extend(cases_panel(snapshot, result, x_range, config));
    panels.extend(tests_panel(result, x_range));

    let layout = Layout::grid(
        panels.len(),
        panels.len().min(DETAIL_COLUMNS),
        config.detail_width,
        config.detail_row_height,
    );
    for (i, panel) in panels.iter_mut().enumerate() {
        (panel.row, panel.col) = layout.position(i);
    }

    Ok(DetailChartSpec {
        area: area.to_string(),
        layout,
        credible_interval: snapshot.credible_interval,
        color_scale: config.color_scale.clone(),
        panels,
    })
}

/// Daily cases with a moving average, plus test-adjusted and inferred
/// infection overlays when the result table carries them.
///
/// Daily cases come from the cumulative case table when the snapshot has
/// one for the area, otherwise from the result table's `positive` column.
fn cases_panel(
    snapshot: &DashboardSnapshot,
    result: &AreaResult,
    x_range: [NaiveDate; 2],
    config: &DashboardConfig,
) -> Option<Panel> {
    let area = result.area.as_str();
    let dates = result.dates();
    let mut traces = Vec::new();

    if let Some(cumulative) = snapshot.cases(area) {
        match smooth(cumulative, config.min_cases) {
            Ok(cases) => {
                let x: Vec<NaiveDate> = cases.original.iter().map(|p| p.date).collect();
                traces.push(bar(
                    "Daily Cases",
                    x.clone(),
                    cases.original.iter().map(|p| Some(p.value as f64)).collect(),
                    DAILY_BAR,
                ));
                traces.push(line(
                    "Moving Average",
                    x,
                    cases.smoothed.iter().map(|p| Some(p.value as f64)).collect(),
                    MOVING_AVERAGE,
                ));
            }
            Err(e) => warn!(area, error = %e, "Case series not plotted"),
        }
    } else if let Some(positive) = result.column(|r| r.positive) {
        let smoothed = smooth_column(&positive);
        traces.push(bar("Daily Cases", dates.clone(), positive, DAILY_BAR));
        traces.push(line("Moving Average", dates.clone(), smoothed, MOVING_AVERAGE));
    }

    if let Some(raw) = result.column(|r| r.test_adjusted_raw) {
        traces.push(line("Test-Adjusted Cases (raw)", dates.clone(), raw, TEST_ADJUSTED_RAW));
    }
    if let Some(adjusted) = result.column(|r| r.test_adjusted_smoothed) {
        traces.push(line("Test-Adjusted Cases", dates.clone(), adjusted, TEST_ADJUSTED));
    }
    if let Some(infections) = result.column(|r| r.infections) {
        traces.push(line("Inferred Infections", dates, infections, INFECTIONS));
    }

    if traces.is_empty() {
        return None;
    }
    Some(count_panel(format!("{area} Area New Cases"), x_range, traces))
}

fn tests_panel(result: &AreaResult, x_range: [NaiveDate; 2]) -> Option<Panel> {
    let tests = result.column(|r| r.tests)?;
    let dates = result.dates();
    let smoothed = smooth_column(&tests);
    let traces = vec![
        bar("Daily Tests", dates.clone(), tests, TESTS_BAR),
        line("Tests Moving Average", dates, smoothed, TESTS_AVERAGE),
    ];
    Some(count_panel(
        format!("{} Area Daily Tests", result.area),
        x_range,
        traces,
    ))
}

fn count_panel(title: String, x_range: [NaiveDate; 2], traces: Vec<Trace>) -> Panel {
    let y_max = count_axis_max(traces.iter().flat_map(|t| match t {
        Trace::Bar { y, .. } | Trace::Line { y, .. } => y.as_slice(),
        Trace::Band { .. } | Trace::Markers { .. } => &[],
    }));
    Panel {
        title,
        row: 1,
        col: 1,
        x_range,
        y_range: [0.0, y_max],
        x_tick_format: TICK_FORMAT.to_string(),
        traces,
        reference_lines: Vec::new(),
    }
}

/// Gaussian rolling mean over a column with gaps, rounded half to even.
fn smooth_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let raw: Vec<f64> = values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    gaussian_rolling_mean(&raw)
        .into_iter()
        .map(|v| (!v.is_nan()).then(|| v.round_ties_even()))
        .collect()
}

fn bar(name: &str, x: Vec<NaiveDate>, y: Vec<Option<f64>>, color: &str) -> Trace {
    Trace::Bar {
        name: name.to_string(),
        x,
        y,
        color: color.to_string(),
        opacity: BAR_OPACITY,
    }
}

fn line(name: &str, x: Vec<NaiveDate>, y: Vec<Option<f64>>, color: &str) -> Trace {
    Trace::Line {
        name: name.to_string(),
        x,
        y,
        color: color.to_string(),
    }
}
