use chrono::Duration;

use super::rt::rt_panel;
use super::types::{GridChartSpec, Layout};
use super::plotted_result;
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::store::DashboardSnapshot;

/// One Rt panel per area, in the given order, on a fixed-column grid.
///
/// Every panel shares the X range from plot start to one day past the
/// latest date among the requested areas.
pub(crate) fn build<S: AsRef<str>>(
    snapshot: &DashboardSnapshot,
    areas: &[S],
    config: &DashboardConfig,
) -> Result<GridChartSpec> {
    let results = areas
        .iter()
        .map(|area| plotted_result(snapshot, area.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let last = results
        .iter()
        .filter_map(|r| r.last_date())
        .max()
        .ok_or_else(|| Error::EmptySeries("overview".to_string()))?;
    let x_range = [config.plot_start, last + Duration::days(1)];

    let layout = Layout::grid(
        results.len(),
        config.overview_columns,
        config.overview_width,
        config.overview_row_height,
    );

    let panels = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            rt_panel(
                result,
                result.area.clone(),
                layout.position(i),
                x_range,
                snapshot.credible_interval,
                config,
            )
        })
        .collect();

    Ok(GridChartSpec {
        layout,
        credible_interval: snapshot.credible_interval,
        color_scale: config.color_scale.clone(),
        panels,
    })
}
