//! Chart-ready data assembly.
//!
//! [`ChartAssembler`] turns a [`DashboardSnapshot`] into panel and trace
//! descriptions for the rendering surface: a grid of Rt panels across
//! areas, or a single area's Rt beside its case and test panels.

mod color;
mod detail;
mod overview;
mod rt;
mod types;
mod utility;

pub use color::{value_color, value_rgb};
pub use types::{DetailChartSpec, GridChartSpec, Layout, Panel, ReferenceLine, Trace};

use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::store::{AreaResult, DashboardSnapshot};

#[derive(Debug, Clone, Default)]
pub struct ChartAssembler {
    config: DashboardConfig,
}

impl ChartAssembler {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Grid of Rt panels, one per area in `areas` order.
    ///
    /// # Errors
    ///
    /// `InvalidArea` for an area missing from the snapshot, `EmptySeries`
    /// for an area with no rows or an empty `areas`.
    pub fn build_overview<S: AsRef<str>>(
        &self,
        snapshot: &DashboardSnapshot,
        areas: &[S],
    ) -> Result<GridChartSpec> {
        overview::build(snapshot, areas, &self.config)
    }

    /// Rt, case and test panels for one area.
    ///
    /// # Errors
    ///
    /// `InvalidArea` or `EmptySeries`, as for [`Self::build_overview`].
    pub fn build_detail(&self, snapshot: &DashboardSnapshot, area: &str) -> Result<DetailChartSpec> {
        detail::build(snapshot, area, &self.config)
    }
}

/// An area's result table, provided it can anchor an X axis.
fn plotted_result<'a>(snapshot: &'a DashboardSnapshot, area: &str) -> Result<&'a AreaResult> {
    let result = snapshot.get(area).map_err(|e| match e {
        Error::NotFound(area) => Error::InvalidArea(area),
        other => other,
    })?;
    if result.is_empty() {
        return Err(Error::EmptySeries(area.to_string()));
    }
    Ok(result)
}
