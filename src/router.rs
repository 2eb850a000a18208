//! Navigation between the dashboard views.
//!
//! The router answers two kinds of events: a navigation path and an area
//! selection. Every event is recomputed from the current snapshot; the only
//! state kept between events is which view is showing.
//!
//! Paths are matched exactly: `/` is the overview, `/detail` the area detail
//! view and anything else the error view.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::charts::{ChartAssembler, DetailChartSpec, GridChartSpec};
use crate::error::{Error, Result};
use crate::metro::MetroComposition;
use crate::store::{AreaResultStore, DashboardSnapshot};

pub const OVERVIEW_PATH: &str = "/";
pub const DETAIL_PATH: &str = "/detail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Overview,
    Detail,
    Error,
}

/// The part of the detail page that changes with the selected area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRegion {
    pub area: String,
    pub description: String,
    pub chart: DetailChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Page {
    Overview {
        updated: String,
        chart: GridChartSpec,
    },
    Detail {
        updated: String,
        /// Choices for the area selector, in snapshot order.
        areas: Vec<String>,
        region: DetailRegion,
    },
    Error {
        message: String,
    },
}

impl Page {
    pub fn view(&self) -> View {
        match self {
            Page::Overview { .. } => View::Overview,
            Page::Detail { .. } => View::Detail,
            Page::Error { .. } => View::Error,
        }
    }

    fn error(err: &Error) -> Self {
        Page::Error {
            message: format!("Whoops! Something went wrong ({err}), go back to the top level."),
        }
    }
}

/// Result of an area selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum Update {
    /// Not on the detail page; nothing to redraw.
    Unchanged,
    /// Redraw only the chart region.
    Region(DetailRegion),
    /// The selection failed and the whole page becomes the error view.
    Page(Page),
}

pub struct PageRouter {
    store: Arc<AreaResultStore>,
    metros: Arc<MetroComposition>,
    assembler: ChartAssembler,
    view: View,
}

impl PageRouter {
    pub fn new(
        store: Arc<AreaResultStore>,
        metros: Arc<MetroComposition>,
        assembler: ChartAssembler,
    ) -> Self {
        Self {
            store,
            metros,
            assembler,
            view: View::Overview,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Renders the page for `path`. Failures become the error page.
    pub fn navigate(&mut self, path: &str) -> Page {
        debug!(path, "Navigate");
        let snapshot = self.store.snapshot();

        let page = match path {
            OVERVIEW_PATH => self.overview(&snapshot),
            DETAIL_PATH => self.detail(&snapshot),
            _ => {
                warn!(path, "Unknown path");
                Ok(Page::Error {
                    message: format!("Whoops! There is no page at {path}, go back to the top level."),
                })
            }
        }
        .unwrap_or_else(|e| {
            warn!(path, error = %e, "Rendering error page");
            Page::error(&e)
        });

        self.view = page.view();
        page
    }

    /// Handles an area selection. Only the detail view reacts.
    pub fn select(&mut self, area: &str) -> Update {
        if self.view != View::Detail {
            return Update::Unchanged;
        }
        debug!(area, "Select area");

        let snapshot = self.store.snapshot();
        match self.region(&snapshot, area) {
            Ok(region) => Update::Region(region),
            Err(e) => {
                warn!(area, error = %e, "Selection failed");
                self.view = View::Error;
                Update::Page(Page::error(&e))
            }
        }
    }

    fn overview(&self, snapshot: &DashboardSnapshot) -> Result<Page> {
        // Areas without rows have nothing to draw and stay off the grid.
        let chart = self.assembler.build_overview(snapshot, &snapshot.plottable_areas())?;
        Ok(Page::Overview {
            updated: snapshot.updated_label(),
            chart,
        })
    }

    /// Detail page opened on the first area that has rows. Only those areas
    /// are offered in the selector.
    fn detail(&self, snapshot: &DashboardSnapshot) -> Result<Page> {
        let areas = snapshot.plottable_areas();
        let first = areas
            .first()
            .ok_or_else(|| Error::EmptySeries("area list".to_string()))?;
        let region = self.region(snapshot, first)?;
        Ok(Page::Detail {
            updated: snapshot.updated_label(),
            areas,
            region,
        })
    }

    fn region(&self, snapshot: &DashboardSnapshot, area: &str) -> Result<DetailRegion> {
        let chart = self.assembler.build_detail(snapshot, area)?;
        let description = self.metros.describe(area)?;
        Ok(DetailRegion {
            area: area.to_string(),
            description,
            chart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AreaResult, ResultRow};
    use chrono::{Duration, NaiveDate};

    fn store() -> Arc<AreaResultStore> {
        let day = |n| NaiveDate::from_ymd_opt(2020, 5, 1).unwrap() + Duration::days(n);
        let rows = |ml: f64| -> Vec<ResultRow> {
            (0..5).map(|i| ResultRow::new(day(i), ml, ml - 0.1, ml + 0.1)).collect()
        };
        let results = vec![
            AreaResult::new("Austin", rows(0.9)).unwrap(),
            AreaResult::new("El Paso", rows(1.1)).unwrap(),
            AreaResult::new("Waco", rows(1.0)).unwrap(),
        ];
        let timestamp = day(5).and_hms_opt(8, 15, 0).unwrap();
        let snapshot = DashboardSnapshot::new(timestamp, 90, results).unwrap();
        Arc::new(AreaResultStore::new(snapshot))
    }

    fn router() -> PageRouter {
        PageRouter::new(
            store(),
            Arc::new(MetroComposition::texas_default()),
            ChartAssembler::default(),
        )
    }

    #[test]
    fn test_initial_view_is_overview() {
        assert_eq!(router().view(), View::Overview);
    }

    #[test]
    fn test_root_renders_overview() {
        let mut router = router();
        let Page::Overview { updated, chart } = router.navigate("/") else {
            panic!("expected overview");
        };
        assert_eq!(updated, "05/06 08:15 AM");
        assert_eq!(chart.panels.len(), 3);
        assert_eq!(chart.credible_interval, 90);
    }

    #[test]
    fn test_detail_opens_first_area() {
        let mut router = router();
        let Page::Detail { areas, region, .. } = router.navigate("/detail") else {
            panic!("expected detail");
        };
        assert_eq!(areas, vec!["Austin", "El Paso", "Waco"]);
        assert_eq!(region.area, "Austin");
        assert_eq!(
            region.description,
            "The **Austin** area view includes data from Travis, Williamson and Hays counties"
        );
        assert_eq!(router.view(), View::Detail);
    }

    #[test]
    fn test_unknown_path_is_error_view() {
        let mut router = router();
        let page = router.navigate("/nowhere");
        assert_eq!(page.view(), View::Error);
        assert_eq!(router.view(), View::Error);

        // Navigation is independent of where we came from.
        assert_eq!(router.navigate("/").view(), View::Overview);
    }

    #[test]
    fn test_unknown_path_message_names_the_path() {
        let mut router = router();
        let Page::Error { message } = router.navigate("/nowhere") else {
            panic!("expected error page");
        };
        assert!(message.contains("no page at /nowhere"));
        assert!(!message.contains("area"));
    }

    fn store_with_empty_area() -> Arc<AreaResultStore> {
        let day = |n| NaiveDate::from_ymd_opt(2020, 5, 1).unwrap() + Duration::days(n);
        let results = vec![
            AreaResult::new("Lubbock", Vec::new()).unwrap(),
            AreaResult::new("Austin", vec![ResultRow::new(day(0), 0.9, 0.8, 1.0)]).unwrap(),
        ];
        let timestamp = day(1).and_hms_opt(8, 15, 0).unwrap();
        let snapshot = DashboardSnapshot::new(timestamp, 80, results).unwrap();
        Arc::new(AreaResultStore::new(snapshot))
    }

    #[test]
    fn test_empty_area_does_not_break_pages() {
        let mut router = PageRouter::new(
            store_with_empty_area(),
            Arc::new(MetroComposition::texas_default()),
            ChartAssembler::default(),
        );

        let Page::Overview { chart, .. } = router.navigate("/") else {
            panic!("expected overview");
        };
        assert_eq!(chart.panels.len(), 1);
        assert_eq!(chart.panels[0].title, "Austin");

        let Page::Detail { areas, region, .. } = router.navigate("/detail") else {
            panic!("expected detail");
        };
        assert_eq!(areas, vec!["Austin"]);
        assert_eq!(region.area, "Austin");

        // Asking for the empty area explicitly still reports it.
        assert!(matches!(router.select("Lubbock"), Update::Page(Page::Error { .. })));
    }

    #[test]
    fn test_all_empty_areas_is_error_view() {
        let day = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let snapshot = DashboardSnapshot::new(
            day.and_hms_opt(8, 0, 0).unwrap(),
            80,
            vec![AreaResult::new("Lubbock", Vec::new()).unwrap()],
        )
        .unwrap();
        let mut router = PageRouter::new(
            Arc::new(AreaResultStore::new(snapshot)),
            Arc::new(MetroComposition::texas_default()),
            ChartAssembler::default(),
        );
        assert_eq!(router.navigate("/").view(), View::Error);
        assert_eq!(router.navigate("/detail").view(), View::Error);
    }

    #[test]
    fn test_select_replaces_region() {
        let mut router = router();
        router.navigate("/detail");
        let Update::Region(region) = router.select("El Paso") else {
            panic!("expected region");
        };
        assert_eq!(region.area, "El Paso");
        assert_eq!(region.chart.area, "El Paso");
        assert_eq!(router.view(), View::Detail);
    }

    #[test]
    fn test_select_outside_detail_is_ignored() {
        let mut router = router();
        router.navigate("/");
        assert_eq!(router.select("El Paso"), Update::Unchanged);
    }

    #[test]
    fn test_select_unknown_area_maps_to_error() {
        let mut router = router();
        router.navigate("/detail");
        let update = router.select("Amarillo");
        assert!(matches!(update, Update::Page(Page::Error { .. })));
        assert_eq!(router.view(), View::Error);
    }

    #[test]
    fn test_area_without_composition_maps_to_error() {
        let mut router = router();
        router.navigate("/detail");
        // Waco has results but no metro composition entry.
        assert!(matches!(router.select("Waco"), Update::Page(_)));
    }
}
