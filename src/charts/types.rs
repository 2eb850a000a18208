//! Chart specifications handed to the rendering surface.
//!
//! Every type serializes to plain JSON with a fixed field order; there are
//! no maps, so equal inputs serialize to identical bytes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ColorScale;

/// One drawable series on a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    /// Closed polygon filled with `fill_color`: upper bound left to right,
    /// then lower bound right to left.
    Band {
        name: String,
        x: Vec<NaiveDate>,
        y: Vec<f64>,
        fill_color: String,
    },
    /// Line through the points with one marker colour per point.
    Markers {
        name: String,
        x: Vec<NaiveDate>,
        y: Vec<f64>,
        line_color: String,
        marker_colors: Vec<String>,
        marker_size: f64,
    },
    Bar {
        name: String,
        x: Vec<NaiveDate>,
        y: Vec<Option<f64>>,
        color: String,
        opacity: f64,
    },
    Line {
        name: String,
        x: Vec<NaiveDate>,
        y: Vec<Option<f64>>,
        color: String,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Band { name, .. }
            | Trace::Markers { name, .. }
            | Trace::Bar { name, .. }
            | Trace::Line { name, .. } => name,
        }
    }

    /// Number of data points (polygon vertices for a band).
    pub fn len(&self) -> usize {
        match self {
            Trace::Band { x, .. }
            | Trace::Markers { x, .. }
            | Trace::Bar { x, .. }
            | Trace::Line { x, .. } => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Horizontal line drawn beneath the traces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub x0: NaiveDate,
    pub x1: NaiveDate,
    pub y: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    /// 1-based grid position.
    pub row: usize,
    pub col: usize,
    pub x_range: [NaiveDate; 2],
    pub y_range: [f64; 2],
    pub x_tick_format: String,
    pub traces: Vec<Trace>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl Panel {
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    pub width: u32,
    pub height: u32,
    pub panel_width: u32,
    pub panel_height: u32,
}

impl Layout {
    pub(crate) fn grid(panels: usize, cols: usize, width: u32, row_height: u32) -> Self {
        let cols = cols.max(1);
        let rows = panels.div_ceil(cols);
        Self {
            rows,
            cols,
            width,
            height: row_height * rows as u32,
            panel_width: width / cols as u32,
            panel_height: row_height,
        }
    }

    /// 1-based (row, col) of the `i`th panel, filled row by row.
    pub(crate) fn position(&self, i: usize) -> (usize, usize) {
        (i / self.cols + 1, i % self.cols + 1)
    }
}

/// All areas' Rt on one grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridChartSpec {
    pub layout: Layout,
    pub credible_interval: u8,
    pub color_scale: ColorScale,
    pub panels: Vec<Panel>,
}

/// One area's Rt next to its case and test panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailChartSpec {
    pub area: String,
    pub layout: Layout,
    pub credible_interval: u8,
    pub color_scale: ColorScale,
    pub panels: Vec<Panel>,
}

impl DetailChartSpec {
    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rows_round_up() {
        let layout = Layout::grid(9, 4, 1000, 267);
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.cols, 4);
        assert_eq!(layout.height, 801);
        assert_eq!(layout.panel_width, 250);
    }

    #[test]
    fn test_positions_fill_rows_first() {
        let layout = Layout::grid(6, 4, 1000, 267);
        assert_eq!(layout.position(0), (1, 1));
        assert_eq!(layout.position(3), (1, 4));
        assert_eq!(layout.position(4), (2, 1));
    }

    #[test]
    fn test_trace_serializes_with_kind_tag() {
        let day = NaiveDate::from_ymd_opt(2020, 3, 16).unwrap();
        let trace = Trace::Line {
            name: "Moving Average".into(),
            x: vec![day],
            y: vec![None],
            color: "royalblue".into(),
        };
        assert_eq!(
            serde_json::to_string(&trace).unwrap(),
            r#"{"kind":"line","name":"Moving Average","x":["2020-03-16"],"y":[null],"color":"royalblue"}"#
        );
    }
}
