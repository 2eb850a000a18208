//! The precomputed Rt result snapshot.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::series::{CumulativeCaseSeries, Point};

/// Only schema version understood by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Credible interval widths the upstream inference publishes.
pub const SUPPORTED_INTERVALS: [u8; 2] = [80, 90];

/// One dated row of an area's result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub date: NaiveDate,
    /// Most likely Rt.
    pub ml: f64,
    pub low: f64,
    pub high: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_adjusted_raw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_adjusted_smoothed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infections: Option<f64>,
}

impl ResultRow {
    pub fn new(date: NaiveDate, ml: f64, low: f64, high: f64) -> Self {
        Self {
            date,
            ml,
            low,
            high,
            positive: None,
            tests: None,
            test_adjusted_raw: None,
            test_adjusted_smoothed: None,
            infections: None,
        }
    }
}

/// Date-ordered result table for one area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaResult {
    pub area: String,
    pub rows: Vec<ResultRow>,
}

impl AreaResult {
    /// Validates that dates are strictly increasing.
    pub fn new(area: &str, rows: Vec<ResultRow>) -> Result<Self> {
        if let Some(pair) = rows.windows(2).find(|p| p[1].date <= p[0].date) {
            return Err(Error::Schema(format!(
                "result dates for '{area}' not strictly increasing at {}",
                pair[1].date
            )));
        }
        Ok(Self {
            area: area.to_string(),
            rows,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn latest(&self) -> Option<&ResultRow> {
        self.rows.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Values of an optional column; `None` when no row carries it.
    pub fn column(&self, pick: impl Fn(&ResultRow) -> Option<f64>) -> Option<Vec<Option<f64>>> {
        let values: Vec<Option<f64>> = self.rows.iter().map(pick).collect();
        values.iter().any(Option::is_some).then_some(values)
    }
}

#[derive(Deserialize)]
struct RawSnapshot {
    schema_version: u32,
    credible_interval: u8,
    timestamp: NaiveDateTime,
    #[serde(deserialize_with = "area_entries")]
    results: Vec<(String, Vec<ResultRow>)>,
}

/// Reads the `results` object as ordered entries, repeated keys included,
/// so that a repeated area reaches the duplicate check instead of
/// replacing the earlier table.
fn area_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, Vec<ResultRow>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Entries;

    impl<'de> Visitor<'de> for Entries {
        type Value = Vec<(String, Vec<ResultRow>)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of area name to result rows")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(Entries)
}

/// Everything the dashboard renders from: one update time, every area's
/// result table and, when available, cumulative case series.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub timestamp: NaiveDateTime,
    pub credible_interval: u8,
    results: IndexMap<String, Arc<AreaResult>>,
    cases: IndexMap<String, CumulativeCaseSeries>,
}

impl DashboardSnapshot {
    pub fn new(
        timestamp: NaiveDateTime,
        credible_interval: u8,
        results: Vec<AreaResult>,
    ) -> Result<Self> {
        if !SUPPORTED_INTERVALS.contains(&credible_interval) {
            return Err(Error::Schema(format!(
                "unsupported credible interval {credible_interval}%"
            )));
        }
        if results.is_empty() {
            return Err(Error::Schema("snapshot contains no areas".to_string()));
        }

        let mut by_area = IndexMap::with_capacity(results.len());
        for result in results {
            let area = result.area.clone();
            if by_area.insert(area.clone(), Arc::new(result)).is_some() {
                return Err(Error::Schema(format!("duplicate area '{area}'")));
            }
        }

        Ok(Self {
            timestamp,
            credible_interval,
            results: by_area,
            cases: IndexMap::new(),
        })
    }

    /// Parses the JSON result artifact.
    ///
    /// Malformed JSON means the artifact is unusable and maps to
    /// [`Error::SourceUnavailable`]; well-formed JSON of the wrong shape maps
    /// to [`Error::Schema`].
    pub fn from_json(location: &str, bytes: &[u8]) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_slice(bytes).map_err(|e| match e.classify() {
            Category::Data => Error::Schema(format!("{location}: {e}")),
            Category::Io | Category::Syntax | Category::Eof => Error::unavailable(location, e),
        })?;

        if raw.schema_version != SCHEMA_VERSION {
            return Err(Error::Schema(format!(
                "{location}: schema version {} (expected {SCHEMA_VERSION})",
                raw.schema_version
            )));
        }

        let results = raw
            .results
            .into_iter()
            .map(|(area, rows)| AreaResult::new(&area, rows))
            .collect::<Result<Vec<_>>>()?;

        Self::new(raw.timestamp, raw.credible_interval, results)
    }

    /// Attaches a cumulative case series for `area`.
    pub fn with_cases(mut self, area: &str, series: CumulativeCaseSeries) -> Self {
        self.cases.insert(area.to_string(), series);
        self
    }

    /// # Errors
    ///
    /// [`Error::NotFound`] when the area has no result table.
    pub fn get(&self, area: &str) -> Result<&AreaResult> {
        self.results
            .get(area)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::NotFound(area.to_string()))
    }

    pub(crate) fn get_shared(&self, area: &str) -> Result<Arc<AreaResult>> {
        self.results
            .get(area)
            .cloned()
            .ok_or_else(|| Error::NotFound(area.to_string()))
    }

    /// Area names in artifact order.
    pub fn areas(&self) -> Vec<String> {
        self.results.keys().cloned().collect()
    }

    /// Areas with at least one result row, in artifact order.
    pub fn plottable_areas(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|(_, result)| !result.is_empty())
            .map(|(area, _)| area.clone())
            .collect()
    }

    pub fn cases(&self, area: &str) -> Option<&[Point<i64>]> {
        self.cases.get(area).map(Vec::as_slice)
    }

    /// Update time as shown on the dashboard, e.g. `06/01 05:30 PM`.
    pub fn updated_label(&self) -> String {
        self.timestamp.format("%m/%d %I:%M %p").to_string()
    }
}
