//! The raw cumulative case table, one row per county.
//!
//! Layout follows the state health department export: a `County Name`
//! column, an optional `Population` column and one column per report date.
//! Date headers are either ISO dates or the spreadsheet form `Cases\nMM-DD`,
//! which carries no year.

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::metro::MetroComposition;
use crate::series::{CumulativeCaseSeries, Point};

const NAME_COLUMN: &str = "County Name";
const IGNORED_COLUMNS: &[&str] = &["Population"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseTable {
    series: IndexMap<String, CumulativeCaseSeries>,
}

impl CaseTable {
    /// Parses the CSV export. `year` resolves headers that only carry a month
    /// and day.
    pub fn from_csv(location: &str, bytes: &[u8], year: i32) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(bytes);

        let headers = rdr.headers().map_err(|e| csv_error(location, e))?.clone();
        let name_idx = headers
            .iter()
            .position(|h| h.trim() == NAME_COLUMN)
            .ok_or_else(|| Error::Schema(format!("{location}: missing '{NAME_COLUMN}' column")))?;

        let mut date_columns: Vec<(usize, NaiveDate)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == name_idx || IGNORED_COLUMNS.contains(&header.trim()) {
                continue;
            }
            let date = parse_date_header(header, year).ok_or_else(|| {
                Error::Schema(format!("{location}: unrecognised date column '{header}'"))
            })?;
            date_columns.push((idx, date));
        }

        if let Some(pair) = date_columns.windows(2).find(|p| p[1].1 <= p[0].1) {
            return Err(Error::Schema(format!(
                "{location}: date columns not strictly increasing at {}",
                pair[1].1
            )));
        }

        let mut series = IndexMap::new();
        for record in rdr.records() {
            let record = record.map_err(|e| csv_error(location, e))?;
            let name = record.get(name_idx).unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }

            let mut points = Vec::with_capacity(date_columns.len());
            for (idx, date) in &date_columns {
                let cell = record.get(*idx).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                let value = parse_count(cell).ok_or_else(|| {
                    Error::Schema(format!("{location}: bad count '{cell}' for {name} on {date}"))
                })?;
                points.push(Point::new(*date, value));
            }
            series.insert(name.to_string(), points);
        }

        debug!(
            location,
            counties = series.len(),
            dates = date_columns.len(),
            "Case table parsed"
        );
        Ok(Self { series })
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, county: &str) -> Option<&[Point<i64>]> {
        self.series.get(county).map(Vec::as_slice)
    }

    /// Case series for a dashboard area.
    ///
    /// An area named like a row of the table uses that row; a metro area sums
    /// its counties on the dates they all report. Those dates can leave gaps,
    /// and a daily delta taken across a gap covers several days. Returns
    /// `None` when a constituent county is missing.
    pub fn area_series(&self, area: &str, metros: &MetroComposition) -> Option<CumulativeCaseSeries> {
        if let Some(points) = self.series.get(area) {
            return Some(points.clone());
        }

        let counties = metros.counties(area).ok()?;
        let mut totals: IndexMap<NaiveDate, (i64, usize)> = IndexMap::new();
        for county in counties {
            let Some(points) = self.series.get(county) else {
                warn!(area, county = %county, "County missing from case table");
                return None;
            };
            for p in points {
                let entry = totals.entry(p.date).or_insert((0, 0));
                entry.0 += p.value;
                entry.1 += 1;
            }
        }

        let mut summed: CumulativeCaseSeries = totals
            .into_iter()
            .filter(|(_, (_, n))| *n == counties.len())
            .map(|(date, (total, _))| Point::new(date, total))
            .collect();
        summed.sort_by_key(|p| p.date);

        let gaps = date_gaps(&summed);
        if gaps > 0 {
            warn!(area, gaps, "Summed case series skips dates");
        }
        Some(summed)
    }
}

/// Number of places where consecutive points are more than a day apart.
fn date_gaps(series: &[Point<i64>]) -> usize {
    series
        .windows(2)
        .filter(|pair| pair[1].date - pair[0].date > Duration::days(1))
        .count()
}

fn parse_date_header(header: &str, year: i32) -> Option<NaiveDate> {
    let header = header.trim();
    if let Ok(date) = NaiveDate::parse_from_str(header, "%Y-%m-%d") {
        return Some(date);
    }
    let (_, month_day) = header.rsplit_once('\n')?;
    NaiveDate::parse_from_str(&format!("{year}-{}", month_day.trim()), "%Y-%m-%d").ok()
}

fn parse_count(cell: &str) -> Option<i64> {
    let cell = cell.replace(',', "");
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    // Spreadsheet exports sometimes write whole numbers as floats.
    let v = cell.parse::<f64>().ok()?;
    (v.fract() == 0.0 && v.is_finite()).then_some(v as i64)
}

fn csv_error(location: &str, e: csv::Error) -> Error {
    if matches!(e.kind(), csv::ErrorKind::Io(_) | csv::ErrorKind::Utf8 { .. }) {
        Error::unavailable(location, e)
    } else {
        Error::Schema(format!("{location}: {e}"))
    }
}
