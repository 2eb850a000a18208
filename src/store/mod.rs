//! Process-wide, read-only dashboard state.
//!
//! [`load`] fetches and validates the result snapshot (and optionally the
//! case table) once at startup. [`AreaResultStore`] owns the loaded
//! [`DashboardSnapshot`] and hands out shared references; a refresh swaps the
//! whole snapshot so readers never see a partial update.

mod cases;
mod snapshot;

pub use cases::CaseTable;
pub use snapshot::{AreaResult, DashboardSnapshot, ResultRow, SCHEMA_VERSION, SUPPORTED_INTERVALS};

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use crate::error::Result;
use crate::metro::MetroComposition;
use crate::source::{ArtifactSource, read_artifact};

/// Where the snapshot artifacts come from.
pub struct SnapshotSources<'a> {
    pub results: &'a dyn ArtifactSource,
    pub cases: Option<&'a dyn ArtifactSource>,
    /// Year for case table headers without one.
    pub case_year: i32,
}

/// Fetches and validates a complete snapshot.
///
/// Case series are attached to every snapshot area the case table can
/// supply, directly or by summing the area's counties.
///
/// # Errors
///
/// `SourceUnavailable` or `Schema`; both are fatal at startup.
#[tracing::instrument(skip_all, fields(results = %sources.results.location()))]
pub async fn load(sources: &SnapshotSources<'_>, metros: &MetroComposition) -> Result<DashboardSnapshot> {
    let bytes = read_artifact(sources.results).await?;
    let mut snapshot = DashboardSnapshot::from_json(sources.results.location(), &bytes)?;

    if let Some(cases) = sources.cases {
        let bytes = read_artifact(cases).await?;
        let table = CaseTable::from_csv(cases.location(), &bytes, sources.case_year)?;
        for area in snapshot.areas() {
            match table.area_series(&area, metros) {
                Some(series) => snapshot = snapshot.with_cases(&area, series),
                None => warn!(area = %area, "No case series for area"),
            }
        }
    }

    info!(
        areas = snapshot.areas().len(),
        interval = snapshot.credible_interval,
        updated = %snapshot.timestamp,
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Owner of the current snapshot.
#[derive(Debug)]
pub struct AreaResultStore {
    current: RwLock<Arc<DashboardSnapshot>>,
}

impl AreaResultStore {
    pub fn new(snapshot: DashboardSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Holders keep a consistent view across a reload.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// # Errors
    ///
    /// `NotFound` when the area is absent.
    pub fn get(&self, area: &str) -> Result<Arc<AreaResult>> {
        self.snapshot().get_shared(area)
    }

    pub fn areas(&self) -> Vec<String> {
        self.snapshot().areas()
    }

    /// Replaces the snapshot, returning the previous one.
    pub fn replace(&self, snapshot: DashboardSnapshot) -> Arc<DashboardSnapshot> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }

    /// Loads a fresh snapshot and swaps it in. On failure the current
    /// snapshot stays in place.
    pub async fn reload(&self, sources: &SnapshotSources<'_>, metros: &MetroComposition) -> Result<()> {
        let snapshot = load(sources, metros).await?;
        self.replace(snapshot);
        Ok(())
    }
}
