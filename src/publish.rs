//! Publishing pre-built charts for a static rendering surface.
//!
//! Builds the overview and every area's detail chart and writes them, with
//! an index, under `charts/`:
//! - `charts/overview.json`
//! - `charts/detail/{slug}.json`
//! - `charts/index.json`
//!
//! Files go to a local directory or an S3 bucket, optionally gzipped.

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::charts::ChartAssembler;
use crate::error::Error;
use crate::store::DashboardSnapshot;

const PREFIX: &str = "charts";

pub enum Destination {
    Local(PathBuf),
    S3 {
        client: aws_sdk_s3::Client,
        bucket: String,
    },
}

impl Destination {
    pub async fn s3(bucket: &str) -> Self {
        let config = aws_config::load_from_env().await;
        Destination::S3 {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.to_string(),
        }
    }
}

/// Summary entry for one published area.
#[derive(Debug, Serialize)]
pub struct ChartIndexEntry {
    pub area: String,
    pub slug: String,
    pub latest_date: NaiveDate,
    pub latest_rt: f64,
    pub latest_low: f64,
    pub latest_high: f64,
}

/// Top-level listing served as `charts/index.json`.
#[derive(Debug, Serialize)]
pub struct ChartIndex {
    pub updated: NaiveDateTime,
    pub credible_interval: u8,
    pub areas: Vec<ChartIndexEntry>,
}

/// File-name-safe form of an area name: `Dallas-Fort Worth` → `dallas-fort-worth`.
pub fn slug(area: &str) -> String {
    let mut out = String::with_capacity(area.len());
    for c in area.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Builds and writes every chart. Areas without rows are skipped; when no
/// area has rows only the index is written.
///
/// # Errors
///
/// Fails before writing anything if two areas share a slug.
#[tracing::instrument(skip_all, fields(gzip))]
pub async fn publish(
    snapshot: &DashboardSnapshot,
    assembler: &ChartAssembler,
    destination: &Destination,
    gzip: bool,
) -> Result<ChartIndex> {
    let mut slugs: HashMap<String, String> = HashMap::new();
    for area in snapshot.areas() {
        if let Some(other) = slugs.insert(slug(&area), area.clone()) {
            bail!("areas '{other}' and '{area}' both publish as '{}'", slug(&area));
        }
    }

    let mut entries = Vec::new();
    let mut plotted = Vec::new();

    for area in snapshot.areas() {
        let chart = match assembler.build_detail(snapshot, &area) {
            Ok(chart) => chart,
            Err(e @ Error::EmptySeries(_)) => {
                warn!(area = %area, error = %e, "Skipping area");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let slug = slug(&area);
        write(destination, &format!("{PREFIX}/detail/{slug}.json"), &chart, gzip).await?;

        let result = snapshot.get(&area)?;
        if let Some(latest) = result.latest() {
            entries.push(ChartIndexEntry {
                area: area.clone(),
                slug,
                latest_date: latest.date,
                latest_rt: latest.ml,
                latest_low: latest.low,
                latest_high: latest.high,
            });
        }
        plotted.push(area);
    }

    if plotted.is_empty() {
        warn!("No area has rows; overview not written");
    } else {
        let overview = assembler.build_overview(snapshot, &plotted)?;
        write(destination, &format!("{PREFIX}/overview.json"), &overview, gzip).await?;
    }

    let index = ChartIndex {
        updated: snapshot.timestamp,
        credible_interval: snapshot.credible_interval,
        areas: entries,
    };
    write(destination, &format!("{PREFIX}/index.json"), &index, gzip).await?;

    info!(areas = index.areas.len(), "Charts published");
    Ok(index)
}

/// Serializes `value` and writes it to `key` under the destination.
async fn write(
    destination: &Destination,
    key: &str,
    value: &impl Serialize,
    gzip: bool,
) -> Result<()> {
    let json = serde_json::to_vec(value)?;
    let (body, key) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        (encoder.finish()?, format!("{key}.gz"))
    } else {
        (json, key.to_string())
    };

    match destination {
        Destination::Local(dir) => {
            let path = dir.join(&key);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &body).await?;
        }
        Destination::S3 { client, bucket } => {
            client
                .put_object()
                .bucket(bucket)
                .key(&key)
                .body(body.into())
                .content_type("application/json")
                .send()
                .await?;
        }
    }
    Ok(())
}
