//! CLI entry point for the Texas Rt dashboard data tool.
//!
//! Loads the precomputed Rt snapshot (and optionally the raw case table)
//! and emits chart specifications for the overview grid, a single area's
//! detail view or a routed page, or publishes every chart at once.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texas_rt::charts::ChartAssembler;
use texas_rt::config::DashboardConfig;
use texas_rt::metro::MetroComposition;
use texas_rt::output::{emit_json, print_json, write_series_csv};
use texas_rt::publish::{Destination, publish};
use texas_rt::router::{PageRouter, Update};
use texas_rt::series::{DEFAULT_MIN_CASES, smooth};
use texas_rt::source;
use texas_rt::store::{self, AreaResultStore, DashboardSnapshot, SnapshotSources};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "texas_rt")]
#[command(about = "Chart data for the Texas covid-19 Rt dashboard", long_about = None)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Result snapshot: local path, http(s) URL or s3://bucket/key
    #[arg(long, global = true, env = "RESULTS_SOURCE", default_value = "data/final_results.json")]
    results: String,

    /// Cumulative case table CSV: local path, http(s) URL or s3://bucket/key
    #[arg(long, global = true, env = "CASES_SOURCE")]
    cases: Option<String>,

    /// Year for case table date headers written as MM-DD
    #[arg(long, global = true, default_value_t = 2020)]
    case_year: i32,

    /// JSON file mapping metro areas to counties (default: built-in Texas metros)
    #[arg(long, global = true, env = "METRO_CONFIG")]
    metro_config: Option<String>,

    /// First date shown on every chart
    #[arg(long, global = true, default_value = "2020-03-16")]
    plot_start: NaiveDate,

    /// Smoothed daily cases needed before case data is plotted
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_CASES)]
    min_cases: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Rt grid for all areas (or the given ones)
    Overview {
        /// Areas to include, in order
        #[arg(long = "area")]
        areas: Vec<String>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rt, case and test panels for one area
    Detail {
        #[arg(long)]
        area: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print which counties make up an area
    Describe {
        #[arg(long)]
        area: String,
    },
    /// Daily and smoothed new cases for one area from the case table
    Smooth {
        #[arg(long)]
        area: String,

        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the page for a navigation path, optionally followed by an area selection
    Route {
        #[arg(long, default_value = "/")]
        path: String,

        #[arg(long)]
        select: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build every chart and write them to a directory or an S3 bucket
    Publish {
        /// Local directory to write charts/ into
        #[arg(short = 'd', long, conflicts_with = "s3_bucket")]
        out_dir: Option<PathBuf>,

        /// S3 bucket to upload charts/ to (e.g., "texas-covid")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Gzip compress JSON before writing
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/texas_rt.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("texas_rt.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let data = cli.data;

    let metros = match &data.metro_config {
        Some(path) => MetroComposition::load(path)?,
        None => MetroComposition::texas_default(),
    };

    // Composition lookups don't need the snapshot.
    let command = match cli.command {
        Commands::Describe { area } => {
            println!("{}", metros.describe(&area)?);
            return Ok(());
        }
        command => command,
    };

    let assembler = ChartAssembler::new(
        DashboardConfig::default()
            .with_plot_start(data.plot_start)
            .with_min_cases(data.min_cases),
    );

    let snapshot = match load_snapshot(&data, &metros).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, "Failed to load dashboard data");
            return Err(e);
        }
    };
    let store = Arc::new(AreaResultStore::new(snapshot));

    match command {
        Commands::Overview { areas, output } => {
            let snapshot = store.snapshot();
            let areas = if areas.is_empty() {
                snapshot.plottable_areas()
            } else {
                areas
            };
            let chart = assembler.build_overview(&snapshot, &areas)?;
            emit_json(output.as_deref(), &chart)?;
        }
        Commands::Detail { area, output } => {
            let chart = assembler.build_detail(&store.snapshot(), &area)?;
            emit_json(output.as_deref(), &chart)?;
        }
        Commands::Smooth { area, output } => {
            let snapshot = store.snapshot();
            let cumulative = snapshot
                .cases(&area)
                .with_context(|| format!("no case series for '{area}' (is --cases set?)"))?;
            let cases = smooth(cumulative, data.min_cases)?;
            info!(area = %area, days = cases.len(), "Case series smoothed");
            match output {
                Some(path) => write_series_csv(std::fs::File::create(path)?, &cases)?,
                None => write_series_csv(std::io::stdout().lock(), &cases)?,
            }
        }
        Commands::Route {
            path,
            select,
            output,
        } => {
            let mut router = PageRouter::new(store.clone(), Arc::new(metros), assembler);
            let page = router.navigate(&path);
            match select.map(|area| router.select(&area)) {
                None | Some(Update::Unchanged) => emit_json(output.as_deref(), &page)?,
                Some(update) => emit_json(output.as_deref(), &update)?,
            }
        }
        Commands::Publish {
            out_dir,
            s3_bucket,
            gzip,
        } => {
            let destination = match (out_dir, s3_bucket) {
                (Some(dir), _) => Destination::Local(dir),
                (None, Some(bucket)) => {
                    info!(bucket = %bucket, gzip, "S3 upload enabled");
                    Destination::s3(&bucket).await
                }
                (None, None) => anyhow::bail!("publish needs --out-dir or --s3-bucket"),
            };
            let index = publish(&store.snapshot(), &assembler, &destination, gzip).await?;
            print_json(&index)?;
        }
        Commands::Describe { .. } => unreachable!("describe returns before loading"),
    }

    Ok(())
}

/// Fetches the snapshot artifacts named on the command line.
#[tracing::instrument(skip_all, fields(results = %data.results))]
async fn load_snapshot(data: &DataArgs, metros: &MetroComposition) -> Result<DashboardSnapshot> {
    let results = source::open(&data.results).await?;
    let cases = match &data.cases {
        Some(location) => Some(source::open(location).await?),
        None => None,
    };

    let sources = SnapshotSources {
        results: results.as_ref(),
        cases: cases.as_deref(),
        case_year: data.case_year,
    };
    Ok(store::load(&sources, metros).await?)
}
