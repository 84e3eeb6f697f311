//! Report processor - routes platform CSV extracts into daily metrics and
//! refreshes the dashboards

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use report_processor::ingestion::dashboard::{
    self, parse_timezone, wall_clock, CsvRangePublisher, DashboardLayout, DEFAULT_TIMEZONE,
};
use report_processor::ingestion::dispatch::process_files;
use report_processor::ingestion::fetch::list_report_files;
use report_processor::ingestion::write::PgReportStore;
use report_processor::schedule_files;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "report-processor", about = "Aggregate property report CSVs into daily metrics")]
struct Cli {
    /// Report files to process; defaults to every CSV in ATTACHMENTS_FOLDER
    files: Vec<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,

    /// Apply schema migrations before processing
    #[arg(long)]
    migrate: bool,

    /// Do not refresh dashboard exports after processing
    #[arg(long)]
    skip_dashboards: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let run_id = Uuid::new_v4();
    run(cli).instrument(info_span!("run", %run_id)).await
}

async fn run(cli: Cli) -> Result<()> {
    info!("🚀 Starting Report Processor...");

    // Load configuration from environment
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let files = if cli.files.is_empty() {
        list_report_files(&config.attachments_dir)?
    } else {
        cli.files
    };

    if files.is_empty() {
        info!("✅ No report files to process. Exiting.");
        return Ok(());
    }

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PgReportStore::new(pool);
    info!("Database connected");

    if cli.migrate {
        store.migrate().await.context("Failed to apply migrations")?;
        info!("Migrations applied");
    }

    let today = wall_clock(Utc::now(), config.timezone).date();
    let summary = process_files(&schedule_files(files), &store, today).await;
    info!("✓ Reports complete: {}", summary);

    if !cli.skip_dashboards {
        info!("📊 Refreshing dashboards...");
        let publisher = CsvRangePublisher::new(&config.dashboard_dir);
        let now = wall_clock(Utc::now(), config.timezone);

        for (layout, property_ids) in [
            (DashboardLayout::Blaze, &config.blaze_property_ids),
            (DashboardLayout::Legacy, &config.legacy_property_ids),
        ] {
            match dashboard::refresh(layout, property_ids, &store, &publisher, now).await {
                Ok(rows) => info!("✓ {} dashboard refreshed with {} rows", layout.name(), rows),
                Err(e) => error!("✗ {} dashboard refresh failed: {}", layout.name(), e),
            }
        }
    }

    info!("🎉 All files and post-processing completed.");
    Ok(())
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
struct Config {
    database_url: String,
    attachments_dir: PathBuf,
    dashboard_dir: PathBuf,
    blaze_property_ids: Vec<String>,
    legacy_property_ids: Vec<String>,
    timezone: Tz,
}

impl Config {
    fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,

            attachments_dir: env::var("ATTACHMENTS_FOLDER")
                .unwrap_or_else(|_| "attachments".to_string())
                .into(),

            dashboard_dir: env::var("DASHBOARD_EXPORT_DIR")
                .unwrap_or_else(|_| "dashboards".to_string())
                .into(),

            blaze_property_ids: property_ids(
                &env::var("BLAZE_PROPERTY_IDS")
                    .unwrap_or_else(|_| "187,236,244,423,561,579,580,581,657,685".to_string()),
            ),

            legacy_property_ids: property_ids(
                &env::var("LEGACY_PROPERTY_IDS")
                    .unwrap_or_else(|_| "329,330,689,690,691,692,693,694,695".to_string()),
            ),

            timezone: parse_timezone(
                &env::var("DASHBOARD_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string()),
            )?,
        })
    }
}

fn property_ids(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
