//! Dashboard refresh - render stored daily rows as spreadsheet grids

use crate::ingestion::write::{ReportStore, StoredRow};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub const TIMESTAMP_RANGE: &str = "Raw Data!C20:D20";
pub const DATA_RANGE: &str = "Raw Data!A1";

/// Zone the dashboards are stamped in unless configured otherwise
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

const BLAZE_COLUMNS: &[&str] = &[
    "property_id", "property_name", "total_units", "occupied_units", "occupancy_rate",
    "projected_occupied_units", "projected_occupancy_rate", "total_receivable",
    "total_delinquent_rent", "delinquent_subsidy", "delinquent_fees", "total_rent",
    "delinquency_percent", "total_guest_cards", "active_guest_cards", "applications",
    "showings", "monthly_received", "daily_received", "delinquency_percent_receivable",
    "delinquency_percent_rent_only", "delinquency_percent_no_subsidies", "vacant_rented_count",
    "vacant_unrented_count", "notice_rented_count", "notice_unrented_count",
    "vacant_unrented_json", "vacant_rented_json", "notice_eviction_count", "notice_eviction",
    "lease_30", "lease_60", "lease_90", "lease_m2m", "notice_unrented_json",
    "notice_rented_json",
];

const LEGACY_COLUMNS: &[&str] = &[
    "property_id", "property_name", "total_units", "occupied_units", "vacant_rented_json",
    "vacant_unrented_json", "notice_unrented_count", "notice_rented_count",
    "vacant_unrented_count", "vacant_rented_count", "delinquency_percent_no_subsidies",
    "delinquency_percent_rent_only", "delinquency_percent_receivable", "daily_received",
    "monthly_received", "showings", "applications", "active_guest_cards", "total_guest_cards",
    "delinquency_percent", "total_rent", "delinquent_fees", "delinquent_subsidy",
    "total_delinquent_rent", "total_receivable", "projected_occupancy_rate",
    "projected_occupied_units", "occupancy_rate", "notice_eviction", "notice_eviction_count",
    "lease_30", "lease_60", "lease_90", "lease_m2m", "notice_unrented_json",
    "notice_rented_json",
];

/// A rectangular grid of cell values
pub type Grid = Vec<Vec<String>>;

/// The two portfolio dashboards, each with its own column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardLayout {
    Blaze,
    Legacy,
}

impl DashboardLayout {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            DashboardLayout::Blaze => BLAZE_COLUMNS,
            DashboardLayout::Legacy => LEGACY_COLUMNS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DashboardLayout::Blaze => "blaze",
            DashboardLayout::Legacy => "legacy",
        }
    }
}

/// Header row followed by one row per stored record; missing values are blank
pub fn build_grid(layout: DashboardLayout, rows: &[StoredRow]) -> Grid {
    let columns = layout.columns();
    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();

    std::iter::once(header)
        .chain(rows.iter().map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).cloned().unwrap_or_default())
                .collect::<Vec<String>>()
        }))
        .collect()
}

/// IANA zone name such as `America/Chicago`
pub fn parse_timezone(name: &str) -> anyhow::Result<Tz> {
    let trimmed = name.trim();
    trimmed.parse::<Tz>().with_context(|| {
        format!("Invalid timezone '{trimmed}' (expected IANA name, e.g. America/Chicago)")
    })
}

/// Wall-clock time of `instant` in `zone`
pub fn wall_clock(instant: DateTime<Utc>, zone: Tz) -> NaiveDateTime {
    instant.with_timezone(&zone).naive_local()
}

/// `Last Update:` cell pair, e.g. `06/08/2025 - 6:15 am`
pub fn timestamp_grid(now: NaiveDateTime) -> Grid {
    let stamp = now.format("%m/%d/%Y - %-I:%M %p").to_string().to_lowercase();
    vec![vec!["Last Update:".to_string(), stamp]]
}

/// Overwrites a named range with a grid
#[async_trait]
pub trait RangePublisher: Send + Sync {
    async fn publish(&self, dashboard: &str, range: &str, grid: &Grid) -> anyhow::Result<()>;
}

/// Writes each published range to `<dir>/<dashboard>-<range>.csv`
pub struct CsvRangePublisher {
    dir: PathBuf,
}

impl CsvRangePublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, dashboard: &str, range: &str) -> PathBuf {
        let range: String = range
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        self.dir.join(format!("{}-{}.csv", dashboard, range))
    }
}

#[async_trait]
impl RangePublisher for CsvRangePublisher {
    async fn publish(&self, dashboard: &str, range: &str, grid: &Grid) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(dashboard, range);

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)?;
        for row in grid {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Published {} rows to {:?}", grid.len(), path);
        Ok(())
    }
}

/// Refresh one dashboard from the latest stored rows of its properties
pub async fn refresh(
    layout: DashboardLayout,
    property_ids: &[String],
    store: &dyn ReportStore,
    publisher: &dyn RangePublisher,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    let rows = store.latest_daily_rows(property_ids).await?;
    info!("Refreshing {} dashboard with {} rows", layout.name(), rows.len());

    publisher
        .publish(layout.name(), TIMESTAMP_RANGE, &timestamp_grid(now))
        .await?;
    publisher
        .publish(layout.name(), DATA_RANGE, &build_grid(layout, &rows))
        .await?;

    Ok(rows.len())
}
