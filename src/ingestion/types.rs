//! Core data types for the report pipeline
//! Pure data structures with no behavior beyond flattening into columns

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// One CSV line: column label -> raw string value
pub type RawRow = HashMap<String, String>;

/// Collectable rent per property, read back from previously stored rent-roll results
pub type CollectableRent = HashMap<String, Decimal>;

/// Stored table for per-property daily metrics
pub const DAILY_DATA_TABLE: &str = "daily_data";

/// Stored table for month-to-date receipts
pub const MTD_RECEIVABLES_TABLE: &str = "mtd_receivables";

/// Report types emitted by the property-management platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Delinquency,
    Showings,
    GuestCards,
    Applications,
    MtdReceivables,
    UnitStatus,
    RentRoll,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Delinquency => write!(f, "delinquency"),
            ReportKind::Showings => write!(f, "showings"),
            ReportKind::GuestCards => write!(f, "guest cards"),
            ReportKind::Applications => write!(f, "rental applications"),
            ReportKind::MtdReceivables => write!(f, "mtd receivables"),
            ReportKind::UnitStatus => write!(f, "unit status"),
            ReportKind::RentRoll => write!(f, "rent roll"),
        }
    }
}

/// A flat column value handed to the store. Lists never appear here:
/// unit labels are joined into text before they leave a reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Decimal(Decimal),
    Date(Option<NaiveDate>),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            SqlValue::Date(None) => Ok(()),
        }
    }
}

/// Flat (column, value) list for one upsert
pub type Columns = Vec<(&'static str, SqlValue)>;

/// A finalized per-property record destined for an upsert keyed on
/// `(property_id, report_date)`
pub trait DailyRecord: std::fmt::Debug + Send + Sync {
    fn table(&self) -> &'static str;
    fn property_id(&self) -> &str;
    fn columns(&self) -> Columns;
}

fn count(value: usize) -> SqlValue {
    SqlValue::Int(value as i64)
}

/// Rent roll summary: occupancy, projected occupancy, lease expirations and collectable rent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentRollSummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub total_units: usize,
    pub occupied_units: usize,
    pub occupancy_rate: Decimal,
    pub projected_occupied_units: usize,
    pub projected_occupancy_rate: Decimal,
    pub vacant_rented_count: usize,
    pub vacant_unrented_count: usize,
    pub notice_rented_count: usize,
    pub notice_unrented_count: usize,
    pub notice_eviction_count: usize,
    pub notice_eviction: String,
    pub lease_30: usize,
    pub lease_60: usize,
    pub lease_90: usize,
    pub lease_m2m: usize,
    pub collectable_rent: Decimal,
    pub vacant_unrented_json: String,
    pub vacant_rented_json: String,
    pub notice_unrented_json: String,
    pub notice_rented_json: String,
}

impl DailyRecord for RentRollSummary {
    fn table(&self) -> &'static str {
        DAILY_DATA_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("total_units", count(self.total_units)),
            ("occupied_units", count(self.occupied_units)),
            ("occupancy_rate", SqlValue::Decimal(self.occupancy_rate)),
            ("projected_occupied_units", count(self.projected_occupied_units)),
            ("projected_occupancy_rate", SqlValue::Decimal(self.projected_occupancy_rate)),
            ("vacant_rented_count", count(self.vacant_rented_count)),
            ("vacant_unrented_count", count(self.vacant_unrented_count)),
            ("notice_rented_count", count(self.notice_rented_count)),
            ("notice_unrented_count", count(self.notice_unrented_count)),
            ("notice_eviction_count", count(self.notice_eviction_count)),
            ("notice_eviction", SqlValue::Text(self.notice_eviction.clone())),
            ("lease_30", count(self.lease_30)),
            ("lease_60", count(self.lease_60)),
            ("lease_90", count(self.lease_90)),
            ("lease_m2m", count(self.lease_m2m)),
            ("collectable_rent", SqlValue::Decimal(self.collectable_rent)),
            ("vacant_unrented_json", SqlValue::Text(self.vacant_unrented_json.clone())),
            ("vacant_rented_json", SqlValue::Text(self.vacant_rented_json.clone())),
            ("notice_unrented_json", SqlValue::Text(self.notice_unrented_json.clone())),
            ("notice_rented_json", SqlValue::Text(self.notice_rented_json.clone())),
        ]
    }
}

/// Receivable and delinquent rent totals against stored collectable rent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelinquencySummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub total_receivable: Decimal,
    pub total_delinquent_rent: Decimal,
    pub delinquent_fees: Decimal,
    pub delinquent_subsidy: Decimal,
    pub total_rent: Decimal,
    pub delinquency_percent_receivable: Decimal,
    pub delinquency_percent_rent_only: Decimal,
}

impl DailyRecord for DelinquencySummary {
    fn table(&self) -> &'static str {
        DAILY_DATA_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("total_receivable", SqlValue::Decimal(self.total_receivable)),
            ("total_delinquent_rent", SqlValue::Decimal(self.total_delinquent_rent)),
            ("delinquent_fees", SqlValue::Decimal(self.delinquent_fees)),
            ("delinquent_subsidy", SqlValue::Decimal(self.delinquent_subsidy)),
            ("total_rent", SqlValue::Decimal(self.total_rent)),
            (
                "delinquency_percent_receivable",
                SqlValue::Decimal(self.delinquency_percent_receivable),
            ),
            (
                "delinquency_percent_rent_only",
                SqlValue::Decimal(self.delinquency_percent_rent_only),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestCardSummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub total_guest_cards: usize,
    pub active_guest_cards: usize,
    pub applications: usize,
    pub showings: usize,
}

impl DailyRecord for GuestCardSummary {
    fn table(&self) -> &'static str {
        DAILY_DATA_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("total_guest_cards", count(self.total_guest_cards)),
            ("active_guest_cards", count(self.active_guest_cards)),
            ("applications", count(self.applications)),
            ("showings", count(self.showings)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub applications: usize,
}

impl DailyRecord for ApplicationSummary {
    fn table(&self) -> &'static str {
        DAILY_DATA_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("applications", count(self.applications)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowingSummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub showings: usize,
}

impl DailyRecord for ShowingSummary {
    fn table(&self) -> &'static str {
        DAILY_DATA_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("showings", count(self.showings)),
        ]
    }
}

/// Month-to-date receipts per property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MtdReceivableSummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub total_amount: Decimal,
}

impl DailyRecord for MtdReceivableSummary {
    fn table(&self) -> &'static str {
        MTD_RECEIVABLES_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("total_amount", SqlValue::Decimal(self.total_amount)),
        ]
    }
}

/// Occupancy snapshot from the daily unit-status report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitStatusSummary {
    pub property_id: String,
    pub report_date: Option<NaiveDate>,
    pub total_units: usize,
    pub occupied_units: usize,
    pub occupancy_rate: Decimal,
    pub projected_occupied_units: usize,
    pub projected_occupancy_rate: Decimal,
}

impl DailyRecord for UnitStatusSummary {
    fn table(&self) -> &'static str {
        DAILY_DATA_TABLE
    }

    fn property_id(&self) -> &str {
        &self.property_id
    }

    fn columns(&self) -> Columns {
        vec![
            ("property_id", SqlValue::Text(self.property_id.clone())),
            ("report_date", SqlValue::Date(self.report_date)),
            ("total_units", count(self.total_units)),
            ("occupied_units", count(self.occupied_units)),
            ("occupancy_rate", SqlValue::Decimal(self.occupancy_rate)),
            ("projected_occupied_units", count(self.projected_occupied_units)),
            ("projected_occupancy_rate", SqlValue::Decimal(self.projected_occupancy_rate)),
        ]
    }
}

/// Write operation statistics for one report file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub rows_read: usize,
    pub upserted: usize,
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows read: {}, records upserted: {}",
            self.rows_read, self.upserted
        )
    }
}

/// Outcome counters for a whole run over many files
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub upserted: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed: {}, skipped: {}, failed: {}, records upserted: {}",
            self.processed, self.skipped, self.failed, self.upserted
        )
    }
}
