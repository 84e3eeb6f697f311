//! End-to-end runs of the dispatcher against an in-memory store

use async_trait::async_trait;
use chrono::NaiveDate;
use report_processor::ingestion::dashboard::{self, CsvRangePublisher, DashboardLayout, DATA_RANGE};
use report_processor::ingestion::dispatch::process_files;
use report_processor::ingestion::write::{ReportStore, StoredRow};
use report_processor::ingestion::{
    CollectableRent, Columns, ReportResult, SqlValue, DAILY_DATA_TABLE, MTD_RECEIVABLES_TABLE,
};
use report_processor::schedule_files;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

type Key = (String, String, Option<NaiveDate>);

/// Mirrors the upsert semantics of the Postgres store: one row per
/// (table, property_id, report_date), only supplied columns overwritten
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<BTreeMap<Key, BTreeMap<String, SqlValue>>>,
    upserts: Mutex<usize>,
}

impl MemoryStore {
    fn row(&self, table: &str, pid: &str, date: Option<NaiveDate>) -> Option<BTreeMap<String, SqlValue>> {
        self.rows
            .lock()
            .unwrap()
            .get(&(table.to_string(), pid.to_string(), date))
            .cloned()
    }

    fn cell(&self, pid: &str, date: Option<NaiveDate>, column: &str) -> String {
        self.row(DAILY_DATA_TABLE, pid, date)
            .and_then(|row| row.get(column).map(|v| v.to_string()))
            .unwrap_or_default()
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn snapshot(&self) -> BTreeMap<Key, BTreeMap<String, SqlValue>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn upsert(&self, table: &'static str, columns: Columns) -> ReportResult<()> {
        let mut pid = String::new();
        let mut date = None;
        for (name, value) in &columns {
            match (*name, value) {
                ("property_id", SqlValue::Text(text)) => pid = text.clone(),
                ("report_date", SqlValue::Date(d)) => date = *d,
                _ => {}
            }
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry((table.to_string(), pid, date)).or_default();
        for (name, value) in columns {
            row.insert(name.to_string(), value);
        }
        *self.upserts.lock().unwrap() += 1;
        Ok(())
    }

    async fn collectable_rent(&self, report_date: Option<NaiveDate>) -> ReportResult<CollectableRent> {
        let rows = self.rows.lock().unwrap();
        let mut latest: BTreeMap<String, (Option<NaiveDate>, Decimal)> = BTreeMap::new();

        for ((table, pid, date), row) in rows.iter() {
            if table != DAILY_DATA_TABLE {
                continue;
            }
            if let (Some(limit), Some(date)) = (report_date, date) {
                if *date > limit {
                    continue;
                }
            }
            if let Some(SqlValue::Decimal(rent)) = row.get("collectable_rent") {
                let newer = latest.get(pid).map(|(seen, _)| date > seen).unwrap_or(true);
                if newer {
                    latest.insert(pid.clone(), (*date, *rent));
                }
            }
        }

        Ok(latest.into_iter().map(|(pid, (_, rent))| (pid, rent)).collect())
    }

    async fn latest_daily_rows(&self, property_ids: &[String]) -> ReportResult<Vec<StoredRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(property_ids
            .iter()
            .filter_map(|id| {
                rows.iter()
                    .filter(|((table, pid, _), _)| table == DAILY_DATA_TABLE && pid == id)
                    .max_by_key(|((_, _, date), _)| *date)
                    .map(|(_, row)| {
                        row.iter()
                            .map(|(k, v)| (k.clone(), v.to_string()))
                            .collect::<StoredRow>()
                    })
            })
            .collect())
    }
}

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 8).unwrap()
}

fn report_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 6, 8)
}

const RENT_ROLL: &str = "\
Property ID,Unit,Status,Rent,Lease To
187,101,Current,\"1,000.00\",07/08/2025
187,102,Vacant-Unrented,,
187,103,Notice-Rented,1000,08/01/2025
187,104,Evict,500,
236,201,Current,2000,01/15/2026
Total,,,\"4,500.00\",
";

const DELINQUENCY: &str = "\
Property ID,Amount Receivable,Delinquent Rent
187,\"1,250.00\",\"1,000.00\"
187,,
236,\"1,200.50\",200
total,\"2,450.50\",\"1,200.00\"
";

#[tokio::test]
async fn test_rent_roll_then_delinquency_in_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let delinquency = write_csv(&dir, "delinquency-20250608.csv", DELINQUENCY);
    let rent_roll = write_csv(&dir, "rent_roll-20250608.csv", RENT_ROLL);
    let store = MemoryStore::default();

    let summary = process_files(&schedule_files(vec![delinquency, rent_roll]), &store, today()).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.upserted, 4);

    // Rent roll and delinquency share the same daily row
    assert_eq!(store.row_count(), 2);
    assert_eq!(store.cell("187", report_date(), "total_units"), "4");
    assert_eq!(store.cell("187", report_date(), "occupied_units"), "3");
    assert_eq!(store.cell("187", report_date(), "occupancy_rate"), "75.00");
    assert_eq!(store.cell("187", report_date(), "projected_occupancy_rate"), "75.00");
    assert_eq!(store.cell("187", report_date(), "collectable_rent"), "2500.00");
    assert_eq!(store.cell("187", report_date(), "vacant_unrented_json"), "102");
    assert_eq!(store.cell("187", report_date(), "notice_eviction"), "104");
    assert_eq!(store.cell("187", report_date(), "lease_30"), "1");
    assert_eq!(store.cell("187", report_date(), "lease_60"), "1");

    assert_eq!(store.cell("187", report_date(), "total_receivable"), "1250.00");
    assert_eq!(store.cell("187", report_date(), "delinquent_fees"), "250.00");
    assert_eq!(store.cell("187", report_date(), "delinquency_percent_receivable"), "50.00");
    assert_eq!(store.cell("187", report_date(), "delinquency_percent_rent_only"), "40.00");
    assert_eq!(store.cell("236", report_date(), "delinquency_percent_receivable"), "60.03");

    assert!(store.row(DAILY_DATA_TABLE, "Total", report_date()).is_none());
    assert!(store.row(DAILY_DATA_TABLE, "total", report_date()).is_none());
}

#[tokio::test]
async fn test_delinquency_without_stored_rent_is_zero_percent() {
    let dir = tempfile::tempdir().unwrap();
    let delinquency = write_csv(&dir, "delinquency-20250608.csv", DELINQUENCY);
    let store = MemoryStore::default();

    process_files(&[delinquency], &store, today()).await;

    assert_eq!(store.cell("236", report_date(), "total_receivable"), "1200.50");
    assert_eq!(store.cell("236", report_date(), "delinquency_percent_receivable"), "0.00");
}

#[tokio::test]
async fn test_rerunning_a_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let rent_roll = write_csv(&dir, "rent_roll-20250608.csv", RENT_ROLL);
    let store = MemoryStore::default();

    process_files(&[rent_roll.clone()], &store, today()).await;
    let first = store.snapshot();

    process_files(&[rent_roll], &store, today()).await;

    assert_eq!(store.snapshot(), first);
    assert_eq!(store.row_count(), 2);
    assert_eq!(*store.upserts.lock().unwrap(), 4);
}

#[tokio::test]
async fn test_bad_files_do_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let unknown = write_csv(&dir, "owner_statement-20250608.csv", "Property ID\n187\n");
    let missing = dir.path().join("showings-20250608.csv");
    let guest = write_csv(
        &dir,
        "guest_cards-20250608.csv",
        "Property ID,Status\n657,Active\n657,Scheduled\nTotal,Active\n",
    );
    let store = MemoryStore::default();

    let summary = process_files(&[unknown, missing, guest], &store, today()).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(store.cell("657", report_date(), "total_guest_cards"), "2");
    assert_eq!(store.cell("657", report_date(), "showings"), "1");
}

#[tokio::test]
async fn test_oversized_amounts_do_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let rent_roll = write_csv(
        &dir,
        "rent_roll-20250608.csv",
        "Property ID,Unit,Status,Rent\n423,1,Current,1\n",
    );
    let delinquency = write_csv(
        &dir,
        "delinquency-20250608.csv",
        "Property ID,Amount Receivable,Delinquent Rent\n\
         423,1000000000000000000000000000,\"(1,200.50)\"\n",
    );
    let guest = write_csv(&dir, "guest_cards-20250608.csv", "Property ID,Status\n657,Active\n");
    let store = MemoryStore::default();

    let summary = process_files(&[rent_roll, delinquency, guest], &store, today()).await;

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.cell("423", report_date(), "delinquency_percent_receivable"), "0.00");
    assert_eq!(store.cell("423", report_date(), "total_delinquent_rent"), "-1200.50");
    assert_eq!(store.cell("657", report_date(), "total_guest_cards"), "1");
}

#[tokio::test]
async fn test_file_without_date_is_stored_without_report_date() {
    let dir = tempfile::tempdir().unwrap();
    let showings = write_csv(&dir, "showings.csv", "Property ID\n580\n580\n");
    let store = MemoryStore::default();

    let summary = process_files(&[showings], &store, today()).await;

    assert_eq!(summary.processed, 1);
    assert_eq!(store.cell("580", None, "showings"), "2");
    assert_eq!(store.cell("580", None, "report_date"), "");
}

#[tokio::test]
async fn test_mtd_receipts_use_their_own_table() {
    let dir = tempfile::tempdir().unwrap();
    let mtd = write_csv(
        &dir,
        "mtd_receivables-20250608.csv",
        "Property ID,Receipt Amount\n580,\"$1,000.00\"\n580,250.5\n",
    );
    let store = MemoryStore::default();

    process_files(&[mtd], &store, today()).await;

    let row = store.row(MTD_RECEIVABLES_TABLE, "580", report_date()).unwrap();
    assert_eq!(row["total_amount"].to_string(), "1250.50");
    assert!(store.row(DAILY_DATA_TABLE, "580", report_date()).is_none());
}

#[tokio::test]
async fn test_dashboard_refresh_from_stored_rows() {
    let dir = tempfile::tempdir().unwrap();
    let rent_roll = write_csv(&dir, "rent_roll-20250608.csv", RENT_ROLL);
    let store = MemoryStore::default();
    process_files(&[rent_roll], &store, today()).await;

    let out = dir.path().join("dashboards");
    let publisher = CsvRangePublisher::new(&out);
    let ids = vec!["236".to_string(), "187".to_string(), "999".to_string()];
    let now = today().and_hms_opt(6, 15, 0).unwrap();

    let rows = dashboard::refresh(DashboardLayout::Blaze, &ids, &store, &publisher, now)
        .await
        .unwrap();
    assert_eq!(rows, 2);

    let grid = fs::read_to_string(publisher.path_for("blaze", DATA_RANGE)).unwrap();
    let lines: Vec<&str> = grid.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("property_id,property_name,total_units"));
    assert!(lines[1].starts_with("236,,1,1,100.00"));
    assert!(lines[2].starts_with("187,,4,3,75.00"));
    assert!(Path::new(&out).join("blaze-raw_data_c20_d20.csv").exists());
}
