//! Write functions - persist summaries with idempotent upserts

use crate::ingestion::error::ReportResult;
use crate::ingestion::types::{CollectableRent, Columns, DailyRecord, SqlValue, DAILY_DATA_TABLE};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info};

/// Columns of one stored row rendered as text, keyed by column name
pub type StoredRow = HashMap<String, String>;

/// Persistence seam for the pipeline
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert or update the row keyed by `(property_id, report_date)`,
    /// touching only the columns supplied
    async fn upsert(&self, table: &'static str, columns: Columns) -> ReportResult<()>;

    /// Most recent stored collectable rent per property on or before `report_date`.
    /// Rent roll results must be committed before this is read for fresh figures.
    async fn collectable_rent(&self, report_date: Option<NaiveDate>)
        -> ReportResult<CollectableRent>;

    /// Latest daily row for each listed property, in the order given
    async fn latest_daily_rows(&self, property_ids: &[String]) -> ReportResult<Vec<StoredRow>>;
}

/// Upsert records one at a time, in order, awaiting each before the next
pub async fn write_records<R>(store: &dyn ReportStore, records: &[R]) -> ReportResult<usize>
where
    R: DailyRecord + Serialize,
{
    info!("Writing {} records", records.len());

    let mut written = 0;
    for record in records {
        store.upsert(record.table(), record.columns()).await?;
        written += 1;
        debug!(
            "Upserted {} for property {}: {}",
            record.table(),
            record.property_id(),
            serde_json::to_string(record).unwrap_or_default()
        );
    }

    Ok(written)
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// `INSERT .. ON CONFLICT (property_id, report_date) DO UPDATE` for the given columns
fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let column_list = columns.join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = columns
        .iter()
        .filter(|c| **c != "property_id" && **c != "report_date")
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .chain(std::iter::once("last_updated = NOW()".to_string()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({column_list}) VALUES ({placeholders}) \
         ON CONFLICT (property_id, report_date) DO UPDATE SET {updates}"
    )
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn upsert(&self, table: &'static str, columns: Columns) -> ReportResult<()> {
        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let sql = upsert_sql(table, &names);

        let mut query = sqlx::query(&sql);
        for (_, value) in columns {
            query = match value {
                SqlValue::Text(text) => query.bind(text),
                SqlValue::Int(int) => query.bind(int),
                SqlValue::Decimal(decimal) => query.bind(decimal),
                SqlValue::Date(date) => query.bind(date),
            };
        }

        let result = query.execute(&self.pool).await?;
        debug!("{} rows affected in {}", result.rows_affected(), table);

        Ok(())
    }

    async fn collectable_rent(
        &self,
        report_date: Option<NaiveDate>,
    ) -> ReportResult<CollectableRent> {
        let rows = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT DISTINCT ON (property_id) property_id, collectable_rent
            FROM daily_data
            WHERE collectable_rent IS NOT NULL
              AND ($1::date IS NULL OR report_date IS NULL OR report_date <= $1)
            ORDER BY property_id, report_date DESC NULLS LAST
            "#,
        )
        .bind(report_date)
        .fetch_all(&self.pool)
        .await?;

        info!("Loaded collectable rent for {} properties", rows.len());

        Ok(rows.into_iter().collect())
    }

    async fn latest_daily_rows(&self, property_ids: &[String]) -> ReportResult<Vec<StoredRow>> {
        let cells = sqlx::query_as::<_, (String, String, Option<String>)>(
            r#"
            SELECT latest.property_id, kv.key, kv.value
            FROM (
                SELECT DISTINCT ON (property_id) *
                FROM daily_data
                WHERE property_id = ANY($1)
                ORDER BY property_id, report_date DESC NULLS LAST
            ) AS latest
            CROSS JOIN LATERAL jsonb_each_text(to_jsonb(latest)) AS kv
            "#,
        )
        .bind(property_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_property: HashMap<String, StoredRow> = HashMap::new();
        for (property_id, column, value) in cells {
            by_property
                .entry(property_id)
                .or_default()
                .insert(column, value.unwrap_or_default());
        }

        debug!("Fetched {} stored rows from {}", by_property.len(), DAILY_DATA_TABLE);

        Ok(property_ids
            .iter()
            .filter_map(|id| by_property.remove(id))
            .collect())
    }
}
