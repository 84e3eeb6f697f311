//! Dispatch - route each report file to its reducer and persist the result

use crate::ingestion::error::ReportResult;
use crate::ingestion::parse::read_report;
use crate::ingestion::reduce::{
    reduce_applications, reduce_delinquency, reduce_guest_cards, reduce_mtd_receivables,
    reduce_rent_roll, reduce_showings, reduce_unit_status,
};
use crate::ingestion::types::{ReportKind, RunSummary, WriteStats};
use crate::ingestion::utils::extract_report_date;
use crate::ingestion::write::{write_records, ReportStore};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn, Instrument};

/// File-name tokens checked in order against the lowercased base name;
/// the first route with a matching token wins
const ROUTES: &[(&[&str], ReportKind)] = &[
    (&["delinquency"], ReportKind::Delinquency),
    (&["showings"], ReportKind::Showings),
    (&["guest"], ReportKind::GuestCards),
    (&["application"], ReportKind::Applications),
    (&["mtd"], ReportKind::MtdReceivables),
    // The platform's daily "receivables" export carries unit status per unit
    (&["receivables"], ReportKind::UnitStatus),
    (&["rent_roll", "unit"], ReportKind::RentRoll),
];

impl ReportKind {
    /// Report kind from a file name, None when no route matches
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        ROUTES
            .iter()
            .find(|(tokens, _)| tokens.iter().any(|token| name.contains(token)))
            .map(|(_, kind)| *kind)
    }
}

/// Read, parse, reduce and upsert one report file
pub async fn process_file(
    path: &Path,
    kind: ReportKind,
    store: &dyn ReportStore,
    today: NaiveDate,
) -> ReportResult<WriteStats> {
    let report_date = extract_report_date(path);
    if report_date.is_none() {
        warn!("No YYYYMMDD date in file name, storing without a report date");
    }

    let rows = read_report(path)?;

    let upserted = match kind {
        ReportKind::RentRoll => {
            write_records(store, &reduce_rent_roll(&rows, report_date, today)).await?
        }
        ReportKind::Delinquency => {
            let collectable = store.collectable_rent(report_date).await?;
            write_records(store, &reduce_delinquency(&rows, report_date, &collectable)).await?
        }
        ReportKind::GuestCards => {
            write_records(store, &reduce_guest_cards(&rows, report_date)).await?
        }
        ReportKind::Applications => {
            write_records(store, &reduce_applications(&rows, report_date)).await?
        }
        ReportKind::Showings => write_records(store, &reduce_showings(&rows, report_date)).await?,
        ReportKind::MtdReceivables => {
            write_records(store, &reduce_mtd_receivables(&rows, report_date)).await?
        }
        ReportKind::UnitStatus => {
            write_records(store, &reduce_unit_status(&rows, report_date)).await?
        }
    };

    Ok(WriteStats {
        rows_read: rows.len(),
        upserted,
    })
}

/// Process files strictly one after another. Unknown file names are skipped
/// and a failing file is logged without stopping the rest of the run.
pub async fn process_files(
    paths: &[PathBuf],
    store: &dyn ReportStore,
    today: NaiveDate,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let Some(kind) = ReportKind::from_path(path) else {
            warn!("No matching workflow for file: {}", name);
            summary.skipped += 1;
            continue;
        };

        let span = info_span!("report", file = %name, kind = %kind);
        let result = async {
            info!("Processing file: {}", name);
            process_file(path, kind, store, today).await
        }
        .instrument(span)
        .await;

        match result {
            Ok(stats) => {
                info!("✓ {} ({}) completed: {}", name, kind, stats);
                summary.processed += 1;
                summary.upserted += stats.upserted;
            }
            Err(e) => {
                error!("✗ Error processing {}: {}", name, e);
                summary.failed += 1;
            }
        }
    }

    info!("Run complete: {}", summary);
    summary
}
