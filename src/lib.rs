// Library module for testable functions

pub mod ingestion;

use ingestion::ReportKind;
use std::path::PathBuf;

/// Order files for a run: rent roll reports first, so delinquency files later
/// in the same run see freshly stored collectable rent. Otherwise keeps the
/// given order.
pub fn schedule_files(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by_key(|path| ReportKind::from_path(path) != Some(ReportKind::RentRoll));
    paths
}
