//! Report ingestion - functional pipeline from platform CSV extracts to daily metrics

pub mod buckets;
pub mod classify;
pub mod dashboard;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod reduce;
pub mod types;
pub mod utils;
pub mod write;

pub use error::{ReportError, ReportResult};
pub use types::*;
