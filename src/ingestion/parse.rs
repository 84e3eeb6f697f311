//! Parse functions - turn raw CSV bytes into header-keyed rows

use crate::ingestion::error::{ReportError, ReportResult};
use crate::ingestion::types::RawRow;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Parse CSV with a header line into one map per data row.
/// Values are trimmed; short rows simply lack the trailing columns.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        if record.iter().all(|value| value.is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), String::from_utf8_lossy(value).into_owned()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Read and parse a report file from disk
pub fn read_report(path: &Path) -> ReportResult<Vec<RawRow>> {
    let bytes = fs::read(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Read {} bytes from {:?}", bytes.len(), path);

    let rows = parse_rows(bytes.as_slice())?;
    info!("Parsed {} rows from {:?}", rows.len(), path);

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_rows() {
        let csv = "Property ID,Status,Unit,Rent\n187, Current ,101,\"1,000.00\"\n187,Vacant-Unrented,102,\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Property ID"], "187");
        assert_eq!(rows[0]["Status"], "Current");
        assert_eq!(rows[0]["Rent"], "1,000.00");
        assert_eq!(rows[1]["Rent"], "");
    }

    #[test]
    fn test_parse_rows_tolerates_short_rows_and_bom() {
        let csv = "\u{feff}Property ID,Status,Unit\n187,current\n\n,,\n188,notice-rented,4\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Property ID"], "187");
        assert!(!rows[0].contains_key("Unit"));
        assert_eq!(rows[1]["Unit"], "4");
    }

    #[test]
    fn test_read_report_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Property ID,Receipt Amount").unwrap();
        writeln!(file, "580,100.00").unwrap();

        let rows = read_report(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Receipt Amount"], "100.00");
    }

    #[test]
    fn test_read_report_missing_file() {
        let err = read_report(Path::new("/nonexistent/rent_roll-20250608.csv")).unwrap_err();
        assert!(matches!(err, ReportError::Read { .. }));
    }
}
