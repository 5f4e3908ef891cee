//! Spreadsheet and CSV file parsing
//!
//! Turns an uploaded file into normalized candidate records. Workbooks use
//! the extended alias table, CSV exports the legacy one, mirroring the
//! formats each table was written for.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::ingest::normalizer::{normalize_rows, AliasTable, Cell, Row};
use crate::models::CanonicalRecord;
use crate::utils::errors::{AppError, AppResult};

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Workbook,
    Csv,
}

impl FileKind {
    /// Classify by file extension; anything else is rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xls" => Some(FileKind::Workbook),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileKind::Workbook => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FileKind::Csv => "text/csv",
        }
    }
}

/// Parse an uploaded file into candidate records, one per data row,
/// preserving row order.
pub fn parse_file(path: &Path, kind: FileKind) -> AppResult<Vec<CanonicalRecord>> {
    match kind {
        FileKind::Workbook => parse_workbook(path),
        FileKind::Csv => parse_csv(path),
    }
}

fn parse_workbook(path: &Path) -> AppResult<Vec<CanonicalRecord>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::BadRequest(format!("Error parsing Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::BadRequest("Workbook has no sheets".to_string()))?
        .map_err(|e| AppError::BadRequest(format!("Error parsing Excel file: {}", e)))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(|c| cell_from(c).as_text()).collect(),
        None => return Ok(Vec::new()),
    };

    let rows: Vec<Row> = rows_iter
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            let map: HashMap<String, Cell> = headers
                .iter()
                .zip(cells.iter())
                .filter(|(header, _)| !header.trim().is_empty())
                .map(|(header, cell)| (header.trim().to_string(), cell_from(cell)))
                .collect();
            Row::Headered(map)
        })
        .collect();

    Ok(normalize_rows(&rows, AliasTable::Extended))
}

fn parse_csv(path: &Path) -> AppResult<Vec<CanonicalRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AppError::BadRequest(format!("Error parsing CSV file: {}", e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::BadRequest(format!("Error parsing CSV file: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| AppError::BadRequest(format!("Error parsing CSV file: {}", e)))?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let map: HashMap<String, Cell> = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), Cell::Text(value.to_string())))
            .collect();
        rows.push(Row::Headered(map));
    }

    Ok(normalize_rows(&rows, AliasTable::Legacy))
}

fn cell_from(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classifies_files_by_extension() {
        assert_eq!(FileKind::from_name("fleet.xlsx"), Some(FileKind::Workbook));
        assert_eq!(FileKind::from_name("FLEET.XLS"), Some(FileKind::Workbook));
        assert_eq!(FileKind::from_name("fleet.csv"), Some(FileKind::Csv));
        assert_eq!(FileKind::from_name("fleet.pdf"), None);
        assert_eq!(FileKind::from_name("noextension"), None);
    }

    #[test]
    fn parses_a_legacy_csv_export() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Vehicle No,Chassis No,Engine No,Customer Name,Group").unwrap();
        writeln!(file, "MH12AB1234,CH-1,EN-1,Rahul Sharma,\"Two Wheeler,CV\"").unwrap();
        writeln!(file, ",,,,").unwrap();
        writeln!(file, "KA01XY9999,CH-2,EN-2,Priya Patel,CE").unwrap();
        file.flush().unwrap();

        let records = parse_file(file.path(), FileKind::Csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vehicle_no, "MH12AB1234");
        assert_eq!(records[0].customer_name, "Rahul Sharma");
        assert_eq!(records[0].group_name, "Two Wheeler");
        assert_eq!(records[1].engine_no, "EN-2");
        assert_eq!(records[1].group_name, "CE");
    }

    #[test]
    fn csv_rows_with_fewer_fields_than_headers_are_tolerated() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Vehicle No,Chassis No,Engine No,Branch").unwrap();
        writeln!(file, "V1,C1,E1").unwrap();
        file.flush().unwrap();

        let records = parse_file(file.path(), FileKind::Csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vehicle_no, "V1");
        assert_eq!(records[0].branch, "");
    }

    #[test]
    fn unreadable_workbook_is_an_input_rejection() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"this is not a workbook").unwrap();
        file.flush().unwrap();

        let err = parse_file(file.path(), FileKind::Workbook).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
