use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use tracing::debug;

use crate::error::ApiError;

/// Parsed upload: the header row plus one column-name → cell-text map per
/// data row, in file order.
#[derive(Debug)]
pub struct TabularFile {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
}

impl FileKind {
    /// Detect from the uploaded filename, falling back to the declared
    /// content type. Unknown uploads parse as CSV.
    pub fn detect(filename: &str, content_type: Option<&str>) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            return FileKind::Spreadsheet;
        }
        if lower.ends_with(".csv") {
            return FileKind::Csv;
        }
        match content_type {
            Some(ct) if ct.contains("spreadsheet") || ct.contains("excel") => FileKind::Spreadsheet,
            _ => FileKind::Csv,
        }
    }
}

pub fn read_file(path: &Path, kind: FileKind) -> Result<TabularFile, ApiError> {
    match kind {
        FileKind::Csv => read_csv(File::open(path)?),
        FileKind::Spreadsheet => read_spreadsheet(BufReader::new(File::open(path)?)),
    }
}

pub fn read_csv(input: impl Read) -> Result<TabularFile, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }

    debug!("Parsed CSV upload: {} columns, {} rows", headers.len(), rows.len());
    Ok(TabularFile { headers, rows })
}

/// Read the first worksheet of an XLSX workbook; the first row is the header
/// row, fully blank rows are skipped.
pub fn read_spreadsheet(input: impl Read + Seek) -> Result<TabularFile, ApiError> {
    let mut workbook = Xlsx::new(input).map_err(|e| ApiError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApiError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| ApiError::Spreadsheet(e.to_string()))?;

    let mut cell_rows = range.rows();
    let headers: Vec<String> = match cell_rows.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for cells in cell_rows {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(cells.iter().map(cell_text))
            .collect();
        rows.push(row);
    }

    debug!("Parsed spreadsheet upload: {} columns, {} rows", headers.len(), rows.len());
    Ok(TabularFile { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Spreadsheet integers arrive as floats; "2023.0" would not parse
        // as a year or scope.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_csv_headers_and_rows() {
        let data = "entreprise,annee,scope,categorie,emissions_co2\nAcme, 2023 ,1,Transport,10.5\n";
        let file = read_csv(Cursor::new(data)).unwrap();

        assert_eq!(
            file.headers,
            vec!["entreprise", "annee", "scope", "categorie", "emissions_co2"]
        );
        assert_eq!(file.rows.len(), 1);
        assert_eq!(file.rows[0]["annee"], "2023");
        assert_eq!(file.rows[0]["emissions_co2"], "10.5");
    }

    #[test]
    fn csv_without_data_rows_parses_to_empty() {
        let file = read_csv(Cursor::new("entreprise,annee,scope,categorie,emissions_co2\n")).unwrap();
        assert!(file.rows.is_empty());
    }

    #[test]
    fn short_rows_leave_trailing_columns_absent() {
        let data = "entreprise,annee,scope,categorie,emissions_co2\nAcme,2023\n";
        let file = read_csv(Cursor::new(data)).unwrap();
        assert_eq!(file.rows[0].get("entreprise").map(String::as_str), Some("Acme"));
        assert!(file.rows[0].get("scope").is_none());
    }

    #[test]
    fn detects_kind_from_extension_then_content_type() {
        assert_eq!(FileKind::detect("data.XLSX", None), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect("data.csv", None), FileKind::Csv);
        assert_eq!(
            FileKind::detect("data", Some("application/vnd.ms-excel")),
            FileKind::Spreadsheet
        );
        assert_eq!(FileKind::detect("data", Some("text/csv")), FileKind::Csv);
    }

    #[test]
    fn integral_floats_render_without_decimal_point() {
        assert_eq!(cell_text(&Data::Float(2023.0)), "2023");
        assert_eq!(cell_text(&Data::Float(10.5)), "10.5");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
