use carbonflow_core::domain::EmissionRecord;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::ApiError;
use crate::processing::aggregate::{self, SCOPES};

const DETAIL_COLUMNS: [&str; 7] =
    ["id", "company_name", "scope", "category", "value", "year", "created_at"];

/// Render the three-sheet workbook (summary, raw detail, per-company) as
/// XLSX bytes.
pub fn render_spreadsheet(records: &[EmissionRecord]) -> Result<Vec<u8>, ApiError> {
    let totals = aggregate::aggregate(records);
    let companies = aggregate::group_by_company(records);

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name("Résumé")?;
    summary.write_string_with_format(0, 0, "Métrique", &bold)?;
    summary.write_string_with_format(0, 1, "Valeur", &bold)?;
    summary.write_string(1, 0, "Total des émissions")?;
    summary.write_number(1, 1, totals.total)?;
    for (i, scope) in SCOPES.iter().enumerate() {
        let row = 2 + i as u32;
        summary.write_string(row, 0, format!("Émissions Scope {scope}"))?;
        summary.write_number(row, 1, totals.by_scope.get(scope).copied().unwrap_or(0.0))?;
    }
    summary.write_string(5, 0, "Nombre d'entreprises")?;
    summary.write_number(5, 1, totals.by_company.len() as f64)?;

    let details = workbook.add_worksheet();
    details.set_name("Données Détaillées")?;
    for (col, name) in DETAIL_COLUMNS.iter().enumerate() {
        details.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    for (i, record) in records.iter().enumerate() {
        let row = 1 + i as u32;
        let id = record.id.map(|id| id.to_string()).unwrap_or_default();
        details.write_string(row, 0, id)?;
        details.write_string(row, 1, &record.company)?;
        details.write_number(row, 2, f64::from(record.scope))?;
        details.write_string(row, 3, &record.category)?;
        details.write_number(row, 4, record.value)?;
        details.write_number(row, 5, f64::from(record.year))?;
        details.write_string(row, 6, record.created_at.to_rfc3339())?;
    }

    let per_company = workbook.add_worksheet();
    per_company.set_name("Par Entreprise")?;
    let company_columns =
        ["Entreprise", "Total Scope 1", "Total Scope 2", "Total Scope 3", "Total", "Catégories"];
    for (col, name) in company_columns.iter().enumerate() {
        per_company.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    for (i, (company, entries)) in companies.iter().enumerate() {
        let row = 1 + i as u32;
        let scope_totals = aggregate::scope_totals(entries.iter().copied());
        let category_totals = aggregate::category_totals(entries.iter().copied());

        per_company.write_string(row, 0, company)?;
        for (col, scope) in SCOPES.iter().enumerate() {
            per_company.write_number(
                row,
                1 + col as u16,
                scope_totals.get(scope).copied().unwrap_or(0.0),
            )?;
        }
        per_company.write_number(row, 4, scope_totals.values().sum::<f64>())?;

        let categories = category_totals
            .iter()
            .map(|(category, value)| format!("{category}: {value:.2}"))
            .collect::<Vec<_>>()
            .join("; ");
        per_company.write_string(row, 5, categories)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(company: &str, scope: u8, category: &str, value: f64) -> EmissionRecord {
        EmissionRecord {
            id: Some(Uuid::new_v4()),
            company: company.to_string(),
            scope,
            category: category.to_string(),
            value,
            year: 2023,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_an_xlsx_byte_stream() {
        let records = vec![
            record("Acme", 1, "Transport", 10.0),
            record("Acme", 2, "Énergie", 4.0),
            record("Beta", 3, "Achats", 2.0),
        ];

        let bytes = render_spreadsheet(&records).unwrap();
        // XLSX files are ZIP containers.
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn renders_even_a_single_record() {
        let bytes = render_spreadsheet(&[record("Acme", 1, "Transport", 1.0)]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
