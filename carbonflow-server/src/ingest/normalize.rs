use std::collections::HashMap;

use carbonflow_core::domain::{EmissionRecord, UNCATEGORIZED};
use chrono::{Datelike, Utc};
use tracing::warn;

/// Parse one raw upload row into a typed record.
///
/// Rows that cannot be normalized are dropped with a warning, never raised:
/// missing company name, scope that is not an integer in 1..=3, or an
/// emissions value that is not a non-negative finite number. The year
/// defaults to the current calendar year and the category to the
/// uncategorized sentinel.
pub fn normalize_row(row: &HashMap<String, String>) -> Option<EmissionRecord> {
    let company = row.get("entreprise").map(|s| s.trim()).unwrap_or_default();
    if company.is_empty() {
        warn!("Dropping row without company name: {:?}", row);
        return None;
    }

    let scope = match row.get("scope").and_then(|s| s.trim().parse::<u8>().ok()) {
        Some(scope @ 1..=3) => scope,
        _ => {
            warn!("Dropping row with invalid scope: {:?}", row);
            return None;
        }
    };

    let value = match row.get("emissions_co2").and_then(|s| s.trim().parse::<f64>().ok()) {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            warn!("Dropping row with invalid emissions value: {:?}", row);
            return None;
        }
    };

    let year = row
        .get("annee")
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or_else(|| Utc::now().year());

    let category = match row.get("categorie").map(|s| s.trim()) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNCATEGORIZED.to_string(),
    };

    Some(EmissionRecord {
        id: None,
        company: company.to_string(),
        scope,
        category,
        value,
        year,
        created_at: Utc::now(),
    })
}

/// Normalize every row, keeping file order and dropping invalid rows.
pub fn normalize_rows(rows: &[HashMap<String, String>]) -> Vec<EmissionRecord> {
    rows.iter().filter_map(normalize_row).collect()
}
