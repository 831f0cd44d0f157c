use std::collections::BTreeMap;

use carbonflow_core::domain::EmissionRecord;
use indexmap::IndexMap;

/// Scope values defined by the GHG Protocol.
pub const SCOPES: [u8; 3] = [1, 2, 3];

/// Totals derived from the full record list in a single pass.
#[derive(Debug, Clone)]
pub struct EmissionTotals {
    pub total: f64,
    /// Per-scope totals; every scope is present, absent ones read zero.
    pub by_scope: BTreeMap<u8, f64>,
    /// Company totals in first-seen order.
    pub by_company: IndexMap<String, f64>,
    /// Companies ordered descending by total; ties keep first-seen order.
    pub top_emitters: Vec<(String, f64)>,
}

// Stored values are typed floats, so the only remaining defensive case on
// the read path is a non-finite value, which contributes zero.
fn numeric(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn aggregate(records: &[EmissionRecord]) -> EmissionTotals {
    let mut total = 0.0;
    let mut by_scope: BTreeMap<u8, f64> = SCOPES.iter().map(|s| (*s, 0.0)).collect();
    let mut by_company: IndexMap<String, f64> = IndexMap::new();

    for record in records {
        let value = numeric(record.value);
        total += value;
        if let Some(scope_total) = by_scope.get_mut(&record.scope) {
            *scope_total += value;
        }
        *by_company.entry(record.company.clone()).or_insert(0.0) += value;
    }

    let mut top_emitters: Vec<(String, f64)> = by_company
        .iter()
        .map(|(name, value)| (name.clone(), *value))
        .collect();
    // Stable sort keeps first-seen order among equal totals.
    top_emitters.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    EmissionTotals { total, by_scope, by_company, top_emitters }
}

/// Group records per company, preserving first-seen company order.
pub fn group_by_company(records: &[EmissionRecord]) -> IndexMap<String, Vec<&EmissionRecord>> {
    let mut companies: IndexMap<String, Vec<&EmissionRecord>> = IndexMap::new();
    for record in records {
        companies.entry(record.company.clone()).or_default().push(record);
    }
    companies
}

/// Per-scope totals over a set of records; every scope is present.
pub fn scope_totals<'a>(records: impl IntoIterator<Item = &'a EmissionRecord>) -> BTreeMap<u8, f64> {
    let mut totals: BTreeMap<u8, f64> = SCOPES.iter().map(|s| (*s, 0.0)).collect();
    for record in records {
        if let Some(total) = totals.get_mut(&record.scope) {
            *total += numeric(record.value);
        }
    }
    totals
}

/// Per-category totals over a set of records, in first-seen order.
pub fn category_totals<'a>(
    records: impl IntoIterator<Item = &'a EmissionRecord>,
) -> IndexMap<String, f64> {
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    for record in records {
        *totals.entry(record.category.clone()).or_insert(0.0) += numeric(record.value);
    }
    totals
}
