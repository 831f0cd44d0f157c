use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category label applied when a source row carries no category.
pub const UNCATEGORIZED: &str = "Non catégorisé";

/// A single corporate emission entry. Immutable once persisted; `id` is
/// assigned by the store at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub id: Option<Uuid>,
    #[serde(rename = "company_name")]
    pub company: String,
    pub scope: u8,
    pub category: String,
    pub value: f64,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

/// Composite key used to merge duplicate emission entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub company: String,
    pub scope: u8,
    pub category: String,
}

impl AggregationKey {
    pub fn of(record: &EmissionRecord) -> Self {
        Self {
            company: record.company.clone(),
            scope: record.scope,
            category: record.category.clone(),
        }
    }
}
