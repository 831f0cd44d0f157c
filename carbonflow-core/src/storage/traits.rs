use crate::common::error::Result;
use crate::domain::EmissionRecord;
use async_trait::async_trait;

/// Storage boundary for emission records. The rest of the system only relies
/// on these three operations and read-after-write visibility.
#[async_trait]
pub trait EmissionStore: Send + Sync {
    /// Insert a batch of records, assigning each one its persisted id.
    async fn insert_records(&self, records: &mut [EmissionRecord]) -> Result<()>;

    /// All stored records, ordered by company name.
    async fn all_records(&self) -> Result<Vec<EmissionRecord>>;

    /// Remove every stored record, returning how many were deleted.
    async fn delete_all(&self) -> Result<usize>;
}
