use super::tabular::TabularFile;
use crate::error::ApiError;

/// Columns every upload must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["entreprise", "annee", "scope", "categorie", "emissions_co2"];

/// Shape validation for an uploaded file. The empty-file check runs first;
/// the missing-column list preserves required-column order. Extra columns
/// are ignored.
pub fn validate(file: &TabularFile) -> Result<(), ApiError> {
    if file.rows.is_empty() {
        return Err(ApiError::EmptyFile);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !file.headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::MissingColumns(missing));
    }

    Ok(())
}
