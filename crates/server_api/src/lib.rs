use shared::{
    domain::{sort_records, Column, Record, SortDirection},
    error::ApiError,
};
use storage::Storage;
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_records(ctx: &ApiContext) -> Result<Vec<Record>, ApiError> {
    Ok(ctx.storage.list_records().await)
}

/// Server-side sort. `direction` follows the URL convention where anything
/// other than `asc` is descending.
pub async fn sorted_records(
    ctx: &ApiContext,
    column: &str,
    direction: &str,
) -> Result<Vec<Record>, ApiError> {
    let column: Column = column.parse()?;
    let direction = SortDirection::from_segment(direction);
    let mut records = ctx.storage.list_records().await;
    sort_records(&mut records, column, direction);
    debug!(%column, %direction, rows = records.len(), "sorted records");
    Ok(records)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
