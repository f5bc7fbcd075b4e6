//! Manual display ordering for works and thoughts

use std::sync::Arc;

use serde_json::Value;

use crate::data::{Database, SortedCollection};
use crate::error::AppError;

/// Apply a batch of `{id, sort_order}` items one by one
///
/// Items without a string `id` or an integer `sort_order` are skipped;
/// unknown ids are a no-op. The first database error stops the batch and
/// already-applied items stay applied.
///
/// # Returns
/// Number of rows actually updated
///
/// # Errors
/// `InvalidInput` when `items` is not an array
pub async fn apply_sort_order(
    db: &Arc<Database>,
    collection: SortedCollection,
    items: &Value,
) -> Result<usize, AppError> {
    let items = items
        .as_array()
        .ok_or_else(|| AppError::InvalidInput("items must be an array".to_string()))?;

    let mut updated = 0;
    for item in items {
        let id = item.get("id").and_then(Value::as_str);
        let sort_order = item.get("sort_order").and_then(Value::as_i64);
        let (Some(id), Some(sort_order)) = (id, sort_order) else {
            tracing::debug!(%item, "Skipping invalid sort item");
            continue;
        };

        if db.set_sort_order(collection, id, sort_order).await? {
            updated += 1;
        }
    }

    tracing::info!(
        table = collection.table(),
        requested = items.len(),
        updated,
        "Sort order applied"
    );
    Ok(updated)
}
