//! Ordered image lists
//!
//! Merges the references a client wants to keep with newly uploaded
//! files into the list that gets persisted.

use crate::storage::{Upload, UploadRelay};

/// Decide which existing references survive an edit
///
/// `raw` is the JSON-encoded retain field exactly as the client sent it:
/// - absent: keep `existing`
/// - blank or `[]`: explicit clear
/// - a JSON array of strings: the entries also present in `existing`,
///   in the client's order
/// - anything else: keep `existing`
///
/// References never enter a list through this field; they come from the
/// upload relay.
pub fn resolve_retained(existing: &[String], raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return existing.to_vec();
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "[]" {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(retained) => retained
            .into_iter()
            .filter(|reference| {
                let known = existing.contains(reference);
                if !known {
                    tracing::debug!(%reference, "Dropping unknown retained reference");
                }
                known
            })
            .collect(),
        Err(error) => {
            tracing::debug!(%error, "Ignoring malformed retain list");
            existing.to_vec()
        }
    }
}

/// Append new references after the retained ones, then apply the cap
pub fn merge(mut retained: Vec<String>, uploaded: Vec<String>, cap: Option<usize>) -> Vec<String> {
    retained.extend(uploaded);
    if let Some(cap) = cap {
        retained.truncate(cap);
    }
    retained
}

/// Full reconciliation for one repeated image slot
///
/// Uploads that cannot fit under `cap` are never sent to storage.
pub async fn reconcile(
    relay: &UploadRelay,
    slot: &str,
    existing: &[String],
    raw_retained: Option<&str>,
    uploads: Vec<Upload>,
    cap: Option<usize>,
) -> Vec<String> {
    let retained = resolve_retained(existing, raw_retained);
    let room = cap.map(|cap| cap.saturating_sub(retained.len()));
    let uploaded = if room == Some(0) {
        Vec::new()
    } else {
        relay.store_many(slot, uploads, room).await
    };
    merge(retained, uploaded, cap)
}
