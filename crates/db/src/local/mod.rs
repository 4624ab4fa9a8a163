//! Local durable tier.
//!
//! Records live as JSON arrays under fixed keys of a [`KvStore`]. Each
//! mutation is a single read-modify-write of one key, so a failed write
//! never leaves a partially updated collection behind.

pub mod kv;
pub mod section_store;
pub mod user_store;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tablebuilder_core::types::DbId;

pub use kv::{FileKvStore, KvStore, MemoryKvStore};
pub use section_store::LocalSectionStore;
pub use user_store::LocalUserStore;

use crate::store::StoreError;

pub const SECTIONS_KEY: &str = "tablebuilder.sections";
pub const USERS_KEY: &str = "tablebuilder.users";
/// Backend sessions recorded while the remote tier was unavailable.
pub const AUTH_SESSIONS_KEY: &str = "tablebuilder.auth_sessions";
/// Active API sessions, keyed by token id.
pub const SESSIONS_KEY: &str = "tablebuilder.sessions";

/// Records under `key` that decode as `T`, plus the raw entries that do
/// not. Undecodable entries are logged and kept aside so a later write
/// stores them back unchanged.
fn decode<T: DeserializeOwned>(
    key: &str,
    raw: Option<&str>,
) -> Result<(Vec<T>, Vec<Value>), StoreError> {
    let Some(raw) = raw else {
        return Ok((Vec::new(), Vec::new()));
    };
    let entries: Vec<Value> = serde_json::from_str(raw)
        .map_err(|e| StoreError::Local(format!("Corrupt records under '{key}': {e}")))?;

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match <T as serde::Deserialize>::deserialize(&entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "Skipping unreadable local record");
                skipped.push(entry);
            }
        }
    }
    Ok((records, skipped))
}

/// Read every record stored under `key`. A missing key is an empty list;
/// entries that fail to decode are skipped.
pub fn read_records<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Result<Vec<T>, StoreError> {
    decode(key, kv.get(key)?.as_deref()).map(|(records, _)| records)
}

/// Load the records under `key`, let `change` edit them, and store the
/// result. When `change` fails nothing is written. Entries that fail to
/// decode are not shown to `change` and are written back as they were.
pub fn modify_records<T, R>(
    kv: &dyn KvStore,
    key: &str,
    change: impl FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
) -> Result<R, StoreError>
where
    T: Serialize + DeserializeOwned,
{
    let encode_error =
        |e: serde_json::Error| StoreError::Local(format!("Failed to encode '{key}': {e}"));

    let mut change = Some(change);
    let mut outcome = None;
    kv.modify(key, &mut |current| {
        let (mut records, skipped) = decode::<T>(key, current)?;
        let change = change
            .take()
            .ok_or_else(|| StoreError::Local(format!("Re-entrant update of '{key}'")))?;
        outcome = Some(change(&mut records)?);

        let mut entries = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(encode_error)?;
        entries.extend(skipped);
        serde_json::to_string(&entries).map_err(encode_error)
    })?;
    outcome.ok_or_else(|| StoreError::Local(format!("Update of '{key}' did not run")))
}

/// A new numeric id: the current time in milliseconds, bumped past any
/// existing id so two saves in the same millisecond still differ.
pub fn fresh_id(existing: impl IntoIterator<Item = DbId>) -> DbId {
    let now = Utc::now().timestamp_millis();
    match existing.into_iter().max() {
        Some(max) if max >= now => max + 1,
        _ => now,
    }
}
