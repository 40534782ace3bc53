//! Persistent map store trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::StoreResult;

/// Stored map contents: key to schema-less value.
pub type Entries = BTreeMap<String, serde_json::Value>;

/// Asynchronous key/value store holding one whole map.
///
/// The store does not interpret values. Writers are expected to be serialized
/// by the caller; the store provides no locking of its own.
#[async_trait]
pub trait MapStore: Send + Sync {
    /// Replace the stored map with `entries`.
    async fn save(&self, entries: &Entries) -> StoreResult<()>;

    /// Load the stored map. A store that was never written loads as empty.
    async fn load(&self) -> StoreResult<Entries>;
}
