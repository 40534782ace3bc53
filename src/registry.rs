//! Root registry: virtual path prefix to ordered storage roots.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::root::RootHandle;
use crate::store::{Entries, StoreResult};

/// Prefix to ordered root list. Earlier roots win on name collisions.
pub type RootMap = BTreeMap<String, Vec<RootHandle>>;

/// Immutable view of the registry at one point in time.
///
/// Mutations after the snapshot was taken are not visible through it.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    roots: Arc<RootMap>,
}

impl Snapshot {
    pub fn get(&self, prefix: &str) -> Option<&[RootHandle]> {
        self.roots.get(prefix).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RootHandle])> {
        self.roots.iter().map(|(p, r)| (p.as_str(), r.as_slice()))
    }

    /// Find the longest registered prefix of `path` that has at least one root.
    ///
    /// Prefixes are compared as plain strings, so `/app` is a prefix of `/apple`.
    pub fn longest_match(&self, path: &str) -> Option<(&str, &[RootHandle])> {
        self.iter()
            .filter(|(prefix, roots)| !roots.is_empty() && path.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
    }

    /// Encode the mapping for the persistent store.
    pub fn to_entries(&self) -> StoreResult<Entries> {
        let mut entries = Entries::new();
        for (prefix, roots) in self.roots.iter() {
            entries.insert(prefix.clone(), serde_json::to_value(roots)?);
        }
        Ok(entries)
    }
}

/// Decode persisted entries.
///
/// Values that are not root lists are returned untouched as the second
/// element so they can be written back on the next save.
pub fn decode_entries(entries: Entries) -> (RootMap, Entries) {
    let mut map = RootMap::new();
    let mut skipped = Entries::new();
    for (prefix, value) in entries {
        match serde_json::from_value::<Vec<RootHandle>>(value.clone()) {
            Ok(roots) => {
                map.insert(prefix, roots);
            }
            Err(e) => {
                warn!("Skipping persisted entry {:?}: {}", prefix, e);
                skipped.insert(prefix, value);
            }
        }
    }
    (map, skipped)
}

/// Shared, explicitly owned registry handle.
///
/// Writers swap in a new map under the write lock, so readers holding a
/// [`Snapshot`] never observe a partially applied mutation.
#[derive(Debug, Clone, Default)]
pub struct RootRegistry {
    current: Arc<RwLock<Arc<RootMap>>>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the root list for `prefix`, keeping the given order.
    pub async fn set(&self, prefix: impl Into<String>, roots: Vec<RootHandle>) {
        let mut current = self.current.write().await;
        Arc::make_mut(&mut current).insert(prefix.into(), roots);
    }

    /// Remove every prefix.
    pub async fn clear(&self) {
        *self.current.write().await = Arc::new(RootMap::new());
    }

    /// Replace the whole mapping.
    pub async fn replace(&self, roots: RootMap) {
        *self.current.write().await = Arc::new(roots);
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            roots: self.current.read().await.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn local(path: &str) -> RootHandle {
        RootHandle::local(path)
    }

    #[tokio::test]
    async fn test_set_preserves_order_and_replaces() {
        let registry = RootRegistry::new();
        registry.set("/app/", vec![local("/one"), local("/two")]).await;
        registry.set("/app/", vec![local("/three"), local("/one")]).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("/app/").unwrap(),
            &[local("/three"), local("/one")]
        );
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = RootRegistry::new();
        registry.set("/a/", vec![local("/a")]).await;
        registry.set("/b/", vec![local("/b")]).await;
        registry.clear().await;

        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_writes() {
        let registry = RootRegistry::new();
        registry.set("/a/", vec![local("/a")]).await;

        let before = registry.snapshot().await;
        registry.set("/b/", vec![local("/b")]).await;
        registry.clear().await;

        assert_eq!(before.len(), 1);
        assert!(before.get("/a/").is_some());
    }

    #[tokio::test]
    async fn test_longest_match_wins() {
        let registry = RootRegistry::new();
        registry.set("/a/", vec![local("/short")]).await;
        registry.set("/a/b/", vec![local("/long")]).await;

        let snapshot = registry.snapshot().await;
        let (prefix, roots) = snapshot.longest_match("/a/b/c").unwrap();
        assert_eq!(prefix, "/a/b/");
        assert_eq!(roots, &[local("/long")]);

        let (prefix, _) = snapshot.longest_match("/a/x").unwrap();
        assert_eq!(prefix, "/a/");
        assert!(snapshot.longest_match("/other").is_none());
    }

    #[tokio::test]
    async fn test_prefix_match_is_literal() {
        let registry = RootRegistry::new();
        registry.set("/app", vec![local("/app")]).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.longest_match("/apple.txt").unwrap().0, "/app");
    }

    #[tokio::test]
    async fn test_empty_root_list_never_matches() {
        let registry = RootRegistry::new();
        registry.set("/a/", vec![local("/a")]).await;
        registry.set("/a/b/", vec![]).await;
        registry.set("/empty/", vec![]).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.longest_match("/a/b/c").unwrap().0, "/a/");
        assert!(snapshot.longest_match("/empty/x").is_none());
    }

    #[tokio::test]
    async fn test_entries_round_trip_through_decode() {
        let registry = RootRegistry::new();
        registry.set("/a/", vec![local("/one"), local("/two")]).await;

        let entries = registry.snapshot().await.to_entries().unwrap();
        assert_eq!(
            entries["/a/"],
            json!([{"type": "local", "path": "/one"}, {"type": "local", "path": "/two"}])
        );

        let (decoded, skipped) = decode_entries(entries);
        assert_eq!(decoded["/a/"], vec![local("/one"), local("/two")]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_decode_skips_invalid_entries() {
        let mut entries = Entries::new();
        entries.insert("/good/".to_string(), json!([{"type": "local", "path": "/g"}]));
        entries.insert("/bad/".to_string(), json!("not a list"));

        let (decoded, skipped) = decode_entries(entries);
        assert_eq!(decoded.len(), 1);
        assert!(decoded.contains_key("/good/"));
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped["/bad/"], json!("not a list"));
    }

    #[test]
    fn test_decode_keeps_unknown_handle_types_verbatim() {
        let mut entries = Entries::new();
        entries.insert("/future/".to_string(), json!([{"type": "opfs", "id": 7}]));

        let (decoded, skipped) = decode_entries(entries);
        assert!(decoded.is_empty());
        assert_eq!(skipped["/future/"], json!([{"type": "opfs", "id": 7}]));
    }
}
