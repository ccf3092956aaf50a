use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Every go-link, keyed by request path (always starting with `/`).
pub type LinkTable = HashMap<String, String>;

/// Thread-safe in-memory table mapping link path -> destination.
///
/// Lookups take the lock in shared mode and may run in parallel; mutations
/// take it exclusively. The handle is cheap to clone and every clone refers
/// to the same table.
#[derive(Clone, Debug, Default)]
pub struct LinkStore {
    inner: Arc<RwLock<LinkTable>>,
}

impl LinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a link path. Returns a clone of the destination if present.
    pub async fn lookup(&self, path: &str) -> Option<String> {
        self.inner.read().await.get(path).cloned()
    }

    /// Insert or overwrite a mapping.
    pub async fn upsert(&self, path: impl Into<String>, destination: impl Into<String>) {
        let mut table = self.inner.write().await;
        table.insert(path.into(), destination.into());
    }

    /// Remove a mapping. Returns `false` if there was nothing to remove.
    pub async fn delete(&self, path: &str) -> bool {
        self.inner.write().await.remove(path).is_some()
    }

    /// Swap in a whole table, discarding whatever was held before.
    pub async fn replace(&self, table: LinkTable) {
        *self.inner.write().await = table;
    }

    /// Serialize the table as a flat JSON object under a shared lock.
    pub async fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let table = self.inner.read().await;
        serde_json::to_vec(&*table)
    }

    /// Number of links currently held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Turn a raw `key` query parameter into the path it is stored under.
///
/// No normalization beyond the leading slash: `"/docs"` becomes `"//docs"`.
pub fn link_key(raw: &str) -> String {
    format!("/{raw}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_then_lookup() {
        let store = LinkStore::new();
        assert!(store.is_empty().await);

        store.upsert("/docs", "https://example.com/docs").await;
        assert_eq!(
            store.lookup("/docs").await.as_deref(),
            Some("https://example.com/docs")
        );
        assert_eq!(store.lookup("/other").await, None);

        store.upsert("/docs", "https://example.org").await;
        assert_eq!(
            store.lookup("/docs").await.as_deref(),
            Some("https://example.org")
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = LinkStore::new();
        store.upsert("/a", "x").await;

        assert!(store.delete("/a").await);
        assert!(!store.delete("/a").await);
        assert!(!store.delete("/never").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_the_table() {
        let store = LinkStore::new();
        let other = store.clone();
        other.upsert("/shared", "y").await;
        assert_eq!(store.lookup("/shared").await.as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn replace_discards_previous_entries() {
        let store = LinkStore::new();
        store.upsert("/old", "x").await;

        let mut table = LinkTable::new();
        table.insert("/new".into(), "y".into());
        store.replace(table).await;

        assert_eq!(store.lookup("/old").await, None);
        assert_eq!(store.lookup("/new").await.as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn to_json_is_a_flat_object() {
        let store = LinkStore::new();
        store.upsert("/docs", "https://example.com/docs").await;

        let json = store.to_json().await.unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"/docs":"https://example.com/docs"}"#
        );
    }

    #[test]
    fn link_key_prepends_a_single_slash() {
        assert_eq!(link_key("docs"), "/docs");
        assert_eq!(link_key("/docs"), "//docs");
        assert_eq!(link_key("a/b"), "/a/b");
    }
}
