//! In-memory store implementation.
//!
//! This module provides [`MemoryStore`], a purely volatile implementation of
//! [`KeyValueStore`] backed by a sharded concurrent hash map.
//!
//! # Features
//!
//! - **Thread-safe**: [`DashMap`] shards the key space; writers lock only
//!   the target key's shard, readers proceed through the others untouched
//! - **Content-equal keys**: [`Bytes`] keys compare and hash by their full
//!   byte content, never by pointer identity
//! - **Immediate reclamation**: overwritten and deleted entries are removed
//!   from the backing map at once, so [`compact`](KeyValueStore::compact)
//!   has nothing to do
//!
//! # Example
//!
//! ```
//! use dedup_store::{KeyValueStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new("clicks__4");
//!
//!     store.put(b"pk:9".to_vec(), b"seg0/row12".to_vec()).await;
//!     let value = store.get(b"pk:9").await;
//!
//!     assert_eq!(value.unwrap().as_ref(), b"seg0/row12");
//! }
//! ```
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | get | expected O(1) |
//! | put | expected O(1) |
//! | delete | expected O(1) |
//! | put_batch | expected O(n) over the batch |
//!
//! Worst case (adversarial colliding keys) degrades to the shard's
//! collision-chain cost. The default hasher distributes over the full byte
//! range of the key.
//!
//! # Limitations
//!
//! - Data is not persisted; all tracked state is lost when the instance is
//!   dropped
//! - The segment label is retained for diagnostics only; nothing is
//!   namespaced by it

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::{
    error::CompactResult,
    store::KeyValueStore,
    types::{KeyValue, SegmentLabel},
};

/// Volatile key-value store over a sharded concurrent hash map.
///
/// This is the reference implementation of [`KeyValueStore`]: suitable for
/// dedup partitions whose tracked state fits in memory and does not need to
/// survive restarts.
///
/// # Cloning
///
/// `MemoryStore` is cheaply cloneable via [`Arc`]. All clones share the same
/// underlying map, so a clone handed to another task observes the same
/// tracked state.
#[derive(Clone)]
pub struct MemoryStore {
    label: SegmentLabel,
    data: Arc<DashMap<Bytes, Bytes>>,
}

impl MemoryStore {
    /// Creates an empty store for the given partition/segment label.
    ///
    /// The label is opaque to this implementation; it appears in log output
    /// and [`Debug`](std::fmt::Debug) formatting but is otherwise ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use dedup_store::MemoryStore;
    ///
    /// let store = MemoryStore::new("orders__0");
    /// assert_eq!(store.label().to_string(), "orders__0");
    /// ```
    pub fn new(label: impl Into<SegmentLabel>) -> Self {
        Self { label: label.into(), data: Arc::new(DashMap::new()) }
    }

    /// Creates an empty store with pre-allocated capacity.
    ///
    /// Useful when the expected number of tracked primary keys is known,
    /// e.g. from a previous run of the same partition.
    pub fn with_capacity(label: impl Into<SegmentLabel>, capacity: usize) -> Self {
        Self { label: label.into(), data: Arc::new(DashMap::with_capacity(capacity)) }
    }

    /// Returns the partition/segment label supplied at construction.
    #[must_use]
    pub fn label(&self) -> &SegmentLabel {
        &self.label
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &[u8]) -> Option<Bytes> {
        // Bytes hashes and compares as a byte slice, so lookup by &[u8]
        // reaches the entry regardless of which allocation stored the key.
        self.data.get(key).map(|entry| entry.value().clone())
    }

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) {
        self.data.insert(Bytes::from(key), Bytes::from(value));
    }

    async fn delete(&self, key: &[u8]) {
        self.data.remove(key);
    }

    async fn put_batch(&self, pairs: Vec<KeyValue>) {
        // Sequence order: a later pair for the same key overwrites an
        // earlier one, matching single-put-at-a-time semantics.
        for pair in pairs {
            self.data.insert(pair.key, pair.value);
        }
    }

    async fn key_count(&self) -> u64 {
        // Sums per-shard lengths without a global lock; advisory under
        // concurrent mutation.
        self.data.len() as u64
    }

    async fn compact(&self) -> CompactResult<()> {
        // Overwritten and deleted entries leave the map immediately, so
        // there is no garbage to reclaim.
        debug!(segment = %self.label, "compact requested; nothing to reclaim");
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("label", &self.label)
            .field("key_count", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = MemoryStore::new("t");

        store.put(b"key1".to_vec(), b"value1".to_vec()).await;
        let value = store.get(b"key1").await;
        assert_eq!(value, Some(Bytes::from("value1")));

        store.delete(b"key1").await;
        let value = store.get(b"key1").await;
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn get_matches_by_content_not_identity() {
        let store = MemoryStore::new("t");

        // Store through one allocation, look up through another.
        let stored_key: Vec<u8> = vec![1, 2, 3];
        store.put(stored_key, b"x".to_vec()).await;

        let probe_key: Vec<u8> = vec![1, 2, 3];
        let value = store.get(&probe_key).await;
        assert_eq!(value, Some(Bytes::from_static(b"x")));
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = MemoryStore::new("t");

        store.put(b"k".to_vec(), b"old".to_vec()).await;
        store.put(b"k".to_vec(), b"new".to_vec()).await;

        assert_eq!(store.get(b"k").await, Some(Bytes::from("new")));
        assert_eq!(store.key_count().await, 1);
    }

    #[tokio::test]
    async fn delete_missing_key_is_noop() {
        let store = MemoryStore::new("t");
        store.delete(b"ghost").await;
        store.delete(b"ghost").await;
        assert_eq!(store.key_count().await, 0);
    }

    #[tokio::test]
    async fn empty_value_is_distinct_from_absent() {
        let store = MemoryStore::new("t");
        store.put(b"k".to_vec(), Vec::new()).await;
        assert_eq!(store.get(b"k").await, Some(Bytes::new()));
    }

    #[tokio::test]
    async fn put_batch_duplicate_key_last_wins() {
        let store = MemoryStore::new("t");

        store
            .put_batch(vec![
                KeyValue::new(Bytes::from_static(b"k"), Bytes::from_static(b"v1")),
                KeyValue::new(Bytes::from_static(b"other"), Bytes::from_static(b"o")),
                KeyValue::new(Bytes::from_static(b"k"), Bytes::from_static(b"v2")),
            ])
            .await;

        assert_eq!(store.get(b"k").await, Some(Bytes::from("v2")));
        assert_eq!(store.key_count().await, 2);
    }

    #[tokio::test]
    async fn key_count_tracks_live_keys() {
        let store = MemoryStore::new("t");

        store.put(b"k1".to_vec(), b"v1".to_vec()).await;
        store.put(b"k2".to_vec(), b"v2".to_vec()).await;
        store.delete(b"k1").await;

        assert_eq!(store.key_count().await, 1);
    }

    #[tokio::test]
    async fn compact_never_fails_or_changes_contents() {
        let store = MemoryStore::new("t");
        store.put(b"k".to_vec(), b"v".to_vec()).await;

        store.compact().await.expect("in-memory compact cannot fail");

        assert_eq!(store.get(b"k").await, Some(Bytes::from("v")));
        assert_eq!(store.key_count().await, 1);
    }

    #[tokio::test]
    async fn clone_shares_data() {
        let store1 = MemoryStore::new("t");
        let store2 = store1.clone();

        store1.put(b"k".to_vec(), b"v".to_vec()).await;

        assert_eq!(store2.get(b"k").await, Some(Bytes::from("v")));
    }

    #[tokio::test]
    async fn debug_reports_label_and_count() {
        let store = MemoryStore::new("orders__7");
        store.put(b"k".to_vec(), b"v".to_vec()).await;

        let rendered = format!("{store:?}");
        assert!(rendered.contains("orders__7"));
        assert!(rendered.contains("key_count"));
    }

    mod proptests {
        use std::collections::HashMap;

        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Put(u8, u8),
            Delete(u8),
        }

        /// Small key universe so puts, overwrites, and deletes collide often.
        fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
            proptest::collection::vec(
                prop_oneof![
                    (0u8..8, any::<u8>()).prop_map(|(k, v)| Op::Put(k, v)),
                    (0u8..8).prop_map(Op::Delete),
                ],
                0..64,
            )
        }

        proptest! {
            /// An arbitrary interleaving of put/delete matches a HashMap
            /// model for both lookups and key counts.
            #[test]
            fn store_matches_hashmap_model(ops in arb_ops()) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let store = MemoryStore::new("model");
                    let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();

                    for op in &ops {
                        match op {
                            Op::Put(k, v) => {
                                let key = vec![*k];
                                let value = vec![*v];
                                store.put(key.clone(), value.clone()).await;
                                model.insert(key, value);
                            }
                            Op::Delete(k) => {
                                let key = vec![*k];
                                store.delete(&key).await;
                                model.remove(&key);
                            }
                        }
                    }

                    prop_assert_eq!(store.key_count().await, model.len() as u64);
                    for k in 0u8..8 {
                        let key = vec![k];
                        let got = store.get(&key).await.map(|b| b.to_vec());
                        prop_assert_eq!(got, model.get(&key).cloned());
                    }

                    Ok(())
                })?;
            }
        }
    }
}
