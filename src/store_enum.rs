//! Unified store enum for runtime backend selection.
//!
//! This module provides the [`Store`] enum, a unified type that can represent
//! any available [`KeyValueStore`] implementation. The ingestion engine picks
//! the backing implementation at construction time (e.g. from configuration)
//! while call sites keep static dispatch.
//!
//! # Available Backends
//!
//! | Variant | Use Case |
//! |---------|----------|
//! | [`Store::Memory`] | Volatile dedup tracking; state fits in memory |
//!
//! # Usage
//!
//! ```
//! use dedup_store::{KeyValueStore, Store};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = Store::memory("orders__0");
//!
//! store.put(b"pk".to_vec(), b"seg1/doc4".to_vec()).await;
//! let value = store.get(b"pk").await;
//! assert!(value.is_some());
//! # });
//! ```
//!
//! # Extending with Additional Backends
//!
//! A crate providing a persistent implementation can wrap this enum with its
//! own, adding variants for its backends:
//!
//! ```ignore
//! pub enum Store {
//!     Memory(dedup_store::MemoryStore),
//!     OffHeap(my_offheap_store::OffHeapStore),
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    error::CompactResult,
    memory::MemoryStore,
    store::KeyValueStore,
    types::{KeyValue, SegmentLabel},
};

/// Unified key-value store enum.
///
/// Wraps the available backing implementations, enabling runtime selection
/// while keeping type safety. Use this when the choice of implementation is
/// made at construction time, e.g. from table configuration.
#[derive(Clone)]
pub enum Store {
    /// In-memory store for volatile dedup tracking.
    Memory(MemoryStore),
}

impl Store {
    /// Creates a new in-memory store for the given partition/segment label.
    #[must_use]
    pub fn memory(label: impl Into<SegmentLabel>) -> Self {
        Self::Memory(MemoryStore::new(label))
    }

    /// Returns true if this is an in-memory store.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }

    /// Returns the partition/segment label this store was constructed with.
    #[must_use]
    pub fn label(&self) -> &SegmentLabel {
        match self {
            Self::Memory(s) => s.label(),
        }
    }
}

#[async_trait]
impl KeyValueStore for Store {
    async fn get(&self, key: &[u8]) -> Option<Bytes> {
        match self {
            Self::Memory(s) => s.get(key).await,
        }
    }

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) {
        match self {
            Self::Memory(s) => s.put(key, value).await,
        }
    }

    async fn delete(&self, key: &[u8]) {
        match self {
            Self::Memory(s) => s.delete(key).await,
        }
    }

    async fn put_batch(&self, pairs: Vec<KeyValue>) {
        match self {
            Self::Memory(s) => s.put_batch(pairs).await,
        }
    }

    async fn key_count(&self) -> u64 {
        match self {
            Self::Memory(s) => s.key_count().await,
        }
    }

    async fn compact(&self) -> CompactResult<()> {
        match self {
            Self::Memory(s) => s.compact().await,
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory(s) => write!(f, "Store::Memory({})", s.label()),
        }
    }
}
