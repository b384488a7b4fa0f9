//! Batched write accumulation for key-value stores.
//!
//! This module provides a generic [`BatchWriter`] that accumulates put and
//! delete operations and flushes them through the
//! [`KeyValueStore`](crate::KeyValueStore) contract in size-bounded
//! sub-batches. Runs of consecutive puts are forwarded through
//! [`put_batch`](crate::KeyValueStore::put_batch); deletes are applied
//! individually in sequence, so mixed-order semantics match applying each
//! operation one at a time.
//!
//! # Examples
//!
//! ```
//! use dedup_store::{MemoryStore, batch::{BatchWriter, BatchConfig}};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = MemoryStore::new("orders__0");
//! let mut writer = BatchWriter::new(store, BatchConfig::default());
//!
//! // Accumulate operations
//! writer.put(b"key1".to_vec(), b"value1".to_vec());
//! writer.put(b"key2".to_vec(), b"value2".to_vec());
//! writer.delete(b"stale_key".to_vec());
//!
//! // Flush all at once
//! let stats = writer.flush_all().await;
//! assert_eq!(stats.operations_count, 3);
//! # });
//! ```
//!
//! # Why split batches
//!
//! The contract guarantees per-pair atomicity but not cross-pair atomicity,
//! so a persistent implementation is free to bound the work it does per
//! `put_batch` call. Splitting here keeps any single call's footprint under
//! the configured operation and byte limits regardless of the backing store.

use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::{error::ConfigError, store::KeyValueStore, types::KeyValue};

/// Default maximum number of operations per sub-batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Default maximum byte size per sub-batch (8 MiB).
pub const DEFAULT_MAX_BATCH_BYTES: usize = 8 * 1024 * 1024;

/// Configuration for batched writes.
///
/// # Validation
///
/// - `max_batch_size` must be `>= 1`
/// - `max_batch_bytes` must be `>= 1`
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of operations per sub-batch.
    pub(crate) max_batch_size: usize,
    /// Maximum byte size per sub-batch.
    pub(crate) max_batch_bytes: usize,
    /// Enable batching (can be disabled for testing).
    pub(crate) enabled: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            enabled: true,
        }
    }
}

#[bon::bon]
impl BatchConfig {
    /// Creates a new batch configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_batch_size` or `max_batch_bytes` is zero.
    #[builder]
    pub fn new(
        #[builder(default = DEFAULT_MAX_BATCH_SIZE)] max_batch_size: usize,
        #[builder(default = DEFAULT_MAX_BATCH_BYTES)] max_batch_bytes: usize,
        #[builder(default = true)] enabled: bool,
    ) -> Result<Self, ConfigError> {
        if max_batch_size == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_batch_size",
                min: "1".into(),
                value: "0".into(),
            });
        }
        if max_batch_bytes == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_batch_bytes",
                min: "1".into(),
                value: "0".into(),
            });
        }
        Ok(Self { max_batch_size, max_batch_bytes, enabled })
    }

    /// Creates a batch config with batching disabled.
    ///
    /// When disabled, [`should_flush`](BatchWriter::should_flush) returns
    /// `true` whenever there are pending operations.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            enabled: false,
        }
    }

    /// Returns the maximum number of operations per sub-batch.
    #[must_use]
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Returns the maximum byte size per sub-batch.
    #[must_use]
    pub fn max_batch_bytes(&self) -> usize {
        self.max_batch_bytes
    }

    /// Returns whether batching is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Single write operation in a batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Stores a key-value pair. Overwrites any existing value for the key.
    Put(KeyValue),
    /// Removes a key and its tracked value. No-op if the key is absent.
    Delete {
        /// The key to remove.
        key: Bytes,
    },
}

impl BatchOperation {
    /// Calculates the size of this operation in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        match self {
            BatchOperation::Put(pair) => pair.key.len() + pair.value.len(),
            BatchOperation::Delete { key } => key.len(),
        }
    }

    /// Returns the key associated with this operation.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOperation::Put(pair) => &pair.key,
            BatchOperation::Delete { key } => key,
        }
    }
}

/// Statistics from a batch flush.
#[derive(Debug, Clone, Default)]
pub struct BatchFlushStats {
    /// Number of operations flushed.
    pub operations_count: usize,
    /// Number of put operations flushed.
    pub puts_count: usize,
    /// Number of delete operations flushed.
    pub deletes_count: usize,
    /// Number of sub-batches created (due to size limits).
    pub batches_count: usize,
    /// Total bytes written.
    pub total_bytes: usize,
    /// Time taken to flush.
    pub duration: Duration,
}

/// Accumulates write operations and flushes them in size-bounded batches.
///
/// Because every write operation of the store contract is total, flushing
/// cannot fail; [`flush_all`](Self::flush_all) returns statistics rather
/// than a `Result`.
pub struct BatchWriter<S: KeyValueStore> {
    store: S,
    operations: Vec<BatchOperation>,
    current_size_bytes: usize,
    config: BatchConfig,
}

impl<S: KeyValueStore> BatchWriter<S> {
    /// Creates a new batch writer over the given store.
    ///
    /// The writer accumulates operations until
    /// [`flush_all`](Self::flush_all) is called.
    #[must_use]
    pub fn new(store: S, config: BatchConfig) -> Self {
        Self { store, operations: Vec::new(), current_size_bytes: 0, config }
    }

    /// Adds a put operation to the batch.
    pub fn put(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        let op = BatchOperation::Put(KeyValue::new(key, value));
        self.current_size_bytes += op.size_bytes();
        self.operations.push(op);
    }

    /// Adds a delete operation to the batch.
    pub fn delete(&mut self, key: impl Into<Bytes>) {
        let op = BatchOperation::Delete { key: key.into() };
        self.current_size_bytes += op.size_bytes();
        self.operations.push(op);
    }

    /// Returns the number of pending operations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.operations.len()
    }

    /// Returns the size of pending operations in bytes.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.current_size_bytes
    }

    /// Returns whether the batch should be flushed based on configured limits.
    #[must_use]
    pub fn should_flush(&self) -> bool {
        if !self.config.enabled {
            return !self.operations.is_empty();
        }
        self.operations.len() >= self.config.max_batch_size
            || self.current_size_bytes >= self.config.max_batch_bytes
    }

    /// Returns the pending operations.
    #[must_use]
    pub fn pending_operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    /// Flushes all pending operations to the store.
    ///
    /// Operations are applied in the order they were added. Consecutive puts
    /// within a sub-batch are forwarded as one
    /// [`put_batch`](KeyValueStore::put_batch) call; a delete closes the
    /// current run before being applied, preserving sequence semantics for
    /// keys that are both written and deleted.
    pub async fn flush_all(&mut self) -> BatchFlushStats {
        let started = Instant::now();
        let operations = std::mem::take(&mut self.operations);
        self.current_size_bytes = 0;

        let mut stats = BatchFlushStats { operations_count: operations.len(), ..Default::default() };
        if operations.is_empty() {
            return stats;
        }

        let (max_ops, max_bytes) = if self.config.enabled {
            (self.config.max_batch_size, self.config.max_batch_bytes)
        } else {
            (usize::MAX, usize::MAX)
        };

        let mut sub_batch: Vec<BatchOperation> = Vec::new();
        let mut sub_bytes = 0usize;
        for op in operations {
            let op_size = op.size_bytes();
            // An operation that alone exceeds max_bytes still ships; the
            // limit bounds grouping, it does not reject writes.
            if !sub_batch.is_empty()
                && (sub_batch.len() >= max_ops || sub_bytes + op_size > max_bytes)
            {
                self.apply_sub_batch(std::mem::take(&mut sub_batch), &mut stats).await;
                sub_bytes = 0;
            }
            sub_bytes += op_size;
            stats.total_bytes += op_size;
            sub_batch.push(op);
        }
        if !sub_batch.is_empty() {
            self.apply_sub_batch(sub_batch, &mut stats).await;
        }

        stats.duration = started.elapsed();
        debug!(
            operations = stats.operations_count,
            batches = stats.batches_count,
            bytes = stats.total_bytes,
            "flushed batch writer"
        );
        stats
    }

    /// Applies one size-bounded sub-batch, coalescing consecutive puts.
    async fn apply_sub_batch(&self, ops: Vec<BatchOperation>, stats: &mut BatchFlushStats) {
        stats.batches_count += 1;
        trace!(operations = ops.len(), "applying sub-batch");

        let mut put_run: Vec<KeyValue> = Vec::new();
        for op in ops {
            match op {
                BatchOperation::Put(pair) => {
                    stats.puts_count += 1;
                    put_run.push(pair);
                }
                BatchOperation::Delete { key } => {
                    stats.deletes_count += 1;
                    if !put_run.is_empty() {
                        self.store.put_batch(std::mem::take(&mut put_run)).await;
                    }
                    self.store.delete(&key).await;
                }
            }
        }
        if !put_run.is_empty() {
            self.store.put_batch(put_run).await;
        }
    }
}
