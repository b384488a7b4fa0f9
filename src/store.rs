//! Key-value store trait definition.
//!
//! This module defines the [`KeyValueStore`] trait, the core abstraction the
//! deduplication engine programs against. All backing implementations
//! (in-memory, persistent/off-heap, etc.) implement this trait, so the engine
//! can swap implementations without code changes.
//!
//! # Design Philosophy
//!
//! The trait provides a minimal key-value interface for dedup tracking:
//! - **Keys and values are bytes**: No assumptions about serialization format.
//!   Keys compare by content, never by identity.
//! - **Async by default**: Persistent backends may block on I/O; the in-memory
//!   backend completes every operation in bounded local time.
//! - **Total operations**: `get`, `put`, `delete`, `put_batch`, and
//!   `key_count` cannot fail for well-formed input. Only [`compact`] carries
//!   an error channel, and its failure is recoverable.
//!
//! What counts as a duplicate, and when to consult the store, is the
//! ingestion engine's decision and lives above this trait.
//!
//! # Implementing a Backend
//!
//! To implement a new backing store:
//!
//! 1. Implement the [`KeyValueStore`] trait.
//! 2. Map backend-specific compaction failures to
//!    [`CompactError`](crate::error::CompactError).
//! 3. Run the [`conformance`](crate::conformance) suite against it.
//!
//! See [`MemoryStore`](crate::MemoryStore) for a reference implementation.
//!
//! [`compact`]: KeyValueStore::compact

use async_trait::async_trait;
use bytes::Bytes;

use crate::{error::CompactResult, types::KeyValue};

/// Abstract key-value store tracking the most recently seen value per key.
///
/// Implementations are thread-safe (`Send + Sync`) and support concurrent
/// operations from multiple callers on the same instance. Operations on the
/// same key are linearizable; operations on different keys are unordered
/// relative to each other.
///
/// # Key Operations
///
/// | Method | Description | Fallible |
/// |--------|-------------|----------|
/// | [`get`](KeyValueStore::get) | Look up the tracked value for a key | no |
/// | [`put`](KeyValueStore::put) | Insert or replace the value for a key | no |
/// | [`delete`](KeyValueStore::delete) | Forget a key's tracked state | no |
/// | [`put_batch`](KeyValueStore::put_batch) | Apply a sequence of insert-or-replace pairs | no |
/// | [`key_count`](KeyValueStore::key_count) | Number of distinct keys present | no |
/// | [`compact`](KeyValueStore::compact) | Reclaim space held by stale entries | yes |
///
/// No compare-and-swap primitive is exposed: a caller must not assume
/// exclusive ownership of a key between a `get` and a subsequent `put`.
/// Any read-modify-write coordination belongs to the caller.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use dedup_store::{KeyValueStore, MemoryStore};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let store = MemoryStore::new("orders__0");
///
/// store.put(b"pk:42".to_vec(), b"seg3/doc17".to_vec()).await;
/// let seen = store.get(b"pk:42").await;
/// assert_eq!(seen, Some(Bytes::from("seg3/doc17")));
/// # });
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Looks up the value currently associated with `key`.
    ///
    /// Returns `None` when the key is absent — distinct from a present key
    /// holding a zero-length value. Has no side effects and is safe to call
    /// concurrently with any other operation on the same key.
    async fn get(&self, key: &[u8]) -> Option<Bytes>;

    /// Inserts or replaces the value associated with `key`.
    ///
    /// Unconditional overwrite: no read-modify-write race protection is
    /// offered beyond atomicity of the single write. A concurrent reader
    /// observes either the pre- or post-state, never a torn value.
    async fn put(&self, key: Vec<u8>, value: Vec<u8>);

    /// Removes the association for `key` if present.
    ///
    /// A no-op when the key is absent; never fails for a missing key.
    async fn delete(&self, key: &[u8]);

    /// Applies a sequence of insert-or-replace operations.
    ///
    /// Each pair is applied with the same per-key atomicity as
    /// [`put`](KeyValueStore::put). Cross-pair atomicity is **not**
    /// guaranteed: implementations may interleave batch application with
    /// other callers' single operations. When the batch contains duplicate
    /// keys, the result is as if the pairs were applied one at a time in
    /// sequence order — the last write for a key wins.
    async fn put_batch(&self, pairs: Vec<KeyValue>);

    /// Returns the number of distinct keys currently present.
    ///
    /// Advisory under concurrent mutation: the value reflects some
    /// consistent state at or near the call time but is not atomic with
    /// respect to concurrent `put`/`delete`/`put_batch` calls. Intended for
    /// diagnostics and sizing, never for correctness decisions.
    async fn key_count(&self) -> u64;

    /// Gives the implementation an opportunity to reclaim space occupied by
    /// stale, overwritten, or deleted entries.
    ///
    /// Relevant to log-structured or copy-on-write backing stores; a pure
    /// in-memory hash-based implementation has no reclaimable garbage and
    /// returns `Ok(())` without doing anything. Compaction never changes the
    /// result of any subsequent `get` or `key_count` call.
    ///
    /// # Errors
    ///
    /// Implementations whose compaction performs I/O may fail with
    /// [`CompactError`](crate::error::CompactError). Failure is non-fatal to
    /// correctness — tracked state remains valid, only space reclamation is
    /// deferred — so callers may retry later or ignore the error.
    #[must_use = "compaction may fail and the error should be inspected or deliberately ignored"]
    async fn compact(&self) -> CompactResult<()>;
}
