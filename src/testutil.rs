//! Shared test utilities for key-value store testing.
//!
//! This module provides common helpers for generating test data and creating
//! pre-populated stores. It backs the crate's own tests and is available to
//! backend authors running the [`conformance`](crate::conformance) suite.

use crate::{memory::MemoryStore, store::KeyValueStore};

/// Create a deterministic test key from a prefix and index.
///
/// Produces keys like `"prefix:000042"` (zero-padded to 6 digits) encoded
/// as UTF-8 bytes. Zero-padding keeps keys visually aligned in failure
/// output when tests iterate over ranges of indices.
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> Vec<u8> {
    format!("{prefix}:{idx:06}").into_bytes()
}

/// Create a test value of the given size filled with `0xAB` bytes.
///
/// Useful for tests that need values of specific sizes without caring
/// about the content.
#[must_use]
pub fn make_value(size: usize) -> Vec<u8> {
    vec![0xAB; size]
}

/// Create a test value tagged with a task ID and sequence number.
///
/// Produces values like `"task3-val042"` encoded as UTF-8 bytes. Useful for
/// concurrent tests where you need to identify which task wrote which value.
#[must_use]
pub fn make_tagged_value(task: usize, seq: usize) -> Vec<u8> {
    format!("task{task}-val{seq}").into_bytes()
}

/// Create a [`MemoryStore`] pre-populated with `count` keys.
///
/// Keys are formatted as `"{prefix}:{idx:06}"` with values of `value_size`
/// bytes each. The store is ready for immediate use in tests.
pub async fn populated_store(prefix: &str, count: usize, value_size: usize) -> MemoryStore {
    let store = MemoryStore::new(format!("test-{prefix}"));
    let value = make_value(value_size);
    for i in 0..count {
        store.put(make_key(prefix, i), value.clone()).await;
    }
    store
}
