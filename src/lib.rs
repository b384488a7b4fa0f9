//! Pluggable local key-value store for stream-ingestion deduplication.
//!
//! This crate provides the [`KeyValueStore`] trait and related types used by
//! a dedup engine to track, per primary key, the most recently seen value
//! (typically a location/version marker). The trait is the seam through
//! which backing implementations plug in, so the engine can swap a volatile
//! store for a persistent one without code changes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Ingestion / Dedup Engine                   │
//! │     (decides what is a duplicate, when to consult us)       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       dedup-store                           │
//! │                   KeyValueStore trait                       │
//! │      (get, put, delete, put_batch, key_count, compact)      │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │  MemoryStore │       persistent / off-heap stores           │
//! │  (volatile)  │          (provided elsewhere)                │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use dedup_store::{KeyValueStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     // One store instance per dedup-tracked partition/segment.
//!     let store = MemoryStore::new("orders__3");
//!
//!     // Record where a primary key was last seen.
//!     store.put(b"pk:1001".to_vec(), b"seg3/doc17".to_vec()).await;
//!
//!     // Check whether a primary key has been seen.
//!     let seen = store.get(b"pk:1001").await;
//!     assert!(seen.is_some());
//!
//!     // Forget a key's tracked state.
//!     store.delete(b"pk:1001").await;
//!     assert_eq!(store.get(b"pk:1001").await, None);
//! }
//! ```
//!
//! # Available Implementations
//!
//! | Implementation | Use Case | Survives Restart |
//! |----------------|----------|------------------|
//! | [`MemoryStore`] | Volatile dedup tracking | No |
//! | [`Store`] enum | Runtime selection over the above | — |
//!
//! # Implementing a Backend
//!
//! To implement a new backing store:
//!
//! 1. Implement the [`KeyValueStore`] trait
//! 2. Map compaction failures to [`CompactError`]
//! 3. Run the [`conformance`] suite against it
//!
//! See the [`memory`] module source for a reference implementation.
//!
//! # Error Handling
//!
//! Only [`compact`](KeyValueStore::compact) is fallible; every other
//! operation is total for well-formed input, which lets the dedup engine
//! treat lookups and writes as infallible. Compaction failures are
//! recoverable — tracked state stays valid, only space reclamation is
//! deferred.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod conformance;
pub mod error;
pub mod memory;
pub mod store;
pub mod store_enum;
pub mod testutil;
pub mod types;

// Re-export primary types at crate root for convenience
pub use batch::{BatchConfig, BatchFlushStats, BatchOperation, BatchWriter};
pub use error::{BoxError, CompactError, CompactResult, ConfigError};
pub use memory::MemoryStore;
pub use store::KeyValueStore;
pub use store_enum::Store;
pub use types::{KeyValue, SegmentLabel};
