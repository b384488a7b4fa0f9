//! Common types used across store operations.
//!
//! This module defines the shared data structures used by store
//! implementations and their consumers.

use bytes::Bytes;

/// Key-value pair submitted to [`put_batch`](crate::KeyValueStore::put_batch).
///
/// Contains the key and its associated value as byte sequences. Both sides
/// use [`Bytes`], so cloning a pair shares the underlying buffers.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use dedup_store::KeyValue;
///
/// let kv = KeyValue {
///     key: Bytes::from("order:42"),
///     value: Bytes::from("partition-3/offset-9001"),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The key identifying this entry.
    pub key: Bytes,

    /// The value stored at this key.
    pub value: Bytes,
}

impl KeyValue {
    /// Creates a new key-value pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use dedup_store::KeyValue;
    ///
    /// let kv = KeyValue::new(Bytes::from("key"), Bytes::from("value"));
    /// ```
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Opaque label identifying the dedup partition/segment a store instance
/// tracks.
///
/// The label is supplied once at construction and owned by the caller.
/// Persistent implementations use it to namespace on-disk state; the
/// in-memory implementation retains it for diagnostics only. The label
/// carries no semantic meaning inside this crate.
///
/// # Examples
///
/// ```
/// use dedup_store::SegmentLabel;
///
/// let label = SegmentLabel::from("orders__3");
/// assert_eq!(label.to_string(), "orders__3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentLabel(Bytes);

impl SegmentLabel {
    /// Creates a label from raw bytes.
    pub fn new(label: impl Into<Bytes>) -> Self {
        Self(label.into())
    }

    /// Returns the label's raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for SegmentLabel {
    fn from(label: &str) -> Self {
        Self(Bytes::copy_from_slice(label.as_bytes()))
    }
}

impl From<String> for SegmentLabel {
    fn from(label: String) -> Self {
        Self(Bytes::from(label))
    }
}

impl From<Vec<u8>> for SegmentLabel {
    fn from(label: Vec<u8>) -> Self {
        Self(Bytes::from(label))
    }
}

impl From<Bytes> for SegmentLabel {
    fn from(label: Bytes) -> Self {
        Self(label)
    }
}

impl std::fmt::Display for SegmentLabel {
    /// Renders the label lossily as UTF-8 for log output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
