//! Key/value object API consumed by [`ObjectStorage`](super::ObjectStorage).
//!
//! Building a real S3 client (credentials, endpoints, retries) belongs to the
//! caller. Anything that can speak these six calls can back the
//! prefix-emulated filesystem.

use chrono::{DateTime, Utc};

use crate::{FsError, Visibility, path};

/// Errors reported by an [`ObjectStore`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    /// The key does not exist.
    #[error("object not found: {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// Network, permission or protocol failure inside the client.
    #[error("object store transport error: {0}")]
    Transport(String),
}

impl From<ObjectStoreError> for FsError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::NotFound { key } => FsError::NotFound {
                path: path::from_key(&key),
            },
            ObjectStoreError::Transport(message) => FsError::Backend(message),
        }
    }
}

/// Options attached to a put.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type recorded with the object.
    pub content_type: Option<String>,
    /// Canned visibility for the object.
    pub visibility: Visibility,
}

/// Metadata returned by [`ObjectStore::head`] and in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Full object key.
    pub key: String,
    /// Payload length in bytes.
    pub size: u64,
    /// Last write time.
    pub last_modified: DateTime<Utc>,
    /// Recorded MIME type, if any.
    pub content_type: Option<String>,
}

/// One listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this prefix.
    pub prefix: String,
    /// Group keys sharing a prefix up to this delimiter into common prefixes.
    pub delimiter: Option<String>,
    /// Token from the previous page's `next_continuation_token`.
    pub continuation_token: Option<String>,
    /// Page size. `None` uses the store's default.
    pub max_keys: Option<usize>,
}

impl ListRequest {
    /// Request every key under `prefix`, ungrouped.
    pub fn recursive(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Request the immediate children of `prefix`, grouped on `/`.
    pub fn delimited(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some(path::SEPARATOR.to_string()),
            ..Default::default()
        }
    }

    /// Same request, continuing after `token`.
    #[must_use]
    pub fn after(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects directly matched by the request.
    pub objects: Vec<ObjectMeta>,
    /// Grouped prefixes, each ending in the delimiter.
    pub common_prefixes: Vec<String>,
    /// Present when the listing was truncated.
    pub next_continuation_token: Option<String>,
}

/// Backing object-store client.
///
/// The client is held for the adapter's lifetime and shared, so methods take
/// `&self` and implementations must be `Send + Sync`.
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite `key`.
    fn put(&self, key: &str, bytes: &[u8], options: &PutOptions) -> Result<(), ObjectStoreError>;

    /// Fetch the payload of `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Fetch the metadata of `key`.
    fn head(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError>;

    /// List one page of keys.
    fn list(&self, request: &ListRequest) -> Result<ListPage, ObjectStoreError>;

    /// Delete many keys at once. Absent keys are not an error.
    fn delete_batch(&self, keys: &[String]) -> Result<(), ObjectStoreError>;

    /// Server-side copy of `src` to `dst`, overwriting `dst`.
    fn copy(&self, src: &str, dst: &str) -> Result<(), ObjectStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_store_is_object_safe() {
        fn _check(_: &dyn ObjectStore) {}
    }

    #[test]
    fn not_found_maps_to_rooted_path() {
        let err: FsError = ObjectStoreError::NotFound {
            key: "docs/a.txt".into(),
        }
        .into();
        assert!(matches!(err, FsError::NotFound { ref path } if path == "/docs/a.txt"));
    }

    #[test]
    fn transport_maps_to_backend() {
        let err: FsError = ObjectStoreError::Transport("timeout".into()).into();
        assert!(matches!(err, FsError::Backend(ref m) if m == "timeout"));
    }

    #[test]
    fn request_builders() {
        let request = ListRequest::delimited("a/").after(Some("a/b".into()));
        assert_eq!(request.delimiter.as_deref(), Some("/"));
        assert_eq!(request.continuation_token.as_deref(), Some("a/b"));
        assert_eq!(ListRequest::recursive("a/").delimiter, None);
    }
}
