//! Existence and metadata queries.

use chrono::{DateTime, Utc};

use crate::{Attributes, FsError};

/// Existence, metadata and URL queries.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsMeta`.
pub trait FsMeta: Send + Sync {
    /// Check if a live file or directory exists at `path`.
    ///
    /// Returns `Ok(false)` for absent paths. Only returns an error for
    /// backing-store failures or on backends without the capability.
    fn exists(&self, path: &str) -> Result<bool, FsError>;

    /// Last modification time of the entry.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, FsError>;

    /// Stored size of the entry in bytes.
    ///
    /// For directories this is the directory's own stored size, not the sum
    /// of its children.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn size(&self, path: &str) -> Result<u64, FsError>;

    /// Public URL of the entry.
    ///
    /// The SQL backend requires the entry to exist; object and static
    /// backends build the URL from the path alone.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the SQL backend has no such entry
    fn url(&self, path: &str) -> Result<String, FsError>;

    /// Attribute snapshot of the entry.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn attributes(&self, path: &str) -> Result<Attributes, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_meta_is_object_safe() {
        fn _check(_: &dyn FsMeta) {}
    }
}
