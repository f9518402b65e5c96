//! Mutating operations.

use crate::FsError;

/// Mutating operations on a storage backend.
///
/// All methods use `&self` (interior mutability). Backends manage their own
/// synchronization.
///
/// # Atomicity
///
/// Tree backends run each call as one transaction. Backends without
/// transactions document which calls can leave partial state behind.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsWrite`.
pub trait FsWrite: Send + Sync {
    /// Create a directory. The parent must already exist.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if a live entry occupies `path`
    /// - [`FsError::ParentNotFound`] if the parent directory is missing
    fn directory_create(&self, path: &str) -> Result<(), FsError>;

    /// Delete a directory and everything below it.
    ///
    /// Deleting a missing directory succeeds without doing anything.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `path` is a file
    fn directory_delete(&self, path: &str) -> Result<(), FsError>;

    /// Copy a directory tree.
    ///
    /// No bundled backend implements this; callers must not rely on it.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `origin` is a file
    /// - [`FsError::NotImplemented`] otherwise
    fn directory_copy(&self, origin: &str, target: &str) -> Result<(), FsError>;

    /// Copy a single file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `origin` does not exist
    /// - [`FsError::NotAFile`] if `origin` is a directory
    /// - [`FsError::ParentNotFound`] if the target's parent is missing
    fn file_copy(&self, origin: &str, target: &str) -> Result<(), FsError>;

    /// Delete a batch of paths.
    ///
    /// Missing paths are skipped. A directory in the batch is deleted
    /// recursively, as by [`directory_delete`](Self::directory_delete).
    fn file_delete(&self, paths: &[&str]) -> Result<(), FsError>;

    /// Store `content` at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::ParentNotFound`] if the parent directory is missing
    fn file_put(&self, path: &str, content: &[u8]) -> Result<(), FsError>;

    /// Move or rename a file or directory, carrying its subtree along.
    ///
    /// # Errors
    ///
    /// - [`FsError::SamePath`] if `origin` and `target` are equal
    /// - [`FsError::NotFound`] if `origin` does not exist
    /// - [`FsError::TargetParentNotFound`] if the target's parent is missing
    fn move_entry(&self, origin: &str, target: &str) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_write_is_object_safe() {
        fn _check(_: &dyn FsWrite) {}
    }
}
