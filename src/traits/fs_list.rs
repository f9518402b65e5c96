//! Directory listings.

use crate::FsError;

/// Directory listing operations.
///
/// Every listing returns normalized rooted child paths (`/a/b`, no trailing
/// separator), one level deep. An existing but empty directory yields
/// `Ok(vec![])`, which is distinct from a missing directory.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsList`.
pub trait FsList: Send + Sync {
    /// Child directories of `dir`, ordered by path ascending.
    ///
    /// # Errors
    ///
    /// - [`FsError::DirectoryNotFound`] if `dir` does not exist (tree backends)
    fn directories_list(&self, dir: &str) -> Result<Vec<String>, FsError>;

    /// Child files of `dir`, ordered by path ascending.
    ///
    /// # Errors
    ///
    /// - [`FsError::DirectoryNotFound`] if `dir` does not exist (tree backends)
    fn files_list(&self, dir: &str) -> Result<Vec<String>, FsError>;

    /// Child directories and files of `dir`, merged and sorted ascending.
    ///
    /// # Errors
    ///
    /// - [`FsError::DirectoryNotFound`] if `dir` does not exist (tree backends)
    fn list(&self, dir: &str) -> Result<Vec<String>, FsError>;
}
