//! Content reads.

use crate::FsError;

/// Read file contents from a storage backend.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsRead`.
pub trait FsRead: Send + Sync {
    /// Read the entire file into memory.
    ///
    /// Returns exactly the bytes given to the last successful
    /// [`file_put`](super::FsWrite::file_put), including empty and non-UTF-8
    /// payloads.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    /// - [`FsError::NotSupported`] on URL-only backends
    fn file_read(&self, path: &str) -> Result<Vec<u8>, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_read_is_object_safe() {
        fn _check(_: &dyn FsRead) {}
    }

    #[test]
    fn fs_read_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: FsRead>() {
            _assert_send_sync::<T>();
        }
    }
}
