//! # Capability Traits
//!
//! The storage contract every backend implements, grouped by concern.
//!
//! ## Trait Groups
//!
//! ```text
//! FsMeta  (exists, last_modified, size, url, attributes)
//!   + FsList  (directories_list, files_list, list)
//!   + FsWrite (directory_create/delete/copy, file_copy/delete/put, move_entry)
//!   + FsRead  (file_read)
//!   = Storage
//! ```
//!
//! ## Quick Reference
//!
//! | Trait | Concern | SQL tree | Object store | Static |
//! |-------|---------|----------|--------------|--------|
//! | [`FsMeta`] | Existence/metadata | ✓ | ✓ | `url` only |
//! | [`FsList`] | Listing | ✓ | ✓ | ✗ |
//! | [`FsWrite`] | Mutation | ✓ (no `directory_copy`) | ✓ (no `directory_copy`, `move_entry`) | ✗ |
//! | [`FsRead`] | Content | ✓ | ✓ | ✗ |
//!
//! Unavailable capabilities return [`FsError::NotSupported`](crate::FsError::NotSupported)
//! or [`FsError::NotImplemented`](crate::FsError::NotImplemented); they never
//! degrade into empty results.
//!
//! ## Blanket Implementation
//!
//! [`Storage`] has a blanket implementation. Implement the four component
//! traits and you get the composite trait automatically.
//!
//! ## Object Safety
//!
//! All traits are object-safe and can be used as trait objects:
//!
//! ```rust
//! use flatfs::Storage;
//!
//! fn process(storage: &dyn Storage) {
//!     let _ = storage.file_read("/file.txt");
//! }
//! ```

mod fs_list;
mod fs_meta;
mod fs_read;
mod fs_write;

pub use fs_list::FsList;
pub use fs_meta::FsMeta;
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// The full storage capability interface.
///
/// Callers program against `Storage` and swap backends through
/// configuration; backend differences stay behind this trait.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type that implements all four component
/// traits. You never need to implement `Storage` directly.
///
/// # Example
///
/// ```rust
/// use flatfs::{FsError, Storage};
///
/// // Generic function that works with any Storage implementation
/// fn archive<S: Storage + ?Sized>(storage: &S, src: &str) -> Result<(), FsError> {
///     if !storage.exists("/archive")? {
///         storage.directory_create("/archive")?;
///     }
///     let data = storage.file_read(src)?;
///     storage.file_put(&format!("/archive{src}"), &data)?;
///     storage.file_delete(&[src])
/// }
/// ```
pub trait Storage: FsMeta + FsList + FsWrite + FsRead {}

// Blanket implementation - any type implementing all four gets Storage for free
impl<T: FsMeta + FsList + FsWrite + FsRead> Storage for T {}
