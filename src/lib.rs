//! # flatfs
//!
//! One storage abstraction ("put/read/delete/list/move a file or directory")
//! over three interchangeable backends:
//!
//! - [`SqlStorage`]: a hierarchical tree of path-indexed nodes in a SQLite table
//! - [`ObjectStorage`]: directories emulated with key prefixes on an object store
//! - [`StaticStorage`]: a read-only public endpoint offering URLs only
//!
//! Callers program against [`Storage`] and pick a backend through
//! configuration ([`config::Disk`] and [`AnyStorage::open`]).
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use flatfs::{FsError, SqlStorage, SqlStorageOptions, Storage};
//!
//! fn publish<S: Storage + ?Sized>(storage: &S) -> Result<(), FsError> {
//!     storage.directory_create("/reports")?;
//!     storage.file_put("/reports/q3.csv", b"region,total\n")?;
//!     for path in storage.files_list("/reports")? {
//!         println!("{path} -> {}", storage.url(&path)?);
//!     }
//!     Ok(())
//! }
//!
//! let storage = SqlStorage::in_memory(SqlStorageOptions::default())?;
//! publish(&storage)?;
//! # Ok::<(), FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Storage`] | Full capability interface (meta + list + write + read) |
//! | [`FsError`] | Error type with path and operation context |
//! | [`Attributes`] | Read-only metadata snapshot of an entry |
//! | [`AnyStorage`] | Closed set of bundled backends |
//! | [`ObjectStore`] | Key/value client consumed by [`ObjectStorage`] |
//!
//! ---
//!
//! ## Paths
//!
//! Paths are `/`-separated strings rooted at `/`; there is no working
//! directory. Every backend normalizes through [`path`], and listings return
//! canonical rooted paths (`/a/b`) whatever the backend.
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. The SQL backend holds
//! one connection behind a mutex and runs each call in a transaction; the
//! object backend shares its client through an `Arc`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `json` | [`StorageExtJson`] for reading and writing JSON files |
//! | `cli` (default) | The `flatfs` binary and [`logging`] |

pub mod config;
mod error;
mod ext;
mod factory;
mod layer;
#[cfg(feature = "cli")]
pub mod logging;
pub mod object;
pub mod path;
pub mod sql;
mod static_fs;
mod traits;
mod types;

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - core types
pub use types::{Attributes, FileType, Visibility};

// Public re-exports - capability traits
pub use traits::{FsList, FsMeta, FsRead, FsWrite, Storage};

// Public re-exports - backends
pub use factory::AnyStorage;
pub use object::{MemoryObjectStore, ObjectStorage, ObjectStore, ObjectStoreError};
pub use sql::{PutPolicy, SqlStorage, SqlStorageOptions};
pub use static_fs::StaticStorage;

// Public re-exports - infrastructure
pub use ext::StorageExt;
pub use layer::{Layer, LayerExt, Traced, TracingLayer};

// Conditional re-exports
#[cfg(feature = "json")]
pub use ext::StorageExtJson;
