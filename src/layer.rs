//! # Layer Trait
//!
//! Tower-style middleware composition for storage backends.
//!
//! ## How It Works
//!
//! ```text
//! Backend ──▶ Layer::layer() ──▶ Wrapped Backend
//! ```
//!
//! Each middleware provides:
//! 1. A wrapper struct that implements the capability traits
//! 2. A `Layer` implementation that creates the wrapper
//!
//! The bundled [`TracingLayer`] wraps any backend in [`Traced`], which runs
//! every call inside a `tracing` span carrying the disk name, operation and
//! path, and logs failures and timings.
//!
//! ## Example
//!
//! ```rust
//! use flatfs::{FsMeta, LayerExt, SqlStorage, SqlStorageOptions, TracingLayer};
//!
//! let storage = SqlStorage::in_memory(SqlStorageOptions::default())?
//!     .layer(TracingLayer::new("media"));
//! assert!(storage.exists("/")?);
//! # Ok::<(), flatfs::FsError>(())
//! ```

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, debug_span};

use crate::{Attributes, FsError, FsList, FsMeta, FsRead, FsWrite, Storage};

/// A layer that wraps a backend to add functionality.
///
/// Inspired by Tower's `Layer` trait. `layer(self, backend)` consumes both
/// the layer configuration and the backend.
pub trait Layer<B> {
    /// The resulting backend type after applying this layer.
    type Backend;

    /// Wrap the given backend with this layer's functionality.
    fn layer(self, backend: B) -> Self::Backend;
}

/// Extension trait for fluent layer composition.
///
/// Provides `.layer()` on any sized [`Storage`] backend.
pub trait LayerExt: Storage + Sized {
    /// Apply a layer to this backend.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Backend {
        layer.layer(self)
    }
}

impl<B: Storage> LayerExt for B {}

/// Layer producing [`Traced`] backends.
#[derive(Debug, Clone)]
pub struct TracingLayer {
    name: String,
}

impl TracingLayer {
    /// Tag every span with the disk `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<B> Layer<B> for TracingLayer {
    type Backend = Traced<B>;

    fn layer(self, backend: B) -> Self::Backend {
        Traced {
            inner: backend,
            name: self.name,
        }
    }
}

/// Backend wrapper that traces every call.
#[derive(Debug)]
pub struct Traced<B> {
    inner: B,
    name: String,
}

impl<B> Traced<B> {
    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwrap the backend.
    pub fn into_inner(self) -> B {
        self.inner
    }

    fn call<T>(
        &self,
        operation: &'static str,
        path: &str,
        f: impl FnOnce(&B) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let span = debug_span!("storage", disk = %self.name, operation, path);
        let _guard = span.enter();
        let started = Instant::now();
        let result = f(&self.inner);
        let elapsed_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(_) => debug!(elapsed_us, "ok"),
            Err(e) => debug!(elapsed_us, error = %e, "failed"),
        }
        result
    }
}

impl<B: FsMeta> FsMeta for Traced<B> {
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        self.call("exists", path, |b| b.exists(path))
    }

    fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, FsError> {
        self.call("last_modified", path, |b| b.last_modified(path))
    }

    fn size(&self, path: &str) -> Result<u64, FsError> {
        self.call("size", path, |b| b.size(path))
    }

    fn url(&self, path: &str) -> Result<String, FsError> {
        self.call("url", path, |b| b.url(path))
    }

    fn attributes(&self, path: &str) -> Result<Attributes, FsError> {
        self.call("attributes", path, |b| b.attributes(path))
    }
}

impl<B: FsList> FsList for Traced<B> {
    fn directories_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        self.call("directories_list", dir, |b| b.directories_list(dir))
    }

    fn files_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        self.call("files_list", dir, |b| b.files_list(dir))
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        self.call("list", dir, |b| b.list(dir))
    }
}

impl<B: FsWrite> FsWrite for Traced<B> {
    fn directory_create(&self, path: &str) -> Result<(), FsError> {
        self.call("directory_create", path, |b| b.directory_create(path))
    }

    fn directory_delete(&self, path: &str) -> Result<(), FsError> {
        self.call("directory_delete", path, |b| b.directory_delete(path))
    }

    fn directory_copy(&self, origin: &str, target: &str) -> Result<(), FsError> {
        self.call("directory_copy", origin, |b| b.directory_copy(origin, target))
    }

    fn file_copy(&self, origin: &str, target: &str) -> Result<(), FsError> {
        self.call("file_copy", origin, |b| b.file_copy(origin, target))
    }

    fn file_delete(&self, paths: &[&str]) -> Result<(), FsError> {
        let joined = paths.join(",");
        self.call("file_delete", &joined, |b| b.file_delete(paths))
    }

    fn file_put(&self, path: &str, content: &[u8]) -> Result<(), FsError> {
        self.call("file_put", path, |b| b.file_put(path, content))
    }

    fn move_entry(&self, origin: &str, target: &str) -> Result<(), FsError> {
        self.call("move_entry", origin, |b| b.move_entry(origin, target))
    }
}

impl<B: FsRead> FsRead for Traced<B> {
    fn file_read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        self.call("file_read", path, |b| b.file_read(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SqlStorage, SqlStorageOptions, StaticStorage};

    #[test]
    fn layer_ext_is_auto_implemented() {
        fn _check<B: Storage + LayerExt>() {}
        _check::<SqlStorage>();
    }

    #[test]
    fn traced_backend_is_storage() {
        fn _takes_storage<T: Storage>(_: &T) {}
        let traced = StaticStorage::new("https://cdn.example.com")
            .unwrap()
            .layer(TracingLayer::new("cdn"));
        _takes_storage(&traced);
    }

    #[test]
    fn traced_backend_delegates() {
        let fs = SqlStorage::in_memory(SqlStorageOptions::default())
            .unwrap()
            .layer(TracingLayer::new("media"));
        fs.directory_create("/d").unwrap();
        fs.file_put("/d/a.txt", b"a").unwrap();
        assert_eq!(fs.files_list("/d").unwrap(), vec!["/d/a.txt"]);
        assert_eq!(fs.file_read("/d/a.txt").unwrap(), b"a");
        assert!(fs.inner().exists("/d").unwrap());
    }

    #[test]
    fn traced_backend_passes_errors_through() {
        let fs = StaticStorage::new("https://cdn.example.com")
            .unwrap()
            .layer(TracingLayer::new("cdn"));
        assert!(matches!(
            fs.file_read("/x"),
            Err(FsError::NotSupported { operation: "file_read" })
        ));
        assert_eq!(fs.url("/x").unwrap(), "https://cdn.example.com/x");
    }
}
