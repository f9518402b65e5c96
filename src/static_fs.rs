//! Read-only static backend.
//!
//! Fronts an immutable public endpoint such as a CDN. Only URL construction
//! is available; every other call fails with [`FsError::NotSupported`] so a
//! URL-only consumer can share the [`Storage`](crate::Storage) interface
//! without implying any write capability.

use chrono::{DateTime, Utc};

use crate::{Attributes, FsError, FsList, FsMeta, FsRead, FsWrite, path};

/// URL-only storage over a fixed base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticStorage {
    base_url: String,
}

impl StaticStorage {
    /// Create a backend serving paths below `base_url`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfig`] if `base_url` is empty
    pub fn new(base_url: impl Into<String>) -> Result<Self, FsError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(FsError::InvalidConfig {
                field: "url",
                reason: "url is required".to_string(),
            });
        }
        Ok(Self { base_url })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn unsupported<T>(operation: &'static str) -> Result<T, FsError> {
    Err(FsError::NotSupported { operation })
}

impl FsMeta for StaticStorage {
    fn exists(&self, _path: &str) -> Result<bool, FsError> {
        unsupported("exists")
    }

    fn last_modified(&self, _path: &str) -> Result<DateTime<Utc>, FsError> {
        unsupported("last_modified")
    }

    fn size(&self, _path: &str) -> Result<u64, FsError> {
        unsupported("size")
    }

    fn url(&self, path: &str) -> Result<String, FsError> {
        let path = path::validate(path)?;
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches(path::SEPARATOR),
            path.trim_start_matches(path::SEPARATOR)
        ))
    }

    fn attributes(&self, _path: &str) -> Result<Attributes, FsError> {
        unsupported("attributes")
    }
}

impl FsList for StaticStorage {
    fn directories_list(&self, _dir: &str) -> Result<Vec<String>, FsError> {
        unsupported("directories_list")
    }

    fn files_list(&self, _dir: &str) -> Result<Vec<String>, FsError> {
        unsupported("files_list")
    }

    fn list(&self, _dir: &str) -> Result<Vec<String>, FsError> {
        unsupported("list")
    }
}

impl FsWrite for StaticStorage {
    fn directory_create(&self, _path: &str) -> Result<(), FsError> {
        unsupported("directory_create")
    }

    fn directory_delete(&self, _path: &str) -> Result<(), FsError> {
        unsupported("directory_delete")
    }

    fn directory_copy(&self, _origin: &str, _target: &str) -> Result<(), FsError> {
        unsupported("directory_copy")
    }

    fn file_copy(&self, _origin: &str, _target: &str) -> Result<(), FsError> {
        unsupported("file_copy")
    }

    fn file_delete(&self, _paths: &[&str]) -> Result<(), FsError> {
        unsupported("file_delete")
    }

    fn file_put(&self, _path: &str, _content: &[u8]) -> Result<(), FsError> {
        unsupported("file_put")
    }

    fn move_entry(&self, _origin: &str, _target: &str) -> Result<(), FsError> {
        unsupported("move_entry")
    }
}

impl FsRead for StaticStorage {
    fn file_read(&self, _path: &str) -> Result<Vec<u8>, FsError> {
        unsupported("file_read")
    }
}
