//! Backend selection from a [`Disk`].
//!
//! [`AnyStorage`] is the closed set of bundled backends. It implements every
//! capability trait by delegation, so callers hold one concrete type
//! whichever driver the configuration names.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{Disk, Driver, IN_MEMORY_DATABASE};
use crate::object::{ObjectStorage, ObjectStore};
use crate::sql::{SqlStorage, SqlStorageOptions};
use crate::static_fs::StaticStorage;
use crate::{Attributes, FsError, FsList, FsMeta, FsRead, FsWrite};

/// One of the bundled backends.
#[derive(Debug)]
pub enum AnyStorage {
    /// SQLite node table.
    Sql(SqlStorage),
    /// Prefix-emulated object store.
    Object(ObjectStorage),
    /// Read-only static endpoint.
    Static(StaticStorage),
}

impl AnyStorage {
    /// Validate `disk` and construct its backend.
    ///
    /// The `s3` driver needs an already-built `client`; credentials and
    /// endpoints in the disk are for whoever builds that client.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfig`] if the disk is missing a required field,
    ///   or if an `s3` disk is opened without a client
    /// - [`FsError::Database`] if the SQLite database cannot be opened
    pub fn open(disk: &Disk, client: Option<Arc<dyn ObjectStore>>) -> Result<Self, FsError> {
        disk.validate()?;
        let driver = disk.driver()?;

        let storage = match driver {
            Driver::Sql => {
                let mut options = SqlStorageOptions {
                    url: disk.url.clone(),
                    visibility: disk.visibility,
                    put_policy: disk.put_policy,
                    ..Default::default()
                };
                if let Some(table) = &disk.table {
                    options.table.clone_from(table);
                }
                let storage = match disk.database() {
                    IN_MEMORY_DATABASE => SqlStorage::in_memory(options)?,
                    database => SqlStorage::open(database, options)?,
                };
                AnyStorage::Sql(storage)
            }
            Driver::S3 => {
                let client = client.ok_or_else(|| FsError::InvalidConfig {
                    field: "driver",
                    reason: "the s3 driver needs an object store client".to_string(),
                })?;
                info!(
                    disk = %disk.name,
                    bucket = %disk.bucket,
                    region = %disk.region,
                    endpoint = disk.endpoint.as_deref().unwrap_or("default"),
                    path_style = disk.use_path_style_endpoint,
                    "using caller-built object store client"
                );
                AnyStorage::Object(
                    ObjectStorage::new(client)
                        .with_url(disk.url.clone())
                        .with_visibility(disk.visibility),
                )
            }
            Driver::Static => AnyStorage::Static(StaticStorage::new(disk.url.clone())?),
        };
        info!(disk = %disk.name, driver = driver.as_str(), "opened storage");
        Ok(storage)
    }

    /// Driver behind this storage.
    pub fn driver(&self) -> Driver {
        match self {
            AnyStorage::Sql(_) => Driver::Sql,
            AnyStorage::Object(_) => Driver::S3,
            AnyStorage::Static(_) => Driver::Static,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $backend:ident => $call:expr) => {
        match $self {
            AnyStorage::Sql($backend) => $call,
            AnyStorage::Object($backend) => $call,
            AnyStorage::Static($backend) => $call,
        }
    };
}

impl FsMeta for AnyStorage {
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        delegate!(self, b => b.exists(path))
    }

    fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, FsError> {
        delegate!(self, b => b.last_modified(path))
    }

    fn size(&self, path: &str) -> Result<u64, FsError> {
        delegate!(self, b => b.size(path))
    }

    fn url(&self, path: &str) -> Result<String, FsError> {
        delegate!(self, b => b.url(path))
    }

    fn attributes(&self, path: &str) -> Result<Attributes, FsError> {
        delegate!(self, b => b.attributes(path))
    }
}

impl FsList for AnyStorage {
    fn directories_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        delegate!(self, b => b.directories_list(dir))
    }

    fn files_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        delegate!(self, b => b.files_list(dir))
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        delegate!(self, b => b.list(dir))
    }
}

impl FsWrite for AnyStorage {
    fn directory_create(&self, path: &str) -> Result<(), FsError> {
        delegate!(self, b => b.directory_create(path))
    }

    fn directory_delete(&self, path: &str) -> Result<(), FsError> {
        delegate!(self, b => b.directory_delete(path))
    }

    fn directory_copy(&self, origin: &str, target: &str) -> Result<(), FsError> {
        delegate!(self, b => b.directory_copy(origin, target))
    }

    fn file_copy(&self, origin: &str, target: &str) -> Result<(), FsError> {
        delegate!(self, b => b.file_copy(origin, target))
    }

    fn file_delete(&self, paths: &[&str]) -> Result<(), FsError> {
        delegate!(self, b => b.file_delete(paths))
    }

    fn file_put(&self, path: &str, content: &[u8]) -> Result<(), FsError> {
        delegate!(self, b => b.file_put(path, content))
    }

    fn move_entry(&self, origin: &str, target: &str) -> Result<(), FsError> {
        delegate!(self, b => b.move_entry(origin, target))
    }
}

impl FsRead for AnyStorage {
    fn file_read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        delegate!(self, b => b.file_read(path))
    }
}
