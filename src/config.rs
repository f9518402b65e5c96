//! # Disk Configuration
//!
//! Named disk definitions loaded from TOML.
//!
//! ## Responsibility
//! - Describe one backend instance per [`Disk`]
//! - Validate required fields per driver before anything is constructed
//! - Pick a disk by name, falling back to the configured default
//!
//! ## Example
//!
//! ```toml
//! default = "media"
//!
//! [disks.media]
//! driver = "sql"
//! url = "https://files.example.com"
//! database = "files.sqlite"
//! table = "filestore"
//!
//! [disks.cdn]
//! driver = "static"
//! url = "https://cdn.example.com/assets"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::sql::PutPolicy;
use crate::{FsError, Visibility};

/// SQLite database used when a `sql` disk names none.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Backend selected by a disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Prefix-emulated object store.
    S3,
    /// SQLite node table.
    Sql,
    /// Read-only static URL endpoint.
    Static,
}

impl Driver {
    /// Lowercase name as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::S3 => "s3",
            Driver::Sql => "sql",
            Driver::Static => "static",
        }
    }
}

/// One configured storage disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Disk {
    /// Disk name. Filled from the table key when loaded through [`DisksConfig`].
    pub name: String,
    /// Backend driver.
    pub driver: Option<Driver>,
    /// Public base URL.
    pub url: String,
    /// Visibility flag passed to the backend.
    pub visibility: Visibility,

    /// SQLite database file, or `:memory:`.
    pub database: Option<String>,
    /// Node table name.
    pub table: Option<String>,
    /// Behavior of writes onto an existing file.
    pub put_policy: PutPolicy,

    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    /// Bucket region.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Custom endpoint for S3-compatible services.
    ///
    /// Only logged by [`AnyStorage::open`](crate::AnyStorage::open); the
    /// client that honors it is built outside this crate.
    pub endpoint: Option<String>,
    /// Address buckets as `https://host/BUCKET/KEY` instead of
    /// `https://BUCKET.host/KEY`. Read by whoever builds the client.
    pub use_path_style_endpoint: bool,
}

impl Disk {
    /// The validated driver.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfig`] if no driver is set
    pub fn driver(&self) -> Result<Driver, FsError> {
        self.driver.ok_or_else(|| FsError::InvalidConfig {
            field: "driver",
            reason: "driver is required".to_string(),
        })
    }

    /// Check that every field the driver needs is present.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfig`] naming the first missing field
    pub fn validate(&self) -> Result<(), FsError> {
        let driver = self.driver()?;
        if driver != Driver::Sql {
            require("url", &self.url)?;
        }
        if driver == Driver::S3 {
            require("region", &self.region)?;
            require("key", &self.key)?;
            require("secret", &self.secret)?;
            require("bucket", &self.bucket)?;
        }
        Ok(())
    }

    /// SQLite database to open, defaulting to an in-memory one.
    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(IN_MEMORY_DATABASE)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), FsError> {
    if value.trim().is_empty() {
        return Err(FsError::InvalidConfig {
            field,
            reason: format!("{field} is required"),
        });
    }
    Ok(())
}

/// A set of named disks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisksConfig {
    /// Name of the disk used when none is requested.
    pub default: Option<String>,
    /// Disks by name.
    pub disks: BTreeMap<String, Disk>,
}

impl DisksConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// - [`FsError::Deserialization`] if the document is malformed
    pub fn from_toml_str(source: &str) -> Result<Self, FsError> {
        let mut config: DisksConfig =
            toml::from_str(source).map_err(|e| FsError::Deserialization(e.to_string()))?;
        for (name, disk) in &mut config.disks {
            if disk.name.is_empty() {
                disk.name.clone_from(name);
            }
        }
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// - [`FsError::Io`] if the file cannot be read
    /// - [`FsError::Deserialization`] if the document is malformed
    pub fn load(path: &Path) -> Result<Self, FsError> {
        let source = std::fs::read_to_string(path).map_err(|source| FsError::Io {
            operation: "read config",
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), disks = config.disks.len(), "loaded disk config");
        Ok(config)
    }

    /// The disk called `name`, or the default disk.
    ///
    /// Without a name and without a `default` entry, a config holding exactly
    /// one disk resolves to that disk.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfig`] if no disk matches
    pub fn disk(&self, name: Option<&str>) -> Result<&Disk, FsError> {
        let name = match name.or(self.default.as_deref()) {
            Some(name) => name,
            None if self.disks.len() == 1 => {
                return self.disks.values().next().ok_or_else(no_default);
            }
            None => return Err(no_default()),
        };
        self.disks.get(name).ok_or_else(|| FsError::InvalidConfig {
            field: "disk",
            reason: format!("no disk named {name:?}"),
        })
    }
}

fn no_default() -> FsError {
    FsError::InvalidConfig {
        field: "default",
        reason: "no disk requested and no default disk configured".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default = "media"

[disks.media]
driver = "sql"
database = "files.sqlite"
put_policy = "reject"

[disks.cdn]
driver = "static"
url = "https://cdn.example.com"
visibility = "private"

[disks.bucket]
driver = "s3"
url = "https://bucket.example.com"
region = "eu-west-1"
key = "AKIA"
secret = "s3cr3t"
bucket = "media"
use_path_style_endpoint = true
"#;

    #[test]
    fn parses_named_disks() {
        let config = DisksConfig::from_toml_str(SAMPLE).unwrap();
        let media = config.disk(None).unwrap();
        assert_eq!(media.name, "media");
        assert_eq!(media.driver, Some(Driver::Sql));
        assert_eq!(media.put_policy, PutPolicy::Reject);
        assert_eq!(media.database(), "files.sqlite");

        let cdn = config.disk(Some("cdn")).unwrap();
        assert_eq!(cdn.visibility, Visibility::Private);

        let bucket = config.disk(Some("bucket")).unwrap();
        assert!(bucket.use_path_style_endpoint);
        for disk in config.disks.values() {
            disk.validate().unwrap();
        }
    }

    #[test]
    fn unknown_disk_is_config_error() {
        let config = DisksConfig::from_toml_str(SAMPLE).unwrap();
        assert!(matches!(
            config.disk(Some("nope")),
            Err(FsError::InvalidConfig { field: "disk", .. })
        ));
    }

    #[test]
    fn single_disk_needs_no_default() {
        let config = DisksConfig::from_toml_str("[disks.only]\ndriver = \"sql\"\n").unwrap();
        assert_eq!(config.disk(None).unwrap().name, "only");
        assert_eq!(config.disk(None).unwrap().database(), IN_MEMORY_DATABASE);
    }

    #[test]
    fn driver_is_required() {
        let disk = Disk::default();
        assert!(matches!(
            disk.validate(),
            Err(FsError::InvalidConfig { field: "driver", .. })
        ));
    }

    #[test]
    fn url_required_except_for_sql() {
        let sql = Disk {
            driver: Some(Driver::Sql),
            ..Default::default()
        };
        sql.validate().unwrap();

        let static_disk = Disk {
            driver: Some(Driver::Static),
            ..Default::default()
        };
        assert!(matches!(
            static_disk.validate(),
            Err(FsError::InvalidConfig { field: "url", .. })
        ));
    }

    #[test]
    fn s3_requires_credentials() {
        let disk = Disk {
            driver: Some(Driver::S3),
            url: "https://bucket.example.com".into(),
            region: "us-east-1".into(),
            ..Default::default()
        };
        assert!(matches!(
            disk.validate(),
            Err(FsError::InvalidConfig { field: "key", .. })
        ));
    }

    #[test]
    fn malformed_toml_is_deserialization_error() {
        assert!(matches!(
            DisksConfig::from_toml_str("[disks.x]\ndriver = \"ftp\"\n"),
            Err(FsError::Deserialization(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("disks.toml");
        std::fs::write(&file, SAMPLE).unwrap();
        let config = DisksConfig::load(&file).unwrap();
        assert_eq!(config.disks.len(), 3);

        assert!(matches!(
            DisksConfig::load(&dir.path().join("missing.toml")),
            Err(FsError::Io { .. })
        ));
    }
}
