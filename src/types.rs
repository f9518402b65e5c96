//! Core types shared by every storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Directory (a tree node on the SQL backend, a key prefix on object stores).
    Directory,
    /// Regular file.
    File,
}

impl FileType {
    /// Stable lowercase name, as persisted by the SQL record store.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Directory => "directory",
            FileType::File => "file",
        }
    }

    /// Parse a persisted type name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "directory" => Some(FileType::Directory),
            "file" => Some(FileType::File),
            _ => None,
        }
    }
}

/// Visibility flag carried by a disk and reported in [`Attributes`].
///
/// Only recorded and passed to the backing store; no ACL is enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Readable through the public URL.
    #[default]
    Public,
    /// Not meant to be served publicly.
    Private,
}

impl Visibility {
    /// Lowercase name of the flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Snapshot of an entry's attributes.
///
/// Derived on demand from the backing store and never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Type of the entry.
    pub file_type: FileType,
    /// Normalized rooted path.
    pub path: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Content type reported by the backing store, if any.
    pub mime_type: Option<String>,
    /// Extension derived from the base name (empty for none).
    pub extension: String,
    /// Stored size in bytes. Directories report their own stored size, not
    /// an aggregate of their children.
    pub size: u64,
    /// Visibility of the disk the entry lives on.
    pub visibility: Visibility,
}

impl Attributes {
    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(file_type: FileType) -> Attributes {
        Attributes {
            file_type,
            path: "/a".into(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            mime_type: None,
            extension: String::new(),
            size: 0,
            visibility: Visibility::Public,
        }
    }

    #[test]
    fn file_type_round_trips_through_names() {
        for ty in [FileType::Directory, FileType::File] {
            assert_eq!(FileType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(FileType::parse("symlink"), None);
    }

    #[test]
    fn attributes_type_predicates() {
        let dir = attributes(FileType::Directory);
        assert!(dir.is_directory());
        assert!(!dir.is_file());

        let file = attributes(FileType::File);
        assert!(file.is_file());
        assert!(!file.is_directory());
    }

    #[test]
    fn visibility_defaults_to_public() {
        assert_eq!(Visibility::default(), Visibility::Public);
        assert_eq!(Visibility::Private.as_str(), "private");
    }

    #[test]
    fn visibility_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            visibility: Visibility,
        }
        let parsed: Wrapper = toml::from_str("visibility = \"private\"").unwrap();
        assert_eq!(parsed.visibility, Visibility::Private);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Visibility>();
        assert_send_sync::<Attributes>();
    }
}
