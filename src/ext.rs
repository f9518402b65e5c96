//! # Extension Traits
//!
//! Convenience methods for storage backends.
//!
//! ## Overview
//!
//! [`StorageExt`] provides commonly-needed helpers that aren't part of the
//! capability traits. They are default methods with a blanket implementation,
//! so every [`Storage`] (including `dyn Storage`) gets them for free.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`missing`](StorageExt::missing) | Inverse of `exists` |
//! | [`is_file`](StorageExt::is_file) | Check if path is a file |
//! | [`is_dir`](StorageExt::is_dir) | Check if path is a directory |
//! | [`file_read_to_string`](StorageExt::file_read_to_string) | Read a UTF-8 file |
//! | [`file_put_string`](StorageExt::file_put_string) | Store a string |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `json` feature enabled, [`StorageExtJson`] adds `read_json` and
//! `write_json`.

use crate::{FsError, Storage};

/// Extension methods for any storage backend.
///
/// # Example
///
/// ```rust
/// use flatfs::{FsError, Storage, StorageExt};
///
/// fn ensure_dir<S: Storage + ?Sized>(storage: &S, path: &str) -> Result<(), FsError> {
///     if !storage.is_dir(path)? {
///         storage.directory_create(path)?;
///     }
///     Ok(())
/// }
/// ```
pub trait StorageExt: Storage {
    /// Returns `true` if nothing exists at `path`.
    fn missing(&self, path: &str) -> Result<bool, FsError> {
        Ok(!self.exists(path)?)
    }

    /// Check if the path points to a file.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        match self.attributes(path) {
            Ok(attributes) => Ok(attributes.is_file()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if the path points to a directory.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_dir(&self, path: &str) -> Result<bool, FsError> {
        match self.attributes(path) {
            Ok(attributes) => Ok(attributes.is_directory()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidData`] if the contents are not valid UTF-8
    fn file_read_to_string(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|e| FsError::InvalidData {
            path: path.to_string(),
            details: e.to_string(),
        })
    }

    /// Store a string as the contents of `path`.
    fn file_put_string(&self, path: &str, content: &str) -> Result<(), FsError> {
        self.file_put(path, content.as_bytes())
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

#[cfg(feature = "json")]
mod json {
    use serde::{Serialize, de::DeserializeOwned};

    use super::StorageExt;
    use crate::FsError;

    /// JSON serialization extension methods.
    ///
    /// Available when the `json` feature is enabled.
    pub trait StorageExtJson: StorageExt {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::NotFound` if the file doesn't exist
        /// - `FsError::InvalidData` if the file isn't valid UTF-8
        /// - `FsError::Deserialization` if JSON parsing failed
        fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
            let data = self.file_read_to_string(path)?;
            serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }

        /// Serialize a value and store it as pretty-printed JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::Serialization` if serialization failed
        fn write_json<T: Serialize>(&self, path: &str, value: &T) -> Result<(), FsError> {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| FsError::Serialization(e.to_string()))?;
            self.file_put(path, json.as_bytes())
        }
    }

    impl<S: StorageExt + ?Sized> StorageExtJson for S {}
}

#[cfg(feature = "json")]
pub use json::StorageExtJson;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsWrite, SqlStorage, SqlStorageOptions, StaticStorage};

    fn storage() -> SqlStorage {
        let fs = SqlStorage::in_memory(SqlStorageOptions::default()).unwrap();
        fs.directory_create("/dir").unwrap();
        fs.file_put("/dir/file.txt", b"hello").unwrap();
        fs
    }

    #[test]
    fn is_file_and_is_dir() {
        let fs = storage();
        assert!(fs.is_file("/dir/file.txt").unwrap());
        assert!(!fs.is_file("/dir").unwrap());
        assert!(fs.is_dir("/dir").unwrap());
        assert!(!fs.is_dir("/dir/file.txt").unwrap());
    }

    #[test]
    fn missing_paths_are_false_not_errors() {
        let fs = storage();
        assert!(!fs.is_file("/nope").unwrap());
        assert!(!fs.is_dir("/nope").unwrap());
        assert!(fs.missing("/nope").unwrap());
        assert!(!fs.missing("/dir").unwrap());
    }

    #[test]
    fn capability_errors_propagate() {
        let fs = StaticStorage::new("https://cdn.example.com").unwrap();
        assert!(matches!(
            fs.is_file("/a"),
            Err(FsError::NotSupported { .. })
        ));
    }

    #[test]
    fn string_round_trip() {
        let fs = storage();
        fs.file_put_string("/dir/note.txt", "héllo").unwrap();
        assert_eq!(fs.file_read_to_string("/dir/note.txt").unwrap(), "héllo");
    }

    #[test]
    fn invalid_utf8_is_invalid_data() {
        let fs = storage();
        fs.file_put("/bin", &[0xff, 0xfe]).unwrap();
        assert!(matches!(
            fs.file_read_to_string("/bin"),
            Err(FsError::InvalidData { .. })
        ));
    }

    #[test]
    fn works_through_trait_objects() {
        let fs: Box<dyn Storage> = Box::new(storage());
        assert!(fs.is_dir("/dir").unwrap());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trip() {
        let fs = storage();
        let value = serde_json::json!({ "name": "flatfs", "disks": 3 });
        fs.write_json("/dir/config.json", &value).unwrap();
        let loaded: serde_json::Value = fs.read_json("/dir/config.json").unwrap();
        assert_eq!(loaded, value);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_parse_error_is_deserialization() {
        let fs = storage();
        let result: Result<serde_json::Value, _> = fs.read_json("/dir/file.txt");
        assert!(matches!(result, Err(FsError::Deserialization(_))));
    }
}
