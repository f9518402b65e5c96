//! Error types for the flatfs storage abstraction.

/// Storage error type with contextual variants.
///
/// Every variant carries the path (or operation) that caused it. Backing-store
/// failures pass through as [`FsError::Database`] or [`FsError::Backend`].
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use flatfs::FsError;
///
/// let err = FsError::NotFound { path: "/missing.txt".into() };
/// assert_eq!(err.to_string(), "not found: /missing.txt");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Path/Node Errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// A listing was requested for a directory that does not exist.
    #[error("directory not found: {path}")]
    DirectoryNotFound {
        /// The directory path.
        path: String,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// The parent directory of a new entry does not exist.
    #[error("parent directory not found: {path}")]
    ParentNotFound {
        /// The path whose parent is missing.
        path: String,
    },

    /// The parent directory of a move target does not exist.
    #[error("target parent directory not found: {path}")]
    TargetParentNotFound {
        /// The move target whose parent is missing.
        path: String,
    },

    /// Expected a file but found a directory.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: String,
    },

    /// Expected a directory but found a file.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
    },

    /// Origin and target of a move are the same path.
    #[error("origin and target are the same path: {path}")]
    SamePath {
        /// The path given as both origin and target.
        path: String,
    },

    /// The path cannot be used for this operation.
    #[error("invalid path: {path} ({reason})")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    // Capability Errors
    /// The backend does not offer this capability at all.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// The operation is declared by the backend but has no implementation.
    #[error("operation not implemented: {operation}")]
    NotImplemented {
        /// The unimplemented operation.
        operation: &'static str,
    },

    // Data Errors
    /// Stored data could not be decoded.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: String,
        /// Details about the invalid data.
        details: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    // Configuration Errors
    /// A disk configuration is missing a field or holds an unusable value.
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig {
        /// The configuration field at fault.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    // Backing Store Errors
    /// SQL record store failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic backend error (object store transport, permissions).
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Returns `true` for [`FsError::NotFound`] and [`FsError::DirectoryNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FsError::NotFound { .. } | FsError::DirectoryNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_error_not_found_display() {
        let err = FsError::NotFound {
            path: "/missing".into(),
        };
        assert_eq!(err.to_string(), "not found: /missing");
    }

    #[test]
    fn fs_error_already_exists_display() {
        let err = FsError::AlreadyExists {
            path: "/exists".into(),
            operation: "directory_create",
        };
        assert_eq!(err.to_string(), "directory_create: already exists: /exists");
    }

    #[test]
    fn fs_error_same_path_display() {
        let err = FsError::SamePath { path: "/a".into() };
        assert!(err.to_string().contains("/a"));
    }

    #[test]
    fn fs_error_capability_display() {
        let err = FsError::NotSupported { operation: "file_put" };
        assert_eq!(err.to_string(), "operation not supported: file_put");

        let err = FsError::NotImplemented {
            operation: "directory_copy",
        };
        assert_eq!(err.to_string(), "operation not implemented: directory_copy");
    }

    #[test]
    fn fs_error_from_rusqlite() {
        let err = FsError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, FsError::Database(_)));
    }

    #[test]
    fn is_not_found_covers_both_variants() {
        assert!(FsError::NotFound { path: "/a".into() }.is_not_found());
        assert!(FsError::DirectoryNotFound { path: "/a".into() }.is_not_found());
        assert!(!FsError::SamePath { path: "/a".into() }.is_not_found());
    }
}
