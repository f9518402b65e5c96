//! # SQL Hierarchical Filesystem
//!
//! Tree semantics on top of a flat table of path-indexed rows.
//!
//! ## Responsibility
//! - Resolve paths to nodes and parents to directory nodes
//! - Keep every stored `path` consistent with the parent-id chain
//! - Cascade soft deletes through subtrees, children before parents
//! - Rewrite descendant paths when a directory moves
//!
//! ## Dependencies
//! - [`RecordStore`] for row access
//! - [`crate::path`] for normalization
//!
//! ## Transactions
//!
//! The connection is opened once and held for the adapter's lifetime behind a
//! mutex. Every operation runs inside one SQLite transaction, so a recursive
//! delete or a move with its descendant rewrite either lands completely or
//! not at all.

mod record;

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, info};

pub use record::{Node, RecordQuery, RecordStore, validate_table_name};

use crate::{Attributes, FileType, FsError, FsList, FsMeta, FsRead, FsWrite, Visibility, path};

/// What [`SqlStorage::file_put`](FsWrite::file_put) and
/// [`file_copy`](FsWrite::file_copy) do when a live file already occupies the
/// target path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PutPolicy {
    /// Replace the stored contents in place.
    #[default]
    Overwrite,
    /// Fail with [`FsError::AlreadyExists`].
    Reject,
}

/// Options for [`SqlStorage`].
#[derive(Debug, Clone)]
pub struct SqlStorageOptions {
    /// Name of the node table.
    pub table: String,
    /// Base URL prepended to paths by [`FsMeta::url`]. Empty means bare paths.
    pub url: String,
    /// Create the table and root node on construction.
    pub automigrate: bool,
    /// Visibility reported in attributes.
    pub visibility: Visibility,
    /// Policy for writes onto an existing file.
    pub put_policy: PutPolicy,
}

impl Default for SqlStorageOptions {
    fn default() -> Self {
        Self {
            table: "filestore".to_string(),
            url: String::new(),
            automigrate: true,
            visibility: Visibility::default(),
            put_policy: PutPolicy::default(),
        }
    }
}

/// Storage backend over a SQLite node table.
pub struct SqlStorage {
    conn: Mutex<Connection>,
    table: String,
    url: String,
    visibility: Visibility,
    put_policy: PutPolicy,
}

impl std::fmt::Debug for SqlStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlStorage")
            .field("table", &self.table)
            .field("url", &self.url)
            .field("put_policy", &self.put_policy)
            .finish_non_exhaustive()
    }
}

impl SqlStorage {
    /// Wrap an open connection.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidConfig`] if the table name is empty or not an identifier
    /// - [`FsError::Database`] if automigration fails
    pub fn new(conn: Connection, options: SqlStorageOptions) -> Result<Self, FsError> {
        if options.table.is_empty() {
            return Err(FsError::InvalidConfig {
                field: "table",
                reason: "table is required".to_string(),
            });
        }
        validate_table_name(&options.table)?;

        let storage = Self {
            conn: Mutex::new(conn),
            table: options.table,
            url: options.url,
            visibility: options.visibility,
            put_policy: options.put_policy,
        };

        if options.automigrate {
            storage.mutate(|store| store.migrate())?;
        }
        debug!(table = %storage.table, "sql storage ready");
        Ok(storage)
    }

    /// Open (or create) a SQLite database file.
    pub fn open<P: AsRef<Path>>(path: P, options: SqlStorageOptions) -> Result<Self, FsError> {
        Self::new(Connection::open(path)?, options)
    }

    /// Create a storage over a fresh in-memory database.
    pub fn in_memory(options: SqlStorageOptions) -> Result<Self, FsError> {
        Self::new(Connection::open_in_memory()?, options)
    }

    /// Run read-only queries against the table.
    fn read<T>(
        &self,
        f: impl FnOnce(&RecordStore<'_>) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let conn = self.conn.lock();
        f(&RecordStore::new(&conn, &self.table))
    }

    /// Run a subtree mutation inside one transaction. Any error rolls the
    /// whole mutation back.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&RecordStore<'_>) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&RecordStore::new(&tx, &self.table))?;
        tx.commit()?;
        Ok(value)
    }

    fn attributes_of(&self, node: &Node) -> Attributes {
        Attributes {
            file_type: node.node_type,
            path: node.path.clone(),
            last_modified: node.updated_at,
            mime_type: None,
            extension: node.extension.clone(),
            size: node.size,
            visibility: self.visibility,
        }
    }

    fn children(&self, dir: &str, node_type: Option<FileType>) -> Result<Vec<String>, FsError> {
        let dir = path::validate(dir)?;
        debug!(path = %dir, node_type = node_type.map(|t| t.as_str()), "list");
        self.read(|store| {
            let node = store
                .find_by_path(&dir)?
                .ok_or_else(|| FsError::DirectoryNotFound { path: dir.clone() })?;
            if !node.is_directory() {
                return Err(FsError::NotADirectory { path: dir.clone() });
            }
            let children = store.list(&RecordQuery {
                parent_id: Some(&node.id),
                node_type,
            })?;
            Ok(children.into_iter().map(|child| child.path).collect())
        })
    }

    /// Store `contents` as a file named after `target`, following the put policy.
    fn write_file(
        &self,
        store: &RecordStore<'_>,
        target: &str,
        contents: Vec<u8>,
        extension: Option<String>,
        operation: &'static str,
    ) -> Result<(), FsError> {
        let parent = parent_directory(store, target)?
            .ok_or_else(|| FsError::ParentNotFound {
                path: target.to_string(),
            })?;
        let name = path::base_name(target);
        let target = path::join(&parent.path, &name);

        match store.find_by_path(&target)? {
            Some(existing) if existing.is_directory() => Err(FsError::NotAFile { path: target }),
            Some(_) if self.put_policy == PutPolicy::Reject => Err(FsError::AlreadyExists {
                path: target,
                operation,
            }),
            Some(mut existing) => {
                existing.size = contents.len() as u64;
                existing.contents = Some(contents);
                existing.extension = extension.unwrap_or_else(|| path::extension(&name));
                existing.updated_at = Utc::now();
                store.update(&existing)?;
                debug!(path = %target, size = existing.size, "overwrote file");
                Ok(())
            }
            None => {
                let mut file = Node::file(&parent, &name, contents);
                if let Some(extension) = extension {
                    file.extension = extension;
                }
                store.create(&file)?;
                debug!(path = %target, size = file.size, "created file");
                Ok(())
            }
        }
    }
}

/// Directory node holding `path`, if it exists.
fn parent_directory(store: &RecordStore<'_>, path: &str) -> Result<Option<Node>, FsError> {
    let parent_path = path::parent_path(path);
    match store.find_by_path(&parent_path)? {
        Some(parent) if !parent.is_directory() => Err(FsError::NotADirectory { path: parent_path }),
        parent => Ok(parent),
    }
}

/// Soft-delete `dir` and everything below it, depth first, children before
/// the directory itself.
fn delete_tree(store: &RecordStore<'_>, dir: &Node) -> Result<usize, FsError> {
    let mut deleted = 0;
    let children = store.list(&RecordQuery {
        parent_id: Some(&dir.id),
        node_type: None,
    })?;
    for child in &children {
        if child.is_directory() {
            deleted += delete_tree(store, child)?;
        } else {
            store.soft_delete(child)?;
            deleted += 1;
        }
    }
    store.soft_delete(dir)?;
    Ok(deleted + 1)
}

fn reject_root(path: &str) -> Result<(), FsError> {
    if path::is_root(path) {
        return Err(FsError::InvalidPath {
            path: path.to_string(),
            reason: "the root directory cannot be changed",
        });
    }
    Ok(())
}

impl FsMeta for SqlStorage {
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "exists");
        self.read(|store| Ok(store.count_by_path(&path)? > 0))
    }

    fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, FsError> {
        Ok(self.attributes(path)?.last_modified)
    }

    fn size(&self, path: &str) -> Result<u64, FsError> {
        // Directories report their stored size field; nothing is summed.
        Ok(self.attributes(path)?.size)
    }

    fn url(&self, path: &str) -> Result<String, FsError> {
        let attributes = self.attributes(path)?;
        if self.url.is_empty() {
            return Ok(attributes.path);
        }
        Ok(format!("{}{}", self.url.trim_end_matches('/'), attributes.path))
    }

    fn attributes(&self, path: &str) -> Result<Attributes, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "attributes");
        let node = self.read(|store| store.find_by_path(&path))?;
        node.map(|node| self.attributes_of(&node))
            .ok_or(FsError::NotFound { path })
    }
}

impl FsList for SqlStorage {
    fn directories_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        self.children(dir, Some(FileType::Directory))
    }

    fn files_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        self.children(dir, Some(FileType::File))
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        self.children(dir, None)
    }
}

impl FsWrite for SqlStorage {
    fn directory_create(&self, path: &str) -> Result<(), FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "directory_create");
        self.mutate(|store| {
            if store.count_by_path(&path)? > 0 {
                return Err(FsError::AlreadyExists {
                    path: path.clone(),
                    operation: "directory_create",
                });
            }
            let parent = parent_directory(store, &path)?
                .ok_or_else(|| FsError::ParentNotFound { path: path.clone() })?;
            let directory = Node::directory(&parent, &path::base_name(&path));
            store.create(&directory)?;
            info!(path = %directory.path, "created directory");
            Ok(())
        })
    }

    fn directory_delete(&self, path: &str) -> Result<(), FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "directory_delete");
        self.mutate(|store| {
            let Some(node) = store.find_by_path(&path)? else {
                debug!(path = %path, "directory already absent");
                return Ok(());
            };
            if !node.is_directory() {
                return Err(FsError::NotADirectory { path: path.clone() });
            }
            reject_root(&path)?;
            let deleted = delete_tree(store, &node)?;
            info!(path = %path, deleted, "deleted directory");
            Ok(())
        })
    }

    fn directory_copy(&self, origin: &str, _target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        debug!(path = %origin, "directory_copy");
        let node = self.read(|store| store.find_by_path(&origin))?;
        match node {
            None => Err(FsError::NotFound { path: origin }),
            Some(node) if !node.is_directory() => Err(FsError::NotADirectory { path: origin }),
            Some(_) => Err(FsError::NotImplemented {
                operation: "directory_copy",
            }),
        }
    }

    fn file_copy(&self, origin: &str, target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        let target = path::validate(target)?;
        debug!(from = %origin, to = %target, "file_copy");
        if origin == target {
            return Err(FsError::SamePath { path: origin });
        }
        self.mutate(|store| {
            let source = store
                .find_by_path_with_contents(&origin)?
                .ok_or_else(|| FsError::NotFound {
                    path: origin.clone(),
                })?;
            if !source.is_file() {
                return Err(FsError::NotAFile {
                    path: origin.clone(),
                });
            }
            let contents = source.contents.unwrap_or_default();
            self.write_file(store, &target, contents, Some(source.extension), "file_copy")
        })
    }

    fn file_delete(&self, paths: &[&str]) -> Result<(), FsError> {
        let paths = paths
            .iter()
            .map(|path| path::validate(path))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = paths.len(), "file_delete");
        self.mutate(|store| {
            for path in &paths {
                let Some(node) = store.find_by_path(path)? else {
                    continue;
                };
                if node.is_directory() {
                    reject_root(path)?;
                    delete_tree(store, &node)?;
                } else {
                    store.soft_delete(&node)?;
                }
                info!(path = %path, "deleted");
            }
            Ok(())
        })
    }

    fn file_put(&self, path: &str, content: &[u8]) -> Result<(), FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, size = content.len(), "file_put");
        reject_root(&path)?;
        self.mutate(|store| self.write_file(store, &path, content.to_vec(), None, "file_put"))
    }

    fn move_entry(&self, origin: &str, target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        let target = path::validate(target)?;
        debug!(from = %origin, to = %target, "move_entry");
        if origin == target {
            return Err(FsError::SamePath { path: origin });
        }
        reject_root(&origin)?;
        reject_root(&target)?;

        self.mutate(|store| {
            let mut node = store
                .find_by_path(&origin)?
                .ok_or_else(|| FsError::NotFound {
                    path: origin.clone(),
                })?;
            if node.is_directory() && path::is_within(&target, &origin) {
                return Err(FsError::InvalidPath {
                    path: target.clone(),
                    reason: "a directory cannot move into its own subtree",
                });
            }
            let target_parent = match parent_directory(store, &target) {
                Ok(Some(parent)) => parent,
                Ok(None) => {
                    return Err(FsError::TargetParentNotFound {
                        path: target.clone(),
                    });
                }
                Err(e) => return Err(e),
            };
            if store.count_by_path(&target)? > 0 {
                return Err(FsError::AlreadyExists {
                    path: target.clone(),
                    operation: "move_entry",
                });
            }

            node.parent_id = Some(target_parent.id.clone());
            node.name = path::base_name(&target);
            node.path = path::join(&target_parent.path, &node.name);
            if node.is_file() {
                node.extension = path::extension(&node.name);
            }
            node.updated_at = Utc::now();
            store.update(&node)?;

            let rewritten = if node.is_directory() {
                store.recalculate_paths(&node)?
            } else {
                0
            };
            info!(from = %origin, to = %node.path, rewritten, "moved");
            Ok(())
        })
    }
}

impl FsRead for SqlStorage {
    fn file_read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "file_read");
        let node = self
            .read(|store| store.find_by_path_with_contents(&path))?
            .ok_or_else(|| FsError::NotFound { path: path.clone() })?;
        if !node.is_file() {
            return Err(FsError::NotAFile { path });
        }
        Ok(node.contents.unwrap_or_default())
    }
}
