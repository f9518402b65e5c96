//! # Prefix-Emulated Object Filesystem
//!
//! Directory semantics over a flat key space.
//!
//! ## Responsibility
//! - Map rooted paths to keys (`/a/b.txt` → `a/b.txt`) and prefixes (`/a` → `a/`)
//! - Infer directories from common prefixes at list time
//! - Represent empty directories with zero-byte marker objects
//! - Delete directories page by page through continuation tokens
//!
//! ## Dependencies
//! - An [`ObjectStore`] client, held for the adapter's lifetime
//! - [`crate::path`] for key translation
//!
//! ## Consistency
//!
//! The backing store has no transactions. [`ObjectStorage::file_move`] is
//! copy-then-delete and deletes the copy again if removing the origin fails.
//! A directory delete lists and deletes one page at a time, so keys written
//! under the prefix while it runs may or may not be removed.

mod client;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub use client::{ListPage, ListRequest, ObjectMeta, ObjectStore, ObjectStoreError, PutOptions};
pub use memory::{DEFAULT_PAGE_SIZE, MemoryObjectStore};

use crate::{Attributes, FileType, FsError, FsList, FsMeta, FsRead, FsWrite, Visibility, path};

/// Storage backend over an [`ObjectStore`].
#[derive(Clone)]
pub struct ObjectStorage {
    client: Arc<dyn ObjectStore>,
    url: String,
    visibility: Visibility,
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("url", &self.url)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

impl ObjectStorage {
    /// Wrap a client. URLs are bare rooted paths until [`with_url`](Self::with_url).
    pub fn new(client: Arc<dyn ObjectStore>) -> Self {
        Self {
            client,
            url: String::new(),
            visibility: Visibility::default(),
        }
    }

    /// Base URL used by [`FsMeta::url`].
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Visibility passed with every put.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<dyn ObjectStore> {
        &self.client
    }

    /// Move a single file with a server-side copy followed by a delete.
    ///
    /// If the delete fails the copy is removed again and the delete error is
    /// returned, so a failed move leaves only the origin behind.
    ///
    /// # Errors
    ///
    /// - [`FsError::SamePath`] if `origin` and `target` are equal
    /// - [`FsError::NotFound`] if `origin` does not exist
    pub fn file_move(&self, origin: &str, target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        let target = path::validate(target)?;
        if origin == target {
            return Err(FsError::SamePath { path: origin });
        }
        let (src, dst) = (path::object_key(&origin), path::object_key(&target));
        debug!(from = %origin, to = %target, "file_move");

        self.client.copy(&src, &dst)?;
        if let Err(e) = self.client.delete_batch(std::slice::from_ref(&src)) {
            warn!(from = %origin, to = %target, error = %e, "origin delete failed, removing copy");
            if let Err(undo) = self.client.delete_batch(std::slice::from_ref(&dst)) {
                warn!(path = %target, error = %undo, "could not remove copy");
            }
            return Err(e.into());
        }
        info!(from = %origin, to = %target, "moved file");
        Ok(())
    }

    /// Metadata of the object at `key`, or `None` if absent.
    fn head(&self, key: &str) -> Result<Option<ObjectMeta>, FsError> {
        match self.client.head(key) {
            Ok(meta) => Ok(Some(meta)),
            Err(ObjectStoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether `path` is a directory: a marker object or any key below it.
    fn is_directory(&self, path: &str) -> Result<bool, FsError> {
        if path::is_root(path) {
            return Ok(true);
        }
        let prefix = path::directory_key(path);
        if self.head(&prefix)?.is_some() {
            return Ok(true);
        }
        let mut request = ListRequest::recursive(prefix);
        request.max_keys = Some(1);
        let page = self.client.list(&request)?;
        Ok(!page.objects.is_empty() || !page.common_prefixes.is_empty())
    }

    /// Every page of a listing under `prefix`.
    fn pages(
        &self,
        request: ListRequest,
        mut visit: impl FnMut(ListPage) -> Result<(), FsError>,
    ) -> Result<(), FsError> {
        let mut token = None;
        loop {
            let page = self.client.list(&request.clone().after(token))?;
            token = page.next_continuation_token.clone();
            visit(page)?;
            if token.is_none() {
                return Ok(());
            }
        }
    }

    fn file_attributes(&self, path: &str, meta: ObjectMeta) -> Attributes {
        Attributes {
            file_type: FileType::File,
            path: path.to_string(),
            last_modified: meta.last_modified,
            mime_type: meta.content_type,
            extension: path::extension(path),
            size: meta.size,
            visibility: self.visibility,
        }
    }

    fn directory_attributes(&self, path: &str) -> Result<Attributes, FsError> {
        let marker = self.head(&path::directory_key(path))?;
        Ok(Attributes {
            file_type: FileType::Directory,
            path: path.to_string(),
            last_modified: marker
                .as_ref()
                .map(|meta| meta.last_modified)
                .unwrap_or_default(),
            mime_type: None,
            extension: String::new(),
            size: marker.map(|meta| meta.size).unwrap_or(0),
            visibility: self.visibility,
        })
    }
}

impl FsMeta for ObjectStorage {
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "exists");
        if !path::is_root(&path) && self.head(&path::object_key(&path))?.is_some() {
            return Ok(true);
        }
        self.is_directory(&path)
    }

    fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, FsError> {
        Ok(self.attributes(path)?.last_modified)
    }

    fn size(&self, path: &str) -> Result<u64, FsError> {
        Ok(self.attributes(path)?.size)
    }

    fn url(&self, path: &str) -> Result<String, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "url");
        if self.url.is_empty() {
            return Ok(path);
        }
        Ok(format!(
            "{}/{}",
            self.url.trim_end_matches(path::SEPARATOR),
            path::object_key(&path)
        ))
    }

    fn attributes(&self, path: &str) -> Result<Attributes, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "attributes");
        if !path::is_root(&path) {
            if let Some(meta) = self.head(&path::object_key(&path))? {
                return Ok(self.file_attributes(&path, meta));
            }
        }
        if self.is_directory(&path)? {
            return self.directory_attributes(&path);
        }
        Err(FsError::NotFound { path })
    }
}

impl FsList for ObjectStorage {
    fn directories_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        let dir = path::validate(dir)?;
        debug!(path = %dir, "directories_list");
        let mut directories = Vec::new();
        self.pages(ListRequest::delimited(path::directory_key(&dir)), |page| {
            directories.extend(page.common_prefixes.iter().map(|p| path::from_key(p)));
            Ok(())
        })?;
        directories.sort();
        Ok(directories)
    }

    fn files_list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        let dir = path::validate(dir)?;
        debug!(path = %dir, "files_list");
        let prefix = path::directory_key(&dir);
        let mut files = Vec::new();
        self.pages(ListRequest::delimited(prefix.clone()), |page| {
            files.extend(
                page.objects
                    .iter()
                    .filter(|object| {
                        object.key != prefix && !object.key.ends_with(path::SEPARATOR)
                    })
                    .map(|object| path::from_key(&object.key)),
            );
            Ok(())
        })?;
        files.sort();
        Ok(files)
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, FsError> {
        let mut entries = self.directories_list(dir)?;
        entries.extend(self.files_list(dir)?);
        entries.sort();
        Ok(entries)
    }
}

impl FsWrite for ObjectStorage {
    fn directory_create(&self, path: &str) -> Result<(), FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "directory_create");
        if path::is_root(&path)
            || self.head(&path::object_key(&path))?.is_some()
            || self.head(&path::directory_key(&path))?.is_some()
        {
            return Err(FsError::AlreadyExists {
                path,
                operation: "directory_create",
            });
        }
        let options = PutOptions {
            content_type: None,
            visibility: self.visibility,
        };
        self.client.put(&path::directory_key(&path), &[], &options)?;
        info!(path = %path, "created directory marker");
        Ok(())
    }

    fn directory_delete(&self, path: &str) -> Result<(), FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "directory_delete");
        if path::is_root(&path) {
            return Err(FsError::InvalidPath {
                path,
                reason: "the root directory cannot be changed",
            });
        }
        if self.head(&path::object_key(&path))?.is_some() {
            return Err(FsError::NotADirectory { path });
        }

        let mut deleted = 0;
        let client = &self.client;
        self.pages(ListRequest::recursive(path::directory_key(&path)), |page| {
            if page.objects.is_empty() {
                return Ok(());
            }
            let keys: Vec<String> = page.objects.into_iter().map(|object| object.key).collect();
            client.delete_batch(&keys)?;
            deleted += keys.len();
            Ok(())
        })?;

        if deleted == 0 {
            debug!(path = %path, "directory already absent");
        } else {
            info!(path = %path, deleted, "deleted directory");
        }
        Ok(())
    }

    fn directory_copy(&self, origin: &str, _target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        debug!(path = %origin, "directory_copy");
        if !path::is_root(&origin) && self.head(&path::object_key(&origin))?.is_some() {
            return Err(FsError::NotADirectory { path: origin });
        }
        Err(FsError::NotImplemented {
            operation: "directory_copy",
        })
    }

    fn file_copy(&self, origin: &str, target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        let target = path::validate(target)?;
        debug!(from = %origin, to = %target, "file_copy");
        if origin == target {
            return Err(FsError::SamePath { path: origin });
        }
        if self.head(&path::object_key(&origin))?.is_none() {
            return Err(if self.is_directory(&origin)? {
                FsError::NotAFile { path: origin }
            } else {
                FsError::NotFound { path: origin }
            });
        }
        self.client
            .copy(&path::object_key(&origin), &path::object_key(&target))?;
        debug!(from = %origin, to = %target, "copied file");
        Ok(())
    }

    fn file_delete(&self, paths: &[&str]) -> Result<(), FsError> {
        let paths = paths
            .iter()
            .map(|path| path::validate(path))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = paths.len(), "file_delete");

        let mut keys = Vec::with_capacity(paths.len());
        for path in &paths {
            let key = path::object_key(path);
            if !path::is_root(path) && self.head(&key)?.is_some() {
                keys.push(key);
            } else if self.is_directory(path)? {
                self.directory_delete(path)?;
            }
        }
        if !keys.is_empty() {
            self.client.delete_batch(&keys)?;
            info!(count = keys.len(), "deleted files");
        }
        Ok(())
    }

    fn file_put(&self, path: &str, content: &[u8]) -> Result<(), FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, size = content.len(), "file_put");
        if path::is_root(&path) {
            return Err(FsError::InvalidPath {
                path,
                reason: "the root directory cannot be changed",
            });
        }
        let options = PutOptions {
            content_type: None,
            visibility: self.visibility,
        };
        self.client.put(&path::object_key(&path), content, &options)?;
        Ok(())
    }

    fn move_entry(&self, origin: &str, target: &str) -> Result<(), FsError> {
        let origin = path::validate(origin)?;
        let target = path::validate(target)?;
        debug!(from = %origin, to = %target, "move_entry");
        if origin == target {
            return Err(FsError::SamePath { path: origin });
        }
        Err(FsError::NotImplemented {
            operation: "move_entry",
        })
    }
}

impl FsRead for ObjectStorage {
    fn file_read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let path = path::validate(path)?;
        debug!(path = %path, "file_read");
        if !path::is_root(&path) {
            match self.client.get(&path::object_key(&path)) {
                Ok(bytes) => return Ok(bytes),
                Err(ObjectStoreError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        if self.is_directory(&path)? {
            return Err(FsError::NotAFile { path });
        }
        Err(FsError::NotFound { path })
    }
}
