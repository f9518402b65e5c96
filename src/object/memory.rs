//! In-process [`ObjectStore`] over an ordered map.
//!
//! Keys sort bytewise, listings page in key order and continuation tokens are
//! the last key (or common prefix) returned, which is how S3 behaves from the
//! caller's side.

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::client::{ListPage, ListRequest, ObjectMeta, ObjectStore, ObjectStoreError, PutOptions};
use crate::Visibility;

/// Default listing page size, matching the S3 `ListObjectsV2` cap.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    last_modified: DateTime<Utc>,
    content_type: Option<String>,
    visibility: Visibility,
}

impl StoredObject {
    fn meta(&self, key: &str) -> ObjectMeta {
        ObjectMeta {
            key: key.to_string(),
            size: self.bytes.len() as u64,
            last_modified: self.last_modified,
            content_type: self.content_type.clone(),
        }
    }
}

/// Thread-safe in-memory object store.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    page_size: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    /// Empty store with the default page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Empty store that truncates listings after `page_size` entries.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of stored keys, directory markers included.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Visibility recorded for `key` at its last put.
    pub fn visibility(&self, key: &str) -> Option<Visibility> {
        self.objects.read().get(key).map(|object| object.visibility)
    }

    /// All stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&self, key: &str, bytes: &[u8], options: &PutOptions) -> Result<(), ObjectStoreError> {
        let object = StoredObject {
            bytes: bytes.to_vec(),
            last_modified: Utc::now(),
            content_type: options.content_type.clone(),
            visibility: options.visibility,
        };
        self.objects.write().insert(key.to_string(), object);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.objects
            .read()
            .get(key)
            .map(|object| object.bytes.clone())
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn head(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError> {
        self.objects
            .read()
            .get(key)
            .map(|object| object.meta(key))
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn list(&self, request: &ListRequest) -> Result<ListPage, ObjectStoreError> {
        let objects = self.objects.read();
        let limit = request.max_keys.unwrap_or(self.page_size).max(1);
        let prefix = request.prefix.as_str();
        let delimiter = request.delimiter.as_deref().filter(|d| !d.is_empty());

        let start = match &request.continuation_token {
            Some(token) => Bound::Excluded(token.clone()),
            None => Bound::Included(prefix.to_string()),
        };
        // A token that is itself a common prefix means every key below it was
        // already reported as that prefix. The marker at `prefix` also ends in
        // the delimiter but was reported as an object.
        let skip_below = request
            .continuation_token
            .as_deref()
            .filter(|token| *token != prefix)
            .filter(|token| delimiter.is_some_and(|d| token.ends_with(d)));

        let mut page = ListPage::default();
        let mut emitted = 0;
        let mut last: Option<String> = None;

        for (key, object) in objects.range::<String, _>((start, Bound::Unbounded)) {
            if !key.starts_with(prefix) {
                break;
            }
            if skip_below.is_some_and(|token| key.starts_with(token)) {
                continue;
            }

            let rest = &key[prefix.len()..];
            let grouped = delimiter.and_then(|d| {
                rest.find(d)
                    .map(|at| format!("{prefix}{}", &rest[..at + d.len()]))
            });

            if let Some(common) = grouped {
                if page.common_prefixes.last() == Some(&common) {
                    continue;
                }
                if emitted == limit {
                    page.next_continuation_token = last;
                    return Ok(page);
                }
                last = Some(common.clone());
                page.common_prefixes.push(common);
            } else {
                if emitted == limit {
                    page.next_continuation_token = last;
                    return Ok(page);
                }
                last = Some(key.clone());
                page.objects.push(object.meta(key));
            }
            emitted += 1;
        }
        Ok(page)
    }

    fn delete_batch(&self, keys: &[String]) -> Result<(), ObjectStoreError> {
        let mut objects = self.objects.write();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    fn copy(&self, src: &str, dst: &str) -> Result<(), ObjectStoreError> {
        let mut objects = self.objects.write();
        let mut object = objects
            .get(src)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: src.to_string(),
            })?;
        object.last_modified = Utc::now();
        objects.insert(dst.to_string(), object);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(page_size: usize, keys: &[&str]) -> MemoryObjectStore {
        let store = MemoryObjectStore::with_page_size(page_size);
        for key in keys {
            store.put(key, key.as_bytes(), &PutOptions::default()).unwrap();
        }
        store
    }

    fn object_keys(page: &ListPage) -> Vec<&str> {
        page.objects.iter().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn put_get_head() {
        let store = MemoryObjectStore::new();
        let options = PutOptions {
            content_type: Some("text/plain".into()),
            ..Default::default()
        };
        store.put("a.txt", b"hello", &options).unwrap();

        assert_eq!(store.get("a.txt").unwrap(), b"hello");
        let meta = store.head("a.txt").unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert!(matches!(
            store.get("missing"),
            Err(ObjectStoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delimited_listing_groups_prefixes() {
        let store = seeded(
            100,
            &["docs/", "docs/a.txt", "docs/sub/b.txt", "docs/sub/c.txt", "other.txt"],
        );
        let page = store.list(&ListRequest::delimited("docs/")).unwrap();

        assert_eq!(object_keys(&page), vec!["docs/", "docs/a.txt"]);
        assert_eq!(page.common_prefixes, vec!["docs/sub/"]);
        assert_eq!(page.next_continuation_token, None);
    }

    #[test]
    fn recursive_listing_pages_with_token() {
        let store = seeded(2, &["p/1", "p/2", "p/3", "p/4", "p/5", "q"]);

        let mut seen = Vec::new();
        let mut token = None;
        loop {
            let page = store
                .list(&ListRequest::recursive("p/").after(token))
                .unwrap();
            seen.extend(page.objects.iter().map(|o| o.key.clone()));
            token = page.next_continuation_token;
            if token.is_none() {
                break;
            }
        }
        assert_eq!(seen, vec!["p/1", "p/2", "p/3", "p/4", "p/5"]);
    }

    #[test]
    fn delimited_paging_does_not_repeat_prefixes() {
        let store = seeded(1, &["r/a/1", "r/a/2", "r/b/1", "r/c"]);

        let first = store.list(&ListRequest::delimited("r/")).unwrap();
        assert_eq!(first.common_prefixes, vec!["r/a/"]);

        let second = store
            .list(&ListRequest::delimited("r/").after(first.next_continuation_token))
            .unwrap();
        assert_eq!(second.common_prefixes, vec!["r/b/"]);

        let third = store
            .list(&ListRequest::delimited("r/").after(second.next_continuation_token))
            .unwrap();
        assert_eq!(object_keys(&third), vec!["r/c"]);
        assert_eq!(third.next_continuation_token, None);
    }

    #[test]
    fn delimited_paging_continues_past_marker() {
        let store = seeded(1, &["d/", "d/a.txt", "d/b.txt", "d/sub/", "d/sub/c.txt"]);

        let mut objects = Vec::new();
        let mut prefixes = Vec::new();
        let mut token = None;
        loop {
            let page = store
                .list(&ListRequest::delimited("d/").after(token))
                .unwrap();
            objects.extend(page.objects.iter().map(|o| o.key.clone()));
            prefixes.extend(page.common_prefixes);
            token = page.next_continuation_token;
            if token.is_none() {
                break;
            }
        }
        assert_eq!(objects, vec!["d/", "d/a.txt", "d/b.txt"]);
        assert_eq!(prefixes, vec!["d/sub/"]);
    }

    #[test]
    fn delete_batch_ignores_absent_keys() {
        let store = seeded(10, &["a", "b"]);
        store
            .delete_batch(&["a".to_string(), "zzz".to_string()])
            .unwrap();
        assert_eq!(store.keys(), vec!["b"]);
    }

    #[test]
    fn copy_duplicates_payload() {
        let store = seeded(10, &["src"]);
        store.copy("src", "dst").unwrap();
        assert_eq!(store.get("dst").unwrap(), b"src");
        assert!(matches!(
            store.copy("nope", "x"),
            Err(ObjectStoreError::NotFound { .. })
        ));
    }
}
