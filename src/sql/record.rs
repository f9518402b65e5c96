//! Record store adapter: a minimal CRUD/query façade over one SQLite table of
//! path-indexed nodes linked by parent-id pointers.
//!
//! The adapter borrows a connection (usually an open transaction) and never
//! commits on its own; the caller decides the transaction scope.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::{FileType, FsError, path};

const META_COLUMNS: &str =
    "id, parent_id, name, path, node_type, size, extension, created_at, updated_at, deleted_at";

/// A persisted file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Store-assigned identity.
    pub id: String,
    /// Identity of the containing directory; `None` only for the root.
    pub parent_id: Option<String>,
    /// Leaf segment.
    pub name: String,
    /// Full normalized path, kept in step with the ancestor chain.
    pub path: String,
    /// Directory or file.
    pub node_type: FileType,
    /// File payload. `None` for directories and for rows loaded without contents.
    pub contents: Option<Vec<u8>>,
    /// Stored byte length.
    pub size: u64,
    /// Extension derived from `name`.
    pub extension: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Tombstone marker; `None` while live.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Node {
    /// New directory node under `parent`. The path comes from the parent's
    /// stored path, not from any caller-supplied string.
    pub fn directory(parent: &Node, name: &str) -> Self {
        Self::child(parent, name, FileType::Directory)
    }

    /// New file node under `parent` holding `contents`.
    pub fn file(parent: &Node, name: &str, contents: Vec<u8>) -> Self {
        let mut node = Self::child(parent, name, FileType::File);
        node.extension = path::extension(name);
        node.size = contents.len() as u64;
        node.contents = Some(contents);
        node
    }

    fn root() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            name: String::new(),
            path: path::ROOT.to_string(),
            node_type: FileType::Directory,
            contents: None,
            size: 0,
            extension: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn child(parent: &Node, name: &str, node_type: FileType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: Some(parent.id.clone()),
            name: name.to_string(),
            path: path::join(&parent.path, name),
            node_type,
            contents: None,
            size: 0,
            extension: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns `true` if this node is a directory.
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.node_type == FileType::Directory
    }

    /// Returns `true` if this node is a file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.node_type == FileType::File
    }
}

/// Filter for [`RecordStore::list`]. Results are always live rows ordered
/// by path ascending.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordQuery<'q> {
    /// Only children of this node.
    pub parent_id: Option<&'q str>,
    /// Only nodes of this type.
    pub node_type: Option<FileType>,
}

/// CRUD façade over the node table.
pub struct RecordStore<'c> {
    conn: &'c Connection,
    table: &'c str,
}

impl<'c> RecordStore<'c> {
    /// Wrap a connection (or transaction) and a validated table name.
    pub fn new(conn: &'c Connection, table: &'c str) -> Self {
        Self { conn, table }
    }

    /// Create the table, its indexes and the root node if they are missing.
    pub fn migrate(&self) -> Result<(), FsError> {
        let table = self.table;
        self.conn.execute_batch(&format!(
            r#"
CREATE TABLE IF NOT EXISTS {table} (
    id TEXT PRIMARY KEY,
    parent_id TEXT,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    node_type TEXT NOT NULL,
    contents TEXT,
    size INTEGER NOT NULL DEFAULT 0,
    extension TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_{table}_parent ON {table}(parent_id, node_type);
CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_live_path ON {table}(path) WHERE deleted_at IS NULL;
"#
        ))?;

        if self.find_by_path(path::ROOT)?.is_none() {
            self.create(&Node::root())?;
            tracing::info!(table, "created root directory node");
        }
        Ok(())
    }

    /// Insert a node.
    pub fn create(&self, node: &Node) -> Result<(), FsError> {
        let contents = node.contents.as_deref().map(|bytes| BASE64.encode(bytes));
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, parent_id, name, path, node_type, contents, size, extension, created_at, updated_at, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                self.table
            ),
            params![
                node.id,
                node.parent_id,
                node.name,
                node.path,
                node.node_type.as_str(),
                contents,
                size_to_sql(node.size),
                node.extension,
                node.created_at,
                node.updated_at,
                node.deleted_at,
            ],
        )?;
        Ok(())
    }

    /// Live node at `path`, without its contents.
    pub fn find_by_path(&self, path: &str) -> Result<Option<Node>, FsError> {
        let sql = format!(
            "SELECT {META_COLUMNS} FROM {} WHERE path = ?1 AND deleted_at IS NULL LIMIT 1",
            self.table
        );
        Ok(self
            .conn
            .query_row(&sql, params![path], node_from_row)
            .optional()?)
    }

    /// Live node at `path`, with its contents decoded.
    pub fn find_by_path_with_contents(&self, path: &str) -> Result<Option<Node>, FsError> {
        let sql = format!(
            "SELECT {META_COLUMNS}, contents FROM {} WHERE path = ?1 AND deleted_at IS NULL LIMIT 1",
            self.table
        );
        let row = self
            .conn
            .query_row(&sql, params![path], |row| {
                let node = node_from_row(row)?;
                let encoded: Option<String> = row.get(10)?;
                Ok((node, encoded))
            })
            .optional()?;

        let Some((mut node, encoded)) = row else {
            return Ok(None);
        };
        if let Some(encoded) = encoded {
            let bytes = BASE64.decode(encoded).map_err(|e| FsError::InvalidData {
                path: node.path.clone(),
                details: e.to_string(),
            })?;
            node.contents = Some(bytes);
        }
        Ok(Some(node))
    }

    /// Live node with identity `id`, without its contents.
    ///
    /// [`SqlStorage`](crate::SqlStorage) resolves everything by path; this is
    /// for callers following `parent_id` links through the table.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Node>, FsError> {
        let sql = format!(
            "SELECT {META_COLUMNS} FROM {} WHERE id = ?1 AND deleted_at IS NULL",
            self.table
        );
        Ok(self
            .conn
            .query_row(&sql, params![id], node_from_row)
            .optional()?)
    }

    /// Live nodes matching `query`, ordered by path ascending, without contents.
    pub fn list(&self, query: &RecordQuery<'_>) -> Result<Vec<Node>, FsError> {
        let sql = format!(
            "SELECT {META_COLUMNS} FROM {}
             WHERE deleted_at IS NULL
               AND (?1 IS NULL OR parent_id = ?1)
               AND (?2 IS NULL OR node_type = ?2)
             ORDER BY path ASC",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![query.parent_id, query.node_type.map(|t| t.as_str())],
            node_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of live nodes at `path`.
    pub fn count_by_path(&self, path: &str) -> Result<u64, FsError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE path = ?1 AND deleted_at IS NULL",
            self.table
        );
        let count: i64 = self.conn.query_row(&sql, params![path], |row| row.get(0))?;
        Ok(size_from_sql(count))
    }

    /// Persist a node's placement and metadata. Contents are only rewritten
    /// when the node carries them.
    pub fn update(&self, node: &Node) -> Result<(), FsError> {
        let contents = node.contents.as_deref().map(|bytes| BASE64.encode(bytes));
        self.conn.execute(
            &format!(
                "UPDATE {} SET parent_id = ?2, name = ?3, path = ?4, size = ?5, extension = ?6,
                    updated_at = ?7, contents = COALESCE(?8, contents)
                 WHERE id = ?1",
                self.table
            ),
            params![
                node.id,
                node.parent_id,
                node.name,
                node.path,
                size_to_sql(node.size),
                node.extension,
                node.updated_at,
                contents,
            ],
        )?;
        Ok(())
    }

    /// Mark a node deleted. The row stays behind as a tombstone.
    pub fn soft_delete(&self, node: &Node) -> Result<(), FsError> {
        self.conn.execute(
            &format!(
                "UPDATE {} SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
                self.table
            ),
            params![node.id, Utc::now()],
        )?;
        Ok(())
    }

    /// Rewrite the stored path of every live descendant of `node` from the
    /// node's current path. Returns the number of rows rewritten.
    pub fn recalculate_paths(&self, node: &Node) -> Result<usize, FsError> {
        let mut rewritten = 0;
        let mut pending = vec![node.clone()];

        while let Some(parent) = pending.pop() {
            let children = self.list(&RecordQuery {
                parent_id: Some(&parent.id),
                node_type: None,
            })?;
            for mut child in children {
                child.path = path::join(&parent.path, &child.name);
                self.conn.execute(
                    &format!("UPDATE {} SET path = ?2 WHERE id = ?1", self.table),
                    params![child.id, child.path],
                )?;
                rewritten += 1;
                if child.is_directory() {
                    pending.push(child);
                }
            }
        }
        Ok(rewritten)
    }
}

/// Reject table names that are not plain SQL identifiers.
pub fn validate_table_name(table: &str) -> Result<(), FsError> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(FsError::InvalidConfig {
            field: "table",
            reason: format!("not a valid table name: {table:?}"),
        })
    }
}

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    let type_name: String = row.get(4)?;
    let node_type = FileType::parse(&type_name).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown node type {type_name:?}").into(),
        )
    })?;
    let size: i64 = row.get(5)?;

    Ok(Node {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        name: row.get(2)?,
        path: row.get(3)?,
        node_type,
        contents: None,
        size: size_from_sql(size),
        extension: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        deleted_at: row.get(9)?,
    })
}

fn size_to_sql(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

fn size_from_sql(size: i64) -> u64 {
    u64::try_from(size).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(conn: &Connection) -> RecordStore<'_> {
        let store = RecordStore::new(conn, "filestore");
        store.migrate().unwrap();
        store
    }

    fn root(store: &RecordStore<'_>) -> Node {
        store.find_by_path("/").unwrap().unwrap()
    }

    #[test]
    fn migrate_creates_root_once() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        store.migrate().unwrap();

        assert_eq!(store.count_by_path("/").unwrap(), 1);
        let root = root(&store);
        assert!(root.is_directory());
        assert_eq!(root.parent_id, None);
    }

    #[test]
    fn directory_path_comes_from_parent() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let docs = Node::directory(&root(&store), "docs");
        assert_eq!(docs.path, "/docs");

        let nested = Node::directory(&docs, "2024");
        assert_eq!(nested.path, "/docs/2024");
    }

    #[test]
    fn file_contents_survive_encoding() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let payload = vec![0u8, 159, 146, 150, 255, b'\n'];
        let file = Node::file(&root(&store), "blob.bin", payload.clone());
        store.create(&file).unwrap();

        let loaded = store.find_by_path_with_contents("/blob.bin").unwrap().unwrap();
        assert_eq!(loaded.contents, Some(payload));
        assert_eq!(loaded.size, 6);
        assert_eq!(loaded.extension, "bin");

        let meta_only = store.find_by_path("/blob.bin").unwrap().unwrap();
        assert_eq!(meta_only.contents, None);
    }

    #[test]
    fn list_filters_by_parent_and_type() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let root = root(&store);
        let b = Node::directory(&root, "b");
        let a = Node::file(&root, "a.txt", b"a".to_vec());
        store.create(&b).unwrap();
        store.create(&a).unwrap();
        store.create(&Node::file(&b, "inner.txt", vec![])).unwrap();

        let all = store
            .list(&RecordQuery {
                parent_id: Some(&root.id),
                node_type: None,
            })
            .unwrap();
        let paths: Vec<_> = all.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["/a.txt", "/b"]);

        let dirs = store
            .list(&RecordQuery {
                parent_id: Some(&root.id),
                node_type: Some(FileType::Directory),
            })
            .unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].path, "/b");
    }

    #[test]
    fn soft_delete_hides_but_keeps_row() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let file = Node::file(&root(&store), "gone.txt", b"x".to_vec());
        store.create(&file).unwrap();
        store.soft_delete(&file).unwrap();

        assert!(store.find_by_path("/gone.txt").unwrap().is_none());
        assert!(store.find_by_id(&file.id).unwrap().is_none());
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM filestore WHERE id = ?1", [&file.id], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn live_path_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let root = root(&store);
        store.create(&Node::file(&root, "dup.txt", vec![])).unwrap();
        let err = store.create(&Node::file(&root, "dup.txt", vec![]));
        assert!(matches!(err, Err(FsError::Database(_))));
    }

    #[test]
    fn parent_links_resolve_to_root() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let dir = Node::directory(&root(&store), "docs");
        let file = Node::file(&dir, "a.txt", b"a".to_vec());
        store.create(&dir).unwrap();
        store.create(&file).unwrap();

        let mut chain = Vec::new();
        let mut next = file.parent_id.clone();
        while let Some(id) = next {
            let node = store.find_by_id(&id).unwrap().unwrap();
            chain.push(node.path.clone());
            next = node.parent_id;
        }
        assert_eq!(chain, vec!["/docs", "/"]);
    }

    #[test]
    fn recalculate_paths_rewrites_descendants() {
        let conn = Connection::open_in_memory().unwrap();
        let store = store(&conn);
        let root = root(&store);
        let mut a = Node::directory(&root, "a");
        let sub = Node::directory(&a, "sub");
        let leaf = Node::file(&sub, "leaf.txt", b"leaf".to_vec());
        store.create(&a).unwrap();
        store.create(&sub).unwrap();
        store.create(&leaf).unwrap();

        a.name = "renamed".into();
        a.path = "/renamed".into();
        store.update(&a).unwrap();
        let rewritten = store.recalculate_paths(&a).unwrap();

        assert_eq!(rewritten, 2);
        assert!(store.find_by_path("/renamed/sub").unwrap().is_some());
        assert!(store.find_by_path("/renamed/sub/leaf.txt").unwrap().is_some());
        assert!(store.find_by_path("/a/sub").unwrap().is_none());
    }

    #[test]
    fn table_names_are_validated() {
        assert!(validate_table_name("filestore").is_ok());
        assert!(validate_table_name("_fs_2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2fs").is_err());
        assert!(validate_table_name("fs; DROP TABLE x").is_err());
    }
}
