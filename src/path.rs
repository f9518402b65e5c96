//! # Path Model
//!
//! Pure functions over separator-delimited virtual paths.
//!
//! ## Responsibility
//! - Normalize caller-supplied paths into one canonical rooted form
//! - Derive parent paths, base names and extensions
//! - Translate between rooted paths and object-store keys/prefixes
//!
//! ## Dependencies
//! - None, apart from [`FsError`] for [`validate`]. Every other function is
//!   total: empty input yields empty output.
//!
//! ## Canonical Form
//!
//! ```text
//! "./a//b/"  ──normalize──▶  "/a/b"          (rooted, no trailing separator)
//! "/a/b"     ──directory_key──▶  "a/b/"      (object-store prefix)
//! "/a/b.txt" ──object_key──▶  "a/b.txt"      (object-store key)
//! "/"        ──directory_key──▶  ""          (bucket root)
//! ```
//!
//! Every backend funnels its paths through this module, so the SQL tree and
//! the prefix-emulated object store agree on what a path means.

use crate::FsError;

/// Path separator used by every backend.
pub const SEPARATOR: char = '/';

/// The root path.
pub const ROOT: &str = "/";

/// Normalize a path into its canonical rooted form.
///
/// Strips leading `./` and `.` segments, collapses repeated separators,
/// roots relative paths at `/` and drops any trailing separator (except on
/// the root itself). `..` segments are kept verbatim; see
/// [`has_parent_segments`].
///
/// # Example
///
/// ```rust
/// use flatfs::path::normalize;
///
/// assert_eq!(normalize("./docs//notes/"), "/docs/notes");
/// assert_eq!(normalize("docs"), "/docs");
/// assert_eq!(normalize("."), "/");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let segments: Vec<&str> = segments(path).collect();
    if segments.is_empty() {
        return ROOT.to_string();
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in segments {
        normalized.push(SEPARATOR);
        normalized.push_str(segment);
    }
    normalized
}

/// Path of the directory containing `path`, rooted.
///
/// The root is its own parent.
///
/// ```rust
/// use flatfs::path::parent_path;
///
/// assert_eq!(parent_path("/a/b/c.txt"), "/a/b");
/// assert_eq!(parent_path("a"), "/");
/// assert_eq!(parent_path("/"), "/");
/// ```
pub fn parent_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let normalized = normalize(path);
    match normalized.rfind(SEPARATOR) {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => normalized[..idx].to_string(),
    }
}

/// Last segment of `path`, or an empty string for the root.
pub fn base_name(path: &str) -> String {
    segments(path).last().unwrap_or_default().to_string()
}

/// Text after the first `.` of the base name, or empty if there is none.
///
/// ```rust
/// use flatfs::path::extension;
///
/// assert_eq!(extension("/reports/q1.csv"), "csv");
/// assert_eq!(extension("archive.tar.gz"), "tar.gz");
/// assert_eq!(extension("/README"), "");
/// ```
pub fn extension(path: &str) -> String {
    let name = base_name(path);
    match name.split_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => String::new(),
    }
}

/// Append `name` to the directory `parent` and normalize the result.
///
/// Building a child path this way (rather than trusting the caller's raw
/// string) keeps stored paths consistent with the tree.
pub fn join(parent: &str, name: &str) -> String {
    let mut joined = String::with_capacity(parent.len() + name.len() + 1);
    joined.push_str(parent);
    joined.push(SEPARATOR);
    joined.push_str(name);
    normalize(&joined)
}

/// Returns `true` if `path` normalizes to the root.
pub fn is_root(path: &str) -> bool {
    !path.is_empty() && segments(path).next().is_none()
}

/// Returns `true` if `path` contains a `..` segment.
pub fn has_parent_segments(path: &str) -> bool {
    segments(path).any(|segment| segment == "..")
}

/// Returns `true` if `path` lies strictly below `ancestor`.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let path = normalize(path);
    let ancestor = normalize(ancestor);
    if path.is_empty() || ancestor.is_empty() || path == ancestor {
        return false;
    }
    if ancestor == ROOT {
        return true;
    }
    path.strip_prefix(&ancestor)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Object-store prefix for a directory: no leading separator, one trailing
/// separator. The root maps to the empty prefix.
///
/// ```rust
/// use flatfs::path::directory_key;
///
/// assert_eq!(directory_key("./photos"), "photos/");
/// assert_eq!(directory_key("/photos/2024/"), "photos/2024/");
/// assert_eq!(directory_key("/"), "");
/// ```
pub fn directory_key(path: &str) -> String {
    let key = object_key(path);
    if key.is_empty() {
        key
    } else {
        key + "/"
    }
}

/// Object-store key for a file: the normalized path without its leading separator.
pub fn object_key(path: &str) -> String {
    let normalized = normalize(path);
    normalized
        .strip_prefix(SEPARATOR)
        .unwrap_or(&normalized)
        .to_string()
}

/// Rooted path for an object-store key or common prefix.
///
/// Directory markers and common prefixes lose their trailing separator.
pub fn from_key(key: &str) -> String {
    normalize(&format!("{SEPARATOR}{key}"))
}

/// Normalize a caller path and reject the forms no backend can address:
/// the empty path and paths with `..` segments.
///
/// # Errors
///
/// - [`FsError::InvalidPath`] for empty input or parent traversal
pub fn validate(raw: &str) -> Result<String, FsError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Err(FsError::InvalidPath {
            path: raw.to_string(),
            reason: "empty path",
        });
    }
    if has_parent_segments(&normalized) {
        return Err(FsError::InvalidPath {
            path: raw.to_string(),
            reason: "parent segments are not allowed",
        });
    }
    Ok(normalized)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_dot_prefixes() {
        assert_eq!(normalize("./a/b"), "/a/b");
        assert_eq!(normalize("."), "/");
        assert_eq!(normalize("./"), "/");
    }

    #[test]
    fn normalize_roots_relative_paths() {
        assert_eq!(normalize("a"), "/a");
        assert_eq!(normalize("a/b.txt"), "/a/b.txt");
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("//a///b//"), "/a/b");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn normalize_keeps_hidden_names() {
        assert_eq!(normalize("/.config/app"), "/.config/app");
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(parent_path(""), "");
        assert_eq!(base_name(""), "");
        assert_eq!(extension(""), "");
    }

    #[test]
    fn parent_path_handles_depths() {
        assert_eq!(parent_path("/a/b/c"), "/a/b");
        assert_eq!(parent_path("/a"), "/");
        assert_eq!(parent_path("a/b/"), "/a");
    }

    #[test]
    fn base_name_is_last_segment() {
        assert_eq!(base_name("/a/b/c.txt"), "c.txt");
        assert_eq!(base_name("/a/b/"), "b");
        assert_eq!(base_name("/"), "");
    }

    #[test]
    fn extension_after_first_dot() {
        assert_eq!(extension("/x/photo.jpeg"), "jpeg");
        assert_eq!(extension("/x/a.tar.gz"), "tar.gz");
        assert_eq!(extension("/x/Makefile"), "");
        assert_eq!(extension("/x.d/Makefile"), "");
    }

    #[test]
    fn join_normalizes() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
        assert_eq!(join("/a/", "/b"), "/a/b");
    }

    #[test]
    fn is_within_detects_descendants() {
        assert!(is_within("/a/b", "/a"));
        assert!(is_within("/a/b/c", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(!is_within("/a", "/a"));
        assert!(is_within("/a", "/"));
        assert!(!is_within("/", "/"));
    }

    #[test]
    fn parent_segments_detected() {
        assert!(has_parent_segments("/a/../b"));
        assert!(!has_parent_segments("/a/..b"));
    }

    #[test]
    fn keys_round_trip_through_paths() {
        assert_eq!(object_key("/a/b.txt"), "a/b.txt");
        assert_eq!(directory_key("a"), "a/");
        assert_eq!(directory_key(""), "");
        assert_eq!(from_key("a/b/"), "/a/b");
        assert_eq!(from_key("a/b.txt"), "/a/b.txt");
        assert_eq!(from_key(""), "/");
    }

    #[test]
    fn validate_rejects_empty_and_traversal() {
        assert_eq!(validate("./a/").unwrap(), "/a");
        assert!(matches!(validate(""), Err(FsError::InvalidPath { .. })));
        assert!(matches!(
            validate("/a/../etc"),
            Err(FsError::InvalidPath { .. })
        ));
    }

    #[test]
    fn is_root_only_for_root_forms() {
        assert!(is_root("/"));
        assert!(is_root("./"));
        assert!(!is_root(""));
        assert!(!is_root("/a"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(path in "[a-z./]{0,24}") {
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalized_paths_are_rooted(path in "[a-z./]{1,24}") {
            let normalized = normalize(&path);
            prop_assert!(normalized.starts_with('/'));
            prop_assert!(normalized == "/" || !normalized.ends_with('/'));
        }

        #[test]
        fn join_of_parent_and_base_restores_path(path in "(/[a-z]{1,6}){1,5}") {
            prop_assert_eq!(join(&parent_path(&path), &base_name(&path)), normalize(&path));
        }

        #[test]
        fn directory_key_ends_with_separator(path in "(/[a-z]{1,6}){1,5}") {
            let key = directory_key(&path);
            prop_assert!(key.ends_with('/'));
            prop_assert!(!key.starts_with('/'));
            prop_assert_eq!(from_key(&key), normalize(&path));
        }
    }
}
