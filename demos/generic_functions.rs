//! Writing code once against `Storage` and running it on every backend.
//!
//! Run with: `cargo run --example generic_functions`

use std::sync::Arc;

use flatfs::*;

// =============================================================================
// Pattern 1: Generic bound (static dispatch)
// =============================================================================

/// Count files below `dir`, descending into subdirectories.
fn count_files<S: Storage + ?Sized>(fs: &S, dir: &str) -> Result<usize, FsError> {
    let mut count = fs.files_list(dir)?.len();
    for sub in fs.directories_list(dir)? {
        count += count_files(fs, &sub)?;
    }
    Ok(count)
}

/// Copy every file of `dir` (not recursive) into `target`.
fn back_up<S: Storage + ?Sized>(fs: &S, dir: &str, target: &str) -> Result<(), FsError> {
    if fs.missing(target)? {
        fs.directory_create(target)?;
    }
    for file in fs.files_list(dir)? {
        let name = flatfs::path::base_name(&file);
        fs.file_copy(&file, &flatfs::path::join(target, &name))?;
    }
    Ok(())
}

// =============================================================================
// Pattern 2: Trait objects (dynamic dispatch)
// =============================================================================

fn backends() -> Result<Vec<(&'static str, Box<dyn Storage>)>, FsError> {
    let sql = SqlStorage::in_memory(SqlStorageOptions::default())?;
    let object = ObjectStorage::new(Arc::new(MemoryObjectStore::new()));
    Ok(vec![
        ("sql", Box::new(sql) as Box<dyn Storage>),
        ("object", Box::new(object)),
    ])
}

fn main() -> Result<(), FsError> {
    for (name, fs) in backends()? {
        fs.directory_create("/photos")?;
        fs.directory_create("/photos/raw")?;
        fs.file_put("/photos/a.jpg", b"a")?;
        fs.file_put("/photos/b.jpg", b"b")?;
        fs.file_put("/photos/raw/c.cr2", b"c")?;

        back_up(fs.as_ref(), "/photos", "/backup")?;

        println!(
            "{name}: {} photos, {} backed up",
            count_files(fs.as_ref(), "/photos")?,
            count_files(fs.as_ref(), "/backup")?
        );
    }
    Ok(())
}
