//! Opening disks from TOML and tracing every call.
//!
//! This example builds a SQL disk and a static disk from one configuration
//! file, wraps the SQL disk in a `TracingLayer`, and runs a few operations.
//!
//! Run with: `FLATFS_LOG=debug cargo run --example basic_usage`

use flatfs::config::DisksConfig;
use flatfs::logging::init_logging;
use flatfs::*;

const DISKS: &str = r#"
default = "media"

[disks.media]
driver = "sql"
url = "https://media.example.com"

[disks.cdn]
driver = "static"
url = "https://cdn.example.com/assets"
"#;

fn main() -> Result<(), FsError> {
    init_logging("info", false)?;

    // =========================================================================
    // Step 1: Open the default disk and layer tracing over it
    // =========================================================================
    let config = DisksConfig::from_toml_str(DISKS)?;
    let media = AnyStorage::open(config.disk(None)?, None)?.layer(TracingLayer::new("media"));

    // =========================================================================
    // Step 2: Build a small tree
    // =========================================================================
    media.directory_create("/reports")?;
    media.directory_create("/reports/2024")?;
    media.file_put("/reports/2024/q3.csv", b"region,total\nnorth,12\n")?;
    media.file_put_string("/reports/README", "Quarterly exports")?;

    for entry in media.list("/reports")? {
        let kind = if media.is_dir(&entry)? { "dir " } else { "file" };
        println!("{kind} {entry}");
    }

    // =========================================================================
    // Step 3: Move a directory; descendants follow
    // =========================================================================
    media.move_entry("/reports/2024", "/reports/archive")?;
    let attributes = media.attributes("/reports/archive/q3.csv")?;
    println!(
        "{} ({} bytes, .{}) -> {}",
        attributes.path,
        attributes.size,
        attributes.extension,
        media.url(&attributes.path)?
    );

    // =========================================================================
    // Step 4: A static disk only knows URLs
    // =========================================================================
    let cdn = AnyStorage::open(config.disk(Some("cdn"))?, None)?;
    println!("{}", cdn.url("/logo.svg")?);
    match cdn.file_read("/logo.svg") {
        Err(FsError::NotSupported { operation }) => println!("cdn: {operation} not supported"),
        other => println!("cdn: unexpected {other:?}"),
    }

    Ok(())
}
