//! flatfs CLI Binary
//!
//! Runs one storage operation against a configured disk.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flatfs::config::{Disk, DisksConfig, Driver};
use flatfs::{
    AnyStorage, FsList, FsMeta, FsRead, FsWrite, LayerExt, Storage, StorageExt, TracingLayer,
    logging,
};

#[derive(Debug, Parser)]
#[command(
    name = "flatfs",
    version,
    about = "Hierarchical storage over SQL tables, object stores and static endpoints"
)]
struct Cli {
    /// TOML file with disk definitions.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disk to use (defaults to the config's default disk).
    #[arg(long, global = true)]
    disk: Option<String>,

    /// SQLite database for the implicit disk used without --config.
    #[arg(long, global = true, conflicts_with = "config")]
    database: Option<String>,

    /// Log level, overridden by FLATFS_LOG.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List directories and files.
    Ls {
        #[arg(default_value = "/")]
        dir: String,
    },
    /// List directories only.
    Dirs {
        #[arg(default_value = "/")]
        dir: String,
    },
    /// List files only.
    Files {
        #[arg(default_value = "/")]
        dir: String,
    },
    /// Print a file to stdout.
    Cat { path: String },
    /// Store a local file.
    Put { path: String, local: PathBuf },
    /// Create a directory.
    Mkdir { path: String },
    /// Delete files (directories are removed recursively).
    Rm {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Delete a directory recursively.
    Rmdir { path: String },
    /// Move or rename an entry.
    Mv { origin: String, target: String },
    /// Copy a file.
    Cp { origin: String, target: String },
    /// Show attributes.
    Stat { path: String },
    /// Print the public URL.
    Url { path: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(&cli.log_level, cli.log_json) {
        eprintln!("Error initializing logging: {e}");
        process::exit(1);
    }
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn open_disk(cli: &Cli) -> Result<AnyStorage> {
    let disk = match &cli.config {
        Some(path) => {
            let config = DisksConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.disk(cli.disk.as_deref())?.clone()
        }
        None => Disk {
            name: "local".to_string(),
            driver: Some(Driver::Sql),
            database: cli.database.clone(),
            ..Default::default()
        },
    };
    AnyStorage::open(&disk, None).with_context(|| format!("opening disk {:?}", disk.name))
}

fn run(cli: Cli) -> Result<()> {
    let name = cli.disk.clone().unwrap_or_else(|| "default".to_string());
    let storage = open_disk(&cli)?.layer(TracingLayer::new(name));
    let mut out = std::io::stdout().lock();

    match &cli.command {
        Command::Ls { dir } => print_lines(&mut out, storage.list(dir)?)?,
        Command::Dirs { dir } => print_lines(&mut out, storage.directories_list(dir)?)?,
        Command::Files { dir } => print_lines(&mut out, storage.files_list(dir)?)?,
        Command::Cat { path } => out.write_all(&storage.file_read(path)?)?,
        Command::Put { path, local } => {
            let bytes = std::fs::read(local)
                .with_context(|| format!("reading {}", local.display()))?;
            storage.file_put(path, &bytes)?;
        }
        Command::Mkdir { path } => storage.directory_create(path)?,
        Command::Rm { paths } => {
            let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
            storage.file_delete(&paths)?;
        }
        Command::Rmdir { path } => storage.directory_delete(path)?,
        Command::Mv { origin, target } => storage.move_entry(origin, target)?,
        Command::Cp { origin, target } => copy(&storage, origin, target)?,
        Command::Stat { path } => {
            let attributes = storage.attributes(path)?;
            writeln!(out, "path:          {}", attributes.path)?;
            writeln!(out, "type:          {}", attributes.file_type.as_str())?;
            writeln!(out, "size:          {}", attributes.size)?;
            writeln!(out, "extension:     {}", attributes.extension)?;
            writeln!(out, "last_modified: {}", attributes.last_modified.to_rfc3339())?;
            writeln!(out, "visibility:    {}", attributes.visibility.as_str())?;
            if let Some(mime) = attributes.mime_type {
                writeln!(out, "mime_type:     {mime}")?;
            }
        }
        Command::Url { path } => writeln!(out, "{}", storage.url(path)?)?,
    }
    Ok(())
}

fn copy<S: Storage + ?Sized>(storage: &S, origin: &str, target: &str) -> Result<()> {
    if storage.is_dir(origin)? {
        storage.directory_copy(origin, target)?;
    } else {
        storage.file_copy(origin, target)?;
    }
    Ok(())
}

fn print_lines(out: &mut impl Write, lines: Vec<String>) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
