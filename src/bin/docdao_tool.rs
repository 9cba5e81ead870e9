use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use docdao::io::backup_filename;
use docdao::micro::MicroReader;
use docdao::{
    Change, ConstantFilename, Dao, DaoConfig, DaoIo, DataProvider, FileSystemIo, SystemMigrationManager,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Upper bound when probing for numbered backups
const MAX_BACKUP_PROBE: usize = 100;

#[derive(Parser)]
#[command(name = "docdao-tool")]
#[command(about = "Developer tooling for docdao XML files")]
struct Cli {
    /// Log DAO activity (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the root element and the provenance comments of a file
    Inspect { file: PathBuf },
    /// List the numbered backups next to a file
    Backups { file: PathBuf },
    /// Print the results stored in a system migration file
    Migrations {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Replace a file with one of its backups, keeping the current content as `.1`
    Restore {
        file: PathBuf,
        #[arg(long)]
        backup: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Inspect { file } => inspect(&file),
        Command::Backups { file } => list_backups(&file),
        Command::Migrations { file, json } => print_migrations(&file, json),
        Command::Restore { file, backup } => restore(&file, backup),
    }
}

/// Splits a path into an IO rooted at its directory and the bare filename.
fn open_io(file: &Path) -> Result<(Arc<FileSystemIo>, String)> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("'{}' does not name a file", file.display()))?
        .to_string();
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((Arc::new(FileSystemIo::new(dir)), name))
}

fn inspect(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;
    let document =
        MicroReader::read_bytes(&bytes).with_context(|| format!("'{}' is not a valid XML file", file.display()))?;

    println!("File: {}", file.display());
    for comment in document.comments() {
        println!("  <!-- {} -->", comment.trim());
    }
    match document.root() {
        Some(root) => {
            println!("Root element: <{}>", root.name());
            println!("Child elements: {}", root.child_elements().count());
        }
        None => println!("Root element: <none>"),
    }
    Ok(())
}

fn list_backups(file: &Path) -> Result<()> {
    let (io, name) = open_io(file)?;
    let mut found = 0;
    for index in 1..=MAX_BACKUP_PROBE {
        let backup = backup_filename(&name, index);
        if !io.exists(&backup) {
            continue;
        }
        let size = std::fs::metadata(io.path(&backup)).map(|m| m.len()).unwrap_or(0);
        println!("{:>3}  {}  ({} bytes)", index, io.path(&backup).display(), size);
        found += 1;
    }
    if found == 0 {
        println!("No backups of '{}' found", file.display());
    }
    Ok(())
}

fn print_migrations(file: &Path, json: bool) -> Result<()> {
    let (io, name) = open_io(file)?;
    if !io.exists(&name) {
        bail!("Migration file '{}' does not exist", file.display());
    }
    // Read-only: nothing may be written back
    let config = DaoConfig::from_env()?.auto_save(false);
    let manager = SystemMigrationManager::new(name, config, io)?;
    let results = manager.all_migration_results()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No migration results stored");
    }
    for result in &results {
        let status = if result.is_success() { "OK" } else { "FAILED" };
        print!("{:<40} {:<7} {}", result.id(), status, result.executed_at().to_rfc3339());
        match result.error_message() {
            Some(message) => println!("  {}", message),
            None => println!(),
        }
    }
    Ok(())
}

/// Raw text content, used to push restored bytes through the DAO write path.
#[derive(Default)]
struct RawContent {
    text: String,
}

impl DataProvider for RawContent {
    fn read_from_stream(&mut self, input: &mut dyn Read) -> docdao::Result<Change> {
        self.text.clear();
        input.read_to_string(&mut self.text)?;
        Ok(Change::Unchanged)
    }

    fn fill_buffer_for_saving(&self, buffer: &mut String) -> docdao::Result<()> {
        buffer.push_str(&self.text);
        Ok(())
    }

    fn init_for_first_time_usage(&mut self) -> docdao::Result<Change> {
        Ok(Change::Unchanged)
    }
}

fn restore(file: &Path, backup: usize) -> Result<()> {
    if backup == 0 {
        bail!("Backup numbers start at 1");
    }
    let (io, name) = open_io(file)?;
    let backup_name = backup_filename(&name, backup);
    let mut input = io
        .open_input(&backup_name)?
        .ok_or_else(|| anyhow!("Backup '{}' does not exist", io.path(&backup_name).display()))?;
    let mut restored = String::new();
    input
        .read_to_string(&mut restored)
        .with_context(|| format!("Failed to read backup '{}'", backup_name))?;
    MicroReader::read_str(&restored).with_context(|| format!("Backup '{}' is not valid XML", backup_name))?;

    let config = DaoConfig::from_env()?.auto_save(false);
    let dao = Dao::new(ConstantFilename::new(name.clone()), RawContent::default(), config, io.clone());
    dao.modify(|raw| {
        raw.text = restored;
        Change::Changed
    })?;
    dao.write_to_file_on_pending_changes()
        .with_context(|| format!("Failed to restore '{}'", file.display()))?;

    println!("Restored '{}' from backup {}", io.path(&name).display(), backup);
    Ok(())
}
