//! Filename resolution and storage access for DAO files.

pub mod filename;
pub mod fs;
pub mod memory;

use crate::core::{Change, Result};
use std::fmt;
use std::io::Read;

pub use filename::{ConstantFilename, DatedFilename, FilenameProvider, NoFilename};
pub use fs::FileSystemIo;
pub use memory::MemoryIo;

/// Storage backend a DAO reads from and writes to.
///
/// Filenames are logical names; the backend decides where they live.
pub trait DaoIo: Send + Sync + fmt::Debug {
    fn exists(&self, filename: &str) -> bool;

    /// `Ok(None)` when the resource does not exist.
    fn open_input(&self, filename: &str) -> Result<Option<Box<dyn Read + Send>>>;

    /// Moves `from` over `to`. Missing sources are ignored.
    fn rename_file(&self, from: &str, to: &str) -> Result<()>;

    /// Copies `from` over `to`. Missing sources are ignored.
    fn copy_file(&self, from: &str, to: &str) -> Result<()>;

    /// Replaces the whole content of `filename`.
    fn save_file(&self, filename: &str, content: &[u8]) -> Result<()>;

    fn delete_file(&self, filename: &str) -> Result<Change>;

    /// Human readable location, used in log messages and error handlers.
    fn describe(&self, filename: &str) -> String;
}

/// Name of the `index`-th backup of `filename` (`file.xml.1` is the newest).
pub fn backup_filename(filename: &str, index: usize) -> String {
    format!("{}.{}", filename, index)
}
