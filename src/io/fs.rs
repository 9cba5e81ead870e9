use super::DaoIo;
use crate::core::{Change, DaoError, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Files below a base directory.
#[derive(Debug, Clone)]
pub struct FileSystemIo {
    base_dir: PathBuf,
}

impl FileSystemIo {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DaoError::IoError(format!("Failed to create directory '{}': {}", parent.display(), e))
            })?;
        }
        Ok(())
    }
}

impl DaoIo for FileSystemIo {
    fn exists(&self, filename: &str) -> bool {
        self.path(filename).is_file()
    }

    fn open_input(&self, filename: &str) -> Result<Option<Box<dyn Read + Send>>> {
        let path = self.path(filename);
        if path.is_dir() {
            return Err(DaoError::IllegalArgument(format!(
                "'{}' is a directory and not a file",
                path.display()
            )));
        }
        match File::open(&path) {
            Ok(file) => Ok(Some(Box::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DaoError::IoError(format!("Failed to open '{}': {}", path.display(), e))),
        }
    }

    fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let from_path = self.path(from);
        if !from_path.exists() {
            return Ok(());
        }
        let to_path = self.path(to);
        fs::rename(&from_path, &to_path).map_err(|e| {
            DaoError::IoError(format!(
                "Failed to rename '{}' to '{}': {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })
    }

    fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let from_path = self.path(from);
        if !from_path.exists() {
            return Ok(());
        }
        let to_path = self.path(to);
        fs::copy(&from_path, &to_path).map(|_| ()).map_err(|e| {
            DaoError::IoError(format!(
                "Failed to copy '{}' to '{}': {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })
    }

    fn save_file(&self, filename: &str, content: &[u8]) -> Result<()> {
        let path = self.path(filename);
        self.ensure_parent(&path)?;
        let dir = path.parent().unwrap_or(&self.base_dir);
        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| DaoError::IoError(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(content)
            .map_err(|e| DaoError::IoError(format!("Failed to write '{}': {}", path.display(), e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| DaoError::IoError(format!("Failed to sync '{}': {}", path.display(), e)))?;
        temp.persist(&path)
            .map_err(|e| DaoError::IoError(format!("Failed to replace '{}': {}", path.display(), e)))?;
        Ok(())
    }

    fn delete_file(&self, filename: &str) -> Result<Change> {
        let path = self.path(filename);
        match fs::remove_file(&path) {
            Ok(()) => Ok(Change::Changed),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Change::Unchanged),
            Err(e) => Err(DaoError::IoError(format!("Failed to delete '{}': {}", path.display(), e))),
        }
    }

    fn describe(&self, filename: &str) -> String {
        self.path(filename).display().to_string()
    }
}
