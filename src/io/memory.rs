use super::DaoIo;
use crate::core::{Change, DaoError, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory storage, mainly for tests.
///
/// Saves can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryIo {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, filename: &str, content: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut files) = self.files.write() {
            files.insert(filename.to_string(), content.into());
        }
        self
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn content(&self, filename: &str) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(filename).cloned()
    }

    pub fn content_string(&self, filename: &str) -> Option<String> {
        self.content(filename)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn filenames(&self) -> Vec<String> {
        self.files
            .read()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl DaoIo for MemoryIo {
    fn exists(&self, filename: &str) -> bool {
        self.files
            .read()
            .map(|files| files.contains_key(filename))
            .unwrap_or(false)
    }

    fn open_input(&self, filename: &str) -> Result<Option<Box<dyn Read + Send>>> {
        let files = self.files.read()?;
        Ok(files
            .get(filename)
            .map(|bytes| Box::new(Cursor::new(bytes.clone())) as Box<dyn Read + Send>))
    }

    fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let mut files = self.files.write()?;
        if let Some(bytes) = files.remove(from) {
            files.insert(to.to_string(), bytes);
        }
        Ok(())
    }

    fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let mut files = self.files.write()?;
        if let Some(bytes) = files.get(from).cloned() {
            files.insert(to.to_string(), bytes);
        }
        Ok(())
    }

    fn save_file(&self, filename: &str, content: &[u8]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DaoError::IoError(format!("Simulated save failure for '{}'", filename)));
        }
        self.files.write()?.insert(filename.to_string(), content.to_vec());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete_file(&self, filename: &str) -> Result<Change> {
        Ok(Change::from_bool(self.files.write()?.remove(filename).is_some()))
    }

    fn describe(&self, filename: &str) -> String {
        format!("memory:{}", filename)
    }
}
