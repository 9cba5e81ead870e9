use chrono::Utc;
use std::fmt;

/// Resolves the logical filename of a DAO.
///
/// `None` means the DAO works in memory only.
pub trait FilenameProvider: Send + Sync + fmt::Debug {
    fn filename(&self) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantFilename(String);

impl ConstantFilename {
    pub fn new(filename: impl Into<String>) -> Self {
        Self(filename.into())
    }
}

impl FilenameProvider for ConstantFilename {
    fn filename(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilename;

impl FilenameProvider for NoFilename {
    fn filename(&self) -> Option<String> {
        None
    }
}

/// One file per UTC day below a base directory: `<base>/<yyyy-mm-dd>.xml`.
///
/// An empty base directory yields no filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedFilename {
    base_dir: String,
}

impl DatedFilename {
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }
}

impl FilenameProvider for DatedFilename {
    fn filename(&self) -> Option<String> {
        if self.base_dir.is_empty() {
            return None;
        }
        let date = Utc::now().format("%Y-%m-%d");
        let base = self.base_dir.trim_end_matches('/');
        Some(format!("{}/{}.xml", base, date))
    }
}
