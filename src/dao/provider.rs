use crate::config::{Charset, DaoConfig};
use crate::core::{Change, Result};
use std::io::Read;

/// Converts the in-memory state of a DAO from and to its stored form.
pub trait DataProvider: Send + Sync {
    /// Replaces the state with the content of `input`.
    fn read_from_stream(&mut self, input: &mut dyn Read) -> Result<Change>;

    /// Appends the serialized state to `buffer`.
    fn fill_buffer_for_saving(&self, buffer: &mut String) -> Result<()>;

    /// Last check before the serialized content replaces the file.
    fn is_content_valid_for_saving(&self, content: &str) -> bool {
        !content.is_empty()
    }

    /// Called instead of reading when no file exists yet.
    fn init_for_first_time_usage(&mut self) -> Result<Change>;

    fn charset(&self) -> Charset {
        Charset::Utf8
    }

    /// The resolved filename differs from the one last written.
    fn on_filename_change(&mut self) {}

    /// Picks up settings when the owning DAO is created.
    fn apply_config(&mut self, _config: &DaoConfig) {}
}
