use crate::core::{DaoError, Result};
use std::env;

/// Character set used when encoding a DAO file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Iso8859_1,
}

impl Charset {
    /// Name as written into the XML declaration
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
        }
    }

    pub fn can_encode(&self, c: char) -> bool {
        match self {
            Charset::Utf8 => true,
            Charset::Iso8859_1 => (c as u32) < 0x100,
        }
    }

    /// True if [`Charset::encode`] keeps every character of `content`.
    pub fn can_encode_all(&self, content: &str) -> bool {
        content.chars().all(|c| self.can_encode(c))
    }

    /// Characters outside the charset become `?`; check [`Charset::can_encode_all`] first.
    pub fn encode(&self, content: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => content.as_bytes().to_vec(),
            Charset::Iso8859_1 => content
                .chars()
                .map(|c| if (c as u32) < 0x100 { c as u32 as u8 } else { b'?' })
                .collect(),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| DaoError::Xml(format!("Invalid UTF-8 content: {}", e))),
            Charset::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// DAO configuration
///
/// Controls backup rotation, auto-save and debug checks of a [`crate::dao::Dao`].
#[derive(Debug, Clone)]
pub struct DaoConfig {
    /// Number of numbered backups kept next to the file (`file.1` is the newest)
    pub backup_count: usize,

    /// Write immediately on every change
    pub auto_save: bool,

    /// Re-parse serialized content before writing and log file access
    pub debug: bool,

    /// Encoding of the written file
    pub charset: Charset,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DaoConfig {
    pub const DEFAULT_BACKUP_COUNT: usize = 3;
    pub const DEFAULT_AUTO_SAVE: bool = true;

    const ENV_BACKUP_COUNT: &'static str = "DOCDAO_BACKUP_COUNT";
    const ENV_AUTO_SAVE: &'static str = "DOCDAO_AUTO_SAVE";
    const ENV_DEBUG: &'static str = "DOCDAO_DEBUG";

    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            backup_count: Self::DEFAULT_BACKUP_COUNT,
            auto_save: Self::DEFAULT_AUTO_SAVE,
            debug: false,
            charset: Charset::Utf8,
        }
    }

    /// Defaults overlaid with `DOCDAO_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();
        if let Ok(raw) = env::var(Self::ENV_BACKUP_COUNT) {
            config.backup_count = raw.trim().parse().map_err(|_| {
                DaoError::IllegalArgument(format!(
                    "{} must be a non-negative integer, got '{}'",
                    Self::ENV_BACKUP_COUNT,
                    raw
                ))
            })?;
        }
        if let Ok(raw) = env::var(Self::ENV_AUTO_SAVE) {
            config.auto_save = parse_bool(Self::ENV_AUTO_SAVE, &raw)?;
        }
        if let Ok(raw) = env::var(Self::ENV_DEBUG) {
            config.debug = parse_bool(Self::ENV_DEBUG, &raw)?;
        }
        Ok(config)
    }

    /// Set the number of backups
    pub fn backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    /// Enable or disable auto-save
    pub fn auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Enable or disable debug checks
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the file charset
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DaoError::IllegalArgument(format!(
            "{} must be a boolean, got '{}'",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaoConfig::new();
        assert_eq!(config.backup_count, 3);
        assert!(config.auto_save);
        assert!(!config.debug);
        assert_eq!(config.charset, Charset::Utf8);
    }

    #[test]
    fn test_builder() {
        let config = DaoConfig::new()
            .backup_count(0)
            .auto_save(false)
            .debug(true)
            .charset(Charset::Iso8859_1);
        assert_eq!(config.backup_count, 0);
        assert!(!config.auto_save);
        assert!(config.debug);
        assert_eq!(config.charset.name(), "ISO-8859-1");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "Yes").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_latin1_round_trip() {
        let charset = Charset::Iso8859_1;
        let bytes = charset.encode("Grüße €");
        assert_eq!(charset.decode(&bytes).unwrap(), "Grüße ?");
    }

    #[test]
    fn test_can_encode_all() {
        assert!(Charset::Iso8859_1.can_encode_all("Grüße"));
        assert!(!Charset::Iso8859_1.can_encode_all("5 €"));
        assert!(Charset::Utf8.can_encode_all("5 €"));
    }
}
