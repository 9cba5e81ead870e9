use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Error {} the file '{filename}': {message}", read_action(.initialization))]
    Read {
        filename: String,
        initialization: bool,
        message: String,
    },

    #[error("Failed to write to file '{filename}': {message}")]
    Write { filename: String, message: String },

    #[error("Data provider rejected the content for '{0}'")]
    InvalidContent(String),

    #[error("No filename is available for this DAO")]
    NoFilename,

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, DaoError>;

fn read_action(initialization: &bool) -> &'static str {
    if *initialization { "initializing" } else { "reading" }
}

impl DaoError {
    pub fn read(filename: &str, initialization: bool, message: impl Into<String>) -> Self {
        Self::Read {
            filename: filename.to_string(),
            initialization,
            message: message.into(),
        }
    }

    pub fn write(filename: &str, message: impl Into<String>) -> Self {
        Self::Write {
            filename: filename.to_string(),
            message: message.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for DaoError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for DaoError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<quick_xml::Error> for DaoError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DaoError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Fails with `IllegalArgument` when `value` is empty.
pub fn ensure_not_empty(value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DaoError::IllegalArgument(format!("{} must not be empty", name)));
    }
    Ok(())
}
