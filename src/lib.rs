// ============================================================================
// docdao Library
// ============================================================================

pub mod audit;
pub mod config;
pub mod context;
pub mod core;
pub mod dao;
pub mod io;
pub mod locale;
pub mod micro;
pub mod migration;
pub mod security;
pub mod state;
pub mod user;

// Re-export main types for convenience
pub use config::{Charset, DaoConfig};
pub use context::AppContext;
pub use core::{Change, DaoError, Locked, Result, Success};
pub use dao::{Dao, DaoStats, DataProvider, XmlDataProvider, XmlDocumentHandler};
pub use io::{ConstantFilename, DaoIo, DatedFilename, FileSystemIo, FilenameProvider, MemoryIo, NoFilename};

// Re-export services
pub use audit::{AsyncAuditor, AuditItem, AuditManager, Auditor, LoggingAuditor};
pub use locale::{Locale, LocaleManager};
pub use migration::{MigrationResult, SystemMigrationManager};
pub use security::{CurrentUserIdProvider, FixedUserId, LockManager, SessionUserId};
pub use state::ObjectStateRegistry;
pub use user::{User, UserMicroTypeConverter};

/// Crate version as written into generated files
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Quick start
// ============================================================================

/// Opens an XML backed DAO below `base_dir` and reads it.
///
/// # Examples
///
/// ```
/// use docdao::{Change, DaoConfig, XmlDocumentHandler, open_xml_dao};
/// use docdao::micro::{MicroDocument, MicroElement};
///
/// #[derive(Default)]
/// struct Settings {
///     theme: String,
/// }
///
/// impl XmlDocumentHandler for Settings {
///     fn read_document(&mut self, document: &MicroDocument) -> docdao::Result<Change> {
///         self.theme = document
///             .root()
///             .and_then(|root| root.child_text_content("theme"))
///             .unwrap_or_default();
///         Ok(Change::Unchanged)
///     }
///
///     fn create_document(&self) -> MicroDocument {
///         let mut root = MicroElement::new("settings");
///         root.append_element("theme").append_text(self.theme.clone());
///         MicroDocument::with_root(root)
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let dao = open_xml_dao(dir.path(), "settings.xml", Settings::default(), DaoConfig::new())?;
/// dao.modify(|settings| {
///     settings.theme = "dark".to_string();
///     Change::Changed
/// })?;
/// assert!(dir.path().join("settings.xml").exists());
/// # Ok(())
/// # }
/// ```
pub fn open_xml_dao<H, B>(
    base_dir: B,
    filename: &str,
    handler: H,
    config: DaoConfig,
) -> Result<Dao<XmlDataProvider<H>>>
where
    H: XmlDocumentHandler,
    B: AsRef<std::path::Path>,
{
    let io = std::sync::Arc::new(FileSystemIo::new(base_dir));
    let dao = Dao::new(ConstantFilename::new(filename), XmlDataProvider::new(handler), config, io);
    dao.initial_read()?;
    Ok(dao)
}
