use super::provider::DataProvider;
use crate::config::{Charset, DaoConfig};
use crate::core::{Change, Result};
use crate::micro::{MicroDocument, MicroReader, MicroWriter};
use chrono::{SecondsFormat, Utc};
use log::warn;
use std::io::Read;
use std::ops::{Deref, DerefMut};

pub const GENERATED_WARNING: &str = "This file was generated automatically - do NOT modify!";

/// Domain side of an XML backed DAO.
pub trait XmlDocumentHandler: Send + Sync {
    /// Fills the state from a parsed document.
    fn read_document(&mut self, document: &MicroDocument) -> Result<Change>;

    /// Builds the document to be written.
    fn create_document(&self) -> MicroDocument;

    fn init_for_first_time_usage(&mut self) -> Result<Change> {
        Ok(Change::Unchanged)
    }

    fn on_filename_change(&mut self) {}
}

/// [`DataProvider`] writing a [`MicroDocument`] with provenance comments.
///
/// Dereferences to the wrapped handler so DAO closures can reach the domain state.
pub struct XmlDataProvider<H: XmlDocumentHandler> {
    handler: H,
    charset: Charset,
    debug: bool,
}

impl<H: XmlDocumentHandler> XmlDataProvider<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            charset: Charset::Utf8,
            debug: false,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    fn provenance_comments() -> Vec<String> {
        vec![
            GENERATED_WARNING.to_string(),
            format!("Vendor: {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!(
                "Written at {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        ]
    }
}

impl<H: XmlDocumentHandler> Deref for XmlDataProvider<H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.handler
    }
}

impl<H: XmlDocumentHandler> DerefMut for XmlDataProvider<H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}

impl<H: XmlDocumentHandler> DataProvider for XmlDataProvider<H> {
    fn read_from_stream(&mut self, input: &mut dyn Read) -> Result<Change> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;

        let parsed = self
            .charset
            .decode(&bytes)
            .and_then(|text| MicroReader::read_str(&text));
        match parsed {
            Ok(document) => self.handler.read_document(&document),
            Err(err) => {
                // Treat as "no data" and let the handler populate its defaults
                warn!("Failed to parse XML document, treating it as empty: {}", err);
                self.handler.init_for_first_time_usage()
            }
        }
    }

    fn fill_buffer_for_saving(&self, buffer: &mut String) -> Result<()> {
        let mut document = MicroDocument::new();
        for comment in Self::provenance_comments() {
            document.insert_comment_before_root(comment);
        }
        let created = self.handler.create_document();
        for comment in created.comments() {
            document.insert_comment_before_root(comment.clone());
        }
        if let Some(root) = created.into_root() {
            document.set_root(root);
        }
        MicroWriter::write_into(&document, self.charset, buffer);
        Ok(())
    }

    fn is_content_valid_for_saving(&self, content: &str) -> bool {
        if content.trim().is_empty() {
            return false;
        }
        if self.debug {
            if let Err(err) = MicroReader::read_str(content) {
                warn!("Serialized XML is not well-formed: {}", err);
                return false;
            }
        }
        true
    }

    fn init_for_first_time_usage(&mut self) -> Result<Change> {
        self.handler.init_for_first_time_usage()
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    fn on_filename_change(&mut self) {
        self.handler.on_filename_change();
    }

    fn apply_config(&mut self, config: &DaoConfig) {
        self.charset = config.charset;
        self.debug = config.debug;
    }
}
