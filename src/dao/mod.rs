//! File-backed data access objects.
//!
//! A [`Dao`] pairs one backing file with an in-memory state owned by a
//! [`DataProvider`]. The controller decides when to read, initialize and
//! write; the provider only knows how to convert its state.

pub mod controller;
pub mod provider;
pub mod stats;
pub mod xml_provider;

pub use controller::{Dao, ReadErrorHandler, WriteErrorHandler};
pub use provider::DataProvider;
pub use stats::DaoStats;
pub use xml_provider::{XmlDataProvider, XmlDocumentHandler};
