//! Registry of one-time system migrations and their outcome.

pub mod manager;
pub mod result;

pub use manager::{MigrationStore, SystemMigrationManager};
pub use result::{MigrationResult, MigrationResultMicroTypeConverter};
