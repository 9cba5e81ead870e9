//! Audit trail.
//!
//! [`Auditor`] turns domain events into [`AuditItem`]s. Items are either logged
//! ([`LoggingAuditor`]), persisted into dated XML files ([`AuditManager`]) or
//! handed to a background worker ([`AsyncAuditor`]).

pub mod async_auditor;
pub mod auditor;
pub mod item;
pub mod logging;
pub mod manager;

pub use async_auditor::{AsyncAuditor, AuditPerformer, AuditorState};
pub use auditor::{AuditNotation, Auditor, create_audit_string};
pub use item::{AuditActionType, AuditItem, AuditItemMicroTypeConverter};
pub use logging::LoggingAuditor;
pub use manager::AuditManager;
