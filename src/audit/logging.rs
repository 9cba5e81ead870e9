use super::auditor::{AuditNotation, Auditor};
use super::item::AuditItem;
use crate::core::Result;
use crate::security::CurrentUserIdProvider;
use log::info;
use std::sync::Arc;

/// Writes every audit item to the log and keeps nothing.
#[derive(Debug)]
pub struct LoggingAuditor {
    current_user: Arc<dyn CurrentUserIdProvider>,
    notation: AuditNotation,
}

impl LoggingAuditor {
    pub fn new(current_user: Arc<dyn CurrentUserIdProvider>) -> Self {
        Self {
            current_user,
            notation: AuditNotation::Json,
        }
    }

    pub fn with_notation(mut self, notation: AuditNotation) -> Self {
        self.notation = notation;
        self
    }
}

impl Auditor for LoggingAuditor {
    fn current_user_id(&self) -> Option<String> {
        self.current_user.current_user_id()
    }

    fn handle_audit_item(&self, item: AuditItem) -> Result<()> {
        info!(
            "AUDIT: {} {} by '{}': {}",
            item.action_type,
            if item.success.is_success() { "succeeded" } else { "failed" },
            item.user_id.as_deref().unwrap_or("<none>"),
            item.action
        );
        Ok(())
    }

    fn notation(&self) -> AuditNotation {
        self.notation
    }
}
