use super::item::{AuditActionType, AuditItem};
use crate::core::{Result, Success};
use serde_json::{Map, Value};
use std::fmt::Display;

/// How the action string of an audit item is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditNotation {
    /// `{"user":["42","alice"]}`
    #[default]
    Json,
    /// `user(42,alice)`
    Plain,
}

/// Builds the action string for `object_type` and its arguments.
pub fn create_audit_string(notation: AuditNotation, object_type: &str, args: &[&dyn Display]) -> String {
    match notation {
        AuditNotation::Json => {
            let values = args.iter().map(|arg| Value::String(arg.to_string())).collect();
            let mut object = Map::new();
            object.insert(object_type.to_string(), Value::Array(values));
            Value::Object(object).to_string()
        }
        AuditNotation::Plain => {
            if args.is_empty() {
                return object_type.to_string();
            }
            let joined: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
            format!("{}({})", object_type, joined.join(","))
        }
    }
}

fn with_what<'a>(what: &'a dyn Display, args: &[&'a dyn Display]) -> Vec<&'a dyn Display> {
    let mut all = Vec::with_capacity(args.len() + 1);
    all.push(what);
    all.extend_from_slice(args);
    all
}

/// Receives domain events and turns them into [`AuditItem`]s.
///
/// Implementors provide the user lookup and [`Auditor::handle_audit_item`];
/// the event methods are shared.
pub trait Auditor: Send + Sync {
    fn current_user_id(&self) -> Option<String>;

    fn handle_audit_item(&self, item: AuditItem) -> Result<()>;

    fn notation(&self) -> AuditNotation {
        AuditNotation::Json
    }

    fn create_audit_item(&self, action_type: AuditActionType, success: Success, action: String) -> Result<()> {
        self.handle_audit_item(AuditItem::new(self.current_user_id(), action_type, success, action))
    }

    fn on_create_success(&self, object_type: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, args);
        self.create_audit_item(AuditActionType::Create, Success::Success, action)
    }

    fn on_create_failure(&self, object_type: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, args);
        self.create_audit_item(AuditActionType::Create, Success::Failure, action)
    }

    fn on_modify_success(&self, object_type: &str, what: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, &with_what(&what, args));
        self.create_audit_item(AuditActionType::Modify, Success::Success, action)
    }

    fn on_modify_failure(&self, object_type: &str, what: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, &with_what(&what, args));
        self.create_audit_item(AuditActionType::Modify, Success::Failure, action)
    }

    fn on_delete_success(&self, object_type: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, args);
        self.create_audit_item(AuditActionType::Delete, Success::Success, action)
    }

    fn on_delete_failure(&self, object_type: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, args);
        self.create_audit_item(AuditActionType::Delete, Success::Failure, action)
    }

    fn on_undelete_success(&self, object_type: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, args);
        self.create_audit_item(AuditActionType::Undelete, Success::Success, action)
    }

    fn on_undelete_failure(&self, object_type: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, args);
        self.create_audit_item(AuditActionType::Undelete, Success::Failure, action)
    }

    fn on_execute_success(&self, what: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), what, args);
        self.create_audit_item(AuditActionType::Execute, Success::Success, action)
    }

    fn on_execute_failure(&self, what: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), what, args);
        self.create_audit_item(AuditActionType::Execute, Success::Failure, action)
    }

    fn on_execute_success_for(&self, object_type: &str, what: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, &with_what(&what, args));
        self.create_audit_item(AuditActionType::Execute, Success::Success, action)
    }

    fn on_execute_failure_for(&self, object_type: &str, what: &str, args: &[&dyn Display]) -> Result<()> {
        let action = create_audit_string(self.notation(), object_type, &with_what(&what, args));
        self.create_audit_item(AuditActionType::Execute, Success::Failure, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Collecting {
        notation: AuditNotation,
        items: Mutex<Vec<AuditItem>>,
    }

    impl Collecting {
        fn new(notation: AuditNotation) -> Self {
            Self {
                notation,
                items: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> AuditItem {
            self.items.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Auditor for Collecting {
        fn current_user_id(&self) -> Option<String> {
            Some("tester".to_string())
        }

        fn handle_audit_item(&self, item: AuditItem) -> Result<()> {
            self.items.lock().unwrap().push(item);
            Ok(())
        }

        fn notation(&self) -> AuditNotation {
            self.notation
        }
    }

    #[test]
    fn test_json_notation() {
        assert_eq!(
            create_audit_string(AuditNotation::Json, "user", &[&42, &"alice"]),
            r#"{"user":["42","alice"]}"#
        );
        assert_eq!(create_audit_string(AuditNotation::Json, "user", &[]), r#"{"user":[]}"#);
    }

    #[test]
    fn test_plain_notation() {
        assert_eq!(create_audit_string(AuditNotation::Plain, "user", &[&42, &"alice"]), "user(42,alice)");
        assert_eq!(create_audit_string(AuditNotation::Plain, "user", &[]), "user");
    }

    #[test]
    fn test_event_methods_build_items() {
        let auditor = Collecting::new(AuditNotation::Plain);
        auditor.on_modify_failure("user", "password", &[&"u1"]).unwrap();
        let item = auditor.last();
        assert_eq!(item.action_type, AuditActionType::Modify);
        assert_eq!(item.success, Success::Failure);
        assert_eq!(item.action, "user(password,u1)");
        assert_eq!(item.user_id.as_deref(), Some("tester"));

        auditor.on_execute_success("cleanup", &[]).unwrap();
        assert_eq!(auditor.last().action, "cleanup");
        auditor.on_execute_success_for("job", "run", &[&7]).unwrap();
        assert_eq!(auditor.last().action, "job(run,7)");
        assert_eq!(auditor.items.lock().unwrap().len(), 3);
    }
}
