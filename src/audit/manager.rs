// ============================================================================
// XML persisted audit trail
// ============================================================================

use super::auditor::{AuditNotation, Auditor};
use super::item::{AuditItem, AuditItemMicroTypeConverter};
use crate::config::DaoConfig;
use crate::core::{Change, Result, Success};
use crate::dao::{Dao, XmlDataProvider, XmlDocumentHandler};
use crate::io::{DaoIo, DatedFilename};
use crate::micro::{MicroDocument, MicroElement, MicroTypeConverter};
use crate::security::CurrentUserIdProvider;
use log::warn;
use std::sync::Arc;

const ELEMENT_ROOT: &str = "audittrail";
const ELEMENT_ITEM: &str = "item";

/// Items of the current audit file, oldest first.
#[derive(Debug, Default)]
pub struct AuditItemList {
    items: Vec<AuditItem>,
}

impl AuditItemList {
    pub fn items(&self) -> &[AuditItem] {
        &self.items
    }
}

impl XmlDocumentHandler for AuditItemList {
    fn read_document(&mut self, document: &MicroDocument) -> Result<Change> {
        self.items.clear();
        if let Some(root) = document.root() {
            for element in root.child_elements_named(ELEMENT_ITEM) {
                match AuditItemMicroTypeConverter::to_native(element) {
                    Ok(item) => self.items.push(item),
                    Err(err) => warn!("Skipping unreadable audit item: {}", err),
                }
            }
        }
        Ok(Change::Unchanged)
    }

    fn create_document(&self) -> MicroDocument {
        let mut root = MicroElement::new(ELEMENT_ROOT);
        for item in &self.items {
            root.append_child(AuditItemMicroTypeConverter::to_micro_element(item, ELEMENT_ITEM));
        }
        MicroDocument::with_root(root)
    }

    /// A new day starts a new file; the last item stays as a link to the previous one.
    fn on_filename_change(&mut self) {
        if self.items.len() > 1 {
            let last = self.items.len() - 1;
            self.items.drain(..last);
        }
    }
}

/// Audit trail written to one XML file per day below a base directory.
pub struct AuditManager {
    dao: Dao<XmlDataProvider<AuditItemList>>,
    current_user: Arc<dyn CurrentUserIdProvider>,
}

impl AuditManager {
    /// An empty `base_dir` keeps the trail in memory only.
    pub fn new(
        base_dir: impl Into<String>,
        current_user: Arc<dyn CurrentUserIdProvider>,
        config: DaoConfig,
        io: Arc<dyn DaoIo>,
    ) -> Result<Self> {
        let dao = Dao::new(
            DatedFilename::new(base_dir),
            XmlDataProvider::new(AuditItemList::default()),
            config,
            io,
        );
        dao.initial_read()?;
        Ok(Self { dao, current_user })
    }

    pub fn dao(&self) -> &Dao<XmlDataProvider<AuditItemList>> {
        &self.dao
    }

    pub fn all_audit_items(&self) -> Result<Vec<AuditItem>> {
        self.dao.read(|list| list.items.clone())
    }

    pub fn audit_item_count(&self) -> Result<usize> {
        self.dao.read(|list| list.items.len())
    }

    pub fn successful_items(&self) -> Result<Vec<AuditItem>> {
        self.dao.read(|list| {
            list.items
                .iter()
                .filter(|item| item.success == Success::Success)
                .cloned()
                .collect()
        })
    }

    /// Most recent items first.
    pub fn last_audit_items(&self, max_items: usize) -> Result<Vec<AuditItem>> {
        self.dao
            .read(|list| list.items.iter().rev().take(max_items).cloned().collect())
    }
}

impl Auditor for AuditManager {
    fn current_user_id(&self) -> Option<String> {
        self.current_user.current_user_id()
    }

    fn handle_audit_item(&self, item: AuditItem) -> Result<()> {
        self.dao.modify(|list| {
            list.items.push(item);
            Change::Changed
        })?;
        Ok(())
    }

    fn notation(&self) -> AuditNotation {
        AuditNotation::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditActionType;
    use crate::io::MemoryIo;
    use crate::security::FixedUserId;

    fn manager(io: Arc<MemoryIo>) -> AuditManager {
        AuditManager::new("audit", Arc::new(FixedUserId::new("admin")), DaoConfig::new(), io).unwrap()
    }

    #[test]
    fn test_items_are_persisted_to_dated_file() {
        let io = Arc::new(MemoryIo::new());
        let am = manager(io.clone());
        am.on_create_success("user", &[&"u1"]).unwrap();
        am.on_delete_failure("user", &[&"u2"]).unwrap();

        let filename = am.dao().filename().unwrap();
        assert!(filename.starts_with("audit/"));
        let content = io.content_string(&filename).unwrap();
        assert!(content.contains("<audittrail>"));
        assert!(content.contains("user(u1)"));

        let reopened = manager(io);
        let items = reopened.all_audit_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].user_id.as_deref(), Some("admin"));
        assert_eq!(reopened.successful_items().unwrap().len(), 1);
        assert_eq!(reopened.last_audit_items(1).unwrap()[0].action, "user(u2)");
    }

    #[test]
    fn test_filename_change_keeps_last_item() {
        let mut list = AuditItemList::default();
        for i in 0..3 {
            list.items.push(AuditItem::new(
                None,
                AuditActionType::Execute,
                Success::Success,
                format!("job{}", i),
            ));
        }
        list.on_filename_change();
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].action, "job2");
    }

    #[test]
    fn test_in_memory_trail() {
        let am = AuditManager::new("", Arc::new(FixedUserId::anonymous()), DaoConfig::new(), Arc::new(MemoryIo::new()))
            .unwrap();
        am.on_execute_success("noop", &[]).unwrap();
        assert_eq!(am.audit_item_count().unwrap(), 1);
        assert!(am.dao().filename().is_none());
    }
}
