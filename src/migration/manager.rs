// ============================================================================
// System migration registry
// ============================================================================

use super::result::{MigrationResult, MigrationResultMicroTypeConverter};
use crate::audit::Auditor;
use crate::config::DaoConfig;
use crate::core::{Change, Result, ensure_not_empty};
use crate::dao::{Dao, XmlDataProvider, XmlDocumentHandler};
use crate::io::{ConstantFilename, DaoIo, FilenameProvider};
use crate::micro::{MicroDocument, MicroElement, MicroTypeConverter};
use log::{error, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::sync::Arc;

pub const OT_SYSTEM_MIGRATION_RESULT: &str = "systemmigrationresult";

const ELEMENT_ROOT: &str = "systemmigrationresults";
const ELEMENT_RESULT: &str = "systemmigrationresult";

/// Migration ID to its latest result.
#[derive(Debug, Default)]
pub struct MigrationStore {
    results: BTreeMap<String, MigrationResult>,
}

impl MigrationStore {
    fn add(&mut self, result: MigrationResult) {
        self.results.insert(result.id().to_string(), result);
    }
}

impl XmlDocumentHandler for MigrationStore {
    fn read_document(&mut self, document: &MicroDocument) -> Result<Change> {
        self.results.clear();
        if let Some(root) = document.root() {
            for element in root.child_elements_named(ELEMENT_RESULT) {
                match MigrationResultMicroTypeConverter::to_native(element) {
                    Ok(result) => self.add(result),
                    Err(err) => warn!("Ignoring unreadable migration result: {}", err),
                }
            }
        }
        Ok(Change::Unchanged)
    }

    fn create_document(&self) -> MicroDocument {
        let mut root = MicroElement::new(ELEMENT_ROOT);
        for result in self.results.values() {
            root.append_child(MigrationResultMicroTypeConverter::to_micro_element(result, ELEMENT_RESULT));
        }
        MicroDocument::with_root(root)
    }
}

/// Keeps track of which system migrations already ran.
pub struct SystemMigrationManager {
    dao: Dao<XmlDataProvider<MigrationStore>>,
    auditor: Option<Arc<dyn Auditor>>,
}

impl SystemMigrationManager {
    pub fn new(filename: impl Into<String>, config: DaoConfig, io: Arc<dyn DaoIo>) -> Result<Self> {
        Self::with_filename_provider(ConstantFilename::new(filename), config, io)
    }

    pub fn with_filename_provider(
        filename_provider: impl FilenameProvider + 'static,
        config: DaoConfig,
        io: Arc<dyn DaoIo>,
    ) -> Result<Self> {
        let dao = Dao::new(
            filename_provider,
            XmlDataProvider::new(MigrationStore::default()),
            config,
            io,
        );
        dao.initial_read()?;
        Ok(Self { dao, auditor: None })
    }

    /// Additions are audited as CREATE events.
    pub fn with_auditor(mut self, auditor: Arc<dyn Auditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub fn dao(&self) -> &Dao<XmlDataProvider<MigrationStore>> {
        &self.dao
    }

    /// Replaces any earlier result with the same ID.
    pub fn add_migration_result(&self, result: MigrationResult) -> Result<()> {
        let id = result.id().to_string();
        let success = result.is_success();
        self.dao.modify(|store| {
            store.add(result);
            Change::Changed
        })?;

        if let Some(auditor) = &self.auditor {
            auditor.on_create_success(OT_SYSTEM_MIGRATION_RESULT, &[&id, &success])?;
        }
        Ok(())
    }

    pub fn add_migration_result_success(&self, id: &str) -> Result<()> {
        self.add_migration_result(MigrationResult::create_success(id)?)
    }

    pub fn add_migration_result_error(&self, id: &str, error_message: &str) -> Result<()> {
        self.add_migration_result(MigrationResult::create_failure(id, error_message)?)
    }

    pub fn migration_result(&self, id: &str) -> Result<Option<MigrationResult>> {
        self.dao.read(|store| store.results.get(id).cloned())
    }

    /// Sorted by migration ID.
    pub fn all_migration_results(&self) -> Result<Vec<MigrationResult>> {
        self.dao.read(|store| store.results.values().cloned().collect())
    }

    pub fn all_failed_migration_results(&self) -> Result<Vec<MigrationResult>> {
        self.dao.read(|store| {
            store
                .results
                .values()
                .filter(|result| result.is_failure())
                .cloned()
                .collect()
        })
    }

    pub fn was_migration_executed_successfully(&self, id: &str) -> Result<bool> {
        self.dao
            .read(|store| store.results.get(id).is_some_and(MigrationResult::is_success))
    }

    pub fn all_migration_ids(&self) -> Result<BTreeSet<String>> {
        self.dao.read(|store| store.results.keys().cloned().collect())
    }

    /// Runs `action` unless the migration already succeeded.
    ///
    /// Returns the recorded result, or `None` when nothing ran.
    pub fn perform_migration_if_necessary<E: Display>(
        &self,
        id: &str,
        action: impl FnOnce() -> std::result::Result<(), E>,
    ) -> Result<Option<MigrationResult>> {
        ensure_not_empty(id, "migration ID")?;
        if self.was_migration_executed_successfully(id)? {
            return Ok(None);
        }

        info!("Performing system migration '{}'", id);
        let result = match action() {
            Ok(()) => MigrationResult::create_success(id)?,
            Err(err) => {
                error!("System migration '{}' failed: {}", id, err);
                MigrationResult::create_failure(id, err.to_string())?
            }
        };
        self.add_migration_result(result.clone())?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryIo;

    fn manager(io: Arc<MemoryIo>) -> SystemMigrationManager {
        SystemMigrationManager::new("migrations.xml", DaoConfig::new(), io).unwrap()
    }

    #[test]
    fn test_later_result_replaces_earlier() {
        let mm = manager(Arc::new(MemoryIo::new()));
        mm.add_migration_result_error("m1", "boom").unwrap();
        assert!(!mm.was_migration_executed_successfully("m1").unwrap());
        assert_eq!(mm.all_failed_migration_results().unwrap().len(), 1);

        mm.add_migration_result_success("m1").unwrap();
        assert!(mm.was_migration_executed_successfully("m1").unwrap());
        assert!(mm.all_failed_migration_results().unwrap().is_empty());
        assert_eq!(mm.all_migration_results().unwrap().len(), 1);
    }

    #[test]
    fn test_perform_runs_once() {
        let mm = manager(Arc::new(MemoryIo::new()));
        let mut runs = 0;
        let first = mm
            .perform_migration_if_necessary("m1", || {
                runs += 1;
                Ok::<(), String>(())
            })
            .unwrap();
        assert!(first.unwrap().is_success());
        let second = mm
            .perform_migration_if_necessary("m1", || {
                runs += 1;
                Ok::<(), String>(())
            })
            .unwrap();
        assert!(second.is_none());
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_failed_migration_is_retried() {
        let mm = manager(Arc::new(MemoryIo::new()));
        let failed = mm
            .perform_migration_if_necessary("m1", || Err("not yet"))
            .unwrap()
            .unwrap();
        assert_eq!(failed.error_message(), Some("not yet"));

        let retried = mm
            .perform_migration_if_necessary("m1", || Ok::<(), &str>(()))
            .unwrap();
        assert!(retried.unwrap().is_success());
        assert!(mm.perform_migration_if_necessary("", || Ok::<(), &str>(())).is_err());
    }

    #[test]
    fn test_results_survive_reopen() {
        let io = Arc::new(MemoryIo::new());
        {
            let mm = manager(io.clone());
            mm.add_migration_result_success("b").unwrap();
            mm.add_migration_result_error("a", "x").unwrap();
        }
        let content = io.content_string("migrations.xml").unwrap();
        assert!(content.contains("<systemmigrationresults>"));

        let mm = manager(io);
        let ids: Vec<String> = mm.all_migration_ids().unwrap().into_iter().collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(mm.migration_result("a").unwrap().unwrap().error_message(), Some("x"));
    }
}
