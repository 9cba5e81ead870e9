//! Application-wide services, created once and handed to callers.

use crate::audit::{Auditor, LoggingAuditor};
use crate::config::DaoConfig;
use crate::core::Result;
use crate::io::DaoIo;
use crate::locale::LocaleManager;
use crate::migration::SystemMigrationManager;
use crate::security::{CurrentUserIdProvider, FixedUserId, LockManager};
use crate::state::ObjectStateRegistry;
use std::sync::Arc;

pub const DEFAULT_MIGRATIONS_FILENAME: &str = "systemmigrations.xml";

/// Shared services of one application instance.
///
/// Cloning is cheap; all clones see the same services.
#[derive(Clone)]
pub struct AppContext {
    current_user: Arc<dyn CurrentUserIdProvider>,
    auditor: Arc<dyn Auditor>,
    lock_manager: Arc<LockManager>,
    migration_manager: Arc<SystemMigrationManager>,
    locale_manager: Arc<LocaleManager>,
    object_states: Arc<ObjectStateRegistry<String>>,
}

impl AppContext {
    pub fn builder(io: Arc<dyn DaoIo>) -> AppContextBuilder {
        AppContextBuilder {
            io,
            config: DaoConfig::new(),
            current_user: None,
            auditor: None,
            migrations_filename: DEFAULT_MIGRATIONS_FILENAME.to_string(),
        }
    }

    pub fn current_user(&self) -> &Arc<dyn CurrentUserIdProvider> {
        &self.current_user
    }

    pub fn auditor(&self) -> &Arc<dyn Auditor> {
        &self.auditor
    }

    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    pub fn migration_manager(&self) -> &SystemMigrationManager {
        &self.migration_manager
    }

    pub fn locale_manager(&self) -> &LocaleManager {
        &self.locale_manager
    }

    pub fn object_states(&self) -> &ObjectStateRegistry<String> {
        &self.object_states
    }
}

pub struct AppContextBuilder {
    io: Arc<dyn DaoIo>,
    config: DaoConfig,
    current_user: Option<Arc<dyn CurrentUserIdProvider>>,
    auditor: Option<Arc<dyn Auditor>>,
    migrations_filename: String,
}

impl AppContextBuilder {
    pub fn config(mut self, config: DaoConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to an anonymous user.
    pub fn current_user(mut self, current_user: Arc<dyn CurrentUserIdProvider>) -> Self {
        self.current_user = Some(current_user);
        self
    }

    /// Defaults to a [`LoggingAuditor`].
    pub fn auditor(mut self, auditor: Arc<dyn Auditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    pub fn migrations_filename(mut self, filename: impl Into<String>) -> Self {
        self.migrations_filename = filename.into();
        self
    }

    /// Reads the migration file, so this touches the backing storage.
    pub fn build(self) -> Result<AppContext> {
        let current_user: Arc<dyn CurrentUserIdProvider> = match self.current_user {
            Some(current_user) => current_user,
            None => Arc::new(FixedUserId::anonymous()),
        };
        let auditor: Arc<dyn Auditor> = match self.auditor {
            Some(auditor) => auditor,
            None => Arc::new(LoggingAuditor::new(current_user.clone())),
        };
        let migration_manager =
            SystemMigrationManager::new(self.migrations_filename, self.config, self.io)?.with_auditor(auditor.clone());

        Ok(AppContext {
            lock_manager: Arc::new(LockManager::new(current_user.clone())),
            migration_manager: Arc::new(migration_manager),
            locale_manager: Arc::new(LocaleManager::new()),
            object_states: Arc::new(ObjectStateRegistry::new()),
            current_user,
            auditor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Locked;
    use crate::io::MemoryIo;

    #[test]
    fn test_clones_share_services() {
        let io = Arc::new(MemoryIo::new());
        let ctx = AppContext::builder(io.clone())
            .current_user(Arc::new(FixedUserId::new("admin")))
            .build()
            .unwrap();
        let other = ctx.clone();

        assert_eq!(ctx.lock_manager().lock_object("doc").unwrap(), Locked::Locked);
        assert!(other.lock_manager().is_object_locked_by_current_user("doc").unwrap());

        other.migration_manager().add_migration_result_success("m1").unwrap();
        assert!(ctx.migration_manager().was_migration_executed_successfully("m1").unwrap());
        assert!(io.content(DEFAULT_MIGRATIONS_FILENAME).is_some());
    }

    #[test]
    fn test_defaults_to_anonymous_user() {
        let ctx = AppContext::builder(Arc::new(MemoryIo::new())).build().unwrap();
        assert_eq!(ctx.current_user().current_user_id(), None);
        assert_eq!(ctx.lock_manager().lock_object("doc").unwrap(), Locked::NotLocked);
    }
}
