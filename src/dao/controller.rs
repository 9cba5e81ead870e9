// ============================================================================
// DAO lifecycle controller
// ============================================================================

use super::provider::DataProvider;
use super::stats::DaoStats;
use crate::config::DaoConfig;
use crate::core::{Change, DaoError, Result};
use crate::io::{DaoIo, FilenameProvider, backup_filename};
use log::{error, info, warn};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

/// Notified when reading or initializing fails: `(error, is_initialization, resource)`.
pub type ReadErrorHandler = Arc<dyn Fn(&DaoError, bool, Option<&str>) + Send + Sync>;

/// Notified when writing fails: `(error, resource, produced_content)`.
pub type WriteErrorHandler = Arc<dyn Fn(&DaoError, &str, &str) + Send + Sync>;

struct DaoState<P> {
    provider: P,
    pending_changes: bool,
    auto_save_enabled: bool,
    auto_save_stack: Vec<bool>,
    previous_filename: Option<String>,
    stats: DaoStats,
}

/// A data provider bound to one backing file.
///
/// All mutations run under the write lock, all queries under the read lock.
/// Closures passed to [`Dao::read`] and [`Dao::modify`] must not call back into
/// the same DAO.
pub struct Dao<P: DataProvider> {
    filename_provider: Box<dyn FilenameProvider>,
    io: Arc<dyn DaoIo>,
    backup_count: usize,
    debug: bool,
    state: RwLock<DaoState<P>>,
    read_error_handler: RwLock<Option<ReadErrorHandler>>,
    write_error_handler: RwLock<Option<WriteErrorHandler>>,
}

impl<P: DataProvider> Dao<P> {
    pub fn new(
        filename_provider: impl FilenameProvider + 'static,
        mut provider: P,
        config: DaoConfig,
        io: Arc<dyn DaoIo>,
    ) -> Self {
        provider.apply_config(&config);
        let previous_filename = filename_provider.filename();
        Self {
            filename_provider: Box::new(filename_provider),
            io,
            backup_count: config.backup_count,
            debug: config.debug,
            state: RwLock::new(DaoState {
                provider,
                pending_changes: false,
                auto_save_enabled: config.auto_save,
                auto_save_stack: Vec::new(),
                previous_filename,
                stats: DaoStats::default(),
            }),
            read_error_handler: RwLock::new(None),
            write_error_handler: RwLock::new(None),
        }
    }

    pub fn filename(&self) -> Option<String> {
        self.filename_provider.filename()
    }

    pub fn io(&self) -> &Arc<dyn DaoIo> {
        &self.io
    }

    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    pub fn set_read_error_handler(&self, handler: Option<ReadErrorHandler>) -> Result<()> {
        *self.read_error_handler.write()? = handler;
        Ok(())
    }

    pub fn set_write_error_handler(&self, handler: Option<WriteErrorHandler>) -> Result<()> {
        *self.write_error_handler.write()? = handler;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    /// Reads the backing file, or runs first-time initialization if it does not exist.
    ///
    /// Exactly one of the two paths runs. A `Changed` result from either is
    /// marked as a change afterwards, which writes when auto-save is enabled.
    pub fn initial_read(&self) -> Result<()> {
        let mut state = self.state.write()?;

        let Some(filename) = self.filename_provider.filename() else {
            error!("This DAO has no filename and will not be able to read from a file");
            return Ok(());
        };

        if self.debug {
            info!("Trying to read DAO file '{}'", filename);
        }

        let input = match self.io.open_input(&filename) {
            Ok(input) => input,
            Err(err) => return Err(self.read_failed(&filename, false, err)),
        };

        let initialization = input.is_none();
        let result = match input {
            None => {
                if self.debug {
                    info!("Initializing DAO for file '{}'", filename);
                }
                state.provider.init_for_first_time_usage()
            }
            Some(mut input) => state.provider.read_from_stream(&mut input),
        };
        // Reading is not a change by itself; only the returned indicator counts
        state.pending_changes = false;

        let change = match result {
            Ok(change) => change,
            Err(err) => return Err(self.read_failed(&filename, initialization, err)),
        };

        if initialization {
            state.stats.record_init();
        } else {
            state.stats.record_read();
        }

        if change.is_changed() {
            self.mark_as_changed_locked(&mut state)?;
        }
        Ok(())
    }

    fn read_failed(&self, filename: &str, initialization: bool, cause: DaoError) -> DaoError {
        let err = DaoError::read(filename, initialization, cause.to_string());
        let handler = self.read_error_handler.read().ok().and_then(|h| h.clone());
        if let Some(handler) = handler {
            let resource = self.io.describe(filename);
            handler(&err, initialization, Some(&resource));
        }
        err
    }

    // ------------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------------

    /// Runs a query against the provider under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&P) -> R) -> Result<R> {
        let state = self.state.read()?;
        Ok(f(&state.provider))
    }

    /// Runs a mutation under the write lock; `Changed` marks the DAO as changed.
    pub fn modify(&self, f: impl FnOnce(&mut P) -> Change) -> Result<Change> {
        self.modify_with(|provider| {
            let change = f(provider);
            (change, change)
        })
    }

    /// Like [`Dao::modify`] but returns a value computed by the mutation.
    pub fn modify_with<R>(&self, f: impl FnOnce(&mut P) -> (R, Change)) -> Result<R> {
        let mut state = self.state.write()?;
        let (value, change) = f(&mut state.provider);
        if change.is_changed() {
            self.mark_as_changed_locked(&mut state)?;
        }
        Ok(value)
    }

    // ------------------------------------------------------------------------
    // Pending changes and writing
    // ------------------------------------------------------------------------

    /// Records a change; writes immediately when auto-save is enabled.
    pub fn mark_as_changed(&self) -> Result<()> {
        let mut state = self.state.write()?;
        self.mark_as_changed_locked(&mut state)
    }

    fn mark_as_changed_locked(&self, state: &mut RwLockWriteGuard<'_, DaoState<P>>) -> Result<()> {
        state.pending_changes = true;
        // Memory-only DAOs keep their changes pending
        if state.auto_save_enabled && self.filename_provider.filename().is_some() {
            self.write_pending_locked(state)?;
        }
        Ok(())
    }

    /// Writes only if there are pending changes.
    pub fn write_to_file_on_pending_changes(&self) -> Result<()> {
        let mut state = self.state.write()?;
        self.write_pending_locked(&mut state)
    }

    /// Writes regardless of the pending flag.
    pub fn force_write(&self) -> Result<()> {
        let mut state = self.state.write()?;
        self.write_locked(&mut state)
    }

    fn write_pending_locked(&self, state: &mut RwLockWriteGuard<'_, DaoState<P>>) -> Result<()> {
        if !state.pending_changes {
            return Ok(());
        }
        let result = self.write_locked(state);
        if result.is_err() {
            if let Some(filename) = self.filename_provider.filename() {
                error!("Object '{}' has still pending changes!", filename);
            }
        }
        result
    }

    fn write_locked(&self, state: &mut RwLockWriteGuard<'_, DaoState<P>>) -> Result<()> {
        let Some(filename) = self.filename_provider.filename() else {
            error!("This DAO has no filename and will not be able to write to a file");
            return Err(DaoError::NoFilename);
        };

        if self.debug {
            info!("Trying to write DAO file '{}'", filename);
        }

        // Remembered only after a successful save so a failed write repeats the hook
        let filename_changed = state.previous_filename.as_deref() != Some(filename.as_str());
        if filename_changed {
            state.provider.on_filename_change();
        }

        // Produce and validate before anything on disk is touched
        let mut content = String::new();
        if let Err(err) = state.provider.fill_buffer_for_saving(&mut content) {
            return Err(self.write_failed(&filename, err, &content));
        }
        if content.is_empty() || !state.provider.is_content_valid_for_saving(&content) {
            warn!("Data provider stopped saving data to file '{}'", filename);
            let err = DaoError::InvalidContent(filename.clone());
            return Err(self.write_failed(&filename, err, &content));
        }
        let charset = state.provider.charset();
        if !charset.can_encode_all(&content) {
            warn!(
                "Content for file '{}' cannot be encoded as {}",
                filename,
                charset.name()
            );
            let err = DaoError::InvalidContent(filename.clone());
            return Err(self.write_failed(&filename, err, &content));
        }

        let bytes = charset.encode(&content);
        let stored = self
            .rotate_backups(&filename)
            .and_then(|_| self.io.save_file(&filename, &bytes));
        if let Err(err) = stored {
            return Err(self.write_failed(&filename, err, &content));
        }

        if filename_changed {
            state.previous_filename = Some(filename);
        }
        state.pending_changes = false;
        state.stats.record_write();
        Ok(())
    }

    /// `file.(n-1) -> file.n`, ..., then a copy of `file` becomes `file.1`.
    ///
    /// The live file stays in place until the new content replaces it.
    fn rotate_backups(&self, filename: &str) -> Result<()> {
        if self.backup_count == 0 {
            return Ok(());
        }
        for index in (2..=self.backup_count).rev() {
            self.io.rename_file(
                &backup_filename(filename, index - 1),
                &backup_filename(filename, index),
            )?;
        }
        self.io.copy_file(filename, &backup_filename(filename, 1))
    }

    fn write_failed(&self, filename: &str, cause: DaoError, content: &str) -> DaoError {
        error!("Failed to write to file '{}': {}", filename, cause);
        let handler = self.write_error_handler.read().ok().and_then(|h| h.clone());
        if let Some(handler) = handler {
            handler(&cause, &self.io.describe(filename), content);
        }
        match cause {
            DaoError::InvalidContent(_) | DaoError::NoFilename => cause,
            other => DaoError::write(filename, other.to_string()),
        }
    }

    pub fn has_pending_changes(&self) -> Result<bool> {
        Ok(self.state.read()?.pending_changes)
    }

    // ------------------------------------------------------------------------
    // Auto-save
    // ------------------------------------------------------------------------

    pub fn is_auto_save_enabled(&self) -> Result<bool> {
        Ok(self.state.read()?.auto_save_enabled)
    }

    pub fn set_auto_save_enabled(&self, enabled: bool) -> Result<Change> {
        let mut state = self.state.write()?;
        if state.auto_save_enabled == enabled {
            return Ok(Change::Unchanged);
        }
        state.auto_save_enabled = enabled;
        Ok(Change::Changed)
    }

    /// Disables auto-save until the matching [`Dao::end_without_auto_save`]. Nests.
    pub fn begin_without_auto_save(&self) -> Result<()> {
        let mut state = self.state.write()?;
        let previous = state.auto_save_enabled;
        state.auto_save_stack.push(previous);
        state.auto_save_enabled = false;
        Ok(())
    }

    /// Restores the auto-save state and writes pending changes if it was enabled.
    pub fn end_without_auto_save(&self) -> Result<()> {
        let mut state = self.state.write()?;
        let previous = state.auto_save_stack.pop().ok_or_else(|| {
            DaoError::IllegalState("end_without_auto_save called without begin".to_string())
        })?;
        state.auto_save_enabled = previous;
        if previous && self.filename_provider.filename().is_some() {
            self.write_pending_locked(&mut state)?;
        }
        Ok(())
    }

    /// Runs `f` with auto-save disabled and writes once afterwards.
    pub fn perform_without_auto_save<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        self.begin_without_auto_save()?;
        let value = f();
        self.end_without_auto_save()?;
        Ok(value)
    }

    pub fn stats(&self) -> Result<DaoStats> {
        Ok(self.state.read()?.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ConstantFilename, MemoryIo, NoFilename};
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Plain text provider counting its callbacks.
    #[derive(Default)]
    struct Counter {
        value: u32,
        reads: usize,
        inits: usize,
        init_change: bool,
        reject: bool,
        filename_changes: usize,
    }

    impl DataProvider for Counter {
        fn read_from_stream(&mut self, input: &mut dyn Read) -> Result<Change> {
            self.reads += 1;
            let mut text = String::new();
            input.read_to_string(&mut text)?;
            self.value = text
                .trim()
                .parse()
                .map_err(|_| DaoError::Conversion(format!("not a number: {}", text)))?;
            Ok(Change::Unchanged)
        }

        fn fill_buffer_for_saving(&self, buffer: &mut String) -> Result<()> {
            buffer.push_str(&self.value.to_string());
            Ok(())
        }

        fn is_content_valid_for_saving(&self, content: &str) -> bool {
            !self.reject && !content.is_empty()
        }

        fn init_for_first_time_usage(&mut self) -> Result<Change> {
            self.inits += 1;
            Ok(Change::from_bool(self.init_change))
        }

        fn on_filename_change(&mut self) {
            self.filename_changes += 1;
        }
    }

    fn dao_with(io: Arc<MemoryIo>, config: DaoConfig) -> Dao<Counter> {
        Dao::new(ConstantFilename::new("counter.txt"), Counter::default(), config, io)
    }

    fn increment(dao: &Dao<Counter>) -> Change {
        dao.modify(|c| {
            c.value += 1;
            Change::Changed
        })
        .unwrap()
    }

    #[test]
    fn test_initial_read_missing_file_initializes_once() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.initial_read().unwrap();

        assert_eq!(dao.read(|c| (c.inits, c.reads)).unwrap(), (1, 0));
        let stats = dao.stats().unwrap();
        assert_eq!(stats.init_count, 1);
        assert_eq!(stats.read_count, 0);
        assert!(stats.last_init.is_some());
        // Unchanged init result does not write
        assert_eq!(io.save_count(), 0);
    }

    #[test]
    fn test_initial_read_changed_init_writes() {
        let io = Arc::new(MemoryIo::new());
        let mut provider = Counter::default();
        provider.init_change = true;
        provider.value = 7;
        let dao = Dao::new(ConstantFilename::new("counter.txt"), provider, DaoConfig::new(), io.clone());
        dao.initial_read().unwrap();

        assert_eq!(io.content_string("counter.txt").as_deref(), Some("7"));
        assert!(!dao.has_pending_changes().unwrap());
        assert_eq!(dao.stats().unwrap().write_count, 1);
    }

    #[test]
    fn test_initial_read_existing_file() {
        let io = Arc::new(MemoryIo::new().with_file("counter.txt", "42"));
        let dao = dao_with(io, DaoConfig::new());
        dao.initial_read().unwrap();

        assert_eq!(dao.read(|c| (c.value, c.inits, c.reads)).unwrap(), (42, 0, 1));
        assert_eq!(dao.stats().unwrap().read_count, 1);
    }

    #[test]
    fn test_read_failure_reports_and_fails() {
        let io = Arc::new(MemoryIo::new().with_file("counter.txt", "garbage"));
        let dao = dao_with(io, DaoConfig::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        dao.set_read_error_handler(Some(Arc::new(move |_: &DaoError, init: bool, resource: Option<&str>| {
            assert!(!init);
            assert_eq!(resource, Some("memory:counter.txt"));
            seen.fetch_add(1, Ordering::SeqCst);
        })))
        .unwrap();

        let err = dao.initial_read().unwrap_err();
        assert!(matches!(err, DaoError::Read { initialization: false, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(dao.stats().unwrap().read_count, 0);
    }

    #[test]
    fn test_no_filename_skips_read() {
        let dao = Dao::new(NoFilename, Counter::default(), DaoConfig::new(), Arc::new(MemoryIo::new()));
        dao.initial_read().unwrap();
        assert_eq!(dao.read(|c| c.inits + c.reads).unwrap(), 0);
        assert!(matches!(dao.force_write(), Err(DaoError::NoFilename)));
    }

    #[test]
    fn test_no_filename_changes_stay_pending() {
        let dao = Dao::new(NoFilename, Counter::default(), DaoConfig::new(), Arc::new(MemoryIo::new()));
        assert_eq!(increment(&dao), Change::Changed);
        assert!(dao.has_pending_changes().unwrap());
        assert_eq!(dao.stats().unwrap().write_count, 0);
    }

    #[test]
    fn test_auto_save_writes_on_change() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.initial_read().unwrap();

        assert_eq!(increment(&dao), Change::Changed);
        assert!(!dao.has_pending_changes().unwrap());
        assert_eq!(dao.stats().unwrap().write_count, 1);
        assert_eq!(io.content_string("counter.txt").as_deref(), Some("1"));
    }

    #[test]
    fn test_unchanged_modification_does_not_write() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new());
        assert_eq!(dao.modify(|_| Change::Unchanged).unwrap(), Change::Unchanged);
        assert_eq!(io.save_count(), 0);
    }

    #[test]
    fn test_write_on_pending_changes_is_idempotent() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new().auto_save(false));
        increment(&dao);
        assert!(dao.has_pending_changes().unwrap());

        dao.write_to_file_on_pending_changes().unwrap();
        dao.write_to_file_on_pending_changes().unwrap();
        assert_eq!(io.save_count(), 1);
        assert_eq!(dao.stats().unwrap().write_count, 1);
        assert!(!dao.has_pending_changes().unwrap());
    }

    #[test]
    fn test_force_write_ignores_flag() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.force_write().unwrap();
        dao.force_write().unwrap();
        assert_eq!(io.save_count(), 2);
    }

    #[test]
    fn test_backup_rotation() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new().backup_count(2));
        for _ in 0..4 {
            increment(&dao);
        }
        assert_eq!(io.content_string("counter.txt").as_deref(), Some("4"));
        assert_eq!(io.content_string("counter.txt.1").as_deref(), Some("3"));
        assert_eq!(io.content_string("counter.txt.2").as_deref(), Some("2"));
        assert!(io.content("counter.txt.3").is_none());
    }

    #[test]
    fn test_zero_backups() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new().backup_count(0));
        increment(&dao);
        increment(&dao);
        assert_eq!(io.filenames(), vec!["counter.txt".to_string()]);
    }

    #[test]
    fn test_invalid_content_leaves_files_untouched() {
        let io = Arc::new(MemoryIo::new().with_file("counter.txt", "5"));
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.initial_read().unwrap();
        dao.modify(|c| {
            c.reject = true;
            Change::Unchanged
        })
        .unwrap();

        let err = dao
            .modify(|c| {
                c.value = 99;
                Change::Changed
            })
            .unwrap_err();
        assert!(matches!(err, DaoError::InvalidContent(_)));
        assert!(dao.has_pending_changes().unwrap());
        assert_eq!(io.filenames(), vec!["counter.txt".to_string()]);
        assert_eq!(io.content_string("counter.txt").as_deref(), Some("5"));
    }

    #[test]
    fn test_failed_save_keeps_live_file_and_pending_flag() {
        let io = Arc::new(MemoryIo::new().with_file("counter.txt", "5"));
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.initial_read().unwrap();
        let contents = Arc::new(RwLock::new(String::new()));
        let captured = contents.clone();
        dao.set_write_error_handler(Some(Arc::new(move |_: &DaoError, _: &str, content: &str| {
            *captured.write().unwrap() = content.to_string();
        })))
        .unwrap();

        io.set_fail_saves(true);
        let err = increment_err(&dao);
        assert!(matches!(err, DaoError::Write { .. }));
        assert!(dao.has_pending_changes().unwrap());
        assert_eq!(io.content_string("counter.txt").as_deref(), Some("5"));
        assert_eq!(contents.read().unwrap().as_str(), "6");

        io.set_fail_saves(false);
        dao.write_to_file_on_pending_changes().unwrap();
        assert_eq!(io.content_string("counter.txt").as_deref(), Some("6"));
        assert!(!dao.has_pending_changes().unwrap());
    }

    fn increment_err(dao: &Dao<Counter>) -> DaoError {
        dao.modify(|c| {
            c.value += 1;
            Change::Changed
        })
        .unwrap_err()
    }

    #[test]
    fn test_perform_without_auto_save_writes_once() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.perform_without_auto_save(|| {
            for _ in 0..5 {
                increment(&dao);
            }
            assert!(dao.has_pending_changes().unwrap());
            assert!(!dao.is_auto_save_enabled().unwrap());
        })
        .unwrap();

        assert!(dao.is_auto_save_enabled().unwrap());
        assert_eq!(io.save_count(), 1);
        assert_eq!(io.content_string("counter.txt").as_deref(), Some("5"));
    }

    #[test]
    fn test_nested_without_auto_save() {
        let io = Arc::new(MemoryIo::new());
        let dao = dao_with(io.clone(), DaoConfig::new());
        dao.begin_without_auto_save().unwrap();
        dao.begin_without_auto_save().unwrap();
        increment(&dao);
        dao.end_without_auto_save().unwrap();
        // Inner end restores "disabled"
        assert_eq!(io.save_count(), 0);
        dao.end_without_auto_save().unwrap();
        assert_eq!(io.save_count(), 1);
        assert!(matches!(dao.end_without_auto_save(), Err(DaoError::IllegalState(_))));
    }

    #[test]
    fn test_set_auto_save_enabled() {
        let dao = dao_with(Arc::new(MemoryIo::new()), DaoConfig::new());
        assert_eq!(dao.set_auto_save_enabled(true).unwrap(), Change::Unchanged);
        assert_eq!(dao.set_auto_save_enabled(false).unwrap(), Change::Changed);
        assert!(!dao.is_auto_save_enabled().unwrap());
    }

    #[derive(Debug)]
    struct Switching(std::sync::atomic::AtomicBool);

    impl FilenameProvider for Switching {
        fn filename(&self) -> Option<String> {
            Some(if self.0.load(Ordering::SeqCst) { "b.txt" } else { "a.txt" }.to_string())
        }
    }

    #[test]
    fn test_filename_change_hook() {
        let io = Arc::new(MemoryIo::new());
        let switching = Arc::new(Switching(std::sync::atomic::AtomicBool::new(false)));
        let dao = Dao::new(SharedName(switching.clone()), Counter::default(), DaoConfig::new(), io.clone());
        increment(&dao);
        assert_eq!(dao.read(|c| c.filename_changes).unwrap(), 0);

        switching.0.store(true, Ordering::SeqCst);
        increment(&dao);
        assert_eq!(dao.read(|c| c.filename_changes).unwrap(), 1);
        assert!(io.content("b.txt").is_some());
    }

    #[test]
    fn test_filename_change_hook_repeats_after_failed_write() {
        let io = Arc::new(MemoryIo::new());
        let switching = Arc::new(Switching(std::sync::atomic::AtomicBool::new(false)));
        let dao = Dao::new(SharedName(switching.clone()), Counter::default(), DaoConfig::new(), io.clone());
        increment(&dao);

        switching.0.store(true, Ordering::SeqCst);
        io.set_fail_saves(true);
        assert!(matches!(increment_err(&dao), DaoError::Write { .. }));
        assert_eq!(dao.read(|c| c.filename_changes).unwrap(), 1);

        io.set_fail_saves(false);
        dao.write_to_file_on_pending_changes().unwrap();
        assert_eq!(dao.read(|c| c.filename_changes).unwrap(), 2);
        assert!(io.content("b.txt").is_some());

        // Recorded now, no further calls
        increment(&dao);
        assert_eq!(dao.read(|c| c.filename_changes).unwrap(), 2);
    }

    #[test]
    fn test_unencodable_content_is_rejected() {
        let io = Arc::new(MemoryIo::new().with_file("text.txt", "alt"));
        let config = DaoConfig::new().charset(crate::config::Charset::Iso8859_1);
        let dao = Dao::new(ConstantFilename::new("text.txt"), Latin1Text::default(), config, io.clone());

        let err = dao
            .modify(|t| {
                t.0 = "Preis 5 €".to_string();
                Change::Changed
            })
            .unwrap_err();
        assert!(matches!(err, DaoError::InvalidContent(_)));
        assert!(dao.has_pending_changes().unwrap());
        assert_eq!(io.content_string("text.txt").as_deref(), Some("alt"));
        assert_eq!(io.save_count(), 0);
    }

    /// Raw text provider without any escaping.
    #[derive(Default)]
    struct Latin1Text(String);

    impl DataProvider for Latin1Text {
        fn read_from_stream(&mut self, input: &mut dyn Read) -> Result<Change> {
            self.0.clear();
            input.read_to_string(&mut self.0)?;
            Ok(Change::Unchanged)
        }

        fn fill_buffer_for_saving(&self, buffer: &mut String) -> Result<()> {
            buffer.push_str(&self.0);
            Ok(())
        }

        fn init_for_first_time_usage(&mut self) -> Result<Change> {
            Ok(Change::Unchanged)
        }

        fn charset(&self) -> crate::config::Charset {
            crate::config::Charset::Iso8859_1
        }
    }

    #[derive(Debug)]
    struct SharedName(Arc<Switching>);

    impl FilenameProvider for SharedName {
        fn filename(&self) -> Option<String> {
            self.0.filename()
        }
    }
}
