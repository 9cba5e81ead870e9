use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle counters of a DAO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaoStats {
    pub init_count: u64,
    pub last_init: Option<DateTime<Utc>>,
    pub read_count: u64,
    pub last_read: Option<DateTime<Utc>>,
    pub write_count: u64,
    pub last_write: Option<DateTime<Utc>>,
}

impl DaoStats {
    pub(crate) fn record_init(&mut self) {
        self.init_count += 1;
        self.last_init = Some(Utc::now());
    }

    pub(crate) fn record_read(&mut self) {
        self.read_count += 1;
        self.last_read = Some(Utc::now());
    }

    pub(crate) fn record_write(&mut self) {
        self.write_count += 1;
        self.last_write = Some(Utc::now());
    }
}
