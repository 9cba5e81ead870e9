// ============================================================================
// Asynchronous auditor
// ============================================================================

use super::auditor::{AuditNotation, Auditor};
use super::item::AuditItem;
use crate::core::{Change, DaoError, Result};
use crate::security::CurrentUserIdProvider;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{Level, event, info_span};

/// Consumes batches of audit items on the background worker.
pub trait AuditPerformer: Send + Sync + 'static {
    fn perform(&self, items: &[AuditItem]);
}

impl<F> AuditPerformer for F
where
    F: Fn(&[AuditItem]) + Send + Sync + 'static,
{
    fn perform(&self, items: &[AuditItem]) {
        self(items)
    }
}

/// Lifecycle of an [`AsyncAuditor`]; transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditorState {
    Running,
    Stopping,
    Stopped,
}

struct Inner {
    state: AuditorState,
    sender: Option<UnboundedSender<AuditItem>>,
    join_handle: Option<JoinHandle<()>>,
}

/// Queues audit items to a tokio task that hands them to an [`AuditPerformer`].
///
/// Must be created inside a tokio runtime, otherwise [`AsyncAuditor::new`] fails
/// with [`DaoError::IllegalState`]. After [`AsyncAuditor::stop`] every audit call
/// fails the same way.
pub struct AsyncAuditor {
    current_user: Arc<dyn CurrentUserIdProvider>,
    notation: AuditNotation,
    inner: Mutex<Inner>,
}

impl AsyncAuditor {
    pub fn new(current_user: Arc<dyn CurrentUserIdProvider>, performer: impl AuditPerformer) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|err| DaoError::IllegalState(format!("Async auditor needs a tokio runtime: {}", err)))?;
        let (sender, receiver) = unbounded_channel();
        let join_handle = runtime.spawn(drain_queue(receiver, Arc::new(performer)));
        Ok(Self {
            current_user,
            notation: AuditNotation::Json,
            inner: Mutex::new(Inner {
                state: AuditorState::Running,
                sender: Some(sender),
                join_handle: Some(join_handle),
            }),
        })
    }

    pub fn with_notation(mut self, notation: AuditNotation) -> Self {
        self.notation = notation;
        self
    }

    pub fn state(&self) -> Result<AuditorState> {
        Ok(self.inner.lock()?.state)
    }

    /// Stops accepting items and waits until everything queued was performed.
    ///
    /// `Changed` on the first call, `Unchanged` afterwards.
    pub async fn stop(&self) -> Result<Change> {
        let join_handle = {
            let mut inner = self.inner.lock()?;
            if inner.state != AuditorState::Running {
                return Ok(Change::Unchanged);
            }
            inner.state = AuditorState::Stopping;
            // Closing the channel ends the worker once the queue is empty
            inner.sender = None;
            inner.join_handle.take()
        };

        let joined = match join_handle {
            Some(join_handle) => join_handle
                .await
                .map_err(|err| DaoError::IllegalState(format!("audit worker join: {}", err))),
            None => Ok(()),
        };

        self.inner.lock()?.state = AuditorState::Stopped;
        joined?;
        Ok(Change::Changed)
    }
}

impl Drop for AsyncAuditor {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.get_mut() {
            inner.sender = None;
            if let Some(join_handle) = inner.join_handle.take() {
                join_handle.abort();
            }
        }
    }
}

impl Auditor for AsyncAuditor {
    fn current_user_id(&self) -> Option<String> {
        self.current_user.current_user_id()
    }

    fn handle_audit_item(&self, item: AuditItem) -> Result<()> {
        let inner = self.inner.lock()?;
        let sender = match (&inner.state, &inner.sender) {
            (AuditorState::Running, Some(sender)) => sender,
            _ => {
                return Err(DaoError::IllegalState(
                    "Auditor was already stopped and does not accept further items".to_string(),
                ));
            }
        };
        sender
            .send(item)
            .map_err(|_| DaoError::IllegalState("Audit worker is no longer running".to_string()))
    }

    fn notation(&self) -> AuditNotation {
        self.notation
    }
}

/// Takes everything available per wake-up and performs it as one batch.
async fn drain_queue(mut receiver: UnboundedReceiver<AuditItem>, performer: Arc<dyn AuditPerformer>) {
    let mut batch = Vec::new();
    while let Some(item) = receiver.recv().await {
        batch.push(item);
        while let Ok(item) = receiver.try_recv() {
            batch.push(item);
        }

        let span = info_span!("audit.batch", size = batch.len());
        span.in_scope(|| performer.perform(&batch));
        event!(Level::DEBUG, count = batch.len(), "audit batch performed");
        batch.clear();
    }
    event!(Level::DEBUG, "audit worker finished");
}
