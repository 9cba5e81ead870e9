use std::fmt;
use std::sync::RwLock;

/// Supplies the ID of the user on whose behalf an operation runs.
pub trait CurrentUserIdProvider: Send + Sync + fmt::Debug {
    /// `None` when nobody is logged in.
    fn current_user_id(&self) -> Option<String>;
}

/// Always the same user; handy for background jobs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedUserId(Option<String>);

impl FixedUserId {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CurrentUserIdProvider for FixedUserId {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Mutable current user, switched on login and logout.
#[derive(Debug, Default)]
pub struct SessionUserId {
    user_id: RwLock<Option<String>>,
}

impl SessionUserId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_id(&self, user_id: Option<String>) {
        match self.user_id.write() {
            Ok(mut current) => *current = user_id,
            Err(poisoned) => *poisoned.into_inner() = user_id,
        }
    }
}

impl CurrentUserIdProvider for SessionUserId {
    fn current_user_id(&self) -> Option<String> {
        match self.user_id.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
