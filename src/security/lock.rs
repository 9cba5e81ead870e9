// ============================================================================
// Object Lock Manager
// ============================================================================

use super::user_id::CurrentUserIdProvider;
use crate::core::{Change, DaoError, Locked, Result, ensure_not_empty};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Who locked an object and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    user_id: String,
    locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            locked_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn locked_at(&self) -> DateTime<Utc> {
        self.locked_at
    }
}

/// Registry of object locks, one owner per object ID.
///
/// Locks never expire; they are released explicitly or in bulk when the
/// owning session ends.
#[derive(Debug)]
pub struct LockManager {
    current_user: Arc<dyn CurrentUserIdProvider>,
    // Key: locked object ID
    locked_objects: RwLock<HashMap<String, LockInfo>>,
}

impl LockManager {
    pub fn new(current_user: Arc<dyn CurrentUserIdProvider>) -> Self {
        Self {
            current_user,
            locked_objects: RwLock::new(HashMap::new()),
        }
    }

    fn current_user_id(&self) -> Option<String> {
        self.current_user
            .current_user_id()
            .filter(|user_id| !user_id.is_empty())
    }

    pub fn lock_info(&self, object_id: &str) -> Result<Option<LockInfo>> {
        Ok(self.locked_objects.read()?.get(object_id).cloned())
    }

    pub fn lock_user_id(&self, object_id: &str) -> Result<Option<String>> {
        Ok(self.lock_info(object_id)?.map(|info| info.user_id))
    }

    pub fn lock_date_time(&self, object_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock_info(object_id)?.map(|info| info.locked_at))
    }

    /// Locks for the current user.
    pub fn lock_object(&self, object_id: &str) -> Result<Locked> {
        ensure_not_empty(object_id, "object ID")?;
        match self.current_user_id() {
            Some(user_id) => self.lock_object_for_user(object_id, &user_id),
            None => Ok(Locked::NotLocked),
        }
    }

    /// `Locked` if the object is now locked by `user_id`, including when it already was.
    pub fn lock_object_for_user(&self, object_id: &str, user_id: &str) -> Result<Locked> {
        ensure_not_empty(object_id, "object ID")?;
        if user_id.is_empty() {
            return Ok(Locked::NotLocked);
        }
        let mut locked = self.locked_objects.write()?;
        Ok(Self::lock_locked(&mut locked, object_id, user_id))
    }

    fn lock_locked(locked: &mut HashMap<String, LockInfo>, object_id: &str, user_id: &str) -> Locked {
        if let Some(current) = locked.get(object_id) {
            return Locked::from_bool(current.user_id == user_id);
        }
        locked.insert(object_id.to_string(), LockInfo::new(user_id));
        info!("User '{}' locked object '{}'", user_id, object_id);
        Locked::Locked
    }

    /// Releases every other lock of the current user, then locks `object_id`.
    ///
    /// Returns the lock result and the released object IDs.
    pub fn lock_object_and_unlock_all_others(&self, object_id: &str) -> Result<(Locked, Vec<String>)> {
        ensure_not_empty(object_id, "object ID")?;
        match self.current_user_id() {
            Some(user_id) => self.lock_object_and_unlock_all_others_for_user(object_id, &user_id),
            None => Ok((Locked::NotLocked, Vec::new())),
        }
    }

    /// Both steps happen under one write lock, so a user never holds two locks.
    pub fn lock_object_and_unlock_all_others_for_user(
        &self,
        object_id: &str,
        user_id: &str,
    ) -> Result<(Locked, Vec<String>)> {
        ensure_not_empty(object_id, "object ID")?;
        if user_id.is_empty() {
            return Ok((Locked::NotLocked, Vec::new()));
        }
        let mut locked = self.locked_objects.write()?;
        let keep: HashSet<String> = HashSet::from([object_id.to_string()]);
        let released = Self::unlock_all_locked(&mut locked, user_id, Some(&keep));
        if !released.is_empty() {
            info!("Unlocked all other objects of user '{}': {:?}", user_id, released);
        }
        Ok((Self::lock_locked(&mut locked, object_id, user_id), released))
    }

    /// Unlocks for the current user.
    pub fn unlock_object(&self, object_id: &str) -> Result<Change> {
        ensure_not_empty(object_id, "object ID")?;
        match self.current_user_id() {
            Some(user_id) => self.unlock_object_for_user(&user_id, object_id),
            None => Ok(Change::Unchanged),
        }
    }

    /// Only the lock owner can unlock.
    pub fn unlock_object_for_user(&self, user_id: &str, object_id: &str) -> Result<Change> {
        ensure_not_empty(user_id, "user ID")?;
        ensure_not_empty(object_id, "object ID")?;
        let mut locked = self.locked_objects.write()?;
        match locked.get(object_id) {
            None => {
                // Happens after a manual bulk unlock
                warn!(
                    "User '{}' could not unlock object '{}' because it is not locked",
                    user_id, object_id
                );
                Ok(Change::Unchanged)
            }
            Some(current) if current.user_id != user_id => {
                warn!(
                    "User '{}' could not unlock object '{}' because it is locked by '{}'",
                    user_id, object_id, current.user_id
                );
                Ok(Change::Unchanged)
            }
            Some(_) => {
                if locked.remove(object_id).is_none() {
                    return Err(DaoError::IllegalState(
                        "Internal inconsistency: removing from lock list failed".to_string(),
                    ));
                }
                info!("User '{}' unlocked object '{}'", user_id, object_id);
                Ok(Change::Changed)
            }
        }
    }

    pub fn unlock_all_objects_of_current_user(&self) -> Result<Vec<String>> {
        self.unlock_all_objects_of_current_user_except(None)
    }

    pub fn unlock_all_objects_of_current_user_except(&self, keep_locked: Option<&HashSet<String>>) -> Result<Vec<String>> {
        match self.current_user_id() {
            Some(user_id) => self.unlock_all_objects_of_user_except(&user_id, keep_locked),
            None => Ok(Vec::new()),
        }
    }

    pub fn unlock_all_objects_of_user(&self, user_id: &str) -> Result<Vec<String>> {
        self.unlock_all_objects_of_user_except(user_id, None)
    }

    /// Privileged bulk unlock; returns the released object IDs, sorted.
    pub fn unlock_all_objects_of_user_except(
        &self,
        user_id: &str,
        keep_locked: Option<&HashSet<String>>,
    ) -> Result<Vec<String>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }
        let released = {
            let mut locked = self.locked_objects.write()?;
            Self::unlock_all_locked(&mut locked, user_id, keep_locked)
        };
        if !released.is_empty() {
            info!("Unlocked all objects of user '{}': {:?}", user_id, released);
        }
        Ok(released)
    }

    fn unlock_all_locked(
        locked: &mut HashMap<String, LockInfo>,
        user_id: &str,
        keep_locked: Option<&HashSet<String>>,
    ) -> Vec<String> {
        let mut released: Vec<String> = locked
            .iter()
            .filter(|(object_id, info)| {
                info.user_id == user_id && !keep_locked.is_some_and(|keep| keep.contains(*object_id))
            })
            .map(|(object_id, _)| object_id.clone())
            .collect();
        released.sort();
        for object_id in &released {
            locked.remove(object_id);
        }
        released
    }

    pub fn is_object_locked_by_current_user(&self, object_id: &str) -> Result<bool> {
        let Some(lock_user) = self.lock_user_id(object_id)? else {
            return Ok(false);
        };
        Ok(self.current_user_id().as_deref() == Some(lock_user.as_str()))
    }

    pub fn is_object_locked_by_other_user(&self, object_id: &str) -> Result<bool> {
        let Some(lock_user) = self.lock_user_id(object_id)? else {
            return Ok(false);
        };
        Ok(self.current_user_id().as_deref() != Some(lock_user.as_str()))
    }

    pub fn is_object_locked_by_any_user(&self, object_id: &str) -> Result<bool> {
        Ok(self.locked_objects.read()?.contains_key(object_id))
    }

    pub fn all_locked_objects(&self) -> Result<HashSet<String>> {
        Ok(self.locked_objects.read()?.keys().cloned().collect())
    }
}
