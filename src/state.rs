//! Object type -> state ID -> state.

use crate::core::{Change, Result, ensure_not_empty};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// In-memory registry of per-object states, grouped by object type.
#[derive(Debug)]
pub struct ObjectStateRegistry<S> {
    states: RwLock<HashMap<String, HashMap<String, S>>>,
}

impl<S> Default for ObjectStateRegistry<S> {
    fn default() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }
}

impl<S: Clone + PartialEq> ObjectStateRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; storing an equal state is no change.
    pub fn set_state(&self, object_type: &str, state_id: &str, state: S) -> Result<Change> {
        ensure_not_empty(object_type, "object type")?;
        ensure_not_empty(state_id, "state ID")?;
        let mut states = self.states.write()?;
        let of_type = states.entry(object_type.to_string()).or_default();
        if of_type.get(state_id) == Some(&state) {
            return Ok(Change::Unchanged);
        }
        of_type.insert(state_id.to_string(), state);
        Ok(Change::Changed)
    }

    pub fn state(&self, object_type: &str, state_id: &str) -> Result<Option<S>> {
        Ok(self
            .states
            .read()?
            .get(object_type)
            .and_then(|of_type| of_type.get(state_id))
            .cloned())
    }

    pub fn remove_state(&self, object_type: &str, state_id: &str) -> Result<Change> {
        let mut states = self.states.write()?;
        let Some(of_type) = states.get_mut(object_type) else {
            return Ok(Change::Unchanged);
        };
        let removed = of_type.remove(state_id).is_some();
        if of_type.is_empty() {
            states.remove(object_type);
        }
        Ok(Change::from_bool(removed))
    }

    pub fn states_of_type(&self, object_type: &str) -> Result<HashMap<String, S>> {
        Ok(self
            .states
            .read()?
            .get(object_type)
            .cloned()
            .unwrap_or_default())
    }

    pub fn object_types(&self) -> Result<BTreeSet<String>> {
        Ok(self.states.read()?.keys().cloned().collect())
    }

    pub fn clear_type(&self, object_type: &str) -> Result<Change> {
        Ok(Change::from_bool(self.states.write()?.remove(object_type).is_some()))
    }
}
