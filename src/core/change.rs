use serde::{Deserialize, Serialize};

/// Whether an operation modified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Change {
    Changed,
    Unchanged,
}

impl Change {
    pub fn from_bool(changed: bool) -> Self {
        if changed { Change::Changed } else { Change::Unchanged }
    }

    #[inline]
    pub fn is_changed(self) -> bool {
        self == Change::Changed
    }

    #[inline]
    pub fn is_unchanged(self) -> bool {
        self == Change::Unchanged
    }

    /// `Changed` if either side changed.
    pub fn or(self, other: Change) -> Change {
        Change::from_bool(self.is_changed() || other.is_changed())
    }
}

impl From<bool> for Change {
    fn from(changed: bool) -> Self {
        Change::from_bool(changed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Success {
    Success,
    Failure,
}

impl Success {
    pub fn from_bool(success: bool) -> Self {
        if success { Success::Success } else { Success::Failure }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == Success::Success
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        self == Success::Failure
    }
}

/// Outcome of a lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locked {
    Locked,
    NotLocked,
}

impl Locked {
    pub fn from_bool(locked: bool) -> Self {
        if locked { Locked::Locked } else { Locked::NotLocked }
    }

    #[inline]
    pub fn is_locked(self) -> bool {
        self == Locked::Locked
    }
}
