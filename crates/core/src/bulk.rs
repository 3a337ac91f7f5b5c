//! Bulk actions over selected rows and their safety guards.
//!
//! The acting user's own id is removed from every bulk target set, both when
//! the client prepares a request and again on the server.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Delete,
    Activate,
    Deactivate,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
        }
    }

    /// Whether the action removes rows from the list.
    pub fn removes_rows(self) -> bool {
        matches!(self, BulkAction::Delete)
    }

    /// Flash message shown after a successful run.
    pub fn success_message(self) -> &'static str {
        match self {
            BulkAction::Delete => "Users deleted successfully.",
            BulkAction::Activate => "Users activated successfully.",
            BulkAction::Deactivate => "Users deactivated successfully.",
        }
    }
}

impl FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(BulkAction::Delete),
            "activate" => Ok(BulkAction::Activate),
            "deactivate" => Ok(BulkAction::Deactivate),
            _ => Err("Invalid action.".to_string()),
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a bulk action was stopped before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkGuard {
    #[error("Please select at least one item")]
    NothingSelected,

    #[error("You cannot {0} your own account")]
    OnlySelf(BulkAction),
}

/// A bulk action ready to send: the target ids never include the acting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub ids: BTreeSet<RecordId>,
    /// Whether the acting user's id was removed from the selection.
    pub skipped_self: bool,
}

impl BulkRequest {
    /// Validate a selection for `action` on behalf of `acting_user`.
    pub fn prepare(
        action: BulkAction,
        selected: &BTreeSet<RecordId>,
        acting_user: &RecordId,
    ) -> Result<Self, BulkGuard> {
        if selected.is_empty() {
            return Err(BulkGuard::NothingSelected);
        }
        let (ids, skipped_self) = exclude_acting_user(selected.iter().cloned(), acting_user);
        if ids.is_empty() {
            return Err(BulkGuard::OnlySelf(action));
        }
        Ok(Self {
            action,
            ids,
            skipped_self,
        })
    }
}

/// Remove `acting_user` from `ids`, reporting whether it was present.
pub fn exclude_acting_user<T: Ord + PartialEq>(
    ids: impl IntoIterator<Item = T>,
    acting_user: &T,
) -> (BTreeSet<T>, bool) {
    let mut skipped = false;
    let kept: BTreeSet<T> = ids
        .into_iter()
        .filter(|id| {
            let is_self = id == acting_user;
            skipped |= is_self;
            !is_self
        })
        .collect();
    (kept, skipped)
}
