//! Ledger specific errors

use thiserror::Error;

use crate::ids::{ActionId, NodeId, UserId};

/// Errors raised by the action ledger and the content operations it drives.
///
/// User-facing refusals (permissions, limits, duplicates) are not here; they
/// belong to [`crate::commands::CommandError`]. A `LedgerError` means the call
/// was malformed or an internal invariant did not hold.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An internal consistency rule was broken.
    #[error("Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// A typed operation met an action tag with no registered behaviour.
    #[error("Unknown action type: {tag}")]
    UnknownActionType { tag: String },

    /// Two behaviours were registered under the same tag.
    #[error("Action type already registered: {tag}")]
    DuplicateActionType { tag: String },

    /// A derived action tag does not fit the stored column.
    #[error("Action type tag '{tag}' is longer than {max} characters")]
    ActionTypeTooLong { tag: String, max: usize },

    /// The action type needs a target node and none was given.
    #[error("Action type {action_type} requires a target node")]
    TargetRequired { action_type: String },

    /// The target node cannot receive this action.
    #[error("Node {node} is not a valid target for {action_type}: {reason}")]
    InvalidTarget {
        node: NodeId,
        action_type: String,
        reason: String,
    },

    /// The payload passed with an action does not fit its type.
    #[error("Invalid payload for {action_type}: {reason}")]
    InvalidPayload { action_type: String, reason: String },

    /// The requested revision number does not exist on the node.
    #[error("Node {node} has no revision {revision}")]
    RevisionNotFound { node: NodeId, revision: u32 },

    /// No live action of the requested types exists.
    #[error("No current {types:?} action by {user} on {node}")]
    NoCurrentAction {
        types: Vec<String>,
        user: UserId,
        node: NodeId,
    },

    /// The commit kept losing to concurrent writers.
    #[error("Operation {operation} gave up after {attempts} conflicting commits")]
    RetriesExhausted {
        operation: &'static str,
        attempts: usize,
    },
}

impl LedgerError {
    /// Check if this error indicates something was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::RevisionNotFound { .. } | LedgerError::NoCurrentAction { .. }
        )
    }

    /// Check if this error reports a broken internal invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvariantViolation { .. } | LedgerError::UnknownActionType { .. }
        )
    }

    /// Check if this error comes from registering action types.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            LedgerError::DuplicateActionType { .. } | LedgerError::ActionTypeTooLong { .. }
        )
    }

    /// Check if this error rejects the arguments of the call.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            LedgerError::TargetRequired { .. }
                | LedgerError::InvalidTarget { .. }
                | LedgerError::InvalidPayload { .. }
        )
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        LedgerError::InvariantViolation {
            reason: reason.into(),
        }
    }

    pub(crate) fn already_reversed(action: &ActionId) -> Self {
        Self::invariant(format!("reputation for action {action} is already reversed"))
    }
}

impl From<LedgerError> for crate::Error {
    fn from(err: LedgerError) -> Self {
        crate::Error::Ledger(err)
    }
}
