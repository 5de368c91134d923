//! User-facing refusals raised by the command layer.

use thiserror::Error;

/// Why a user request was refused.
///
/// These are expected outcomes of ordinary use, not faults. The `action`
/// fields name what the user tried to do ("vote", "flag posts", ...).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// An anonymous user attempted a gated action.
    #[error("Anonymous users cannot {action}")]
    Unauthorized { action: &'static str },

    /// The user tried to act on their own post.
    #[error("You cannot {action} your own post")]
    SelfActionForbidden { action: &'static str },

    /// The user's reputation is below the threshold for the action.
    #[error("You need {required} reputation to {action}, you have {reputation}")]
    InsufficientReputation {
        action: &'static str,
        required: i64,
        reputation: i64,
    },

    /// The daily cap for the action is used up.
    #[error("No {action} left today, the limit is {limit} per day")]
    RateLimited { action: &'static str, limit: u32 },

    /// The user already did this to the post.
    #[error("You already {action} this post: {detail}")]
    DuplicateAction {
        action: &'static str,
        detail: String,
    },

    /// The vote is too old to cancel.
    #[error("A vote cannot be canceled more than {days} days after it was cast")]
    Stale { days: i64 },

    /// A referenced record does not exist or is of the wrong kind.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Required input is missing or empty.
    #[error("{field} is empty")]
    ValidationFailed { field: &'static str },

    /// The user is known but may not do this regardless of reputation.
    #[error("Only {who} can {action}")]
    NotPermitted {
        action: &'static str,
        who: &'static str,
    },
}

impl CommandError {
    /// Check if this error indicates a referenced record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound { .. })
    }

    /// Check if this error is a permission refusal of any kind.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            CommandError::Unauthorized { .. }
                | CommandError::SelfActionForbidden { .. }
                | CommandError::InsufficientReputation { .. }
                | CommandError::NotPermitted { .. }
        )
    }

    /// Check if this error would go away by waiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CommandError::RateLimited { .. })
    }

    /// Check if this error rejects the user's input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, CommandError::ValidationFailed { .. })
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Unauthorized { .. } => "unauthorized",
            CommandError::SelfActionForbidden { .. } => "self_action_forbidden",
            CommandError::InsufficientReputation { .. } => "insufficient_reputation",
            CommandError::RateLimited { .. } => "rate_limited",
            CommandError::DuplicateAction { .. } => "duplicate_action",
            CommandError::Stale { .. } => "stale",
            CommandError::NotFound { .. } => "not_found",
            CommandError::ValidationFailed { .. } => "validation_failed",
            CommandError::NotPermitted { .. } => "not_permitted",
        }
    }
}

impl From<CommandError> for crate::Error {
    fn from(err: CommandError) -> Self {
        crate::Error::Command(err)
    }
}
