//!
//! Quorum: the action ledger and reputation engine of a Q&A forum.
//!
//! Every interaction that changes site state is recorded as an immutable, typed
//! [`model::Action`]. Actions mutate [`model::Node`]s and grant or reverse user
//! reputation, and can be canceled with exact reversal.
//!
//! ## Core Concepts
//!
//! * **Ledger (`ledger::Ledger`)**: The entry point. Creates, cancels and resolves actions,
//!   running every operation as one atomic [`ledger::Transaction`] against the store.
//! * **Action types (`actions`)**: Concrete behaviours (votes, flags, accepts, favorites,
//!   deletes and content edits) registered by tag in an [`actions::ActionRegistry`].
//! * **Reputation (`ledger::reputation`)**: Signed [`model::ActionRepute`] rows whose sum per
//!   user always equals that user's reputation counter.
//! * **Content (`content`)**: Node revisioning, activation, rollback and tag usage accounting.
//! * **Store (`store::EntityStore`)**: A pluggable record store with atomic, version-checked
//!   changesets. [`store::InMemory`] is the bundled implementation.
//! * **Commands (`commands`)**: Permission, rate-limit and duplicate checks layered on top
//!   of the ledger, raising user-facing [`commands::CommandError`]s.

pub mod actions;
pub mod clock;
pub mod commands;
pub mod constants;
pub mod content;
pub mod ids;
pub mod ledger;
pub mod model;
pub mod settings;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use ids::{ActionId, NodeId, ReputeId, RevisionId, UserId};
pub use ledger::Ledger;
pub use settings::Settings;

/// Result type used throughout the Quorum library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Quorum library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured ledger errors from the ledger module
    #[error(transparent)]
    Ledger(ledger::LedgerError),

    /// User-facing command errors from the commands module
    #[error(transparent)]
    Command(commands::CommandError),

    /// Configuration errors from the settings module
    #[error(transparent)]
    Settings(settings::SettingsError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Ledger(_) => "ledger",
            Error::Command(_) => "commands",
            Error::Settings(_) => "settings",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Ledger(ledger_err) => ledger_err.is_not_found(),
            Error::Command(command_err) => command_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is an optimistic concurrency conflict.
    ///
    /// Conflicting commits can be retried from scratch.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error reports a broken internal invariant.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Error::Ledger(ledger_err) => ledger_err.is_invariant_violation(),
            _ => false,
        }
    }

    /// Check if this error was raised by the command layer.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Command(_))
    }

    /// Returns the command error, if this is one.
    pub fn as_command_error(&self) -> Option<&commands::CommandError> {
        match self {
            Error::Command(command_err) => Some(command_err),
            _ => None,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            Error::Settings(settings_err) => settings_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is configuration related.
    pub fn is_settings_error(&self) -> bool {
        matches!(self, Error::Settings(_))
    }
}
