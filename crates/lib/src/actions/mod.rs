//! Concrete action behaviours.
//!
//! Every stored [`Action`] carries a type tag. The [`ActionRegistry`] maps
//! each tag to a behaviour implementing [`ActionKind`], which the ledger calls
//! at fixed points:
//!
//! 1. `process_data` prepares the record from the caller's [`ActionData`]
//!    (content actions create their node or revision here).
//! 2. `repute_users` grants reputation, once, on first persistence.
//! 3. `process_action` applies the node mutation.
//! 4. `cancel_action` undoes the node mutation on cancel.
//!
//! Reputation reversal is handled by the ledger itself, so behaviours only
//! ever grant.

use std::fmt;

use serde::Serialize;

use crate::{
    Result,
    constants::ACTION_SUFFIX,
    ids::{ActionId, NodeId, UserId},
    ledger::{ActionContext, Transaction},
    model::{Action, RevisionContent},
};

mod accept;
mod content;
mod delete;
mod favorite;
mod flag;
mod registry;
mod vote;

pub use accept::AcceptAnswerAction;
pub use content::{
    AnswerAction, AskAction, CommentAction, RetagAction, ReviseAction, RollbackAction,
};
pub use delete::DeleteAction;
pub use favorite::FavoriteAction;
pub use flag::FlagAction;
pub use registry::ActionRegistry;
pub use vote::{VoteDownAction, VoteUpAction, VoteUpCommentAction};

/// Caller-supplied input consumed by `process_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionData {
    #[default]
    None,
    Ask(RevisionContent),
    Answer {
        question: NodeId,
        content: RevisionContent,
    },
    Comment {
        parent: NodeId,
        text: String,
    },
    Revise(RevisionContent),
    Retag {
        tag_names: String,
    },
    Rollback {
        revision: u32,
    },
}

impl ActionData {
    pub fn name(&self) -> &'static str {
        match self {
            ActionData::None => "none",
            ActionData::Ask(_) => "ask",
            ActionData::Answer { .. } => "answer",
            ActionData::Comment { .. } => "comment",
            ActionData::Revise(_) => "revise",
            ActionData::Retag { .. } => "retag",
            ActionData::Rollback { .. } => "rollback",
        }
    }
}

/// The data needed to render one line of activity for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescription {
    pub action: ActionId,
    pub action_type: String,
    pub actor: UserId,
    pub actor_name: String,
    pub verb: String,
    pub node: Option<NodeId>,
    /// Title of the node, or of its question for answers and comments.
    pub node_title: Option<String>,
    pub reason: Option<String>,
}

impl fmt::Display for ActionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.actor_name, self.verb)?;
        match (&self.node_title, &self.node) {
            (Some(title), _) if !title.is_empty() => write!(f, " \"{title}\"")?,
            (_, Some(node)) => write!(f, " {node}")?,
            _ => {}
        }
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

/// Behaviour attached to an action type tag.
///
/// Every hook has an inert default, so [`BaseAction`] is simply the trait
/// with nothing overridden.
pub trait ActionKind: Send + Sync + fmt::Debug {
    /// Whether a stored action of this type must point at a node.
    fn requires_node(&self) -> bool {
        true
    }

    /// Prepares the record before it is first persisted.
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let _ = (ctx, data);
        Ok(())
    }

    /// Grants reputation. Called exactly once, at creation.
    fn repute_users(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Applies the forward node mutation.
    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Applies the inverse node mutation.
    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Past-tense verb for activity lines.
    fn verb(&self) -> &'static str {
        "acted on"
    }

    /// Free-text reason shown with the action, if the type has one.
    fn reason(&self, action: &Action, tx: &Transaction<'_>) -> Result<Option<String>> {
        let _ = (action, tx);
        Ok(None)
    }

    fn describe(&self, action: &Action, tx: &Transaction<'_>) -> Result<ActionDescription> {
        let actor = tx.user(&action.user)?;
        let node_title = match &action.node {
            Some(id) => Some(crate::content::display_title(tx, id)?),
            None => None,
        };
        Ok(ActionDescription {
            action: action.id.clone(),
            action_type: action.action_type.clone(),
            actor: actor.id,
            actor_name: actor.username,
            verb: self.verb().to_string(),
            node: action.node.clone(),
            node_title,
            reason: self.reason(action, tx)?,
        })
    }
}

/// A registrable action type with a compile-time name.
pub trait ActionType: ActionKind + Default + 'static {
    /// Type name the tag is derived from, e.g. `"VoteUpAction"`.
    const NAME: &'static str;

    fn type_tag() -> String {
        derive_type_tag(Self::NAME)
    }
}

/// Derives the stored tag from a type name: lower-cased, trailing
/// `action` removed.
///
/// `"VoteUpAction"` becomes `"voteup"`.
pub fn derive_type_tag(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.strip_suffix(ACTION_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => lower,
    }
}

/// Behaviour for tags nobody registered: no reputation, no mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseAction;

impl ActionKind for BaseAction {
    fn requires_node(&self) -> bool {
        false
    }
}

/// Registers every built-in action type.
///
/// Called once when a ledger is opened; the order here has no meaning.
pub fn register_builtins(registry: &mut ActionRegistry) -> Result<()> {
    registry.register::<VoteUpAction>()?;
    registry.register::<VoteDownAction>()?;
    registry.register::<VoteUpCommentAction>()?;
    registry.register::<FlagAction>()?;
    registry.register::<AcceptAnswerAction>()?;
    registry.register::<FavoriteAction>()?;
    registry.register::<DeleteAction>()?;
    registry.register::<AskAction>()?;
    registry.register::<AnswerAction>()?;
    registry.register::<CommentAction>()?;
    registry.register::<ReviseAction>()?;
    registry.register::<RetagAction>()?;
    registry.register::<RollbackAction>()?;
    Ok(())
}

/// Error for a payload that does not fit `action_type`.
pub(crate) fn unexpected_payload(action_type: &str, data: &ActionData) -> crate::Error {
    crate::ledger::LedgerError::InvalidPayload {
        action_type: action_type.to_string(),
        reason: format!("unexpected {} payload", data.name()),
    }
    .into()
}
