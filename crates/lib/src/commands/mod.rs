//! User commands.
//!
//! Each command checks who may do what (authentication, authorship,
//! reputation thresholds, daily limits and duplicates) and then drives the
//! ledger. The checks and the resulting actions run in one transaction, so a
//! concurrent request cannot slip between "is there a live flag?" and
//! "create a flag".
//!
//! `actor` is `None` for anonymous requests.

use serde::Serialize;
use tracing::info;

use crate::{
    Result,
    actions::{
        AcceptAnswerAction, ActionData, ActionType, AnswerAction, AskAction, CommentAction,
        DeleteAction, FavoriteAction, FlagAction, RetagAction, ReviseAction, RollbackAction,
        VoteDownAction, VoteUpAction, VoteUpCommentAction,
    },
    ids::{NodeId, UserId},
    ledger::{Ledger, Transaction},
    model::{Action, Node, NodeType, RevisionContent, User},
    store::ActionFilter,
};

mod errors;
pub mod permissions;

pub use errors::CommandError;

/// Direction of a post vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }

    /// Tag of the action recording a vote in this direction.
    pub fn type_tag(&self) -> String {
        match self {
            VoteDirection::Up => VoteUpAction::type_tag(),
            VoteDirection::Down => VoteDownAction::type_tag(),
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        if tag == VoteUpAction::type_tag() {
            Some(VoteDirection::Up)
        } else if tag == VoteDownAction::type_tag() {
            Some(VoteDirection::Down)
        } else {
            None
        }
    }
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`vote_post`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    /// The vote created, or the one that was withdrawn.
    pub action: Action,
    /// The user's vote on the post afterwards.
    pub state: Option<VoteDirection>,
    /// Votes the user may still cast today.
    pub votes_left: u32,
}

/// Result of a toggling command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub action: Action,
    /// Whether the toggle is now on.
    pub active: bool,
}

/// Result of [`delete_post`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "action", rename_all = "lowercase")]
pub enum DeleteOutcome {
    Deleted(Action),
    /// The post was already deleted and its delete action got canceled.
    Restored(Action),
}

impl DeleteOutcome {
    pub fn action(&self) -> &Action {
        match self {
            DeleteOutcome::Deleted(action) | DeleteOutcome::Restored(action) => action,
        }
    }
}

/// Result of [`accept_answer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptOutcome {
    /// The new acceptance, `None` if the answer was un-accepted.
    pub accepted: Option<Action>,
    /// Acceptances canceled along the way.
    pub canceled: Vec<Action>,
}

// === Voting ===

/// Votes a post up or down, or withdraws the user's existing vote.
///
/// Any existing vote is withdrawn regardless of `direction`; a second call
/// is needed to vote the other way.
pub fn vote_post(
    ledger: &Ledger,
    actor: Option<&UserId>,
    node: &NodeId,
    direction: VoteDirection,
) -> Result<VoteOutcome> {
    let outcome = ledger.run("vote_post", |tx| {
        let user = require_user(tx, actor, "vote")?;
        let post = load_node(tx, node)?;
        if post.author == user.id {
            return Err(CommandError::SelfActionForbidden { action: "vote on" }.into());
        }
        let settings = tx.settings().clone();
        let (allowed, required, action) = match direction {
            VoteDirection::Up => (
                permissions::can_vote_up(&user, &settings),
                settings.rep_to_vote_up,
                "vote up",
            ),
            VoteDirection::Down => (
                permissions::can_vote_down(&user, &settings),
                settings.rep_to_vote_down,
                "vote down",
            ),
        };
        if !allowed {
            return Err(insufficient(action, required, &user));
        }

        let today = count_today(tx, &user.id, &vote_tags())?;
        if today >= settings.max_votes_per_day {
            return Err(CommandError::RateLimited {
                action: "votes",
                limit: settings.max_votes_per_day,
            }
            .into());
        }

        let votes_left = settings.max_votes_per_day - today - 1;
        match tx.current_action(&vote_tags(), &post.id, &user.id)? {
            Some(current) => {
                if current.action_date < tx.now() - settings.unvote_deadline() {
                    return Err(CommandError::Stale {
                        days: settings.deny_unvote_days,
                    }
                    .into());
                }
                let withdrawn = tx.cancel_or_delete_action(&current.id, Some(&user.id))?;
                Ok(VoteOutcome {
                    action: withdrawn.into_action(),
                    state: None,
                    votes_left: votes_left + 1,
                })
            }
            None => {
                let action = tx.create_action(
                    &direction.type_tag(),
                    &user.id,
                    Some(&post.id),
                    "",
                    &ActionData::None,
                )?;
                Ok(VoteOutcome {
                    action,
                    state: Some(direction),
                    votes_left,
                })
            }
        }
    })?;
    Ok(VoteOutcome {
        action: ledger.reload(outcome.action)?,
        ..outcome
    })
}

/// The user's live vote on a post.
pub fn vote_state(ledger: &Ledger, user: &UserId, node: &NodeId) -> Result<Option<VoteDirection>> {
    Ok(ledger
        .find_current(&vote_tags(), node, user)?
        .and_then(|vote| VoteDirection::from_tag(&vote.action_type)))
}

/// Votes cast by `user` in the last day, withdrawn ones included.
pub fn votes_today(ledger: &Ledger, user: &UserId) -> Result<u32> {
    ledger.read(|tx| count_today(tx, user, &vote_tags()))
}

/// Likes a comment, or takes the like back.
pub fn like_comment(ledger: &Ledger, actor: Option<&UserId>, comment: &NodeId) -> Result<ToggleOutcome> {
    let tag = VoteUpCommentAction::type_tag();
    let outcome = ledger.run("like_comment", |tx| {
        let user = require_user(tx, actor, "like comments")?;
        let comment = load_kind(tx, comment, NodeType::Comment)?;
        if comment.author == user.id {
            return Err(CommandError::SelfActionForbidden { action: "like" }.into());
        }
        let settings = tx.settings();
        if !permissions::can_like_comment(&user, settings) {
            return Err(insufficient("like comments", settings.rep_to_like_comment, &user));
        }
        let (action, active) = tx.create_or_cancel_action(&tag, &user.id, &comment.id, "")?;
        Ok(ToggleOutcome { action, active })
    })?;
    Ok(ToggleOutcome {
        action: ledger.reload(outcome.action)?,
        ..outcome
    })
}

// === Moderation ===

/// Flags a post as inappropriate.
///
/// A user can hold one live flag per post. Reaching the configured flag
/// counts hides and then deletes the post.
pub fn flag_post(ledger: &Ledger, actor: Option<&UserId>, node: &NodeId, reason: &str) -> Result<Action> {
    let tag = FlagAction::type_tag();
    let reason = reason.trim();
    let action = ledger.run("flag_post", |tx| {
        let user = require_user(tx, actor, "flag posts")?;
        let post = load_node(tx, node)?;
        if post.author == user.id {
            return Err(CommandError::SelfActionForbidden { action: "flag" }.into());
        }
        let settings = tx.settings().clone();
        if !permissions::can_flag(&user, &settings) {
            return Err(insufficient("flag posts", settings.rep_to_flag, &user));
        }
        if count_today(tx, &user.id, &[tag.clone()])? >= settings.max_flags_per_day {
            return Err(CommandError::RateLimited {
                action: "flags",
                limit: settings.max_flags_per_day,
            }
            .into());
        }
        if let Some(previous) = tx.current_action(&[&tag], &post.id, &user.id)? {
            return Err(CommandError::DuplicateAction {
                action: "flagged",
                detail: previous.extra,
            }
            .into());
        }
        if reason.is_empty() {
            return Err(CommandError::ValidationFailed { field: "reason" }.into());
        }
        tx.create_action(&tag, &user.id, Some(&post.id), reason, &ActionData::None)
    })?;
    ledger.reload(action)
}

/// Flags raised by `user` in the last day, withdrawn ones included.
pub fn flags_today(ledger: &Ledger, user: &UserId) -> Result<u32> {
    ledger.read(|tx| count_today(tx, user, &[FlagAction::type_tag()]))
}

/// Deletes a post, or restores it if it is already deleted.
pub fn delete_post(
    ledger: &Ledger,
    actor: Option<&UserId>,
    node: &NodeId,
    reason: &str,
) -> Result<DeleteOutcome> {
    let tag = DeleteAction::type_tag();
    let reason = reason.trim();
    let outcome = ledger.run("delete_post", |tx| {
        let user = require_user(tx, actor, "delete posts")?;
        let post = load_node(tx, node)?;
        let settings = tx.settings();
        if !permissions::can_delete_post(&user, &post, settings) {
            return Err(insufficient(
                "delete others' posts",
                settings.rep_to_delete_others_posts,
                &user,
            ));
        }
        if let Some(delete) = &post.deleted {
            let restored = tx.cancel_action(delete, Some(&user.id))?;
            info!(node = %post.id, by = %user.id, "Restored post");
            return Ok(DeleteOutcome::Restored(restored));
        }
        if reason.is_empty() {
            return Err(CommandError::ValidationFailed { field: "reason" }.into());
        }
        let action = tx.create_action(&tag, &user.id, Some(&post.id), reason, &ActionData::None)?;
        Ok(DeleteOutcome::Deleted(action))
    })?;
    Ok(match outcome {
        DeleteOutcome::Deleted(action) => DeleteOutcome::Deleted(ledger.reload(action)?),
        DeleteOutcome::Restored(action) => DeleteOutcome::Restored(ledger.reload(action)?),
    })
}

/// Deletes a comment. Returns `None` if it was already deleted.
pub fn delete_comment(
    ledger: &Ledger,
    actor: Option<&UserId>,
    comment: &NodeId,
    reason: &str,
) -> Result<Option<Action>> {
    let tag = DeleteAction::type_tag();
    let reason = reason.trim();
    let action = ledger.run("delete_comment", |tx| {
        let user = require_user(tx, actor, "delete comments")?;
        let comment = load_kind(tx, comment, NodeType::Comment)?;
        let settings = tx.settings();
        if !permissions::can_delete_comment(&user, &comment, settings) {
            return Err(insufficient(
                "delete comments",
                settings.rep_to_delete_comments,
                &user,
            ));
        }
        if reason.is_empty() {
            return Err(CommandError::ValidationFailed { field: "reason" }.into());
        }
        if comment.is_deleted() {
            return Ok(None);
        }
        tx.create_action(&tag, &user.id, Some(&comment.id), reason, &ActionData::None)
            .map(Some)
    })?;
    action.map(|action| ledger.reload(action)).transpose()
}

/// Marks a question as a favorite, or removes the mark.
pub fn mark_favorite(ledger: &Ledger, actor: Option<&UserId>, question: &NodeId) -> Result<ToggleOutcome> {
    let tag = FavoriteAction::type_tag();
    let outcome = ledger.run("mark_favorite", |tx| {
        let user = require_user(tx, actor, "mark favorites")?;
        let question = load_kind(tx, question, NodeType::Question)?;
        let (action, active) = tx.create_or_cancel_action(&tag, &user.id, &question.id, "")?;
        Ok(ToggleOutcome { action, active })
    })?;
    Ok(ToggleOutcome {
        action: ledger.reload(outcome.action)?,
        ..outcome
    })
}

/// Whether `user` has marked `question` as a favorite.
pub fn is_favorite(ledger: &Ledger, user: &UserId, question: &NodeId) -> Result<bool> {
    Ok(ledger
        .find_current(&[FavoriteAction::type_tag()], question, user)?
        .is_some())
}

/// Accepts an answer on behalf of the question's author.
///
/// Accepting the accepted answer again un-accepts it. Otherwise any earlier
/// acceptance on the question is canceled first, so a question never has
/// two accepted answers.
pub fn accept_answer(ledger: &Ledger, actor: Option<&UserId>, answer: &NodeId) -> Result<AcceptOutcome> {
    let tag = AcceptAnswerAction::type_tag();
    let outcome = ledger.run("accept_answer", |tx| {
        let user = require_user(tx, actor, "accept answers")?;
        let answer = load_kind(tx, answer, NodeType::Answer)?;
        let question = load_node(tx, answer.absolute_parent())?;
        if !permissions::can_accept_answer(&user, &question) {
            return Err(CommandError::NotPermitted {
                action: "accept an answer",
                who: "the question's author",
            }
            .into());
        }

        if let Some(acceptance) = answer.extra_action.clone() {
            let canceled = tx.cancel_action(&acceptance, Some(&user.id))?;
            return Ok(AcceptOutcome {
                accepted: None,
                canceled: vec![canceled],
            });
        }

        let mut canceled = Vec::new();
        if let Some(previous) = &question.extra_ref {
            if let Some(acceptance) = tx.node(previous)?.extra_action {
                canceled.push(tx.cancel_action(&acceptance, Some(&user.id))?);
            }
        }
        let accepted = tx.create_action(&tag, &user.id, Some(&answer.id), "", &ActionData::None)?;
        Ok(AcceptOutcome {
            accepted: Some(accepted),
            canceled,
        })
    })?;
    Ok(AcceptOutcome {
        accepted: outcome
            .accepted
            .map(|action| ledger.reload(action))
            .transpose()?,
        canceled: outcome
            .canceled
            .into_iter()
            .map(|action| ledger.reload(action))
            .collect::<Result<_>>()?,
    })
}

// === Content ===

/// Asks a question. Title and body are required.
pub fn ask_question(
    ledger: &Ledger,
    actor: Option<&UserId>,
    content: RevisionContent,
) -> Result<(Action, Node)> {
    let tag = AskAction::type_tag();
    require_text("title", &content.title)?;
    require_text("body", &content.body)?;
    create_content(ledger, "ask_question", |tx| {
        let user = require_user(tx, actor, "ask questions")?;
        tx.create_action(&tag, &user.id, None, "", &ActionData::Ask(content.clone()))
    })
}

pub fn answer_question(
    ledger: &Ledger,
    actor: Option<&UserId>,
    question: &NodeId,
    content: RevisionContent,
) -> Result<(Action, Node)> {
    let tag = AnswerAction::type_tag();
    require_text("body", &content.body)?;
    create_content(ledger, "answer_question", |tx| {
        let user = require_user(tx, actor, "answer questions")?;
        let question = load_kind(tx, question, NodeType::Question)?;
        let data = ActionData::Answer {
            question: question.id,
            content: content.clone(),
        };
        tx.create_action(&tag, &user.id, None, "", &data)
    })
}

/// Comments on a question or an answer.
pub fn comment(ledger: &Ledger, actor: Option<&UserId>, parent: &NodeId, text: &str) -> Result<(Action, Node)> {
    let tag = CommentAction::type_tag();
    let text = text.trim();
    require_text("comment", text)?;
    create_content(ledger, "comment", |tx| {
        let user = require_user(tx, actor, "comment")?;
        let post = load_node(tx, parent)?;
        let question = match &post.abs_parent {
            Some(root) => Some(tx.node(root)?),
            None => None,
        };
        let settings = tx.settings();
        if !permissions::can_comment(&user, &post, question.as_ref(), settings) {
            return Err(insufficient("comment", settings.rep_to_comment, &user));
        }
        let data = ActionData::Comment {
            parent: post.id,
            text: text.to_string(),
        };
        tx.create_action(&tag, &user.id, None, "", &data)
    })
}

/// Replaces a comment's text with a new revision.
pub fn edit_comment(ledger: &Ledger, actor: Option<&UserId>, comment: &NodeId, text: &str) -> Result<Action> {
    let tag = ReviseAction::type_tag();
    let text = text.trim();
    require_text("comment", text)?;
    let action = ledger.run("edit_comment", |tx| {
        let user = require_user(tx, actor, "edit comments")?;
        let comment = load_kind(tx, comment, NodeType::Comment)?;
        if !permissions::can_edit_comment(&user, &comment) {
            return Err(CommandError::NotPermitted {
                action: "edit a comment",
                who: "its author",
            }
            .into());
        }
        let data = ActionData::Revise(RevisionContent::new(text));
        tx.create_action(&tag, &user.id, Some(&comment.id), "", &data)
    })?;
    ledger.reload(action)
}

/// Edits a question or answer through a new revision.
pub fn edit_post(
    ledger: &Ledger,
    actor: Option<&UserId>,
    node: &NodeId,
    content: RevisionContent,
) -> Result<Action> {
    let tag = ReviseAction::type_tag();
    require_text("body", &content.body)?;
    let action = ledger.run("edit_post", |tx| {
        let user = require_user(tx, actor, "edit posts")?;
        let post = load_editable(tx, &user, node)?;
        if post.node_type == NodeType::Question {
            require_text("title", &content.title)?;
        }
        let data = ActionData::Revise(content.clone());
        tx.create_action(&tag, &user.id, Some(&post.id), "", &data)
    })?;
    ledger.reload(action)
}

/// Replaces a question's tags.
pub fn retag_question(
    ledger: &Ledger,
    actor: Option<&UserId>,
    question: &NodeId,
    tag_names: &str,
) -> Result<Action> {
    let tag = RetagAction::type_tag();
    require_text("tags", tag_names)?;
    let action = ledger.run("retag_question", |tx| {
        let user = require_user(tx, actor, "retag questions")?;
        let question = load_editable(tx, &user, question)?;
        if question.node_type != NodeType::Question {
            return Err(not_found(NodeType::Question, &question.id));
        }
        let data = ActionData::Retag {
            tag_names: tag_names.to_string(),
        };
        tx.create_action(&tag, &user.id, Some(&question.id), "", &data)
    })?;
    ledger.reload(action)
}

/// Reverts a post to an earlier revision number.
pub fn rollback_post(ledger: &Ledger, actor: Option<&UserId>, node: &NodeId, revision: u32) -> Result<Action> {
    let tag = RollbackAction::type_tag();
    let action = ledger.run("rollback_post", |tx| {
        let user = require_user(tx, actor, "revert posts")?;
        let post = load_editable(tx, &user, node)?;
        let data = ActionData::Rollback { revision };
        tx.create_action(&tag, &user.id, Some(&post.id), "", &data)
    })?;
    ledger.reload(action)
}

// === Helpers ===

fn vote_tags() -> [String; 2] {
    [VoteUpAction::type_tag(), VoteDownAction::type_tag()]
}

fn require_user(tx: &Transaction<'_>, actor: Option<&UserId>, action: &'static str) -> Result<User> {
    let id = actor.ok_or(CommandError::Unauthorized { action })?;
    tx.user(id)
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CommandError::ValidationFailed { field }.into());
    }
    Ok(())
}

fn insufficient(action: &'static str, required: i64, user: &User) -> crate::Error {
    CommandError::InsufficientReputation {
        action,
        required,
        reputation: user.reputation,
    }
    .into()
}

fn not_found(kind: NodeType, id: &NodeId) -> crate::Error {
    CommandError::NotFound {
        what: format!("{kind} {id}"),
    }
    .into()
}

/// Loads a node, reporting a missing one as a command error.
fn load_node(tx: &Transaction<'_>, id: &NodeId) -> Result<Node> {
    tx.node(id).map_err(|e| {
        if e.is_not_found() {
            CommandError::NotFound {
                what: format!("post {id}"),
            }
            .into()
        } else {
            e
        }
    })
}

fn load_kind(tx: &Transaction<'_>, id: &NodeId, kind: NodeType) -> Result<Node> {
    let node = load_node(tx, id)?;
    if node.node_type != kind {
        return Err(not_found(kind, id));
    }
    Ok(node)
}

fn load_editable(tx: &Transaction<'_>, user: &User, id: &NodeId) -> Result<Node> {
    let post = load_node(tx, id)?;
    let settings = tx.settings();
    if !permissions::can_edit_post(user, &post, settings) {
        return Err(insufficient(
            "edit others' posts",
            settings.rep_to_edit_others_posts,
            user,
        ));
    }
    Ok(post)
}

fn count_today(tx: &Transaction<'_>, user: &UserId, tags: &[String]) -> Result<u32> {
    let filter = ActionFilter::new()
        .user(user)
        .action_types(tags.iter().cloned())
        .since(tx.now() - chrono::Duration::days(1));
    Ok(tx.actions(&filter)?.len() as u32)
}

fn create_content<F>(ledger: &Ledger, operation: &'static str, f: F) -> Result<(Action, Node)>
where
    F: Fn(&mut Transaction<'_>) -> Result<Action>,
{
    let action = ledger.run(operation, f)?;
    let node = action
        .node
        .as_ref()
        .map(|id| ledger.node(id))
        .transpose()?
        .ok_or_else(|| CommandError::NotFound {
            what: format!("node of action {}", action.id),
        })?;
    Ok((ledger.reload(action)?, node))
}
