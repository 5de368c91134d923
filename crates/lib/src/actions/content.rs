//! Actions that create nodes or revisions.
//!
//! Their work happens in `process_data`, before the action is first staged,
//! so the record already points at the node it created. None of them grant
//! reputation, and canceling one leaves the revision history alone.

use super::{ActionData, ActionKind, ActionType, unexpected_payload};
use crate::{
    Result,
    constants::RETAG_SUMMARY,
    content,
    ids::NodeId,
    ledger::ActionContext,
    model::{NodeType, RevisionContent, parse_tag_names},
};

/// Creates a node of `node_type` under `parent` and points the action at it.
fn create_node(
    ctx: &mut ActionContext<'_, '_>,
    node_type: NodeType,
    parent: Option<&NodeId>,
    content: RevisionContent,
) -> Result<()> {
    let author = ctx.action().user.clone();
    let node = content::new_node(ctx.tx(), node_type, &author, parent)?;
    ctx.action_mut().node = Some(node.id.clone());
    let action = ctx.action().clone();
    content::create_node(ctx.tx_mut(), node, content, Some(&action))?;
    Ok(())
}

/// Asks a question.
#[derive(Debug, Default, Clone, Copy)]
pub struct AskAction;

impl ActionKind for AskAction {
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let ActionData::Ask(content) = data else {
            return Err(unexpected_payload(&ctx.action().action_type, data));
        };
        create_node(ctx, NodeType::Question, None, content.clone())
    }

    fn verb(&self) -> &'static str {
        "asked"
    }
}

impl ActionType for AskAction {
    const NAME: &'static str = "AskAction";
}

/// Answers a question.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnswerAction;

impl ActionKind for AnswerAction {
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let ActionData::Answer { question, content } = data else {
            return Err(unexpected_payload(&ctx.action().action_type, data));
        };
        create_node(ctx, NodeType::Answer, Some(question), content.clone())
    }

    fn verb(&self) -> &'static str {
        "answered"
    }
}

impl ActionType for AnswerAction {
    const NAME: &'static str = "AnswerAction";
}

/// Comments on a question or an answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentAction;

impl ActionKind for CommentAction {
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let ActionData::Comment { parent, text } = data else {
            return Err(unexpected_payload(&ctx.action().action_type, data));
        };
        create_node(
            ctx,
            NodeType::Comment,
            Some(parent),
            RevisionContent::new(text.clone()),
        )
    }

    fn verb(&self) -> &'static str {
        "commented on"
    }
}

impl ActionType for CommentAction {
    const NAME: &'static str = "CommentAction";
}

/// Edits a node. The payload records the new revision's id.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviseAction;

impl ActionKind for ReviseAction {
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let ActionData::Revise(content) = data else {
            return Err(unexpected_payload(&ctx.action().action_type, data));
        };
        let node = ctx.target_id()?;
        let author = ctx.action().user.clone();
        let action = ctx.action().clone();
        let revision =
            content::create_revision(ctx.tx_mut(), &node, &author, content.clone(), Some(&action))?;
        ctx.action_mut().extra = revision.id.to_string();
        Ok(())
    }

    fn verb(&self) -> &'static str {
        "edited"
    }
}

impl ActionType for ReviseAction {
    const NAME: &'static str = "ReviseAction";
}

/// Replaces a node's tags, keeping title and body.
#[derive(Debug, Default, Clone, Copy)]
pub struct RetagAction;

impl ActionKind for RetagAction {
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let ActionData::Retag { tag_names } = data else {
            return Err(unexpected_payload(&ctx.action().action_type, data));
        };
        let node = ctx.target()?;
        let content = RevisionContent {
            title: node.title.clone(),
            tag_names: parse_tag_names(tag_names),
            body: node.body.clone(),
            summary: Some(RETAG_SUMMARY.to_string()),
        };
        let author = ctx.action().user.clone();
        let action = ctx.action().clone();
        content::create_revision(ctx.tx_mut(), &node.id, &author, content, Some(&action))?;
        Ok(())
    }

    fn verb(&self) -> &'static str {
        "retagged"
    }
}

impl ActionType for RetagAction {
    const NAME: &'static str = "RetagAction";
}

/// Reactivates an earlier revision. The payload records
/// `"{previous}:{target}"` revision numbers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RollbackAction;

impl ActionKind for RollbackAction {
    fn process_data(&self, ctx: &mut ActionContext<'_, '_>, data: &ActionData) -> Result<()> {
        let ActionData::Rollback { revision } = data else {
            return Err(unexpected_payload(&ctx.action().action_type, data));
        };
        let node = ctx.target_id()?;
        let author = ctx.action().user.clone();
        let action = ctx.action().clone();
        let range = content::rollback(ctx.tx_mut(), &node, &author, *revision, Some(&action))?;
        ctx.action_mut().extra = range;
        Ok(())
    }

    fn verb(&self) -> &'static str {
        "reverted"
    }
}

impl ActionType for RollbackAction {
    const NAME: &'static str = "RollbackAction";
}
