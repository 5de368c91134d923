use super::{ActionKind, ActionType, FlagAction};
use crate::{
    Result,
    constants::BY_FLAGGED,
    content,
    ids::NodeId,
    ledger::{ActionContext, Transaction},
    model::{Action, Node, NodeType},
    store::ActionFilter,
};

/// Soft deletes a node by pointing `node.deleted` at this action.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteAction;

impl ActionKind for DeleteAction {
    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let mut node = ctx.target()?;
        node.deleted = Some(ctx.action().id.clone());
        let parent = comment_parent(&node);
        ctx.save_node(node);
        if let Some(parent) = parent {
            content::refresh_comment_count(ctx.tx_mut(), &parent)?;
        }
        Ok(())
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let mut node = ctx.target()?;
        // A later delete may have replaced this one.
        if node.deleted.as_ref() != Some(&ctx.action().id) {
            return Ok(());
        }
        node.deleted = None;
        let parent = comment_parent(&node);
        ctx.save_node(node);
        if let Some(parent) = parent {
            content::refresh_comment_count(ctx.tx_mut(), &parent)?;
        }
        Ok(())
    }

    fn verb(&self) -> &'static str {
        "deleted"
    }

    fn reason(&self, action: &Action, tx: &Transaction<'_>) -> Result<Option<String>> {
        if action.extra != BY_FLAGGED {
            return Ok(Some(action.extra.clone()).filter(|r| !r.is_empty()));
        }
        let Some(node) = &action.node else {
            return Ok(None);
        };
        let flags = tx.actions(
            &ActionFilter::new()
                .node(node)
                .action_type(FlagAction::type_tag())
                .live(),
        )?;
        let reasons: Vec<&str> = flags.iter().map(|f| f.extra.as_str()).collect();
        Ok(Some(format!(
            "flagged by multiple users: {}",
            reasons.join("; ")
        )))
    }
}

impl ActionType for DeleteAction {
    const NAME: &'static str = "DeleteAction";
}

fn comment_parent(node: &Node) -> Option<NodeId> {
    if node.node_type == NodeType::Comment {
        node.parent.clone()
    } else {
        None
    }
}
