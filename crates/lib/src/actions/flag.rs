use tracing::info;

use super::{ActionKind, ActionType, DeleteAction};
use crate::{
    Result,
    constants::BY_FLAGGED,
    ledger::{ActionContext, Transaction},
    model::Action,
    store::ActionFilter,
};

/// Reports a post. The payload is the reason given by the flagger.
///
/// Reaching `FLAG_COUNT_TO_HIDE_POST` or `FLAG_COUNT_TO_DELETE_POST` live
/// flags costs the author an extra penalty, charged to the flag that hit the
/// threshold. Reaching the delete threshold also deletes the post.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlagAction;

impl FlagAction {
    /// Recomputes `flag_count` from live flags and returns it.
    fn refresh_count(ctx: &mut ActionContext<'_, '_>) -> Result<u32> {
        let mut node = ctx.target()?;
        let live = ctx.tx().actions(
            &ActionFilter::new()
                .node(&node.id)
                .action_type(Self::type_tag())
                .live(),
        )?;
        node.flag_count = live.len() as u32;
        let count = node.flag_count;
        ctx.save_node(node);
        Ok(count)
    }
}

impl ActionKind for FlagAction {
    fn repute_users(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let author = ctx.target()?.author;
        let value = ctx.settings().rep_lost_by_flagged;
        ctx.repute(&author, -value)
    }

    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let count = Self::refresh_count(ctx)?;
        let node = ctx.target()?;
        let settings = ctx.settings().clone();

        if count == settings.flag_count_to_hide_post {
            ctx.repute(&node.author, -settings.rep_lost_by_flagged_3_times)?;
        }

        if count == settings.flag_count_to_delete_post {
            ctx.repute(&node.author, -settings.rep_lost_by_flagged_5_times)?;
            if !node.is_deleted() {
                let flagger = ctx.action().user.clone();
                let delete =
                    ctx.create_nested::<DeleteAction>(&flagger, Some(&node.id), BY_FLAGGED)?;
                info!(
                    node = %node.id,
                    flags = count,
                    delete_action = %delete.id,
                    "Post deleted by flagging"
                );
            }
        }
        Ok(())
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        Self::refresh_count(ctx).map(|_| ())
    }

    fn verb(&self) -> &'static str {
        "flagged"
    }

    fn reason(&self, action: &Action, _tx: &Transaction<'_>) -> Result<Option<String>> {
        Ok(Some(action.extra.clone()))
    }
}

impl ActionType for FlagAction {
    const NAME: &'static str = "FlagAction";
}
