use super::{ActionKind, ActionType};
use crate::{Result, ledger::ActionContext, store::ActionFilter};

/// Marks a question as a favorite of the acting user.
#[derive(Debug, Default, Clone, Copy)]
pub struct FavoriteAction;

impl FavoriteAction {
    /// Sets `favorite_count` to the number of live favorites. Running it any
    /// number of times gives the same result.
    fn refresh_count(ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let mut node = ctx.target()?;
        let live = ctx.tx().actions(
            &ActionFilter::new()
                .node(&node.id)
                .action_type(Self::type_tag())
                .live(),
        )?;
        node.favorite_count = live.len() as u32;
        ctx.save_node(node);
        Ok(())
    }
}

impl ActionKind for FavoriteAction {
    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        Self::refresh_count(ctx)
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        Self::refresh_count(ctx)
    }

    fn verb(&self) -> &'static str {
        "marked as favorite"
    }
}

impl ActionType for FavoriteAction {
    const NAME: &'static str = "FavoriteAction";
}
