//! Up and down votes on posts, and likes on comments.

use super::{ActionKind, ActionType};
use crate::{Result, ledger::ActionContext};

fn update_score(ctx: &mut ActionContext<'_, '_>, delta: i64) -> Result<()> {
    let mut node = ctx.target()?;
    node.score += delta;
    ctx.save_node(node);
    Ok(())
}

/// Up vote. The post's author gains `REP_GAIN_BY_UPVOTED`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoteUpAction;

impl ActionKind for VoteUpAction {
    fn repute_users(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let author = ctx.target()?.author;
        let value = ctx.settings().rep_gain_by_upvoted;
        ctx.repute(&author, value)
    }

    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        update_score(ctx, 1)
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        update_score(ctx, -1)
    }

    fn verb(&self) -> &'static str {
        "voted up"
    }
}

impl ActionType for VoteUpAction {
    const NAME: &'static str = "VoteUpAction";
}

/// Down vote. Costs both the post's author and the voter.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoteDownAction;

impl ActionKind for VoteDownAction {
    fn repute_users(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let author = ctx.target()?.author;
        let voter = ctx.action().user.clone();
        let lost_by_author = ctx.settings().rep_lost_by_downvoted;
        let lost_by_voter = ctx.settings().rep_lost_by_downvoting;
        ctx.repute(&author, -lost_by_author)?;
        ctx.repute(&voter, -lost_by_voter)
    }

    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        update_score(ctx, -1)
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        update_score(ctx, 1)
    }

    fn verb(&self) -> &'static str {
        "voted down"
    }
}

impl ActionType for VoteDownAction {
    const NAME: &'static str = "VoteDownAction";
}

/// A like on a comment: an up vote that moves no reputation.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoteUpCommentAction;

impl ActionKind for VoteUpCommentAction {
    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        update_score(ctx, 1)
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        update_score(ctx, -1)
    }

    fn verb(&self) -> &'static str {
        "liked"
    }
}

impl ActionType for VoteUpCommentAction {
    const NAME: &'static str = "VoteUpCommentAction";
}
