use super::{ActionKind, ActionType};
use crate::{
    Result,
    ledger::{ActionContext, LedgerError},
    model::{Node, NodeType},
};

/// Accepts an answer on its question.
///
/// Exclusivity is the caller's job: the previous acceptance on the question
/// must be canceled first.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnswerAction;

impl AcceptAnswerAction {
    /// The answer and its question.
    fn answer_and_question(ctx: &ActionContext<'_, '_>) -> Result<(Node, Node)> {
        let answer = ctx.target()?;
        let invalid = |reason: &str| -> crate::Error {
            LedgerError::InvalidTarget {
                node: answer.id.clone(),
                action_type: ctx.action().action_type.clone(),
                reason: reason.to_string(),
            }
            .into()
        };
        if answer.node_type != NodeType::Answer {
            return Err(invalid("only answers can be accepted"));
        }
        let Some(parent) = &answer.parent else {
            return Err(invalid("answer has no question"));
        };
        let question = ctx.node(parent)?;
        Ok((answer, question))
    }
}

impl ActionKind for AcceptAnswerAction {
    fn process_data(
        &self,
        ctx: &mut ActionContext<'_, '_>,
        _data: &super::ActionData,
    ) -> Result<()> {
        Self::answer_and_question(ctx).map(|_| ())
    }

    fn repute_users(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let (answer, _) = Self::answer_and_question(ctx)?;
        let acceptor = ctx.action().user.clone();
        if acceptor == answer.author {
            return Ok(());
        }
        let settings = ctx.settings().clone();
        ctx.repute(&acceptor, settings.rep_gain_by_accepting)?;
        ctx.repute(&answer.author, settings.rep_gain_by_accepted)
    }

    fn process_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let (mut answer, mut question) = Self::answer_and_question(ctx)?;
        question.extra_ref = Some(answer.id.clone());
        answer.marked = true;
        answer.extra_action = Some(ctx.action().id.clone());
        ctx.save_node(question);
        ctx.save_node(answer);
        Ok(())
    }

    fn cancel_action(&self, ctx: &mut ActionContext<'_, '_>) -> Result<()> {
        let (mut answer, mut question) = Self::answer_and_question(ctx)?;
        if question.extra_ref.as_ref() == Some(&answer.id) {
            question.extra_ref = None;
            ctx.save_node(question);
        }
        if answer.extra_action.as_ref() == Some(&ctx.action().id) {
            answer.marked = false;
            answer.extra_action = None;
            ctx.save_node(answer);
        }
        Ok(())
    }

    fn verb(&self) -> &'static str {
        "accepted an answer on"
    }
}

impl ActionType for AcceptAnswerAction {
    const NAME: &'static str = "AcceptAnswerAction";
}
