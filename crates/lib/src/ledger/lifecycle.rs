//! Create, cancel and cancel-or-delete.
//!
//! These run inside a [`Transaction`]; [`super::Ledger`] wraps each in its own
//! transaction and commit, and the command layer composes several of them in
//! one.

use tracing::debug;

use super::{ActionContext, LedgerError, Transaction, events::LedgerEvent, reputation};
use crate::{
    Result,
    actions::ActionData,
    ids::{ActionId, NodeId, UserId},
    model::Action,
    store::ActionFilter,
};

/// What cancel-or-delete did with an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Marked canceled and reversed; the record stays.
    Canceled(Action),
    /// Removed outright together with its reputation rows.
    Deleted(Action),
}

impl CancelOutcome {
    pub fn action(&self) -> &Action {
        match self {
            CancelOutcome::Canceled(action) | CancelOutcome::Deleted(action) => action,
        }
    }

    pub fn into_action(self) -> Action {
        match self {
            CancelOutcome::Canceled(action) | CancelOutcome::Deleted(action) => action,
        }
    }

    pub fn was_deleted(&self) -> bool {
        matches!(self, CancelOutcome::Deleted(_))
    }
}

impl Transaction<'_> {
    /// Persists a new action of type `tag` and applies its effects.
    ///
    /// Runs the behaviour's `process_data`, stages the record, then
    /// `repute_users` and `process_action`, in that order.
    pub fn create_action(
        &mut self,
        tag: &str,
        user: &UserId,
        node: Option<&NodeId>,
        extra: &str,
        data: &ActionData,
    ) -> Result<Action> {
        let kind = self.core().registry.resolve_strict(tag)?;
        self.user(user)?;
        if let Some(node) = node {
            self.node(node)?;
        }

        let action = Action::new(tag, user.clone(), node.cloned(), extra, self.now());
        let mut ctx = ActionContext::new(self, action);
        kind.process_data(&mut ctx, data)?;
        if kind.requires_node() && ctx.action().node.is_none() {
            return Err(LedgerError::TargetRequired {
                action_type: tag.to_string(),
            }
            .into());
        }
        ctx.stage();
        kind.repute_users(&mut ctx)?;
        kind.process_action(&mut ctx)?;
        let action = ctx.finish();

        debug!(
            action = %action.id,
            action_type = %action.action_type,
            user = %action.user,
            node = ?action.node,
            "Created action"
        );
        self.emit(LedgerEvent::ActionCreated(action.clone()));
        Ok(action)
    }

    /// Cancels an action, reversing its reputation and node effects.
    ///
    /// Canceling an already canceled action changes nothing.
    pub fn cancel_action(&mut self, id: &ActionId, by: Option<&UserId>) -> Result<Action> {
        let mut action = self.action(id)?;
        if action.canceled {
            debug!(action = %action.id, "Action already canceled");
            return Ok(action);
        }
        let kind = self.core().registry.resolve_strict(&action.action_type)?;
        let by = by.cloned().unwrap_or_else(|| action.user.clone());
        self.user(&by)?;

        action.canceled = true;
        action.canceled_at = Some(self.now());
        action.canceled_by = Some(by);
        self.put(action.clone());

        reputation::reverse(self, &action)?;
        let mut ctx = ActionContext::new(self, action);
        kind.cancel_action(&mut ctx)?;
        let action = ctx.finish();

        debug!(
            action = %action.id,
            action_type = %action.action_type,
            canceled_by = ?action.canceled_by,
            "Canceled action"
        );
        self.emit(LedgerEvent::ActionCanceled(action.clone()));
        Ok(action)
    }

    /// Hard deletes an action younger than the grace window, cancels it
    /// otherwise.
    pub fn cancel_or_delete_action(
        &mut self,
        id: &ActionId,
        by: Option<&UserId>,
    ) -> Result<CancelOutcome> {
        let action = self.action(id)?;
        if self.now() - action.action_date >= self.settings().grace_window() {
            return self.cancel_action(id, by).map(CancelOutcome::Canceled);
        }

        let kind = self.core().registry.resolve_strict(&action.action_type)?;
        reputation::remove(self, &action)?;
        self.delete(action.clone());
        // A canceled action already had its node effects undone.
        if !action.canceled {
            let mut ctx = ActionContext::new(self, action.clone());
            kind.cancel_action(&mut ctx)?;
        }

        debug!(
            action = %action.id,
            action_type = %action.action_type,
            "Deleted action inside grace window"
        );
        self.emit(LedgerEvent::ActionDeleted(action.clone()));
        Ok(CancelOutcome::Deleted(action))
    }

    /// Toggles an action: undoes the live one if present, creates one
    /// otherwise. Returns the action and whether it was created.
    pub fn create_or_cancel_action(
        &mut self,
        tag: &str,
        user: &UserId,
        node: &NodeId,
        extra: &str,
    ) -> Result<(Action, bool)> {
        match self.current_action(&[tag], node, user)? {
            Some(current) => {
                let outcome = self.cancel_or_delete_action(&current.id, Some(user))?;
                Ok((outcome.into_action(), false))
            }
            None => {
                let action = self.create_action(tag, user, Some(node), extra, &ActionData::None)?;
                Ok((action, true))
            }
        }
    }

    /// The live action by `user` on `node` of any of `types`.
    pub fn current_action<S: AsRef<str>>(
        &self,
        types: &[S],
        node: &NodeId,
        user: &UserId,
    ) -> Result<Option<Action>> {
        let filter = ActionFilter::new()
            .user(user)
            .node(node)
            .action_types(types.iter().map(|t| t.as_ref().to_string()))
            .live();
        Ok(self.actions(&filter)?.pop())
    }
}
