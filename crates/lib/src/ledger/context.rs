//! The view an action behaviour gets of the ledger while it runs.

use chrono::{DateTime, Utc};

use super::{LedgerError, Transaction, reputation};
use crate::{
    Result,
    actions::{ActionData, ActionType},
    ids::{NodeId, UserId},
    model::{Action, Node},
    settings::Settings,
};

/// An action being created or canceled, together with the transaction it
/// runs in.
///
/// Behaviours mutate state only through this context so every change lands in
/// the same transaction as the action record itself.
pub struct ActionContext<'t, 'l> {
    tx: &'t mut Transaction<'l>,
    action: Action,
}

impl<'t, 'l> ActionContext<'t, 'l> {
    pub(crate) fn new(tx: &'t mut Transaction<'l>, action: Action) -> Self {
        Self { tx, action }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Mutable access to the record, for behaviours that fill in `node` or
    /// `extra` while preparing.
    pub fn action_mut(&mut self) -> &mut Action {
        &mut self.action
    }

    pub fn tx(&self) -> &Transaction<'l> {
        self.tx
    }

    pub fn tx_mut(&mut self) -> &mut Transaction<'l> {
        self.tx
    }

    pub fn settings(&self) -> &Settings {
        self.tx.settings()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.tx.now()
    }

    /// The id of the node this action targets.
    pub fn target_id(&self) -> Result<NodeId> {
        self.action.node.clone().ok_or_else(|| {
            LedgerError::TargetRequired {
                action_type: self.action.action_type.clone(),
            }
            .into()
        })
    }

    /// The node this action targets, as currently staged.
    pub fn target(&self) -> Result<Node> {
        self.tx.node(&self.target_id()?)
    }

    pub fn node(&self, id: &NodeId) -> Result<Node> {
        self.tx.node(id)
    }

    /// Stages an updated node.
    pub fn save_node(&mut self, node: Node) {
        self.tx.put(node);
    }

    /// Grants `value` reputation to `user` on behalf of this action.
    pub fn repute(&mut self, user: &UserId, value: i64) -> Result<()> {
        reputation::grant(self.tx, &self.action, user, value)
    }

    /// Creates a further action inside the same transaction.
    pub fn create_nested<K: ActionType>(
        &mut self,
        user: &UserId,
        node: Option<&NodeId>,
        extra: &str,
    ) -> Result<Action> {
        self.tx
            .create_action(&K::type_tag(), user, node, extra, &ActionData::None)
    }

    /// Stages the action record as it currently stands.
    pub(crate) fn stage(&mut self) {
        self.tx.put(self.action.clone());
    }

    /// Stages the final record and hands it back.
    pub(crate) fn finish(mut self) -> Action {
        self.stage();
        self.action
    }
}
