//! Reputation rows and the counters they drive.
//!
//! Every change to a user's `reputation` goes through this module together
//! with the row that explains it, so `reputation` always equals the sum of the
//! user's rows.

use serde::Serialize;

use super::{LedgerError, Transaction};
use crate::{
    Result,
    ids::UserId,
    model::{Action, ActionRepute},
    store::{EntityStore, ReputeFilter},
};

fn adjust(tx: &mut Transaction<'_>, user: &UserId, delta: i64) -> Result<()> {
    let mut record = tx.user(user)?;
    record.reputation += delta;
    tx.put(record);
    Ok(())
}

/// Records a delta of `value` for `user` caused by `action`.
///
/// A zero value writes nothing.
pub(crate) fn grant(
    tx: &mut Transaction<'_>,
    action: &Action,
    user: &UserId,
    value: i64,
) -> Result<()> {
    if value == 0 {
        return Ok(());
    }
    tx.put(ActionRepute::new(
        action.id.clone(),
        user.clone(),
        value,
        false,
    ));
    adjust(tx, user, value)
}

/// Adds a negated `by_canceled` row for every original row of `action`.
///
/// Fails with an invariant violation if the rows were reversed before.
pub(crate) fn reverse(tx: &mut Transaction<'_>, action: &Action) -> Result<()> {
    let rows = tx.reputes(&ReputeFilter::action(&action.id))?;
    if rows.iter().any(|r| r.by_canceled) {
        return Err(LedgerError::already_reversed(&action.id).into());
    }
    for row in rows {
        tx.put(ActionRepute::new(
            action.id.clone(),
            row.user.clone(),
            -row.value,
            true,
        ));
        adjust(tx, &row.user, -row.value)?;
    }
    Ok(())
}

/// Deletes every row of `action`, original and reversal, undoing their effect
/// on the counters.
pub(crate) fn remove(tx: &mut Transaction<'_>, action: &Action) -> Result<()> {
    let rows = tx.reputes(&ReputeFilter::action(&action.id))?;
    for row in rows {
        adjust(tx, &row.user, -row.value)?;
        tx.delete(row);
    }
    Ok(())
}

/// A user whose counter disagrees with their rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReputationMismatch {
    pub user: UserId,
    pub username: String,
    pub recorded: i64,
    pub computed: i64,
}

/// Checks every user's counter against the sum of their rows.
pub fn audit(store: &dyn EntityStore) -> Result<Vec<ReputationMismatch>> {
    let mut mismatches = Vec::new();
    for user in store.users()? {
        let computed: i64 = store
            .reputes(&ReputeFilter::user(&user.id))?
            .iter()
            .map(|r| r.value)
            .sum();
        if computed != user.reputation {
            tracing::warn!(
                user = %user.id,
                recorded = user.reputation,
                computed,
                "Reputation counter out of sync"
            );
            mismatches.push(ReputationMismatch {
                user: user.id,
                username: user.username,
                recorded: user.reputation,
                computed,
            });
        }
    }
    Ok(mismatches)
}
