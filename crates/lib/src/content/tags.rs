//! Tag usage accounting.

use tracing::debug;

use crate::{
    Result,
    ids::UserId,
    ledger::{LedgerError, Transaction},
    model::Tag,
};

/// Applies the difference between a node's previous and new tag lists.
///
/// Names only in `current` are created if needed, counted and undeleted.
/// Names only in `previous` lose one use and are marked deleted by `editor`
/// when unused.
pub fn reconcile(
    tx: &mut Transaction<'_>,
    previous: &[String],
    current: &[String],
    editor: &UserId,
) -> Result<()> {
    let now = tx.now();

    for name in current.iter().filter(|n| !previous.contains(n)) {
        let mut tag = match tx.tag(name)? {
            Some(tag) => tag,
            None => Tag::new(name.clone(), editor.clone(), now),
        };
        tag.used_count += 1;
        if tag.deleted {
            tag.unmark_deleted();
            debug!(tag = %name, "Tag back in use");
        }
        tx.put(tag);
    }

    for name in previous.iter().filter(|n| !current.contains(n)) {
        let Some(mut tag) = tx.tag(name)? else {
            return Err(LedgerError::invariant(format!("tag {name} is listed but not stored")).into());
        };
        tag.used_count = tag.used_count.checked_sub(1).ok_or_else(|| {
            LedgerError::invariant(format!("tag {name} is listed but has no uses"))
        })?;
        if tag.used_count == 0 {
            tag.mark_deleted(editor.clone(), now);
            debug!(tag = %name, "Tag no longer used");
        }
        tx.put(tag);
    }
    Ok(())
}
