//! Node revisioning.
//!
//! A node's `title`, `tag_names` and `body` change only through
//! [`activate_revision`], which also stamps edit and activity times, walks
//! the parent chain, reconciles tag usage and emits the node event. Creating
//! a revision, creating a node and rolling back all funnel through it.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    Result,
    constants::INITIAL_REVISION_SUMMARY,
    ids::{NodeId, RevisionId, UserId},
    ledger::{LedgerError, LedgerEvent, Transaction},
    model::{Action, Node, NodeRevision, NodeType, RevisionContent},
};

pub mod tags;

/// Builds an unsaved node of `node_type` under `parent`.
///
/// Questions stand alone, answers sit under questions, comments under
/// questions or answers.
pub fn new_node(
    tx: &Transaction<'_>,
    node_type: NodeType,
    author: &UserId,
    parent: Option<&NodeId>,
) -> Result<Node> {
    let parent = parent.map(|id| tx.node(id)).transpose()?;
    let parent_type = parent.as_ref().map(|p| p.node_type);
    let allowed = match node_type {
        NodeType::Question => parent_type.is_none(),
        NodeType::Answer => parent_type == Some(NodeType::Question),
        NodeType::Comment => matches!(
            parent_type,
            Some(NodeType::Question) | Some(NodeType::Answer)
        ),
    };
    if !allowed {
        return Err(match &parent {
            None => LedgerError::TargetRequired {
                action_type: node_type.as_str().to_string(),
            },
            Some(p) => LedgerError::InvalidTarget {
                node: p.id.clone(),
                action_type: node_type.as_str().to_string(),
                reason: format!("a {} cannot be placed under a {}", node_type, p.node_type),
            },
        }
        .into());
    }
    Ok(Node::new(
        node_type,
        author.clone(),
        parent.as_ref(),
        tx.now(),
    ))
}

/// Stages a new node with its first revision.
///
/// Returns the node as it stands after activation.
pub fn create_node(
    tx: &mut Transaction<'_>,
    node: Node,
    content: RevisionContent,
    action: Option<&Action>,
) -> Result<(Node, NodeRevision)> {
    let id = node.id.clone();
    let author = node.author.clone();
    let comment_parent = match node.node_type {
        NodeType::Comment => node.parent.clone(),
        _ => None,
    };
    tx.put(node);

    let revision = create_revision(tx, &id, &author, content, action)?;
    if let Some(parent) = comment_parent {
        refresh_comment_count(tx, &parent)?;
    }
    Ok((tx.node(&id)?, revision))
}

/// Adds revision `max + 1` to a node and activates it.
///
/// A first revision without a summary gets the initial revision summary.
pub fn create_revision(
    tx: &mut Transaction<'_>,
    node: &NodeId,
    author: &UserId,
    mut content: RevisionContent,
    action: Option<&Action>,
) -> Result<NodeRevision> {
    tx.node(node)?;
    let number = tx
        .revisions(node)?
        .iter()
        .map(|r| r.revision)
        .max()
        .map_or(1, |last| last + 1);
    if number == 1 && content.summary.is_none() {
        content.summary = Some(INITIAL_REVISION_SUMMARY.to_string());
    }

    let revision = NodeRevision::new(node.clone(), number, content, author.clone(), tx.now());
    tx.put(revision.clone());
    activate_revision(tx, node, author, &revision.id, action)?;
    Ok(revision)
}

/// Makes `revision` the node's active content.
pub fn activate_revision(
    tx: &mut Transaction<'_>,
    node_id: &NodeId,
    author: &UserId,
    revision: &RevisionId,
    action: Option<&Action>,
) -> Result<()> {
    let revision = tx.revision(revision)?;
    let mut node = tx.node(node_id)?;
    if revision.node != node.id {
        return Err(LedgerError::InvalidTarget {
            node: node.id.clone(),
            action_type: "activate_revision".to_string(),
            reason: format!("revision {} belongs to node {}", revision.id, revision.node),
        }
        .into());
    }

    let now = tx.now();
    let previous_tags = std::mem::replace(&mut node.tag_names, revision.tag_names.clone());
    node.title = revision.title.clone();
    node.body = revision.body.clone();
    let is_edit = node.active_revision.replace(revision.id.clone()).is_some();
    if is_edit {
        node.last_edited_at = Some(now);
        node.last_edited_by = Some(author.clone());
    }
    tx.put(node);

    tags::reconcile(tx, &previous_tags, &revision.tag_names, author)?;
    touch_activity(tx, node_id, author)?;

    let node = tx.node(node_id)?;
    debug!(
        node = %node.id,
        revision = revision.revision,
        edit = is_edit,
        "Activated revision"
    );
    let action = action.cloned();
    tx.emit(if is_edit {
        LedgerEvent::NodeEdited { node, action }
    } else {
        LedgerEvent::NodeCreated { node, action }
    });
    Ok(())
}

/// Reactivates revision number `target`.
///
/// Returns the `"{previous}:{target}"` range for the triggering action's
/// payload.
pub fn rollback(
    tx: &mut Transaction<'_>,
    node_id: &NodeId,
    author: &UserId,
    target: u32,
    action: Option<&Action>,
) -> Result<String> {
    let node = tx.node(node_id)?;
    let Some(active) = &node.active_revision else {
        return Err(LedgerError::invariant(format!("node {node_id} has no active revision")).into());
    };
    let previous = tx.revision(active)?.revision;
    let target_revision = tx
        .revisions(node_id)?
        .into_iter()
        .find(|r| r.revision == target)
        .ok_or_else(|| LedgerError::RevisionNotFound {
            node: node_id.clone(),
            revision: target,
        })?;

    activate_revision(tx, node_id, author, &target_revision.id, action)?;
    Ok(format!("{previous}:{target}"))
}

/// Stamps last activity on a node and every ancestor.
fn touch_activity(tx: &mut Transaction<'_>, start: &NodeId, user: &UserId) -> Result<()> {
    let now = tx.now();
    let mut visited = HashSet::new();
    let mut next = Some(start.clone());
    while let Some(id) = next {
        if !visited.insert(id.clone()) {
            return Err(LedgerError::invariant(format!("parent chain of {start} loops at {id}")).into());
        }
        let mut node = tx.node(&id)?;
        node.last_activity_at = Some(now);
        node.last_activity_by = Some(user.clone());
        next = node.parent.clone();
        tx.put(node);
    }
    Ok(())
}

/// Sets `comment_count` to the number of live comments directly under a node.
pub fn refresh_comment_count(tx: &mut Transaction<'_>, node_id: &NodeId) -> Result<()> {
    let live = tx
        .children(node_id)?
        .iter()
        .filter(|c| c.node_type == NodeType::Comment && !c.is_deleted())
        .count();
    let mut node = tx.node(node_id)?;
    node.comment_count = live as u32;
    tx.put(node);
    Ok(())
}

/// Title to show for a node: its own, or its question's.
pub fn display_title(tx: &Transaction<'_>, node_id: &NodeId) -> Result<String> {
    let node = tx.node(node_id)?;
    if !node.title.is_empty() {
        return Ok(node.title);
    }
    match &node.abs_parent {
        Some(root) => Ok(tx.node(root)?.title),
        None => Ok(node.title),
    }
}
