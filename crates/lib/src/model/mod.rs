//! Record types persisted in the entity store.
//!
//! These are plain data: the rules that keep them consistent live in
//! [`crate::ledger`] and [`crate::content`].

mod action;
mod node;
mod repute;
mod revision;
mod tag;
mod user;

pub use action::Action;
pub use node::{Node, NodeType};
pub use repute::ActionRepute;
pub use revision::{NodeRevision, RevisionContent, parse_tag_names};
pub use tag::Tag;
pub use user::User;
