//! Permission predicates.
//!
//! Superusers pass every reputation check. Authors may always edit and
//! delete their own posts.

use crate::{
    model::{Node, User},
    settings::Settings,
};

/// Whether `user` meets a reputation threshold.
pub fn has_reputation(user: &User, required: i64) -> bool {
    user.is_superuser || user.reputation >= required
}

pub fn can_vote_up(user: &User, settings: &Settings) -> bool {
    has_reputation(user, settings.rep_to_vote_up)
}

pub fn can_vote_down(user: &User, settings: &Settings) -> bool {
    has_reputation(user, settings.rep_to_vote_down)
}

pub fn can_flag(user: &User, settings: &Settings) -> bool {
    has_reputation(user, settings.rep_to_flag)
}

pub fn can_like_comment(user: &User, settings: &Settings) -> bool {
    has_reputation(user, settings.rep_to_like_comment)
}

/// Authors of the post or of its question may always comment.
pub fn can_comment(user: &User, post: &Node, question: Option<&Node>, settings: &Settings) -> bool {
    user.id == post.author
        || question.is_some_and(|q| q.author == user.id)
        || has_reputation(user, settings.rep_to_comment)
}

pub fn can_edit_comment(user: &User, comment: &Node) -> bool {
    user.is_superuser || user.id == comment.author
}

pub fn can_delete_comment(user: &User, comment: &Node, settings: &Settings) -> bool {
    user.id == comment.author || has_reputation(user, settings.rep_to_delete_comments)
}

pub fn can_delete_post(user: &User, post: &Node, settings: &Settings) -> bool {
    user.id == post.author || has_reputation(user, settings.rep_to_delete_others_posts)
}

pub fn can_edit_post(user: &User, post: &Node, settings: &Settings) -> bool {
    user.id == post.author || has_reputation(user, settings.rep_to_edit_others_posts)
}

/// Only the question's author picks its accepted answer.
pub fn can_accept_answer(user: &User, question: &Node) -> bool {
    user.is_superuser || user.id == question.author
}
