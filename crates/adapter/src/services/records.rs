//! Donation, comment and account records.
//!
//! Failures are logged and reported as `None`; callers render that as a no-op.

use domain::records::{
    Account, Comment, CommentUpvote, Donation, NetlifyAccount, NewComment, NewDonation,
};
use std::fmt::Debug;
use storage::Db;
use tracing::{error, info};

fn logged<T>(action: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to {}: {:?}", action, e);
            None
        }
    }
}

fn found<T: Debug>(what: &str, key: impl Debug, result: anyhow::Result<Option<T>>) -> Option<T> {
    let value = logged(&format!("fetch {}", what), result).flatten();
    if value.is_none() {
        info!("No {} found for {:?}", what, key);
    }
    value
}

pub async fn create_donation(db: &Db, donation: &NewDonation) -> Option<Donation> {
    let created = logged("create donation", db.create_donation(donation).await)?;
    info!("Created donation {} from {}", created.coffee_id, created.email);
    Some(created)
}

pub async fn get_donation(db: &Db, coffee_id: i64) -> Option<Donation> {
    found("donation", coffee_id, db.get_donation(coffee_id).await)
}

pub async fn create_comment(db: &Db, comment: &NewComment) -> Option<Comment> {
    let created = logged("create comment", db.create_comment(comment).await)?;
    info!(
        "New comment {} by {} on `{}`",
        created.id, created.user_name, created.post_slug
    );
    Some(created)
}

pub async fn get_comment(db: &Db, comment_id: i64) -> Option<Comment> {
    found("comment", comment_id, db.get_comment(comment_id).await)
}

pub async fn list_comments(db: &Db, post_slug: &str) -> Option<Vec<Comment>> {
    logged("list comments", db.list_comments(post_slug).await)
}

pub async fn submit_comment_upvote(db: &Db, upvote: &CommentUpvote) -> Option<CommentUpvote> {
    logged("upvote comment", db.submit_comment_upvote(upvote).await)?;
    info!("User {} upvoted comment {}", upvote.user_id, upvote.comment_id);
    Some(upvote.clone())
}

pub async fn remove_comment_upvote(db: &Db, upvote: &CommentUpvote) -> Option<CommentUpvote> {
    let removed = logged("remove upvote", db.remove_comment_upvote(upvote).await)?;
    if !removed {
        info!("No upvote by {} on comment {}", upvote.user_id, upvote.comment_id);
        return None;
    }
    Some(upvote.clone())
}

pub async fn get_comment_upvote(db: &Db, user_id: &str, comment_id: i64) -> Option<CommentUpvote> {
    found(
        "comment upvote",
        (user_id, comment_id),
        db.get_comment_upvote(user_id, comment_id).await,
    )
}

pub async fn create_account(db: &Db, account: &NetlifyAccount) -> Option<Account> {
    let created = logged("create account", db.create_account(account).await)?;
    info!("Created account for {}", created.email);
    Some(created)
}

pub async fn get_account(db: &Db, email: &str) -> Option<Account> {
    found("account", email, db.get_account(email).await)
}
