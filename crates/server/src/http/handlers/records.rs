use adapter::services::records;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use domain::records::{
    Account, Comment, CommentUpvote, Donation, NetlifyAccount, NewComment, NewDonation,
};
use serde::Deserialize;
use storage::Db;

use crate::http::error::ApiResult;

// --- DTOs ---

#[derive(Deserialize)]
pub struct CommentsQuery {
    pub post_slug: String,
}

#[derive(Deserialize)]
pub struct UpvoteQuery {
    pub user_id: String,
    pub comment_id: i64,
}

#[derive(Deserialize)]
pub struct AccountQuery {
    pub email: String,
}

// --- Donations ---

pub async fn create_donation(
    State(db): State<Db>,
    payload: Result<Json<NewDonation>, JsonRejection>,
) -> ApiResult<Json<Option<Donation>>> {
    let Json(donation) = payload?;
    Ok(Json(records::create_donation(&db, &donation).await))
}

pub async fn get_donation(
    State(db): State<Db>,
    coffee_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Option<Donation>>> {
    let Path(coffee_id) = coffee_id?;
    Ok(Json(records::get_donation(&db, coffee_id).await))
}

// --- Comments ---

pub async fn create_comment(
    State(db): State<Db>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> ApiResult<Json<Option<Comment>>> {
    let Json(comment) = payload?;
    Ok(Json(records::create_comment(&db, &comment).await))
}

pub async fn list_comments(
    State(db): State<Db>,
    query: Result<Query<CommentsQuery>, QueryRejection>,
) -> ApiResult<Json<Option<Vec<Comment>>>> {
    let Query(query) = query?;
    Ok(Json(records::list_comments(&db, &query.post_slug).await))
}

pub async fn get_comment(
    State(db): State<Db>,
    comment_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Option<Comment>>> {
    let Path(comment_id) = comment_id?;
    Ok(Json(records::get_comment(&db, comment_id).await))
}

pub async fn submit_upvote(
    State(db): State<Db>,
    payload: Result<Json<CommentUpvote>, JsonRejection>,
) -> ApiResult<Json<Option<CommentUpvote>>> {
    let Json(upvote) = payload?;
    Ok(Json(records::submit_comment_upvote(&db, &upvote).await))
}

pub async fn remove_upvote(
    State(db): State<Db>,
    payload: Result<Json<CommentUpvote>, JsonRejection>,
) -> ApiResult<Json<Option<CommentUpvote>>> {
    let Json(upvote) = payload?;
    Ok(Json(records::remove_comment_upvote(&db, &upvote).await))
}

pub async fn get_upvote(
    State(db): State<Db>,
    query: Result<Query<UpvoteQuery>, QueryRejection>,
) -> ApiResult<Json<Option<CommentUpvote>>> {
    let Query(query) = query?;
    Ok(Json(
        records::get_comment_upvote(&db, &query.user_id, query.comment_id).await,
    ))
}

// --- Accounts ---

pub async fn create_account(
    State(db): State<Db>,
    payload: Result<Json<NetlifyAccount>, JsonRejection>,
) -> ApiResult<Json<Option<Account>>> {
    let Json(account) = payload?;
    Ok(Json(records::create_account(&db, &account).await))
}

pub async fn get_account(
    State(db): State<Db>,
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> ApiResult<Json<Option<Account>>> {
    let Query(query) = query?;
    Ok(Json(records::get_account(&db, &query.email).await))
}
