use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use domain::records::SubscriptionWelcomeEmail;
use domain::MemberWebhook;

use crate::http::error::ApiResult;
use crate::state::AppState;

/// Ghost `member.added`：发送欢迎邮件，失败时返回 `null`
pub async fn new_member(
    State(state): State<AppState>,
    payload: Result<Json<MemberWebhook>, JsonRejection>,
) -> ApiResult<Json<Option<SubscriptionWelcomeEmail>>> {
    let Json(webhook) = payload?;
    let sent = state
        .newsletter
        .welcome_new_member(&webhook.member.current)
        .await;
    Ok(Json(sent))
}
