use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::notify::{Decision, NotificationKind};
use domain::PostWebhook;
use tracing::warn;

use crate::http::error::ApiResult;
use crate::state::AppState;

const ACKNOWLEDGMENT: &str = "x-acknowledgment";

pub async fn post_created(
    State(state): State<AppState>,
    payload: Result<Json<PostWebhook>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(webhook) = payload?;
    let decision = state
        .authors
        .notify(&webhook.post, NotificationKind::PostCreated)
        .await?;

    Ok(match decision {
        Decision::Notify(message) => Json(message).into_response(),
        // 204 不能带响应体，说明文字放在响应头里
        Decision::Acknowledge(text) => match HeaderValue::from_str(&text) {
            Ok(value) => (StatusCode::NO_CONTENT, [(ACKNOWLEDGMENT, value)]).into_response(),
            Err(_) => {
                warn!("Acknowledgment is not a valid header value: {}", text);
                StatusCode::NO_CONTENT.into_response()
            }
        },
    })
}

pub async fn post_updated(
    State(state): State<AppState>,
    payload: Result<Json<PostWebhook>, JsonRejection>,
) -> ApiResult<Json<String>> {
    let Json(webhook) = payload?;
    let decision = state
        .authors
        .notify(&webhook.post, NotificationKind::PostUpdated)
        .await?;

    Ok(match decision {
        Decision::Notify(text) | Decision::Acknowledge(text) => Json(text),
    })
}
