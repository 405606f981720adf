use adapter::services::lynx::{LynxOutcome, LynxSummary};
use adapter::services::posts::{self, BatchMetadataReport, Enrichment};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{PipelineError, PostWebhook};
use serde_json::{json, Map, Value};

use crate::http::error::ApiResult;
use crate::state::AppState;

/// Ghost `post.updated` webhook：补全 SEO 元数据后回写
pub async fn enrich_post(
    State(state): State<AppState>,
    payload: Result<Json<PostWebhook>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(webhook) = payload?;
    posts::mirror_post(&state.db, &webhook.post.current).await;
    match state.enricher.enrich(&webhook.post).await? {
        Enrichment::Suppressed => Err(PipelineError::DuplicateUpdate.into()),
        Enrichment::Updated { response, .. } => {
            let mut body = Map::new();
            body.insert(response.status.to_string(), response.body);
            Ok(Json(Value::Object(body)))
        }
    }
}

pub async fn batch_metadata(State(state): State<AppState>) -> ApiResult<Json<BatchMetadataReport>> {
    Ok(Json(posts::batch_update_metadata(&state.db).await?))
}

pub async fn embed_post(
    State(state): State<AppState>,
    payload: Result<Json<PostWebhook>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(webhook) = payload?;
    let slug = webhook.post.current.slug.clone();
    posts::mirror_post(&state.db, &webhook.post.current).await;

    let response = match state.lynx.preview_for_event(&state.db, &webhook.post).await? {
        LynxOutcome::Generated { embeds, document } => Json(json!({
            "post": slug,
            "embeds": embeds,
            "mobiledoc": document,
        }))
        .into_response(),
        LynxOutcome::AlreadyHasPreviews => (
            StatusCode::ACCEPTED,
            Json(json!(format!("Post `{}` already has link previews.", slug))),
        )
            .into_response(),
        LynxOutcome::NotRoundup => {
            Json(json!(format!("Post `{}` is not a roundup, carry on.", slug))).into_response()
        }
    };
    Ok(response)
}

pub async fn batch_embed(State(state): State<AppState>) -> ApiResult<Json<Vec<LynxSummary>>> {
    Ok(Json(state.lynx.batch_lynx_embeds(&state.db).await?))
}

pub async fn batch_alt(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let updated = state.enricher.batch_assign_img_alt(&state.db).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn backup(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.enricher.backup().await?))
}
