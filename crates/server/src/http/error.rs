use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::PipelineError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] PipelineError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::DuplicateUpdate => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Vendor { .. } => StatusCode::BAD_GATEWAY,
            PipelineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// 请求体解析失败统一按校验错误处理
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PipelineError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(PipelineError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(PipelineError::Validation(rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
