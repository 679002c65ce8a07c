use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;

/// Failures while scoring a request. Every variant is reported to the caller
/// as `400 {"detail": ...}`; none of them takes the process down.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Malformed body, unknown level, missing field or out-of-range value.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("prediction aborted: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Keeps the whole `anyhow` context chain so the caller sees the root cause.
    pub fn model(err: anyhow::Error) -> Self {
        Self::ModelInvocation(format!("{err:#}"))
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
