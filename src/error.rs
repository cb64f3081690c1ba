//! Typed failures of the query service.
//!
//! Each variant carries the full diagnostic detail for server-side logs.
//! Callers only ever see [`ServiceError::user_message`], which never
//! includes upstream error text. The one deliberate exception is credit
//! exhaustion, which is paraphrased so site owners know to act.
//!
//! | Variant | HTTP | Code |
//! |---------|------|------|
//! | `Validation` | 400 | `bad_request` |
//! | `Configuration` | 503 | `not_configured` |
//! | `UpstreamTransport` | 500 | `upstream_transport` |
//! | `UpstreamApi` | 500 | `upstream_api` / `upstream_credit_exhausted` |
//! | `UpstreamContract` | 500 | `upstream_contract` |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Substring of the upstream error message signalling exhausted credit.
pub const CREDIT_EXHAUSTED_MARKER: &str = "credit balance is too low";

pub const CREDIT_EXHAUSTED_MESSAGE: &str =
    "The assistant is temporarily unavailable. Please contact the site administrator.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid query: {0}")]
    Validation(String),

    #[error("assistant is not configured: {0}")]
    Configuration(String),

    #[error("upstream transport error: {0}")]
    UpstreamTransport(String),

    #[error("upstream API error: {message}")]
    UpstreamApi {
        message: String,
        credit_exhausted: bool,
    },

    #[error("unexpected upstream response: {0}")]
    UpstreamContract(String),
}

impl ServiceError {
    /// Build an [`UpstreamApi`](ServiceError::UpstreamApi) error from the
    /// provider's `error.message`, flagging credit exhaustion.
    pub fn upstream_api(message: impl Into<String>) -> Self {
        let message = message.into();
        let credit_exhausted = message.contains(CREDIT_EXHAUSTED_MARKER);
        ServiceError::UpstreamApi {
            message,
            credit_exhausted,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::UpstreamTransport(_)
            | ServiceError::UpstreamApi { .. }
            | ServiceError::UpstreamContract(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "bad_request",
            ServiceError::Configuration(_) => "not_configured",
            ServiceError::UpstreamTransport(_) => "upstream_transport",
            ServiceError::UpstreamApi {
                credit_exhausted: true,
                ..
            } => "upstream_credit_exhausted",
            ServiceError::UpstreamApi { .. } => "upstream_api",
            ServiceError::UpstreamContract(_) => "upstream_contract",
        }
    }

    /// Message safe to show to end users.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(msg) => msg.clone(),
            ServiceError::Configuration(_) => {
                "The assistant is not configured. Please add an API key in the site settings."
                    .to_string()
            }
            ServiceError::UpstreamTransport(_) => {
                "The assistant could not reach the answer service. Please try again later."
                    .to_string()
            }
            ServiceError::UpstreamApi {
                credit_exhausted: true,
                ..
            } => CREDIT_EXHAUSTED_MESSAGE.to_string(),
            ServiceError::UpstreamApi { .. } => {
                "The answer service returned an error. Please try again later.".to_string()
            }
            ServiceError::UpstreamContract(_) => {
                "The answer service returned an unexpected response. Please try again later."
                    .to_string()
            }
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
            },
        };
        (self.status_code(), Json(body)).into_response()
    }
}
