//! Error types for datechat-web.
//!
//! User-correctable problems (bad input, failed completion calls) are
//! rendered back into the page and never reach this type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Infrastructure failures that abort a request.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<handlebars::TemplateError> for WebError {
    fn from(err: handlebars::TemplateError) -> Self {
        WebError::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for WebError {
    fn from(err: handlebars::RenderError) -> Self {
        WebError::Template(err.to_string())
    }
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let code = match &self {
            WebError::Template(_) => "TEMPLATE_ERROR",
            WebError::Internal(_) => "INTERNAL_ERROR",
        };
        tracing::error!(error = %self, "Request failed");

        let body = serde_json::json!({
            "success": false,
            "error": ApiError {
                code: code.to_string(),
                message: self.to_string(),
            }
        });

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
