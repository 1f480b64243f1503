//! Error handling for the shelf HTTP layer
//!
//! Handler-local rejections (400, 403, 404) are terminal: they render their
//! `{message}` body directly. Authentication failures and unclassified errors
//! are left for [`error_middleware`], which decides between a 401, a 500, or
//! forwarding an already committed response untouched.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Body of every handler-local rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a 401 produced by a failed credential check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnauthorizedBody {
    pub code: String,
    pub message: String,
}

/// Body of a 500; `stack` only when the policy allows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    Unauthorized { code: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Status of a rejection the handler answers itself, `None` for errors
    /// that belong to the error middleware
    pub fn local_status(&self) -> Option<StatusCode> {
        match self {
            AppError::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            AppError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            AppError::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            AppError::Unauthorized { .. } | AppError::Internal(_) => None,
        }
    }

    fn stack(&self) -> String {
        match self {
            // `{:?}` on anyhow renders the context chain and any captured backtrace
            AppError::Internal(e) => format!("{e:?}"),
            other => format!("{other:?}"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

/// How much of an unclassified error a 500 response reveals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub expose_stack: bool,
}

impl ErrorPolicy {
    pub fn new(expose_stack: bool) -> Self {
        Self { expose_stack }
    }
}

/// The error behind a response, left for the error middleware
#[derive(Debug, Clone)]
pub struct ErrorReport(pub Arc<AppError>);

/// Marks a response the error middleware has already answered
#[derive(Debug, Clone, Copy)]
pub struct Committed;

/// Outcome of [`handle_error`]
#[derive(Debug)]
pub enum ErrorDisposition {
    /// The response is already committed; hand the error to the next handler
    Forward(Arc<AppError>),
    Respond(Response),
}

/// Map one error to one response, or forward it when `headers_sent`.
pub fn handle_error(
    error: Arc<AppError>,
    headers_sent: bool,
    policy: &ErrorPolicy,
) -> ErrorDisposition {
    if headers_sent {
        tracing::debug!(error = %error, "response already committed, forwarding error");
        return ErrorDisposition::Forward(error);
    }

    let error_id = Uuid::new_v4();
    let timestamp = OffsetDateTime::now_utc();
    let response = render_error(error.clone(), policy);

    if response.status() == StatusCode::UNAUTHORIZED {
        tracing::warn!(
            error_id = %error_id,
            %timestamp,
            error = %error,
            "Request unauthorized"
        );
    } else {
        tracing::error!(
            error_id = %error_id,
            %timestamp,
            status_code = %response.status().as_u16(),
            error = ?error,
            "Request error"
        );
    }

    ErrorDisposition::Respond(response)
}

/// Render an error without any forwarding decision.
///
/// Errors handled by the middleware keep an [`ErrorReport`] on the response.
pub fn render_error(error: Arc<AppError>, policy: &ErrorPolicy) -> Response {
    if let Some(status) = error.local_status() {
        return (status, Json(MessageBody::new(error.to_string()))).into_response();
    }

    let mut response = match error.as_ref() {
        AppError::Unauthorized { code, message } => (
            StatusCode::UNAUTHORIZED,
            Json(UnauthorizedBody {
                code: code.clone(),
                message: message.clone(),
            }),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(InternalErrorBody {
                message: other.to_string(),
                stack: policy.expose_stack.then(|| other.stack()),
            }),
        )
            .into_response(),
    };

    response.extensions_mut().insert(ErrorReport(error));
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(status) = self.local_status() {
            tracing::debug!(status_code = %status.as_u16(), message = %self, "request rejected");
        }

        render_error(Arc::new(self), &ErrorPolicy::default())
    }
}

/// Terminal error handler installed around every route.
pub async fn error_middleware(
    State(policy): State<ErrorPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(ErrorReport(error)) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };
    let headers_sent = response.extensions().get::<Committed>().is_some();

    match handle_error(error, headers_sent, &policy) {
        ErrorDisposition::Forward(_) => response,
        ErrorDisposition::Respond(mut rendered) => {
            rendered.extensions_mut().insert(Committed);
            rendered
        }
    }
}
