//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while giving Actix
//! handlers one place that turns failures into status codes and JSON bodies.
//! [`ApiError`] pairs a domain [`Error`] with the request's [`TraceId`].

use std::fmt;

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, TraceId};
use crate::middleware::trace::trace_id_of;

const REDACTED_MESSAGE: &str = "Internal server error";

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by HTTP handlers and extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    error: Error,
    trace_id: Option<TraceId>,
}

impl ApiError {
    /// Attach the request's trace identifier to a domain error.
    pub fn new(error: Error, trace_id: Option<TraceId>) -> Self {
        Self { error, trace_id }
    }

    /// Wrapped domain error.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Trace identifier of the failing request, when known.
    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

/// JSON error envelope written to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    pub code: String,
    /// Human-readable message.
    #[schema(example = "user payload failed validation")]
    pub message: String,
    /// Correlation identifier matching the `trace-id` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Supplementary details such as per-field validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    fn from_error(error: &ApiError) -> Self {
        let trace_id = error.trace_id.map(|id| id.to_string());
        if error.error.is_internal() {
            return Self {
                code: ErrorCode::InternalError.as_str().to_owned(),
                message: REDACTED_MESSAGE.to_owned(),
                trace_id,
                details: None,
            };
        }
        Self {
            code: error.error.code().as_str().to_owned(),
            message: error.error.message().to_owned(),
            trace_id,
            details: error.error.details().cloned(),
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.error.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let trace_id = self.trace_id.map(|id| id.to_string()).unwrap_or_default();
        if status.is_server_error() {
            error!(%trace_id, message = self.error.message(), "request failed");
        } else {
            warn!(
                %trace_id,
                code = %self.error.code(),
                message = self.error.message(),
                "request rejected"
            );
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        builder.json(ErrorBody::from_error(self))
    }
}

/// Default service for requests no route matches, such as `PATCH /users/{id}`.
pub async fn route_not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    let error = Error::not_found(format!("no route for {} {}", req.method(), req.path()))
        .with_details(json!({ "method": req.method().as_str(), "path": req.path() }));
    Err(ApiError::new(error, trace_id_of(&req)))
}
