//! Shared validation helpers for inbound HTTP adapters.
//!
//! These helpers translate malformed path parameters, undecodable bodies and
//! domain validation failures into `invalid_request` errors whose `details`
//! name the offending input.

use actix_web::error::JsonPayloadError;
use serde_json::json;

use crate::domain::{Error, UserId, UserValidationErrors};

/// Validation error codes for request-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidJson,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidJson => "invalid_json",
        }
    }
}

pub(crate) fn invalid_uuid_error(field: &str, value: &str) -> Error {
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse the `{id}` path segment.
pub(crate) fn parse_user_id(value: &str) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error("id", value))
}

/// Report every failing field of a user payload.
pub(crate) fn user_validation_error(errors: &UserValidationErrors) -> Error {
    let fields: Vec<_> = errors
        .iter()
        .map(|error| {
            json!({
                "field": error.field(),
                "code": error.kind().code(),
                "message": error.message(),
            })
        })
        .collect();
    Error::invalid_request("user payload failed validation").with_details(json!({
        "fields": fields,
    }))
}

/// Describe a request body that could not be decoded as JSON.
pub(crate) fn json_payload_error(error: &JsonPayloadError) -> Error {
    let reason = match error {
        JsonPayloadError::ContentType => "content type must be application/json".to_owned(),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "request body is too large".to_owned()
        }
        JsonPayloadError::Deserialize(err) => err.to_string(),
        other => other.to_string(),
    };
    Error::invalid_request("request body is not valid JSON").with_details(json!({
        "code": ErrorCode::InvalidJson.as_str(),
        "reason": reason,
    }))
}
