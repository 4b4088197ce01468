//! Request-scoped context shared by every user handler.
//!
//! The context bundles the trace identifier assigned by the trace middleware
//! with the user directory handle from the application state. Both must be
//! present; a missing value is a wiring bug, so it is logged and surfaced as
//! an internal error rather than blamed on the client.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::error;

use crate::domain::ports::UserDirectory;
use crate::domain::{Error, TraceId};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::state::HttpState;
use crate::middleware::trace::trace_id_of;

/// Per-request values extracted from the request and application state.
#[derive(Clone)]
pub struct RequestContext {
    trace_id: TraceId,
    users: Arc<dyn UserDirectory>,
}

impl RequestContext {
    /// Trace identifier of the current request.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// User directory port.
    pub fn users(&self) -> &dyn UserDirectory {
        self.users.as_ref()
    }

    /// Wrap a domain error for the error boundary, tagging it with this
    /// request's trace identifier.
    pub fn reject(&self, error: Error) -> ApiError {
        ApiError::new(error, Some(self.trace_id))
    }

    fn extract(req: &HttpRequest) -> Result<Self, ApiError> {
        let Some(trace_id) = trace_id_of(req) else {
            error!(
                path = req.path(),
                "trace id missing from request; Trace middleware not installed"
            );
            return Err(ApiError::new(
                Error::internal("request trace id unavailable"),
                None,
            ));
        };
        let Some(state) = req.app_data::<web::Data<HttpState>>() else {
            error!(
                %trace_id,
                path = req.path(),
                "user directory missing from application state"
            );
            return Err(ApiError::new(
                Error::internal("user directory unavailable"),
                Some(trace_id),
            ));
        };
        Ok(Self {
            trace_id,
            users: Arc::clone(&state.users),
        })
    }
}

impl FromRequest for RequestContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}

#[cfg(test)]
mod tests {
    //! Extraction coverage for the request context.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserDirectory;
    use actix_web::HttpMessage;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn state() -> web::Data<HttpState> {
        web::Data::new(HttpState::new(Arc::new(MockUserDirectory::new())))
    }

    #[rstest]
    fn extracts_trace_id_and_directory() {
        let trace_id = TraceId::generate();
        let req = TestRequest::default().app_data(state()).to_http_request();
        req.extensions_mut().insert(trace_id);

        let context = RequestContext::extract(&req).expect("context available");
        assert_eq!(context.trace_id(), trace_id);
    }

    #[rstest]
    fn missing_trace_id_is_an_internal_error() {
        let req = TestRequest::default().app_data(state()).to_http_request();

        let Err(error) = RequestContext::extract(&req) else {
            panic!("expected missing trace id to fail");
        };
        assert_eq!(error.error().code(), ErrorCode::InternalError);
        assert_eq!(error.trace_id(), None);
    }

    #[rstest]
    fn missing_state_is_an_internal_error_with_trace_id() {
        let trace_id = TraceId::generate();
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(trace_id);

        let Err(error) = RequestContext::extract(&req) else {
            panic!("expected missing state to fail");
        };
        assert_eq!(error.error().code(), ErrorCode::InternalError);
        assert_eq!(error.trace_id(), Some(trace_id));
    }

    #[rstest]
    fn reject_tags_errors_with_trace_id() {
        let trace_id = TraceId::generate();
        let req = TestRequest::default().app_data(state()).to_http_request();
        req.extensions_mut().insert(trace_id);
        let context = RequestContext::extract(&req).expect("context available");

        let error = context.reject(Error::not_found("user missing"));
        assert_eq!(error.trace_id(), Some(trace_id));
        assert_eq!(error.error().code(), ErrorCode::NotFound);
    }
}
