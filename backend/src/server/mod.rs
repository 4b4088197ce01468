//! HTTP server assembly: routes, middleware and shared state.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_user_directory;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use apid::Trace;
#[cfg(debug_assertions)]
use apid::doc::ApiDoc;
use apid::inbound::http::error::route_not_found;
use apid::inbound::http::health::{HealthState, live, ready};
use apid::inbound::http::state::HttpState;
use apid::inbound::http::users;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// One worker's application: every route sits behind [`Trace`] so probes,
/// docs and unmatched paths also answer with a `trace-id` header.
fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(users::configure)
        .service(ready)
        .service(live)
        .default_service(web::to(route_not_found));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and mark the service ready.
///
/// The returned [`Server`] does nothing until awaited.
///
/// # Errors
/// Returns [`std::io::Error`] when the address cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig { bind_addr, users } = config;
    let http_state = web::Data::new(HttpState::new(users));
    let worker_health = health_state.clone();

    let server = HttpServer::new(move || build_app(worker_health.clone(), http_state.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use apid::domain::{TRACE_ID_HEADER, UserDirectoryService};
    use apid::outbound::memory::InMemoryUserRepository;
    use mockable::DefaultClock;
    use rstest::rstest;
    use serde_json::Value;

    fn states() -> (web::Data<HealthState>, web::Data<HttpState>) {
        let users = UserDirectoryService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(DefaultClock),
        );
        (
            web::Data::new(HealthState::new()),
            web::Data::new(HttpState::new(Arc::new(users))),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_follows_health_state() {
        let (health, http) = states();
        let app = test::init_service(build_app(health.clone(), http)).await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        health.mark_ready();
        let req = test::TestRequest::get().uri("/health/ready").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/users")]
    #[case("/health/live")]
    #[case("/no-such-route")]
    #[actix_web::test]
    async fn every_response_carries_a_trace_id(#[case] uri: &str) {
        let (health, http) = states();
        let app = test::init_service(build_app(health, http)).await;

        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;

        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[case(test::TestRequest::patch().uri("/users/3fa85f64-5717-4562-b3fc-2c963f66afa6"))]
    #[case(test::TestRequest::get().uri("/no-such-route"))]
    #[actix_web::test]
    async fn unmatched_routes_answer_with_error_body(#[case] request: test::TestRequest) {
        let (health, http) = states();
        let app = test::init_service(build_app(health, http)).await;

        let res = test::call_service(&app, request.to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("trace-id header");
        let body: Value = test::read_body_json(res).await;

        assert_eq!(body.get("code").and_then(Value::as_str), Some("not_found"));
        assert_eq!(body.get("traceId").and_then(Value::as_str), Some(header.as_str()));
    }
}
