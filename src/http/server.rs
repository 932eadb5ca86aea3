//! HTTP server setup.
//!
//! # Responsibilities
//! - Compile the route table into an axum router
//! - Wire up middleware (request ID, tracing, body limit, CORS, timeout)
//! - Serve on a bound listener until shutdown
//!
//! # Design Decisions
//! - Routes are compiled before the listener exists; a bad table never binds a port
//! - The CORS header is also set at the transport so responses produced
//!   outside the route pipeline (timeouts) carry it

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Request},
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::routing::{ActivationError, Router};

/// HTTP server for a route table.
pub struct HttpServer {
    app: axum::Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Compile `router` and wrap it in the transport middleware.
    pub fn new(router: &Router, config: ServerConfig) -> Result<Self, ActivationError> {
        let app = Self::build_app(router.bind()?, &config);
        Ok(Self { app, config })
    }

    #[allow(deprecated)]
    fn build_app(routes: axum::Router, config: &ServerConfig) -> axum::Router {
        let app = routes.layer(DefaultBodyLimit::max(config.limits.body_limit_bytes));

        let app = match config.timeouts.request_secs {
            Some(secs) => app.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => app,
        };

        app.layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered axum router, for embedding or in-process testing.
    pub fn into_router(self) -> axum::Router {
        self.app
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::routing::{int, PathSpec, Route, Segment};
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn app(config: ServerConfig) -> axum::Router {
        let route = Route::get(
            PathSpec::build([Segment::from("items"), int("itemId").into()]).unwrap(),
            |req| async move { Ok::<_, DomainError>(req.path_params) },
        );
        HttpServer::new(&Router::new().with_route(route), config)
            .unwrap()
            .into_router()
    }

    #[tokio::test]
    async fn test_layers_add_request_id_and_cors() {
        let response = app(ServerConfig::default())
            .oneshot(Request::get("/items/9").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            HeaderValue::from_static("*")
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "data": { "itemId": 9 } }));
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let response = app(ServerConfig::default())
            .oneshot(
                Request::get("/items/9")
                    .header(X_REQUEST_ID, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "req-123");
    }

    #[tokio::test]
    async fn test_timeout_layer_is_optional() {
        let mut config = ServerConfig::default();
        config.timeouts.request_secs = Some(5);

        let response = app(config)
            .oneshot(Request::get("/items/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
