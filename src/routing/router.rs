//! The route table and its binding to the transport.
//!
//! # Responsibilities
//! - Collect routes, append-only, in registration order
//! - Compile the table into an axum router at activation
//! - Reject tables the transport cannot represent unambiguously
//!
//! # Design Decisions
//! - Immutable: `with_route` returns a new table sharing the existing routes
//! - Duplicate (method, path) pairs are an activation error, not last-wins
//! - Methods sharing one path are grouped into a single transport entry
//! - Unmatched paths answer with the NotFound envelope, unmatched methods with 405

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, RawPathParamsRejection},
        RawPathParams,
    },
    http::StatusCode,
    response::Response,
    routing::{MethodFilter, MethodRouter},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::error::DomainError;
use crate::http::response;
use crate::lifecycle::{signals, startup, Shutdown};

use super::path::RawParams;
use super::route::{Method, RawRequest, Route};

/// Reasons a route table cannot be bound to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("{method} {path}: method has no dispatch entry")]
    UnsupportedMethod { method: Method, path: String },

    #[error("{method} {path}: requests with this method carry no body to validate")]
    SchemaOnBodylessMethod { method: Method, path: String },

    #[error("{method} {path} is registered more than once")]
    DuplicateRoute { method: Method, path: String },

    #[error("{conflicting} matches the same requests as {existing} with different parameter names")]
    ConflictingPath { existing: String, conflicting: String },
}

/// Immutable, append-only collection of routes.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Arc<[Route]>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Arc::from(Vec::new()),
        }
    }

    /// A new router with `route` appended; `self` is left untouched.
    pub fn with_route(&self, route: Route) -> Self {
        let routes: Vec<Route> = self.routes.iter().cloned().chain([route]).collect();
        Self {
            routes: routes.into(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compile the table into an axum router, in registration order.
    pub fn bind(&self) -> Result<axum::Router, ActivationError> {
        let mut seen: HashSet<(Method, &str)> = HashSet::new();
        let mut shapes: HashMap<String, String> = HashMap::new();
        let mut entries: Vec<(String, Vec<(MethodFilter, Route)>)> = Vec::new();

        for route in self.routes.iter() {
            let method = route.method();
            let filter = method_filter(method).ok_or_else(|| ActivationError::UnsupportedMethod {
                method,
                path: route.wire_path().to_string(),
            })?;

            if route.has_body_schema() && !method.carries_body() {
                return Err(ActivationError::SchemaOnBodylessMethod {
                    method,
                    path: route.wire_path().to_string(),
                });
            }

            if !seen.insert((method, route.wire_path())) {
                return Err(ActivationError::DuplicateRoute {
                    method,
                    path: route.wire_path().to_string(),
                });
            }

            let wire_path = route.wire_path().to_string();
            let shape = route.path().shape();
            if let Some(existing) = shapes.get(&shape) {
                if *existing != wire_path {
                    return Err(ActivationError::ConflictingPath {
                        existing: existing.clone(),
                        conflicting: wire_path,
                    });
                }
            }
            shapes.insert(shape, wire_path);

            tracing::info!(method = %method, path = %route.wire_path(), "Route bound");

            let transport_path = route.path().transport_path();
            match entries.iter_mut().find(|(path, _)| *path == transport_path) {
                Some((_, methods)) => methods.push((filter, route.clone())),
                None => entries.push((transport_path, vec![(filter, route.clone())])),
            }
        }

        let app = entries
            .into_iter()
            .fold(axum::Router::new(), |app, (path, methods)| {
                let methods = methods
                    .into_iter()
                    .fold(MethodRouter::new(), |methods, (filter, route)| {
                        endpoint(methods, filter, route)
                    })
                    .fallback(method_not_allowed);
                app.route(&path, methods)
            })
            .fallback(not_found);

        Ok(app)
    }

    /// Bind every route and serve on `0.0.0.0:port` until Ctrl+C or SIGTERM.
    ///
    /// No tracing subscriber is installed here; call
    /// [`logging::init`](crate::observability::logging::init) first to see the
    /// bound routes and request logs.
    pub async fn activate(self, port: u16) -> Result<(), startup::StartupError> {
        let mut config = ServerConfig::default();
        config.listener.bind_address = format!("0.0.0.0:{}", port);

        let shutdown = Shutdown::new();
        signals::forward_to(shutdown.clone());
        startup::serve(&self, config, shutdown).await
    }
}

fn method_filter(method: Method) -> Option<MethodFilter> {
    match method {
        Method::Get => Some(MethodFilter::GET),
        Method::Put => Some(MethodFilter::PUT),
        Method::Post => Some(MethodFilter::POST),
        Method::Delete => Some(MethodFilter::DELETE),
        Method::Patch | Method::Options => None,
    }
}

/// Add the transport endpoint for one route. Body-carrying methods ingest the body first.
fn endpoint(methods: MethodRouter, filter: MethodFilter, route: Route) -> MethodRouter {
    if route.method().carries_body() {
        methods.on(
            filter,
            move |params: Result<RawPathParams, RawPathParamsRejection>,
                  body: Result<Bytes, BytesRejection>| async move {
                let body = match body {
                    Ok(body) => (!body.is_empty()).then_some(body),
                    Err(rejection) => {
                        tracing::debug!(error = %rejection, "Request body could not be read");
                        return response::transport_error(rejection.status());
                    }
                };
                route
                    .handle(RawRequest {
                        body,
                        path_params: raw_params(params),
                    })
                    .await
            },
        )
    } else {
        methods.on(
            filter,
            move |params: Result<RawPathParams, RawPathParamsRejection>| async move {
                route
                    .handle(RawRequest {
                        body: None,
                        path_params: raw_params(params),
                    })
                    .await
            },
        )
    }
}

fn raw_params(params: Result<RawPathParams, RawPathParamsRejection>) -> Option<RawParams> {
    match params {
        Ok(params) => Some(
            params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        ),
        // no captures recorded at all; parameterised paths still fail in PathSpec::parse
        Err(RawPathParamsRejection::MissingPathParams(_)) => Some(RawParams::new()),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Path captures could not be decoded");
            None
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

async fn not_found() -> Response {
    response::domain_error(&DomainError::not_found())
}

async fn method_not_allowed() -> Response {
    response::transport_error(StatusCode::METHOD_NOT_ALLOWED)
}
