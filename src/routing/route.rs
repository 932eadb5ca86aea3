//! Route descriptors and the per-request pipeline.
//!
//! # Request Pipeline
//! ```text
//! RawRequest { body bytes?, raw captures }
//!     → body stage    (schema routes only)   → 400 [issues]
//!     → path stage    (PathSpec::parse)      → 400 "Invalid url path"
//!     → handler stage (await handler)
//!     → response stage                       → 200 { data } | status { error }
//! ```
//!
//! # Design Decisions
//! - A `Route` can only be obtained from the builders below; its fields are private
//! - The handler's concrete types are erased once, at construction
//! - Every stage is terminal on failure; handlers never see invalid input

use axum::{body::Bytes, response::Response};
use futures_util::future::BoxFuture;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::error::DomainError;
use crate::http::response;
use crate::observability::metrics;

use super::body::{BodySchema, Ignored};
use super::path::{ParsedParams, PathSpec, RawParams};

/// HTTP methods a route can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// Whether requests with this method may carry a body worth ingesting.
    pub fn carries_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the handler receives.
#[derive(Debug)]
pub struct RequestData<B> {
    pub body: B,
    pub path_params: ParsedParams,
}

/// What the transport hands to a route for one request.
#[derive(Debug, Default)]
pub struct RawRequest {
    /// Request body, `None` when empty or not ingested.
    pub body: Option<Bytes>,
    /// Percent-decoded captures; `None` when the transport could not decode them.
    pub path_params: Option<RawParams>,
}

type Handle = Arc<dyn Fn(RawRequest) -> BoxFuture<'static, Response> + Send + Sync>;

/// Immutable bundle of method, path, body schema and handler.
#[derive(Clone)]
pub struct Route {
    method: Method,
    wire_path: String,
    path: Arc<PathSpec>,
    has_body_schema: bool,
    handle: Handle,
}

impl Route {
    /// Route whose request body is never read.
    pub fn simple<H, Fut, T>(method: Method, path: PathSpec, handler: H) -> Self
    where
        H: Fn(RequestData<()>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self::build(method, path, Ignored, false, handler)
    }

    /// Route whose request body is decoded by `schema` before the handler runs.
    pub fn with_body<S, H, Fut, T>(method: Method, path: PathSpec, schema: S, handler: H) -> Self
    where
        S: BodySchema,
        H: Fn(RequestData<S::Output>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self::build(method, path, schema, true, handler)
    }

    pub fn get<H, Fut, T>(path: PathSpec, handler: H) -> Self
    where
        H: Fn(RequestData<()>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self::simple(Method::Get, path, handler)
    }

    pub fn delete<H, Fut, T>(path: PathSpec, handler: H) -> Self
    where
        H: Fn(RequestData<()>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self::simple(Method::Delete, path, handler)
    }

    pub fn post<S, H, Fut, T>(path: PathSpec, schema: S, handler: H) -> Self
    where
        S: BodySchema,
        H: Fn(RequestData<S::Output>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self::with_body(Method::Post, path, schema, handler)
    }

    pub fn put<S, H, Fut, T>(path: PathSpec, schema: S, handler: H) -> Self
    where
        S: BodySchema,
        H: Fn(RequestData<S::Output>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        Self::with_body(Method::Put, path, schema, handler)
    }

    fn build<S, H, Fut, T>(
        method: Method,
        path: PathSpec,
        schema: S,
        has_body_schema: bool,
        handler: H,
    ) -> Self
    where
        S: BodySchema,
        H: Fn(RequestData<S::Output>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let wire_path = path.template();
        let path = Arc::new(path);
        let pipeline = Arc::new(Pipeline {
            method,
            wire_path: wire_path.clone(),
            path: path.clone(),
            schema,
            handler,
        });

        let handle: Handle = Arc::new(move |raw: RawRequest| {
            let pipeline = pipeline.clone();
            Box::pin(async move { pipeline.run(raw).await }) as BoxFuture<'static, Response>
        });

        Self {
            method,
            wire_path,
            path,
            has_body_schema,
            handle,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Wire template computed at construction, e.g. `/todos/:todoId`.
    pub fn wire_path(&self) -> &str {
        &self.wire_path
    }

    pub fn path(&self) -> &PathSpec {
        &self.path
    }

    pub fn has_body_schema(&self) -> bool {
        self.has_body_schema
    }

    /// Run the full pipeline for one request.
    pub fn handle(&self, raw: RawRequest) -> BoxFuture<'static, Response> {
        (self.handle)(raw)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("wire_path", &self.wire_path)
            .field("has_body_schema", &self.has_body_schema)
            .finish_non_exhaustive()
    }
}

struct Pipeline<S, H> {
    method: Method,
    wire_path: String,
    path: Arc<PathSpec>,
    schema: S,
    handler: H,
}

impl<S, H, Fut, T> Pipeline<S, H>
where
    S: BodySchema,
    H: Fn(RequestData<S::Output>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    async fn run(&self, raw: RawRequest) -> Response {
        let start = Instant::now();
        let response = self.dispatch(raw).await;
        metrics::record_request(
            self.method.as_str(),
            &self.wire_path,
            response.status().as_u16(),
            start,
        );
        response
    }

    async fn dispatch(&self, raw: RawRequest) -> Response {
        let body = match self.schema.decode(raw.body.as_ref()) {
            Ok(body) => body,
            Err(issues) => {
                tracing::debug!(
                    method = %self.method,
                    route = %self.wire_path,
                    issues = issues.len(),
                    "Request body rejected"
                );
                return response::body_issues(&issues);
            }
        };

        let path_params = match raw.path_params.as_ref().map(|p| self.path.parse(p)) {
            Some(Ok(params)) => params,
            Some(Err(_)) | None => {
                tracing::debug!(
                    method = %self.method,
                    route = %self.wire_path,
                    "Path parameters rejected"
                );
                return response::invalid_path();
            }
        };

        match (self.handler)(RequestData { body, path_params }).await {
            Ok(payload) => response::data(payload),
            Err(error) => {
                if let DomainError::Other { context, cause } = &error {
                    tracing::error!(
                        method = %self.method,
                        route = %self.wire_path,
                        context = %context,
                        cause = ?cause,
                        "Handler failed with internal error"
                    );
                } else {
                    tracing::debug!(
                        method = %self.method,
                        route = %self.wire_path,
                        kind = error.kind(),
                        "Handler returned domain error"
                    );
                }
                response::domain_error(&error)
            }
        }
    }
}
