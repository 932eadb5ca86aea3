//! flecha: typed routes over axum.
//!
//! Declare routes as (method, path spec, body schema, handler), collect them
//! in an immutable [`Router`], and activate it. Every request runs the same
//! pipeline: body validation, typed path parsing, the handler, and a JSON
//! envelope with the right status code.
//!
//! ```no_run
//! use flecha::observability::logging;
//! use flecha::{int, DomainError, PathSpec, Route, Router, Segment, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! logging::init(&ServerConfig::default().observability);
//!
//! let get_user = Route::get(
//!     PathSpec::build([Segment::from("users"), int("userId").into()])?,
//!     |req| async move {
//!         match req.path_params.int("userId") {
//!             Some(1) => Ok(serde_json::json!({ "id": 1, "name": "dodo" })),
//!             _ => Err(DomainError::not_found()),
//!         }
//!     },
//! );
//!
//! Router::new().with_route(get_user).activate(3000).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use error::{translate, DomainError, ErrorResponse};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{
    int, json, no_body, str, ActivationError, BodyIssue, BodySchema, IssueCode, Json, Method,
    NoBody, ParamParser, ParamValue, ParsedParams, PathParseError, PathSpec, PathSpecError,
    RequestData, Route, Router, Segment,
};
