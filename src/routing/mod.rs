//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration (at startup):
//!     param.rs (str / int parsers)
//!     → path.rs (PathSpec: literals + parsers, wire template)
//!     → route.rs (method + PathSpec + body.rs schema + handler)
//!     → router.rs (append-only table, bound to axum on activation)
//!
//! Per request:
//!     transport captures + body bytes
//!     → route.rs pipeline (body → path → handler → envelope)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Path parameters are typed by a runtime registry, not by the type system
//! - Deterministic: binding order is registration order

pub mod body;
pub mod param;
pub mod path;
pub mod route;
pub mod router;

pub use body::{json, no_body, BodyIssue, BodySchema, IssueCode, Json, NoBody};
pub use param::{int, str, ParamParser, ParamValue, PathParseError};
pub use path::{ParsedParams, PathSpec, PathSpecError, RawParams, Segment};
pub use route::{Method, RawRequest, RequestData, Route};
pub use router::{ActivationError, Router};
