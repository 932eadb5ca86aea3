//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → routing layer (route pipeline)
//!     → response.rs (JSON envelope, CORS header)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
