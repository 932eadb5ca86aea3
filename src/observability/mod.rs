//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router binding, request pipeline, server lifecycle produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the trace span of every request
//! - Metrics are cheap and recorded unconditionally

pub mod logging;
pub mod metrics;
