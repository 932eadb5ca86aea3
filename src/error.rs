//! Domain errors returned by route handlers and their HTTP translation.
//!
//! The translation table here is the only source of client-visible failure
//! text. `Other` carries internal detail for server-side logs; none of it is
//! ever rendered to the client.

use axum::http::StatusCode;
use std::error::Error as StdError;
use thiserror::Error;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of failures a handler may report.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found")]
    NotFound { context: Option<String> },

    #[error("conflict")]
    Conflict { context: Option<String> },

    #[error("bad request: {context}")]
    BadRequest { context: String },

    #[error("forbidden")]
    Forbidden,

    #[error("missing authorization header")]
    MissingHeader,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid session")]
    InvalidSession,

    #[error("internal error: {context}")]
    Other {
        context: String,
        #[source]
        cause: Option<Cause>,
    },
}

impl DomainError {
    pub fn not_found() -> Self {
        DomainError::NotFound { context: None }
    }

    pub fn not_found_with(context: impl Into<String>) -> Self {
        DomainError::NotFound {
            context: Some(context.into()),
        }
    }

    pub fn conflict() -> Self {
        DomainError::Conflict { context: None }
    }

    pub fn conflict_with(context: impl Into<String>) -> Self {
        DomainError::Conflict {
            context: Some(context.into()),
        }
    }

    pub fn bad_request(context: impl Into<String>) -> Self {
        DomainError::BadRequest {
            context: context.into(),
        }
    }

    pub fn other(context: impl Into<String>) -> Self {
        DomainError::Other {
            context: context.into(),
            cause: None,
        }
    }

    /// Internal failure wrapping the underlying error for logging.
    pub fn other_with_cause<E>(context: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DomainError::Other {
            context: context.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Variant name, used as a low-cardinality log/metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "not_found",
            DomainError::Conflict { .. } => "conflict",
            DomainError::BadRequest { .. } => "bad_request",
            DomainError::Forbidden => "forbidden",
            DomainError::MissingHeader => "missing_header",
            DomainError::InvalidToken => "invalid_token",
            DomainError::InvalidSession => "invalid_session",
            DomainError::Other { .. } => "other",
        }
    }
}

/// Status and client-facing message for a [`DomainError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorResponse {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub const INTERNAL_ERROR_MESSAGE: &str = "An Internal Error Occurred :(";

/// Map a domain error to its HTTP status and message.
pub fn translate(error: &DomainError) -> ErrorResponse {
    match error {
        DomainError::InvalidToken => {
            ErrorResponse::new(StatusCode::BAD_REQUEST, "Invalid Token Format")
        }
        DomainError::MissingHeader => {
            ErrorResponse::new(StatusCode::BAD_REQUEST, "Missing `Authorization` header")
        }
        DomainError::InvalidSession => {
            ErrorResponse::new(StatusCode::UNAUTHORIZED, "Invalid Session")
        }
        DomainError::BadRequest { context } => {
            ErrorResponse::new(StatusCode::BAD_REQUEST, context.as_str())
        }
        DomainError::Conflict { .. } => ErrorResponse::new(StatusCode::CONFLICT, "Conflict"),
        DomainError::NotFound { context } => {
            let message = match context {
                Some(context) => format!("Not Found - {}", context),
                None => "Not Found".to_string(),
            };
            ErrorResponse::new(StatusCode::NOT_FOUND, message)
        }
        DomainError::Forbidden => ErrorResponse::new(
            StatusCode::FORBIDDEN,
            "You do not have access to this resource.",
        ),
        DomainError::Other { .. } => {
            ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}
