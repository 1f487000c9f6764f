//! Typed error handling for the gateway
//!
//! Every failure a request can run into is expressed as a [`GatewayError`] and
//! rendered exactly once as a JSON:API error document by [`map_error`].
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed pagination, sort, query or body input
//! - [`GatewayError::UpstreamResponse`]: the resource answered with a failure status
//! - [`GatewayError::UpstreamNoResponse`]: the request was sent but nothing came back
//! - [`SerializationError`]: the returned payload cannot be shaped into a JSON:API document
//! - [`GatewayError::Internal`]: anything else
//! - [`RegistryError`]: startup-time registration problems (never reach a client)
//!
//! # Example
//!
//! ```rust,ignore
//! use jsonapi_gateway::prelude::*;
//!
//! let err: GatewayError = ResourceError::response(503, Some(json!({"msg": "down"}))).into();
//! let (status, document) = map_error(&err);
//! assert_eq!(status.as_u16(), 503);
//! ```

use crate::core::document::{ApiError, Document};
use crate::core::resource::ResourceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::fmt;

/// Detail used whenever a failure carries no message of its own
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The main error type for request handling
///
/// Variants are listed in the priority order used to classify failures.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Pagination, sort, query or body input was rejected
    Validation(ValidationError),

    /// The resource operation returned a response carrying a failure status
    UpstreamResponse {
        status: u16,
        body: Option<Value>,
    },

    /// The resource operation sent a request but received no response
    UpstreamNoResponse {
        status: Option<u16>,
        message: Option<String>,
    },

    /// The returned payload could not be serialized as a JSON:API document
    Serialization(SerializationError),

    /// Unclassified failure
    Internal { message: Option<String> },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Validation(e) => write!(f, "{}", e),
            GatewayError::UpstreamResponse { status, .. } => {
                write!(f, "Upstream responded with status {}", status)
            }
            GatewayError::UpstreamNoResponse { message, .. } => write!(
                f,
                "No response received from upstream: {}",
                message.as_deref().unwrap_or(UNKNOWN_ERROR)
            ),
            GatewayError::Serialization(e) => write!(f, "{}", e),
            GatewayError::Internal { message } => write!(
                f,
                "Internal error: {}",
                message.as_deref().unwrap_or(UNKNOWN_ERROR)
            ),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Validation(e) => Some(e),
            GatewayError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl GatewayError {
    /// Build an internal error from a message
    pub fn internal(message: impl Into<String>) -> Self {
        GatewayError::Internal {
            message: Some(message.into()),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// Upstream statuses are forwarded as-is. A missing or unrepresentable
    /// upstream status falls back to `502 Bad Gateway`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamResponse { status, .. } => forwarded_status(Some(*status)),
            GatewayError::UpstreamNoResponse { status, .. } => forwarded_status(*status),
            GatewayError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the machine-readable kind of this error (used in diagnostics)
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Validation(e) => e.error_code(),
            GatewayError::UpstreamResponse { .. } => "UPSTREAM_RESPONSE_ERROR",
            GatewayError::UpstreamNoResponse { .. } => "UPSTREAM_NO_RESPONSE",
            GatewayError::Serialization(_) => "SERIALIZATION_ERROR",
            GatewayError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Failures the legacy surface reported with HTTP 200 and an error-shaped body
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Validation(_) | GatewayError::Serialization(_)
        )
    }

    /// Convert to the single JSON:API error object sent to the client
    pub fn to_api_error(&self) -> ApiError {
        match self {
            GatewayError::Validation(e) => e.to_api_error(),
            GatewayError::UpstreamResponse { status, body } => ApiError::new(
                status.to_string(),
                "Error in response",
                body.clone().unwrap_or_else(|| Value::from(UNKNOWN_ERROR)),
            ),
            GatewayError::UpstreamNoResponse { message, .. } => ApiError::new(
                self.status_code().as_u16().to_string(),
                "Response not received",
                message.as_deref().unwrap_or(UNKNOWN_ERROR),
            ),
            GatewayError::Serialization(e) => {
                ApiError::new("500", "Error serializing response", e.message.as_str())
            }
            GatewayError::Internal { message } => ApiError::new(
                "500",
                "Internal server error",
                message.as_deref().unwrap_or(UNKNOWN_ERROR),
            ),
        }
    }

    /// Convert to a JSON:API error document
    pub fn to_document(&self) -> Document {
        Document::error(self.to_api_error())
    }
}

fn forwarded_status(status: Option<u16>) -> StatusCode {
    status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Classify a failure and render it as a status code and error document
///
/// This is the single place failures surface to clients. The raw error is
/// logged for operators; only the message text reaches the document.
pub fn map_error(err: &GatewayError) -> (StatusCode, Document) {
    let status = err.status_code();

    match err {
        GatewayError::Validation(e) => {
            tracing::warn!(kind = err.error_code(), error = %e, "Rejected request parameters");
        }
        GatewayError::UpstreamResponse { body, .. } => {
            tracing::error!(
                kind = err.error_code(),
                status = status.as_u16(),
                body = ?body,
                "Resource operation failed"
            );
        }
        _ => {
            tracing::error!(kind = err.error_code(), error = ?err, "Request failed");
        }
    }

    (status, err.to_document())
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        map_error(&self).into_response()
    }
}

impl From<ResourceError> for GatewayError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Response { status, body } => {
                GatewayError::UpstreamResponse { status, body }
            }
            ResourceError::NoResponse { status, message } => {
                GatewayError::UpstreamNoResponse { status, message }
            }
            ResourceError::Other { message } => GatewayError::Internal { message },
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised while validating request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `page` is not an integer or is below 1
    InvalidPage { value: String },

    /// `size` is not an integer or is outside `[1, max]`
    InvalidSize { value: String, max: u64 },

    /// The query string could not be decoded
    InvalidQuery { message: String },

    /// A path parameter could not be decoded
    InvalidPath { message: String },

    /// The search criteria body could not be decoded
    InvalidBody { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPage { value } => {
                write!(f, "Invalid page parameter '{}'", value)
            }
            ValidationError::InvalidSize { value, max } => {
                write!(f, "Invalid size parameter '{}' (allowed: 1..={})", value, max)
            }
            ValidationError::InvalidQuery { message } => {
                write!(f, "Invalid query string: {}", message)
            }
            ValidationError::InvalidPath { message } => {
                write!(f, "Invalid path: {}", message)
            }
            ValidationError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidPage { .. } => "INVALID_PAGE",
            ValidationError::InvalidSize { .. } => "INVALID_SIZE",
            ValidationError::InvalidQuery { .. } => "INVALID_QUERY",
            ValidationError::InvalidPath { .. } => "INVALID_PATH",
            ValidationError::InvalidBody { .. } => "INVALID_BODY",
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        match self {
            ValidationError::InvalidPage { .. } => ApiError::new(
                "400",
                "Invalid page parameter",
                "The page parameter must be an integer between 1 and the maximum pages.",
            ),
            ValidationError::InvalidSize { max, .. } => ApiError::new(
                "400",
                "Invalid size parameter",
                format!(
                    "The size parameter must be an integer between 1 and {}.",
                    max
                ),
            ),
            ValidationError::InvalidQuery { message } => {
                ApiError::new("400", "Invalid query parameters", message.as_str())
            }
            ValidationError::InvalidPath { message } => {
                ApiError::new("400", "Invalid path parameter", message.as_str())
            }
            ValidationError::InvalidBody { message } => {
                ApiError::new("400", "Invalid request body", message.as_str())
            }
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        GatewayError::Validation(err)
    }
}

// =============================================================================
// Serialization Errors
// =============================================================================

/// A returned payload whose shape does not fit a JSON:API document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationError {
    pub resource_type: String,
    pub message: String,
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to serialize {}: {}",
            self.resource_type, self.message
        )
    }
}

impl std::error::Error for SerializationError {}

impl From<SerializationError> for GatewayError {
    fn from(err: SerializationError) -> Self {
        GatewayError::Serialization(err)
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised while registering resource descriptors at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two descriptors derive the same URL segment
    DuplicateSegment {
        segment: String,
        existing: String,
        incoming: String,
    },

    /// The descriptor name derives an empty or unroutable segment
    InvalidName { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateSegment {
                segment,
                existing,
                incoming,
            } => write!(
                f,
                "Resource '{}' maps to segment '{}' already taken by '{}'",
                incoming, segment, existing
            ),
            RegistryError::InvalidName { name } => {
                write!(f, "Resource name '{}' does not produce a usable URL segment", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for request handling
pub type GatewayResult<T> = Result<T, GatewayError>;
