//! Error types for the resource manager.
//!
//! Errors fall in two groups. Per-request errors ([`ManagerError`] and the
//! errors it is built from) are always turned into an HTTP response and never
//! escape the request. Construction errors ([`ConfigurationError`]) stop a
//! resource type from being served at all.
//!
//! # Status Mapping
//!
//! | Error | HTTP Status | Body |
//! |-------|-------------|------|
//! | [`NegotiationError`] | 400 | plain text |
//! | [`ManagerError::BadRequest`] | 400 | encoded `{code, error}` |
//! | [`ManagerError::NotFound`] | 404 | empty |
//! | [`ManagerError::Internal`] | 500 | encoded `{code, error}` |

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

/// Error returned by a [`ResourceHandler`](crate::handler::ResourceHandler).
///
/// Storage technologies signal absence in different ways; handlers translate
/// theirs into [`HandlerError::NotFound`] so the dispatcher never has to know
/// which store it is talking to.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,

    /// Any other failure of the collaborator.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wraps an arbitrary error as [`HandlerError::Other`].
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HandlerError::Other(anyhow::Error::new(err))
    }

    /// Builds a [`HandlerError::Other`] from a message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        HandlerError::Other(anyhow::Error::msg(message))
    }

    /// Returns true if this error signals an absent record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HandlerError::NotFound)
    }
}

/// Result type alias for resource handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// A spec value that failed its own validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidSpec(pub String);

impl InvalidSpec {
    /// Creates a validation failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// No encoder could be chosen for a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// The media type is well formed but no encoder handles it.
    #[error("unsupported content type '{0}'")]
    Unsupported(String),

    /// The header value is not a media type.
    #[error("invalid media type '{0}'")]
    InvalidMediaType(String),
}

/// Failure to marshal or unmarshal a document.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// JSON (de)serialization failed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failed.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but its root is not a string-keyed mapping.
    #[error("expected a mapping at the document root")]
    NotAMapping,
}

/// Invalid list query parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// `take` or `skip` is not a non-negative integer.
    #[error("error reading {param} param: '{value}' is not a number")]
    NotANumber {
        /// Name of the offending parameter.
        param: &'static str,
        /// Raw value sent by the client.
        value: String,
    },

    /// `sortBy` names a field the handler does not sort by.
    #[error("invalid sort field: {0}")]
    InvalidSortField(String),
}

/// A resource manager could not be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot create resource manager '{resource_type}': {issue}")]
pub struct ConfigurationError {
    /// Singular resource type name the manager was created for.
    pub resource_type: String,
    /// What is wrong with the configuration.
    pub issue: ConfigurationIssue,
}

/// The specific problem behind a [`ConfigurationError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationIssue {
    /// The singular or plural name is empty.
    #[error("{0} resource type name cannot be empty")]
    EmptyName(&'static str),

    /// A name is not usable as a path segment.
    #[error("resource type name '{0}' must only contain ASCII letters, digits, '-' or '_'")]
    InvalidName(String),

    /// `body_limit` is zero.
    #[error("body limit cannot be 0")]
    ZeroBodyLimit,

    /// The negotiator has no encoders.
    #[error("at least one encoder must be configured")]
    NoEncoders,

    /// The path prefix collides with a built-in endpoint.
    #[error("path '{0}' is reserved")]
    ReservedPath(String),

    /// Another mounted manager already serves the path prefix.
    #[error("path '{0}' is already served by another resource manager")]
    DuplicatePath(String),
}

/// The per-request error type of the dispatcher.
///
/// Every variant maps to exactly one status code; see [`ManagerError::status_code`].
#[derive(Debug)]
pub enum ManagerError {
    /// The request could not be understood (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// The handler reported an absent record (HTTP 404).
    NotFound,

    /// Any other failure (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl ManagerError {
    /// Shorthand for [`ManagerError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        ManagerError::BadRequest {
            message: message.into(),
        }
    }

    /// Shorthand for [`ManagerError::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        ManagerError::InternalError {
            message: message.into(),
        }
    }

    /// Translates a handler failure for the given verb and resource type.
    pub fn from_handler(err: HandlerError, verb: &str, resource_type: &str) -> Self {
        match err {
            HandlerError::NotFound => ManagerError::NotFound,
            HandlerError::Other(cause) => ManagerError::InternalError {
                message: format!("error {} resource {}: {:#}", verb, resource_type, cause),
            },
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ManagerError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ManagerError::NotFound => StatusCode::NOT_FOUND,
            ManagerError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message written into the error body, if the variant has one.
    pub fn body_message(&self) -> Option<&str> {
        match self {
            ManagerError::BadRequest { message } | ManagerError::InternalError { message } => {
                Some(message)
            }
            ManagerError::NotFound => None,
        }
    }
}

impl fmt::Display for ManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerError::BadRequest { message } => write!(f, "Bad request: {}", message),
            ManagerError::NotFound => write!(f, "Not found"),
            ManagerError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for ManagerError {}

impl From<PaginationError> for ManagerError {
    fn from(err: PaginationError) -> Self {
        ManagerError::bad_request(format!("cannot process request: {}", err))
    }
}

/// Result type alias for dispatcher stages.
pub type ManagerResult<T> = Result<T, ManagerError>;
