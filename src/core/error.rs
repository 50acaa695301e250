//! Typed error handling for starlinks
//!
//! Every gateway operation, resolver and HTTP handler reports failures through
//! [`StarlinksError`] so callers can tell "the record does not exist" apart from
//! "the store could not be reached" instead of receiving a zero-value record.
//!
//! # Error Categories
//!
//! - [`EntityError`]: lookups that matched nothing and unique-key conflicts
//! - [`ValidationError`]: missing or malformed arguments
//! - [`StorageError`]: store connectivity and query execution failures
//! - [`GraphQLError`]: parse and document validation failures
//! - [`RequestError`]: HTTP-level failures (token exchange endpoint)
//! - [`ConfigError`]: configuration loading failures
//!
//! # Example
//!
//! ```rust,ignore
//! use starlinks::prelude::*;
//!
//! match users.get(42).await {
//!     Ok(Some(user)) => println!("Found: {:?}", user),
//!     Ok(None) => println!("no such user"),
//!     Err(e) if e.error_code() == "STORE_UNAVAILABLE" => eprintln!("store down: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for starlinks
#[derive(Debug)]
pub enum StarlinksError {
    /// Entity-related errors (lookups, unique keys)
    Entity(EntityError),

    /// Argument validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// GraphQL document errors
    GraphQL(GraphQLError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for StarlinksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarlinksError::Entity(e) => write!(f, "{}", e),
            StarlinksError::Validation(e) => write!(f, "{}", e),
            StarlinksError::Storage(e) => write!(f, "{}", e),
            StarlinksError::GraphQL(e) => write!(f, "{}", e),
            StarlinksError::Request(e) => write!(f, "{}", e),
            StarlinksError::Config(e) => write!(f, "{}", e),
            StarlinksError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for StarlinksError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StarlinksError::Entity(e) => Some(e),
            StarlinksError::Validation(e) => Some(e),
            StarlinksError::Storage(e) => Some(e),
            StarlinksError::GraphQL(e) => Some(e),
            StarlinksError::Request(e) => Some(e),
            StarlinksError::Config(e) => Some(e),
            StarlinksError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl StarlinksError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StarlinksError::Entity(e) => e.status_code(),
            StarlinksError::Validation(_) => StatusCode::BAD_REQUEST,
            StarlinksError::Storage(e) => e.status_code(),
            StarlinksError::GraphQL(_) => StatusCode::BAD_REQUEST,
            StarlinksError::Request(e) => e.status_code(),
            StarlinksError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StarlinksError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    ///
    /// This is the value placed in `extensions.code` of GraphQL errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            StarlinksError::Entity(e) => e.error_code(),
            StarlinksError::Validation(_) => "VALIDATION_ERROR",
            StarlinksError::Storage(e) => e.error_code(),
            StarlinksError::GraphQL(e) => e.error_code(),
            StarlinksError::Request(e) => e.error_code(),
            StarlinksError::Config(_) => "CONFIG_ERROR",
            StarlinksError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for unique-key conflicts (duplicate token)
    pub fn is_conflict(&self) -> bool {
        matches!(self, StarlinksError::Entity(EntityError::AlreadyExists { .. }))
    }

    /// True when a lookup matched no row
    pub fn is_not_found(&self) -> bool {
        matches!(self, StarlinksError::Entity(EntityError::NotFound { .. }))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for StarlinksError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups and unique keys
#[derive(Debug)]
pub enum EntityError {
    /// Lookup by id matched no row
    NotFound { entity_type: String, id: i32 },

    /// A unique constraint rejected the write
    AlreadyExists { entity_type: String, message: String },
}

impl EntityError {
    pub fn not_found(entity_type: &str, id: i32) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "NOT_FOUND",
            EntityError::AlreadyExists { .. } => "CONFLICT",
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::AlreadyExists {
                entity_type,
                message,
            } => {
                write!(f, "{} already exists: {}", entity_type, message)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl From<EntityError> for StarlinksError {
    fn from(err: EntityError) -> Self {
        StarlinksError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// A supplied value was rejected
    FieldError { field: String, message: String },

    /// Missing required argument
    MissingArgument { field: String, argument: String },

    /// Arguments could not be converted into the operation's request type
    InvalidArguments { field: String, message: String },

    /// Variable missing or of the wrong shape
    InvalidVariable { variable: String, message: String },

    /// Invalid JSON format
    InvalidJson { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::MissingArgument { field, argument } => {
                write!(
                    f,
                    "Field '{}' is missing required argument '{}'",
                    field, argument
                )
            }
            ValidationError::InvalidArguments { field, message } => {
                write!(f, "Invalid arguments for field '{}': {}", field, message)
            }
            ValidationError::InvalidVariable { variable, message } => {
                write!(f, "Invalid variable '${}': {}", variable, message)
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for StarlinksError {
    fn from(err: ValidationError) -> Self {
        StarlinksError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// The store could not be reached
    Unavailable { backend: String, message: String },

    /// Query execution failed for reasons unrelated to the data
    QueryError { backend: String, message: String },

    /// A non-unique constraint rejected the write
    IntegrityError { message: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::QueryError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            StorageError::IntegrityError { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Unavailable { .. } | StorageError::QueryError { .. } => {
                "STORE_UNAVAILABLE"
            }
            StorageError::IntegrityError { .. } => "CONSTRAINT_VIOLATION",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { backend, message } => {
                write!(f, "Storage backend '{}' is unavailable: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for StarlinksError {
    fn from(err: StorageError) -> Self {
        StarlinksError::Storage(err)
    }
}

// =============================================================================
// GraphQL Errors
// =============================================================================

/// Errors related to GraphQL documents
#[derive(Debug)]
pub enum GraphQLError {
    /// Query parsing error
    ParseError { message: String },

    /// Invalid operation (no operation, ambiguous operation, subscription)
    InvalidOperation { operation: String, message: String },

    /// Field not declared on the parent type
    UnknownField { type_name: String, field: String },

    /// Argument not declared on the field
    UnknownArgument { field: String, argument: String },

    /// Argument literal of the wrong type
    ArgumentType {
        field: String,
        argument: String,
        expected: String,
    },

    /// Missing or superfluous sub-selection
    Selection { field: String, message: String },

    /// Unknown fragment or fragment cycle
    Fragment { name: String, message: String },
}

impl GraphQLError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphQLError::ParseError { .. } => "GRAPHQL_PARSE_ERROR",
            GraphQLError::InvalidOperation { .. } => "GRAPHQL_INVALID_OPERATION",
            GraphQLError::UnknownField { .. }
            | GraphQLError::UnknownArgument { .. }
            | GraphQLError::ArgumentType { .. }
            | GraphQLError::Selection { .. }
            | GraphQLError::Fragment { .. } => "GRAPHQL_VALIDATION_FAILED",
        }
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphQLError::ParseError { message } => {
                write!(f, "GraphQL parse error: {}", message)
            }
            GraphQLError::InvalidOperation { operation, message } => {
                write!(f, "Invalid GraphQL operation '{}': {}", operation, message)
            }
            GraphQLError::UnknownField { type_name, field } => {
                write!(f, "Cannot query field '{}' on type '{}'", field, type_name)
            }
            GraphQLError::UnknownArgument { field, argument } => {
                write!(f, "Unknown argument '{}' on field '{}'", argument, field)
            }
            GraphQLError::ArgumentType {
                field,
                argument,
                expected,
            } => {
                write!(
                    f,
                    "Argument '{}' on field '{}' expects type '{}'",
                    argument, field, expected
                )
            }
            GraphQLError::Selection { field, message } => {
                write!(f, "Invalid selection on field '{}': {}", field, message)
            }
            GraphQLError::Fragment { name, message } => {
                write!(f, "Fragment '{}': {}", name, message)
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl From<GraphQLError> for StarlinksError {
    fn from(err: GraphQLError) -> Self {
        StarlinksError::GraphQL(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Missing required query parameter
    MissingParameter { parameter: String },

    /// The identity provider rejected or failed the exchange
    Upstream { provider: String, message: String },

    /// The endpoint needs configuration that is absent
    NotConfigured { feature: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
            RequestError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            RequestError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::MissingParameter { .. } => "MISSING_PARAMETER",
            RequestError::Upstream { .. } => "UPSTREAM_ERROR",
            RequestError::NotConfigured { .. } => "NOT_CONFIGURED",
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingParameter { parameter } => {
                write!(f, "Missing required parameter: {}", parameter)
            }
            RequestError::Upstream { provider, message } => {
                write!(f, "{} token exchange failed: {}", provider, message)
            }
            RequestError::NotConfigured { feature } => {
                write!(f, "{} is not configured", feature)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<RequestError> for StarlinksError {
    fn from(err: RequestError) -> Self {
        StarlinksError::Request(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError { file: Option<String>, message: String },

    /// Configuration file not found
    FileNotFound { path: String },

    /// Invalid value in configuration
    InvalidValue { field: String, message: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{}': {}", field, message)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for StarlinksError {
    fn from(err: ConfigError) -> Self {
        StarlinksError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for StarlinksError {
    fn from(err: serde_json::Error) -> Self {
        StarlinksError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for StarlinksError {
    fn from(err: std::io::Error) -> Self {
        StarlinksError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for StarlinksError {
    fn from(err: serde_yaml::Error) -> Self {
        StarlinksError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for starlinks operations
pub type StarlinksResult<T> = Result<T, StarlinksError>;
