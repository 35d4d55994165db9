/// Error Handling Module
///
/// One error type per concern, all folded into `AppError`:
/// 1. Domain-specific error types (validation, storage, auth, startup config)
/// 2. Unified `AppError` used for control flow with `?`
/// 3. HTTP response mapping with a coarse client-facing message
/// 4. Structured server-side logging keyed by an error id

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

use crate::auth::{CredentialError, TokenError};

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for request payloads
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::MalformedBody(msg) => write!(f, "malformed request: {}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Record store errors
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Authentication and authorization errors
///
/// `InvalidCredentials` deliberately covers both an unknown email and a wrong
/// password.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    MissingCredential,
    MalformedCredential,
    InvalidCredentials,
    InvalidToken,
    TokenExpired,
    TokenRevoked,
    BadSignature,
    MalformedToken,
    InvalidTtl,
    WrongApiKey,
    Forbidden,
    Hashing(String),
    TokenIssue(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "Missing authorization header"),
            AuthError::MalformedCredential => write!(f, "Malformed authorization header"),
            AuthError::InvalidCredentials => write!(f, "Incorrect email or password"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenRevoked => write!(f, "Token has been revoked"),
            AuthError::BadSignature => write!(f, "Token signature is invalid"),
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidTtl => write!(f, "Token lifetime must be at least one second"),
            AuthError::WrongApiKey => write!(f, "Invalid API key"),
            AuthError::Forbidden => write!(f, "Forbidden"),
            AuthError::Hashing(msg) => write!(f, "Password hashing failed: {}", msg),
            AuthError::TokenIssue(msg) => write!(f, "Access token signing failed: {}", msg),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => AuthError::MissingCredential,
            CredentialError::Malformed => AuthError::MalformedCredential,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Signature => AuthError::BadSignature,
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::InvalidTtl => AuthError::InvalidTtl,
            TokenError::Encoding(msg) => AuthError::TokenIssue(msg),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Auth(err.into())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Auth(err.into())
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                DatabaseError::UniqueConstraintViolation(db.message().to_string())
            }
            // foreign key: the referenced user is gone
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                DatabaseError::NotFound("User".to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            _ => DatabaseError::UnexpectedError(err.to_string()),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to clients
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for client-side handling
    pub code: String,
    /// Id that ties the response to the server-side log line
    pub error_id: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: String, code: String, error_id: String) -> Self {
        Self {
            error,
            code,
            error_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Status, code and the message safe to show a client.
    ///
    /// Store and hasher details stay in the logs.
    pub fn public_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_ENTRY",
                    "Resource already exists".to_string(),
                ),
                DatabaseError::NotFound(what) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{} not found", what))
                }
                DatabaseError::ConnectionPool(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                DatabaseError::UnexpectedError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                ),
            },

            AppError::Auth(e) => match e {
                AuthError::MissingCredential => {
                    (StatusCode::BAD_REQUEST, "MISSING_CREDENTIAL", e.to_string())
                }
                AuthError::MalformedCredential => {
                    (StatusCode::BAD_REQUEST, "MALFORMED_CREDENTIAL", e.to_string())
                }
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", e.to_string())
                }
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", e.to_string()),
                AuthError::TokenRevoked => (StatusCode::UNAUTHORIZED, "TOKEN_REVOKED", e.to_string()),
                AuthError::InvalidToken | AuthError::BadSignature | AuthError::MalformedToken => {
                    (StatusCode::UNAUTHORIZED, "TOKEN_INVALID", "Invalid token".to_string())
                }
                AuthError::WrongApiKey => (StatusCode::UNAUTHORIZED, "INVALID_API_KEY", e.to_string()),
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string()),
                AuthError::InvalidTtl | AuthError::Hashing(_) | AuthError::TokenIssue(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                ),
            },

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }

    /// Log the full error. Client errors are warnings, server faults are errors.
    pub fn log_error(&self, error_id: &str) {
        if self.public_parts().0.is_server_error() {
            tracing::error!(error_id = error_id, error = %self, "Request failed");
        } else {
            tracing::warn!(error_id = error_id, error = %self, "Request rejected");
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, code, message) = self.public_parts();
        HttpResponse::build(status).json(ErrorResponse::new(message, code.to_string(), error_id))
    }

    fn status_code(&self) -> StatusCode {
        self.public_parts().0
    }
}
