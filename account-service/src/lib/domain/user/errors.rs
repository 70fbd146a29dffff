use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user-related operations.
///
/// `Display` of the caller-facing variants is the exact message returned to
/// HTTP clients.
#[derive(Debug, Clone, Error)]
pub enum UserError {
    /// Bad or missing input; the message is surfaced verbatim
    #[error("{0}")]
    Validation(String),

    #[error("Username duplicate!")]
    UsernameAlreadyExists(String),

    /// Unknown username and wrong password are deliberately the same error
    #[error("Username or Password Invalid!")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired token
    #[error("Token invalid!")]
    InvalidToken,

    #[error("Invalid user id!")]
    InvalidUserId(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
