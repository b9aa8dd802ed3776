//! Authentication error types.
//!
//! This module defines all error types that can occur while establishing or
//! renewing a session. The session taxonomy (`Unauthenticated`,
//! `SessionExpired`, `Unavailable`, `Malformed`) all surface as HTTP 401 at
//! the boundary; the remaining variants cover the sign-up/sign-in plumbing.

use std::fmt;

/// Errors that can occur during session authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable credential was presented with the request.
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// Description of why the request is unauthenticated.
        message: String,
    },

    /// The refresh-token flow failed; the caller must sign in again.
    #[error("Session expired: {message}")]
    SessionExpired {
        /// Description of why the session is no longer usable.
        message: String,
    },

    /// A dependent store was unreachable. Treated as a rejection (fail
    /// closed), never as an implicit grant.
    #[error("Dependency unavailable: {message}")]
    Unavailable {
        /// Description of the unavailable dependency.
        message: String,
    },

    /// A presented credential payload is structurally invalid.
    #[error("Malformed credential: {message}")]
    Malformed {
        /// Description of the structural problem.
        message: String,
    },

    /// The email is already registered to another account.
    #[error("This email {email} already exists")]
    EmailTaken {
        /// The conflicting email address.
        email: String,
    },

    /// No account is associated with the given email.
    #[error("No user is associated with the email of: {email}")]
    UnknownEmail {
        /// The email address that was looked up.
        email: String,
    },

    /// The email/password combination does not match a stored account.
    #[error("Email and password mismatch")]
    InvalidCredentials,

    /// The request body failed validation.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the validation failure.
        message: String,
    },

    /// An error occurred while reading or writing auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid. Fatal at startup.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Unauthenticated` error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a new `SessionExpired` error.
    #[must_use]
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired {
            message: message.into(),
        }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `EmailTaken` error.
    #[must_use]
    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    /// Creates a new `UnknownEmail` error.
    #[must_use]
    pub fn unknown_email(email: impl Into<String>) -> Self {
        Self::UnknownEmail {
            email: email.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error belongs to the session rejection
    /// taxonomy (everything the decision engine can emit).
    #[must_use]
    pub fn is_session_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated { .. }
                | Self::SessionExpired { .. }
                | Self::Unavailable { .. }
                | Self::Malformed { .. }
        )
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated { .. }
                | Self::SessionExpired { .. }
                | Self::Unavailable { .. }
                | Self::Malformed { .. }
                | Self::EmailTaken { .. }
                | Self::UnknownEmail { .. }
                | Self::InvalidCredentials
                | Self::InvalidRequest { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthenticated { .. } => ErrorCategory::Session,
            Self::SessionExpired { .. } => ErrorCategory::Session,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
            Self::Malformed { .. } => ErrorCategory::Credential,
            Self::EmailTaken { .. } => ErrorCategory::Account,
            Self::UnknownEmail { .. } => ErrorCategory::Account,
            Self::InvalidCredentials => ErrorCategory::Account,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Session establishment and renewal errors.
    Session,
    /// Credential parsing and verification errors.
    Credential,
    /// Account lookup and password errors.
    Account,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Credential => write!(f, "credential"),
            Self::Account => write!(f, "account"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
