//! Error types for the Instant preview client.

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for all client operations.
///
/// The variants form two branches. [`Error::Network`] covers failures where no
/// HTTP exchange with the service completed. Every other variant except
/// [`Error::Config`] is an API error: the service answered with a non-2xx
/// status. Use [`Error::is_api_error`], [`Error::is_authentication_error`] and
/// [`Error::is_authorization_error`] to match on a whole branch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Transport failure: connection refused or reset, transport timeout,
    /// protocol violation, or a malformed response body.
    #[error("network error: {0}")]
    Network(String),
    /// HTTP 400.
    #[error("request error: {0}")]
    Request(String),
    /// HTTP 404.
    #[error("not found: {0}")]
    NotFound(String),
    /// HTTP 504. The service gave up waiting on a capture.
    #[error("timeout error: {0}")]
    Timeout(String),
    /// HTTP 500.
    #[error("service error: {0}")]
    Service(String),
    /// HTTP 401 without a recognised bearer challenge.
    #[error("authentication error: {0}")]
    Authentication(String),
    /// Bearer challenge `invalid_token`.
    #[error("invalid oauth token: {0}")]
    InvalidOAuthToken(String),
    /// HTTP 403 without a recognised bearer challenge.
    #[error("authorization error: {0}")]
    Authorization(String),
    /// Bearer challenge `invalid_scope`.
    #[error("invalid oauth scope: {0}")]
    InvalidOAuthScope(String),
    /// Bearer challenge `inactive_user`.
    #[error("inactive user: {0}")]
    InactiveUser(String),
    /// Any other non-2xx status.
    #[error("api error (status {status}): {message}")]
    Api { status: StatusCode, message: String },
    /// Invalid client-side configuration. Never produced by a request.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map a non-2xx status to its error kind.
    ///
    /// Unmapped statuses become the generic [`Error::Api`].
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::BAD_REQUEST => Self::Request(message),
            StatusCode::UNAUTHORIZED => Self::Authentication(message),
            StatusCode::FORBIDDEN => Self::Authorization(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::INTERNAL_SERVER_ERROR => Self::Service(message),
            StatusCode::GATEWAY_TIMEOUT => Self::Timeout(message),
            status => Self::Api { status, message },
        }
    }

    /// The human-readable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Network(message)
            | Self::Request(message)
            | Self::NotFound(message)
            | Self::Timeout(message)
            | Self::Service(message)
            | Self::Authentication(message)
            | Self::InvalidOAuthToken(message)
            | Self::Authorization(message)
            | Self::InvalidOAuthScope(message)
            | Self::InactiveUser(message)
            | Self::Config(message) => message,
            Self::Api { message, .. } => message,
        }
    }

    /// Status code the service answered with, for the generic [`Error::Api`],
    /// or the status a plain status-mapped kind stands for.
    ///
    /// Returns `None` for network, configuration and bearer-challenge errors,
    /// since challenges are matched regardless of status.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request(_) => Some(StatusCode::BAD_REQUEST),
            Self::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Authorization(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Service(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Timeout(_) => Some(StatusCode::GATEWAY_TIMEOUT),
            Self::Api { status, .. } => Some(*status),
            Self::Network(_)
            | Self::InvalidOAuthToken(_)
            | Self::InvalidOAuthScope(_)
            | Self::InactiveUser(_)
            | Self::Config(_) => None,
        }
    }

    /// True for every failure that came out of a completed HTTP exchange.
    pub fn is_api_error(&self) -> bool {
        !matches!(self, Self::Network(_) | Self::Config(_))
    }

    /// True for [`Error::Authentication`] and its refinement
    /// [`Error::InvalidOAuthToken`].
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::InvalidOAuthToken(_))
    }

    /// True for [`Error::Authorization`] and its refinements
    /// [`Error::InvalidOAuthScope`] and [`Error::InactiveUser`].
    pub fn is_authorization_error(&self) -> bool {
        matches!(
            self,
            Self::Authorization(_) | Self::InvalidOAuthScope(_) | Self::InactiveUser(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's own message only names the request; the socket error
        // is further down the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            let cause_message = cause.to_string();
            if !message.contains(&cause_message) {
                message.push_str(": ");
                message.push_str(&cause_message);
            }
            source = cause.source();
        }
        Self::Network(message)
    }
}
