//! Error types for OPNsense API operations.
//!
//! Every failure a request can produce is classified here: rejected
//! credentials, transport problems, non-success statuses returned by the
//! appliance, and local configuration or decoding problems.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for OPNsense operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The appliance rejected the API key/secret pair (401 or 403)
    #[error("Authentication failed ({status}): {body}")]
    Auth {
        /// HTTP status code returned by the appliance
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Connection or network failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-success status other than an authentication failure
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code returned by the appliance
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A response or request payload was not valid JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Base URL or request path could not be turned into a URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for OPNsense operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify a non-success HTTP status together with its body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth {
                status: status.as_u16(),
                body,
            },
            _ => Self::Api {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "AUTH_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Api { .. } => "API_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// HTTP status attached to the error, if the appliance answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for network and timeout failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Returns true if repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => matches!(*status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Auth {
                status: 401,
                body: String::new()
            }
            .error_code(),
            "AUTH_ERROR"
        );
        assert_eq!(
            Error::Transport("test".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::Api {
                status: 500,
                body: String::new()
            }
            .error_code(),
            "API_ERROR"
        );
        assert_eq!(
            Error::Decode("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(
            Error::Config("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Api {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");

        let err = Error::Auth {
            status: 401,
            body: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "Authentication failed (401): denied");
    }

    #[test]
    fn test_from_status_classifies_auth() {
        let err = Error::from_status(StatusCode::UNAUTHORIZED, "no".to_string());
        assert!(matches!(err, Error::Auth { status: 401, .. }));

        let err = Error::from_status(StatusCode::FORBIDDEN, "no".to_string());
        assert!(matches!(err, Error::Auth { status: 403, .. }));

        let err = Error::from_status(StatusCode::NOT_FOUND, "missing".to_string());
        assert_eq!(
            err,
            Error::Api {
                status: 404,
                body: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(
            Error::from_status(StatusCode::BAD_GATEWAY, String::new()).status(),
            Some(502)
        );
        assert_eq!(Error::Transport("down".to_string()).status(), None);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Transport("reset".to_string()).is_retryable());
        assert!(Error::Timeout("slow".to_string()).is_retryable());
        assert!(Error::from_status(StatusCode::SERVICE_UNAVAILABLE, String::new()).is_retryable());
        assert!(Error::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()).is_retryable());

        assert!(!Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()).is_retryable());
        assert!(!Error::from_status(StatusCode::UNAUTHORIZED, String::new()).is_retryable());
        assert!(!Error::Decode("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::Transport("x".to_string()).is_transport());
        assert!(Error::Timeout("x".to_string()).is_transport());
        assert!(!Error::Config("x".to_string()).is_transport());
    }

    // Note: reqwest::Error conversion is exercised by the wiremock tests in `transport`

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let opn_err: Error = err.into();
        assert!(matches!(opn_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let opn_err: Error = err.into();
        assert!(matches!(opn_err, Error::Decode(_)));
    }
}
