//! Error types for attache.
//!
//! Every failure the chat client can observe is one variant of [`Error`]. Only
//! [`Error::Config`] is fatal; everything else is reported to the user and the
//! session carries on.

use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// The main error type for attache.
#[derive(Clone, Debug)]
pub enum Error {
    /// Startup configuration is missing or invalid.
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// A line of user input could not be read.
    Input {
        /// Human-readable error message.
        message: String,
    },

    /// A file named by `/attach` could not be read.
    AttachmentRead {
        /// The path exactly as the user supplied it.
        path: PathBuf,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A generic API error occurred.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error type string from the API.
        error_type: Option<String>,
        /// Human-readable error message.
        message: String,
    },

    /// Authentication error.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization/Permission error.
    Permission {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found (usually an unknown model).
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Rate limit or quota exceeded.
    RateLimit {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// Bad request due to invalid parameters.
    BadRequest {
        /// Human-readable error message.
        message: String,
        /// Parameter that caused the error.
        param: Option<String>,
    },

    /// Request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Server returned a 500 internal error.
    InternalServer {
        /// Human-readable error message.
        message: String,
    },

    /// Server is overloaded or unavailable.
    ServiceUnavailable {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The service answered but produced no reply text.
    EmptyResponse {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new input error.
    pub fn input(message: impl Into<String>) -> Self {
        Error::Input {
            message: message.into(),
        }
    }

    /// Creates a new attachment read error.
    pub fn attachment_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::AttachmentRead {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, error_type: Option<String>, message: String) -> Self {
        Error::Api {
            status_code,
            error_type,
            message,
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new permission error.
    pub fn permission(message: impl Into<String>) -> Self {
        Error::Permission {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new bad request error.
    pub fn bad_request(message: impl Into<String>, param: Option<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
            param,
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new internal server error.
    pub fn internal_server(message: impl Into<String>) -> Self {
        Error::InternalServer {
            message: message.into(),
        }
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::ServiceUnavailable {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new empty response error.
    pub fn empty_response(message: impl Into<String>) -> Self {
        Error::EmptyResponse {
            message: message.into(),
        }
    }

    /// Returns true if this error must stop the program before the loop starts.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    /// Returns true if this error came from reading an attachment.
    pub fn is_attachment_read(&self) -> bool {
        matches!(self, Error::AttachmentRead { .. })
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if this error is related to rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Error::InternalServer { .. } | Error::ServiceUnavailable { .. }
        )
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            Error::BadRequest { .. } => Some(400),
            Error::Authentication { .. } => Some(401),
            Error::Permission { .. } => Some(403),
            Error::NotFound { .. } => Some(404),
            Error::RateLimit { .. } => Some(429),
            Error::InternalServer { .. } => Some(500),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config { message } => {
                write!(f, "Configuration error: {message}")
            }
            Error::Input { message } => {
                write!(f, "Input error: {message}")
            }
            Error::AttachmentRead { path, source } => {
                write!(f, "failed to read file {}: {source}", path.display())
            }
            Error::Api {
                message,
                error_type,
                ..
            } => {
                if let Some(error_type) = error_type {
                    write!(f, "{error_type}: {message}")
                } else {
                    write!(f, "API error: {message}")
                }
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::Permission { message } => {
                write!(f, "Permission error: {message}")
            }
            Error::NotFound { message } => {
                write!(f, "Resource not found: {message}")
            }
            Error::RateLimit {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Rate limit exceeded: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Rate limit exceeded: {message}")
                }
            }
            Error::BadRequest { message, param } => {
                if let Some(param) = param {
                    write!(f, "Bad request: {message} (parameter: {param})")
                } else {
                    write!(f, "Bad request: {message}")
                }
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::InternalServer { message } => {
                write!(f, "Internal server error: {message}")
            }
            Error::ServiceUnavailable {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Service unavailable: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Service unavailable: {message}")
                }
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::EmptyResponse { message } => {
                write!(f, "Empty response: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::AttachmentRead { source, .. } => Some(source.as_ref()),
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::config(format!("invalid base URL: {err}"))
    }
}

/// A specialized Result type for attache operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn only_config_is_fatal() {
        assert!(Error::config("missing key").is_fatal());
        assert!(!Error::input("closed").is_fatal());
        assert!(!Error::timeout("slow", Some(1.0)).is_fatal());
        assert!(
            !Error::attachment_read("x", io::Error::from(io::ErrorKind::NotFound)).is_fatal()
        );
    }

    #[test]
    fn attachment_read_display_names_path() {
        let err = Error::attachment_read(
            "missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert!(err.is_attachment_read());
        assert_eq!(
            err.to_string(),
            "failed to read file missing.txt: No such file or directory"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn status_codes() {
        assert_eq!(Error::bad_request("x", None).status_code(), Some(400));
        assert_eq!(Error::authentication("x").status_code(), Some(401));
        assert_eq!(Error::rate_limit("x", None).status_code(), Some(429));
        assert_eq!(
            Error::api(418, None, "teapot".to_string()).status_code(),
            Some(418)
        );
        assert_eq!(Error::empty_response("x").status_code(), None);
    }

    #[test]
    fn rate_limit_display() {
        let err = Error::rate_limit("quota", Some(30));
        assert!(err.is_rate_limit());
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded: quota (retry after 30 seconds)"
        );
    }
}
