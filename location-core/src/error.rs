use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the location services client.
///
/// `InvalidArgument` is raised locally before anything is sent over the wire.
/// `Api`, `Transport` and `Decode` come from the HTTP collaborator and are
/// passed to the caller unchanged. `Config` only happens while building a client.
#[derive(Debug, Error)]
pub enum Error {
    /// A request parameter (or combination of parameters) was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The upstream service answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client construction failed (missing credentials, bad settings).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// HTTP status for upstream failures, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}
