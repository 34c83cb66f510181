//! Error types for the zonesync core
//!
//! One taxonomy covers the whole request path. The routing layer maps
//! each variant class to a transport status; the core never does.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync system
#[derive(Error, Debug)]
pub enum Error {
    /// The presented token matched no configured client
    #[error("unauthorized: token matched no client")]
    Unauthorized,

    /// The request body was syntactically invalid
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request was well-formed but semantically invalid
    #[error("unprocessable input: {0}")]
    Unprocessable(String),

    /// A composed address failed syntax validation
    ///
    /// Surfaces to callers as the unprocessable-input class: a single
    /// bad address anywhere in the book rejects the whole update.
    #[error("invalid address: {candidate:?}")]
    InvalidAddress {
        /// The string that failed to parse as an IPv4/IPv6 address
        candidate: String,
    },

    /// The server lacks configuration required to serve the request
    #[error("server misconfigured: {0}")]
    Misconfigured(String),

    /// The external name-server reload invocation failed
    #[error("zone reload failed: {0}")]
    ReloadFailed(String),

    /// Address book persistence errors
    #[error("address book error: {0}")]
    Store(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a bad-request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create an unprocessable-input error
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::Unprocessable(msg.into())
    }

    /// Create an invalid-address error
    pub fn invalid_address(candidate: impl Into<String>) -> Self {
        Self::InvalidAddress {
            candidate: candidate.into(),
        }
    }

    /// Create a misconfiguration error
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::Misconfigured(msg.into())
    }

    /// Create a reload-failure error
    pub fn reload_failed(msg: impl Into<String>) -> Self {
        Self::ReloadFailed(msg.into())
    }

    /// Create an address book store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// True for the unprocessable-input class (including bad addresses)
    pub fn is_unprocessable(&self) -> bool {
        matches!(self, Self::Unprocessable(_) | Self::InvalidAddress { .. })
    }
}
