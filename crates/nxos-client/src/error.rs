//! NX-API client errors

use thiserror::Error;

/// Boxed error carried by [`NxError::Transport`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when talking to a Nexus switch
#[derive(Debug, Error)]
pub enum NxError {
    /// Body is not valid JSON or lacks the `imdata` envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// URL scheme rejected, or reply shape not recognised
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Switch returned an `error` item for a configuration or query call
    #[error("NX-API error: code={code} text={text}")]
    Remote {
        /// Vendor error code
        code: String,
        /// Vendor error text
        text: String,
    },

    /// Switch returned an `error` item for aaaLogin/aaaRefresh
    #[error("Authentication failed: code={code} text={text}")]
    Auth {
        /// Vendor error code
        code: String,
        /// Vendor error text
        text: String,
    },

    /// Network, TLS or connection failure
    #[error("HTTP error: {url}: {source}")]
    Transport {
        /// URL the request was sent to
        url: String,
        /// Underlying client error
        #[source]
        source: BoxError,
    },

    /// Every candidate host failed during authentication
    #[error("no more Nexus hosts to try - last: {last}")]
    AllHostsExhausted {
        /// Error returned by the final host tried
        last: Box<NxError>,
    },

    /// Malformed interface or VLAN identifier supplied by the caller
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Missing or invalid client options
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error while encoding a request body
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NxError {
    /// Wrap a client error for the given URL
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// True for network-level failures that host failover may skip past
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
