use thiserror::Error;

/// Result type alias for nodetrust operations
pub type Result<T> = std::result::Result<T, NodetrustError>;

/// Errors that can occur across the nodetrust trust, discovery and DNS
/// reconciliation pipelines
#[derive(Error, Debug)]
pub enum NodetrustError {
    /// Peer is not present in the trust cache - announce, discovery and
    /// dns-update requests are rejected with this error
    #[error("{peer} has not been admitted, rejecting request")]
    NotTrusted {
        /// The peer identity that failed the trust gate
        peer: String,
    },

    /// Peer-info or observed-address resolution on a connection failed
    #[error("transport error: {0}")]
    Transport(String),

    /// DNS provider call failed
    #[error("dns provider error: {0}")]
    Provider(String),

    /// Trust authority admission check failed to complete
    #[error("admission check failed: {0}")]
    Admission(String),

    /// Configuration is invalid or missing required fields
    #[error("configuration error: {0}")]
    Config(String),

    /// A network address could not be interpreted
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Unexpected failure during sampling or lookup
    #[error("internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodetrustError {
    /// Returns true if the error is a trust-gate rejection
    #[must_use]
    pub const fn is_not_trusted(&self) -> bool {
        matches!(self, Self::NotTrusted { .. })
    }

    /// Returns true if the error originated at the DNS provider
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Returns true if the error originated in the peer transport
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_trusted_display() {
        let err = NodetrustError::NotTrusted {
            peer: "QmPeer".into(),
        };
        assert_eq!(err.to_string(), "QmPeer has not been admitted, rejecting request");
        assert!(err.is_not_trusted());
        assert!(!err.is_provider());
    }

    #[test]
    fn test_classification() {
        assert!(NodetrustError::Provider("timeout".into()).is_provider());
        assert!(NodetrustError::Transport("reset".into()).is_transport());
        assert!(!NodetrustError::Internal("oops".into()).is_not_trusted());
    }
}
