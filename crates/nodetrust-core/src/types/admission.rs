use serde::{Deserialize, Serialize};

/// Request payload of the admission (`nodetrust`) and admission-update
/// exchanges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    /// Key material proving control of the peer's private key.
    ///
    /// Opaque to this system; the trust authority interprets it.
    pub private_key: Vec<u8>,
}

/// Response payload of the admission exchanges.
///
/// Any underlying failure collapses into `success: false` at this
/// boundary; granular error kinds are not exposed to the remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResponse {
    /// Whether the admission pipeline completed
    pub success: bool,

    /// The canonical DNS name granted to the peer (initial admission only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
}

impl AdmissionResponse {
    /// A successful admission carrying the granted DNS name
    #[must_use]
    pub const fn ok(dns_name: Option<String>) -> Self {
        Self {
            success: true,
            dns_name,
        }
    }

    /// A failure response with no detail exposed
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            success: false,
            dns_name: None,
        }
    }
}
