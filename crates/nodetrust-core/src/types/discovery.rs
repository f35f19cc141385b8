use super::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Request payload of the discovery-sample exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    /// Number of peers the requester would like to receive
    pub num_peers: u32,
}

/// One peer in a discovery response: its identity and the raw address
/// byte strings it most recently announced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPeer {
    /// Peer identity
    pub id: PeerId,

    /// Announced addresses, each kept as an opaque byte encoding
    #[serde(default)]
    pub addresses: Vec<Vec<u8>>,
}

/// Response payload of the discovery-sample exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    /// Whether the sample was produced
    pub success: bool,

    /// Sampled peers, empty on failure
    #[serde(default)]
    pub peers: Vec<DiscoveredPeer>,
}

impl DiscoveryResponse {
    /// A successful response carrying the sampled peers
    #[must_use]
    pub const fn ok(peers: Vec<DiscoveredPeer>) -> Self {
        Self {
            success: true,
            peers,
        }
    }

    /// A failure response with no detail exposed
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            success: false,
            peers: Vec::new(),
        }
    }
}
