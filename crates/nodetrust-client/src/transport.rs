//! Seam to the opaque dialing transport.

use async_trait::async_trait;
use nodetrust_core::{DiscoveryRequest, DiscoveryResponse, Result};

/// Dial a rendezvous peer and run one discovery-sample exchange.
///
/// The wire codec and connection handling live outside this crate; a
/// transport implementation owns both.
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    /// Send `request` to the rendezvous peer and return its response.
    async fn request_peers(
        &self,
        rendezvous: &str,
        request: DiscoveryRequest,
    ) -> Result<DiscoveryResponse>;
}
