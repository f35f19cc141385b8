//! Seam to the opaque peer transport.
//!
//! The connection layer (dial/listen/codec) lives outside this crate.
//! Protocol handlers only need two things from an inbound connection:
//! who is on the other end, and which addresses we observe it at.

use async_trait::async_trait;
use nodetrust_core::{PeerId, Result};

/// View of an established connection as the protocol handlers see it.
///
/// Peer-info resolution is synchronous metadata; observed-address
/// resolution may require a round trip and is async.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// The authenticated identity of the remote peer.
    fn peer_id(&self) -> Result<PeerId>;

    /// The transport addresses this node observes the peer at, in their
    /// textual multiaddr form (e.g. `/ip4/1.2.3.4/tcp/4001`).
    async fn observed_addrs(&self) -> Result<Vec<String>>;
}
