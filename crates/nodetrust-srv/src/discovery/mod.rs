//! Discovery sampling: the announce write path and the sample read path.

use crate::cache::{Directory, TrustCache};
use nodetrust_core::{DiscoveredPeer, DiscoveryResponse, NodetrustError, PeerId, Result};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Server-side handler for announce and discovery-sample requests,
/// gated by trust cache membership.
pub struct DiscoverySampler {
    trust: Arc<TrustCache>,
    directory: Arc<Directory>,
}

impl DiscoverySampler {
    /// Create a sampler over the shared trust cache and directory.
    #[must_use]
    pub fn new(trust: Arc<TrustCache>, directory: Arc<Directory>) -> Self {
        Self { trust, directory }
    }

    /// Record the addresses a trusted peer announces for itself.
    ///
    /// Overwrites any previous entry. Addresses are stored as raw byte
    /// encodings; the directory is address-format-agnostic.
    pub fn announce(&self, peer: &PeerId, addresses: Vec<Vec<u8>>) -> Result<()> {
        if !self.trust.contains(peer) {
            return Err(NodetrustError::NotTrusted {
                peer: peer.to_string(),
            });
        }
        debug!(peer = %peer, addrs = addresses.len(), "announce");
        self.directory.insert(peer.clone(), addresses);
        Ok(())
    }

    /// Sample up to `num_peers` directory entries for `requester`.
    ///
    /// A contiguous window of the ordered key space is chosen at a
    /// uniformly random start offset. The window is clamped to the
    /// directory size, so a small or empty directory yields fewer peers
    /// than requested rather than an out-of-range window. The requester
    /// is excluded from the result whether or not it fell inside the
    /// window.
    pub fn sample(&self, requester: &PeerId, num_peers: usize) -> DiscoveryResponse {
        let keys = self.directory.keys();
        let len = keys.len();
        let effective = num_peers.min(len);
        if effective == 0 {
            return DiscoveryResponse::ok(Vec::new());
        }

        let start = rand::thread_rng().gen_range(0..=len - effective);
        debug!(
            requester = %requester,
            want = num_peers,
            from = start,
            to = start + effective,
            size = len,
            "discovery sample"
        );

        let peers = keys[start..start + effective]
            .iter()
            .filter(|id| *id != requester)
            .filter_map(|id| {
                // An entry may vanish between the key snapshot and the
                // value read; skip it rather than fail the sample.
                self.directory.get(id).map(|addresses| DiscoveredPeer {
                    id: id.clone(),
                    addresses,
                })
            })
            .collect();

        DiscoveryResponse::ok(peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FOREVER: Duration = Duration::from_secs(86_400);

    fn sampler_with_peers(peers: &[&str]) -> (DiscoverySampler, Arc<TrustCache>) {
        let trust = Arc::new(TrustCache::new(1000, FOREVER));
        let directory = Arc::new(Directory::new("directory"));
        let sampler = DiscoverySampler::new(Arc::clone(&trust), directory);
        for peer in peers {
            let id = PeerId::new(*peer);
            trust.set(&id);
            sampler
                .announce(&id, vec![b"/ip4/10.0.0.1/tcp/4001".to_vec()])
                .unwrap();
        }
        (sampler, trust)
    }

    #[test]
    fn test_announce_rejects_untrusted() {
        let (sampler, _trust) = sampler_with_peers(&[]);
        let err = sampler
            .announce(&PeerId::new("QmStranger"), vec![])
            .unwrap_err();
        assert!(err.is_not_trusted());
    }

    #[test]
    fn test_announce_overwrites() {
        let (sampler, trust) = sampler_with_peers(&[]);
        let peer = PeerId::new("QmA");
        trust.set(&peer);
        sampler.announce(&peer, vec![b"/ip4/1.1.1.1/tcp/1".to_vec()]).unwrap();
        sampler.announce(&peer, vec![b"/ip4/2.2.2.2/tcp/2".to_vec()]).unwrap();

        let response = sampler.sample(&PeerId::new("QmOther"), 5);
        assert_eq!(response.peers.len(), 1);
        assert_eq!(response.peers[0].addresses, vec![b"/ip4/2.2.2.2/tcp/2".to_vec()]);
    }

    #[test]
    fn test_sample_empty_directory_succeeds() {
        let (sampler, _trust) = sampler_with_peers(&[]);
        let response = sampler.sample(&PeerId::new("QmX"), 10);
        assert!(response.success);
        assert!(response.peers.is_empty());
    }

    #[test]
    fn test_sample_excludes_requester_and_clamps() {
        let (sampler, _trust) = sampler_with_peers(&["QmX", "QmY", "QmZ"]);
        let requester = PeerId::new("QmY");
        // Asking for more than the directory holds degenerates to the
        // whole key space minus the requester.
        let response = sampler.sample(&requester, 3);
        assert!(response.success);
        let ids: Vec<_> = response.peers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["QmX", "QmZ"]);
    }

    #[test]
    fn test_sample_never_exceeds_request() {
        let (sampler, _trust) = sampler_with_peers(&["Qm1", "Qm2", "Qm3", "Qm4", "Qm5"]);
        let requester = PeerId::new("QmOutsider");
        for _ in 0..50 {
            let response = sampler.sample(&requester, 2);
            assert!(response.success);
            assert!(response.peers.len() <= 2);
            assert!(response.peers.iter().all(|p| p.id != requester));
        }
    }

    #[test]
    fn test_sample_oversized_request_on_small_directory() {
        let (sampler, _trust) = sampler_with_peers(&["QmOnly"]);
        let response = sampler.sample(&PeerId::new("QmOther"), 100);
        assert!(response.success);
        assert_eq!(response.peers.len(), 1);
    }

    #[test]
    fn test_eviction_cascade_removes_from_samples() {
        let trust = Arc::new(TrustCache::new(1000, FOREVER));
        let directory = Arc::new(Directory::new("directory"));
        let dir_for_listener = Arc::clone(&directory);
        trust.register_listener(Box::new(move |id| dir_for_listener.evict(id)));
        let sampler = DiscoverySampler::new(Arc::clone(&trust), directory);

        let a = PeerId::new("QmA");
        let b = PeerId::new("QmB");
        trust.set(&a);
        trust.set(&b);
        sampler.announce(&a, vec![b"addr-a".to_vec()]).unwrap();
        sampler.announce(&b, vec![b"addr-b".to_vec()]).unwrap();

        trust.remove(&a);
        let response = sampler.sample(&PeerId::new("QmOther"), 10);
        let ids: Vec<_> = response.peers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["QmB"]);
    }
}
