//! Timer-driven discovery poller.

use crate::config::PollConfig;
use crate::transport::DiscoveryTransport;
use nodetrust_core::{DiscoveryRequest, NodetrustError, PeerId, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

/// One address learned from a discovery poll.
///
/// The address is the raw announced encoding with any trailing
/// peer-identity suffix (`/ipfs/<id>` or `/p2p/<id>`) stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAddress {
    /// The peer the address belongs to
    pub peer: PeerId,
    /// The address bytes
    pub address: Vec<u8>,
}

/// Client-side poller that periodically samples peers from a rendezvous
/// node and emits their addresses.
///
/// Every poll re-emits all currently returned addresses, even if a
/// consumer has seen them before. A response that arrives after
/// [`stop`](Self::stop) emits nothing.
#[derive(Clone)]
pub struct DiscoveryClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn DiscoveryTransport>,
    rendezvous: String,
    config: PollConfig,
    started: AtomicBool,
    events_tx: UnboundedSender<DiscoveredAddress>,
    events_rx: Mutex<Option<UnboundedReceiver<DiscoveredAddress>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscoveryClient {
    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(
        transport: Arc<dyn DiscoveryTransport>,
        rendezvous: impl Into<String>,
    ) -> DiscoveryClientBuilder {
        DiscoveryClientBuilder::new(transport, rendezvous)
    }

    /// Take the stream of discovered addresses.
    ///
    /// The stream can be taken once; later calls return `None`.
    pub fn events(&self) -> Option<UnboundedReceiverStream<DiscoveredAddress>> {
        self.inner
            .events_rx
            .lock()
            .expect("events receiver lock poisoned")
            .take()
            .map(UnboundedReceiverStream::new)
    }

    /// Start the polling loop
    pub fn start(&self) {
        self.inner.started.store(true, Ordering::Release);
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.config.interval);
            // The first tick fires immediately; skip it so polls line up
            // with the configured interval like a plain timer.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = Self::poll_inner(&inner).await {
                    debug!(error = %e, "discovery poll failed");
                }
            }
        });
        let mut task = self.inner.task.lock().expect("task lock poisoned");
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Stop polling. In-flight responses are discarded.
    pub fn stop(&self) {
        self.inner.started.store(false, Ordering::Release);
        if let Some(handle) = self
            .inner
            .task
            .lock()
            .expect("task lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Whether the client is currently polling
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::Acquire)
    }

    /// Run a single poll, returning how many addresses were emitted.
    ///
    /// Emission is suppressed while the client is stopped, even though
    /// the request itself still completes.
    pub async fn poll_once(&self) -> Result<usize> {
        Self::poll_inner(&self.inner).await
    }

    async fn poll_inner(inner: &ClientInner) -> Result<usize> {
        debug!(rendezvous = %inner.rendezvous, want = inner.config.batch_size, "discovery poll");
        let response = inner
            .transport
            .request_peers(
                &inner.rendezvous,
                DiscoveryRequest {
                    num_peers: inner.config.batch_size,
                },
            )
            .await?;

        if !response.success {
            return Err(NodetrustError::Internal(
                "rendezvous did not complete the discovery request".into(),
            ));
        }

        // A response that raced with stop() must not emit.
        if !inner.started.load(Ordering::Acquire) {
            return Ok(0);
        }

        let mut emitted = 0usize;
        for peer in response.peers {
            for address in peer.addresses {
                let event = DiscoveredAddress {
                    peer: peer.id.clone(),
                    address: strip_peer_suffix(address),
                };
                if inner.events_tx.send(event).is_err() {
                    warn!("event stream dropped, stopping emission");
                    return Ok(emitted);
                }
                emitted += 1;
            }
        }
        Ok(emitted)
    }
}

/// Builder for configuring a [`DiscoveryClient`]
pub struct DiscoveryClientBuilder {
    transport: Arc<dyn DiscoveryTransport>,
    rendezvous: String,
    config: PollConfig,
}

impl DiscoveryClientBuilder {
    /// Create a builder targeting the given rendezvous peer
    #[must_use]
    pub fn new(transport: Arc<dyn DiscoveryTransport>, rendezvous: impl Into<String>) -> Self {
        Self {
            transport,
            rendezvous: rendezvous.into(),
            config: PollConfig::default(),
        }
    }

    /// Set the polling configuration
    #[must_use]
    pub fn poll(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> DiscoveryClient {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        DiscoveryClient {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                rendezvous: self.rendezvous,
                config: self.config,
                started: AtomicBool::new(false),
                events_tx,
                events_rx: Mutex::new(Some(events_rx)),
                task: Mutex::new(None),
            }),
        }
    }
}

/// Strip a trailing `/ipfs/<id>` or `/p2p/<id>` decoration from a
/// textual address; non-UTF-8 addresses pass through untouched.
fn strip_peer_suffix(address: Vec<u8>) -> Vec<u8> {
    let Ok(text) = std::str::from_utf8(&address) else {
        return address;
    };
    for tag in ["/ipfs/", "/p2p/"] {
        if let Some(pos) = text.rfind(tag) {
            // Only strip when the id is the final segment.
            if !text[pos + tag.len()..].contains('/') {
                return text[..pos].as_bytes().to_vec();
            }
        }
    }
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use nodetrust_core::{DiscoveredPeer, DiscoveryResponse};
    use std::time::Duration;

    struct FixedTransport {
        response: DiscoveryResponse,
    }

    #[async_trait]
    impl DiscoveryTransport for FixedTransport {
        async fn request_peers(
            &self,
            _rendezvous: &str,
            _request: DiscoveryRequest,
        ) -> Result<DiscoveryResponse> {
            Ok(self.response.clone())
        }
    }

    fn transport_with(addrs: &[&str]) -> Arc<FixedTransport> {
        Arc::new(FixedTransport {
            response: DiscoveryResponse::ok(vec![DiscoveredPeer {
                id: PeerId::new("QmRemote"),
                addresses: addrs.iter().map(|a| a.as_bytes().to_vec()).collect(),
            }]),
        })
    }

    #[test]
    fn test_strip_peer_suffix() {
        assert_eq!(
            strip_peer_suffix(b"/ip4/1.2.3.4/tcp/4001/ipfs/QmX".to_vec()),
            b"/ip4/1.2.3.4/tcp/4001".to_vec()
        );
        assert_eq!(
            strip_peer_suffix(b"/ip4/1.2.3.4/tcp/4001/p2p/QmX".to_vec()),
            b"/ip4/1.2.3.4/tcp/4001".to_vec()
        );
        // Undecorated addresses pass through.
        assert_eq!(
            strip_peer_suffix(b"/ip4/1.2.3.4/tcp/4001".to_vec()),
            b"/ip4/1.2.3.4/tcp/4001".to_vec()
        );
        // A p2p segment in the middle is not a trailing decoration.
        assert_eq!(
            strip_peer_suffix(b"/p2p/QmRelay/p2p-circuit/ip4/1.2.3.4/tcp/1".to_vec()),
            b"/p2p/QmRelay/p2p-circuit/ip4/1.2.3.4/tcp/1".to_vec()
        );
        // Non-UTF-8 bytes pass through.
        assert_eq!(strip_peer_suffix(vec![0xff, 0xfe]), vec![0xff, 0xfe]);
    }

    #[tokio::test]
    async fn test_poll_emits_stripped_addresses() {
        let client = DiscoveryClient::builder(
            transport_with(&["/ip4/1.2.3.4/tcp/4001/ipfs/QmRemote"]),
            "/dns/rendezvous.example.com/tcp/443",
        )
        .build();
        let mut events = client.events().unwrap();

        client.start();
        let emitted = client.poll_once().await.unwrap();
        client.stop();

        assert_eq!(emitted, 1);
        let event = events.next().await.unwrap();
        assert_eq!(event.peer, PeerId::new("QmRemote"));
        assert_eq!(event.address, b"/ip4/1.2.3.4/tcp/4001".to_vec());
    }

    #[tokio::test]
    async fn test_response_after_stop_is_suppressed() {
        let client = DiscoveryClient::builder(
            transport_with(&["/ip4/1.2.3.4/tcp/4001"]),
            "/dns/rendezvous.example.com/tcp/443",
        )
        .build();

        // Never started: the poll completes but emits nothing.
        let emitted = client.poll_once().await.unwrap();
        assert_eq!(emitted, 0);
    }

    #[tokio::test]
    async fn test_failed_response_is_an_error() {
        let transport = Arc::new(FixedTransport {
            response: DiscoveryResponse::failed(),
        });
        let client =
            DiscoveryClient::builder(transport, "/dns/rendezvous.example.com/tcp/443").build();
        client.start();
        let err = client.poll_once().await.unwrap_err();
        assert!(matches!(err, NodetrustError::Internal(_)));
        client.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_loop_polls_every_interval() {
        let client = DiscoveryClient::builder(
            transport_with(&["/ip4/9.9.9.9/tcp/4001"]),
            "/dns/rendezvous.example.com/tcp/443",
        )
        .poll(PollConfig::new().interval(Duration::from_millis(100)))
        .build();
        let events = client.events().unwrap();

        client.start();
        tokio::time::sleep(Duration::from_millis(350)).await;
        client.stop();

        let mut seen = 0;
        let mut rx = events.into_inner();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.address, b"/ip4/9.9.9.9/tcp/4001".to_vec());
            seen += 1;
        }
        // Three full intervals elapsed; every poll re-emits the address.
        assert_eq!(seen, 3);
        assert!(!client.is_started());
    }
}
