//! Node wiring: one explicitly constructed object graph per server.
//!
//! All caches and protocol components are built here and passed by
//! reference into each other; there are no process-wide singletons.

use crate::admission::{AdmissionPipeline, TrustAuthority};
use crate::cache::{Directory, OwnerSet, TrustCache};
use crate::config::ServerConfig;
use crate::discovery::DiscoverySampler;
use crate::dns::{DnsProvider, DnsReconciler};
use crate::transport::PeerConnection;
use nodetrust_core::{
    AdmissionRequest, AdmissionResponse, DiscoveryRequest, DiscoveryResponse, Result,
};
use std::sync::Arc;
use tracing::{info, warn};

/// A nodetrust server node.
///
/// Owns the trust cache, its two dependent views and the protocol
/// handlers that read and mutate them. The eviction cascade is wired at
/// construction time: trust eviction drops the directory and owner-set
/// entries for the same key in the same step, and owner-set eviction
/// queues best-effort DNS cleanup.
pub struct Node {
    config: ServerConfig,
    trust: Arc<TrustCache>,
    directory: Arc<Directory>,
    owners: Arc<OwnerSet>,
    sampler: Arc<DiscoverySampler>,
    reconciler: Arc<DnsReconciler>,
    pipeline: AdmissionPipeline,
}

impl Node {
    /// Build a node from its configuration and external collaborators.
    pub fn new(
        config: ServerConfig,
        authority: Arc<dyn TrustAuthority>,
        provider: Arc<dyn DnsProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let trust = Arc::new(TrustCache::new(
            config.cache.max_entries,
            config.cache.entry_ttl(),
        ));
        let directory = Arc::new(Directory::new("discovery"));
        let owners = Arc::new(OwnerSet::new("dns-owners"));

        // Cascade: a trust eviction removes both dependent entries
        // before the evicting call returns.
        let directory_dep = Arc::clone(&directory);
        trust.register_listener(Box::new(move |id| directory_dep.evict(id)));
        let owners_dep = Arc::clone(&owners);
        trust.register_listener(Box::new(move |id| owners_dep.evict(id)));

        let sampler = Arc::new(DiscoverySampler::new(
            Arc::clone(&trust),
            Arc::clone(&directory),
        ));
        let reconciler = Arc::new(DnsReconciler::new(
            config.zone.clone(),
            Arc::clone(&trust),
            Arc::clone(&owners),
            provider,
            config.dns.sync_retry(),
        )?);
        let pipeline = AdmissionPipeline::new(
            authority,
            Arc::clone(&trust),
            Arc::clone(&reconciler),
            Arc::clone(&sampler),
        );

        Ok(Self {
            config,
            trust,
            directory,
            owners,
            sampler,
            reconciler,
            pipeline,
        })
    }

    /// Run the startup DNS sweep and spawn the cleanup consumer.
    ///
    /// Until the sweep completes, dns-update requests are held on the
    /// reconciler's readiness gate rather than rejected.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let node = Arc::clone(self);
        tokio::spawn(async move { node.reconciler.run_cleanup().await });

        self.reconciler.sync().await?;
        info!(zone = %self.config.zone, "nodetrust server ready");
        Ok(())
    }

    /// Handle the `nodetrust` admission RPC.
    pub async fn handle_admission(
        &self,
        conn: &dyn PeerConnection,
        request: &AdmissionRequest,
    ) -> AdmissionResponse {
        self.pipeline.admit(conn, request).await
    }

    /// Handle the admission-update RPC.
    pub async fn handle_admission_update(
        &self,
        conn: &dyn PeerConnection,
        request: &AdmissionRequest,
    ) -> AdmissionResponse {
        self.pipeline.refresh(conn, request).await
    }

    /// Handle an announce request: store the caller's observed
    /// addresses in the discovery directory.
    pub async fn handle_announce(&self, conn: &dyn PeerConnection) -> Result<()> {
        let id = conn.peer_id()?;
        let addrs = conn.observed_addrs().await?;
        let raw = addrs.into_iter().map(String::into_bytes).collect();
        self.sampler.announce(&id, raw)
    }

    /// Handle a dns-update request: replace the caller's DNS records
    /// with its currently observed addresses, returning the canonical
    /// domain name. Held on the readiness gate until the startup sweep
    /// completes.
    pub async fn handle_dns_update(&self, conn: &dyn PeerConnection) -> Result<String> {
        self.reconciler.update(conn).await
    }

    /// Handle a discovery-sample request.
    ///
    /// Peer-info lookup failure maps to a bare `success: false`; no
    /// detail crosses the protocol boundary.
    pub async fn handle_discovery(
        &self,
        conn: &dyn PeerConnection,
        request: DiscoveryRequest,
    ) -> DiscoveryResponse {
        let requester = match conn.peer_id() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "discovery request without peer info");
                return DiscoveryResponse::failed();
            }
        };
        self.sampler.sample(&requester, request.num_peers as usize)
    }

    /// The shared trust cache.
    #[must_use]
    pub fn trust(&self) -> &Arc<TrustCache> {
        &self.trust
    }

    /// The discovery directory view.
    #[must_use]
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// The DNS owner-set view.
    #[must_use]
    pub fn owners(&self) -> &Arc<OwnerSet> {
        &self.owners
    }

    /// The DNS reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &Arc<DnsReconciler> {
        &self.reconciler
    }
}
