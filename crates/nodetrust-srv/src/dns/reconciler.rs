//! Event-driven reconciliation between the trusted peer set and the
//! DNS provider's records.

use crate::cache::{OwnerSet, TrustCache};
use crate::dns::naming;
use crate::dns::provider::DnsProvider;
use crate::transport::PeerConnection;
use nodetrust_core::{DnsRecord, NodetrustError, PeerId, RecordType, Result};
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Reconciles DNS records with the trusted peer population.
///
/// Three event sources drive it:
///
/// - **startup sync**: seeds the owner set from names already held at
///   the provider; update requests wait until this completes
/// - **announce/update**: full record replace for one peer (clear, then
///   add), gated on trust membership
/// - **owner-set eviction**: best-effort `clear_domain`, failures logged
///   and swallowed since no caller waits on cascaded cleanup
pub struct DnsReconciler {
    zone: String,
    pattern: Regex,
    trust: Arc<TrustCache>,
    owners: Arc<OwnerSet>,
    provider: Arc<dyn DnsProvider>,
    ready: AtomicBool,
    sync_retry: Duration,
    cleanup_rx: Mutex<Option<UnboundedReceiver<(PeerId, String)>>>,
}

impl DnsReconciler {
    /// Create a reconciler and register it for owner-set evictions.
    ///
    /// `sync_retry` is how long a held update request waits between
    /// readiness re-checks while the startup sweep is pending.
    pub fn new(
        zone: impl Into<String>,
        trust: Arc<TrustCache>,
        owners: Arc<OwnerSet>,
        provider: Arc<dyn DnsProvider>,
        sync_retry: Duration,
    ) -> Result<Self> {
        let zone = zone.into();
        let pattern = naming::zone_pattern(&zone)?;
        let (tx, rx) = mpsc::unbounded_channel();
        Self::attach_cleanup_listener(&owners, tx);
        Ok(Self {
            zone,
            pattern,
            trust,
            owners,
            provider,
            ready: AtomicBool::new(false),
            sync_retry,
            cleanup_rx: Mutex::new(Some(rx)),
        })
    }

    fn attach_cleanup_listener(owners: &OwnerSet, tx: UnboundedSender<(PeerId, String)>) {
        owners.register_listener(Box::new(move |id, domain| {
            if tx.send((id.clone(), domain.clone())).is_err() {
                warn!(peer = %id, domain = %domain, "dns cleanup queue closed, record left behind");
            }
        }));
    }

    /// Whether the startup sweep has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Startup sweep: list the provider's names, keep those matching
    /// `<label>.<zone>`, and seed an owner entry for each label so that
    /// records predating this process are tracked for cleanup.
    pub async fn sync(&self) -> Result<()> {
        let names = self.provider.get_names().await?;
        let mut seeded = 0usize;
        for entry in names {
            if self.pattern.is_match(&entry.name) {
                let label = naming::label_of(&entry.name);
                self.owners.insert(PeerId::new(label), entry.name.clone());
                seeded += 1;
            }
        }
        self.ready.store(true, Ordering::Release);
        info!(zone = %self.zone, seeded, "dns is ready");
        Ok(())
    }

    /// Replace the DNS records for the peer behind `conn`.
    ///
    /// Waits for the startup sweep, re-checking every `sync_retry`.
    /// Then: trust gate, canonical name, observed addresses filtered to
    /// ip4/ip6, `clear_domain` followed by `add_names`. Either provider
    /// call failing aborts the pipeline and surfaces to the caller;
    /// `add_names` is never attempted after a failed clear.
    pub async fn update(&self, conn: &dyn PeerConnection) -> Result<String> {
        while !self.is_ready() {
            tokio::time::sleep(self.sync_retry).await;
        }

        let id = conn.peer_id()?;
        if !self.trust.contains(&id) {
            return Err(NodetrustError::NotTrusted {
                peer: id.to_string(),
            });
        }

        let name = naming::canonical_domain(&id, &self.zone);
        debug!(peer = %id, domain = %name, "update dns");

        let addrs = conn.observed_addrs().await?;
        let records: Vec<DnsRecord> = addrs
            .iter()
            .filter_map(|addr| record_for_addr(&name, addr))
            .collect();

        self.provider.clear_domain(&name).await?;
        self.provider.add_names(&records).await?;
        self.owners.insert(id, name.clone());
        Ok(name)
    }

    /// Consume cleanup events until the node shuts down.
    ///
    /// Spawned once by the server; provider failures here are logged and
    /// dropped, never retried or surfaced.
    pub async fn run_cleanup(&self) {
        let Some(mut rx) = self.take_receiver() else {
            return;
        };
        while let Some((id, domain)) = rx.recv().await {
            self.clear_evicted(&id, &domain).await;
        }
    }

    /// Process every cleanup event queued so far, then return.
    pub async fn drain_cleanups(&self) {
        let Some(mut rx) = self.take_receiver() else {
            return;
        };
        while let Ok((id, domain)) = rx.try_recv() {
            self.clear_evicted(&id, &domain).await;
        }
        *self.cleanup_rx.lock().expect("cleanup receiver lock poisoned") = Some(rx);
    }

    fn take_receiver(&self) -> Option<UnboundedReceiver<(PeerId, String)>> {
        self.cleanup_rx
            .lock()
            .expect("cleanup receiver lock poisoned")
            .take()
    }

    async fn clear_evicted(&self, id: &PeerId, domain: &str) {
        info!(peer = %id, domain = %domain, "clearing dns for evicted peer");
        if let Err(e) = self.provider.clear_domain(domain).await {
            warn!(peer = %id, domain = %domain, error = %e, "dns cleanup failed");
        }
    }
}

/// Map one observed textual multiaddr to a DNS record, or skip it.
///
/// Only `/ip4/<v4>/...` and `/ip6/<v6>/...` addresses produce records.
fn record_for_addr(name: &str, addr: &str) -> Option<DnsRecord> {
    let mut parts = addr.split('/');
    parts.next()?; // leading empty segment before the first slash
    let proto = parts.next()?;
    let value = parts.next()?;
    let record_type = RecordType::for_protocol(proto)?;
    Some(DnsRecord::new(name, record_type, value))
}
