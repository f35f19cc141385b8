//! The admission pipeline: proving key control, then granting trust,
//! a DNS name and discoverability in one sequential exchange.

use crate::cache::TrustCache;
use crate::discovery::DiscoverySampler;
use crate::dns::DnsReconciler;
use crate::transport::PeerConnection;
use async_trait::async_trait;
use nodetrust_core::{AdmissionRequest, AdmissionResponse, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// External authority deciding whether a peer's key material earns
/// admission. Issuance internals are out of scope; this system only
/// consumes the yes/no answer.
#[async_trait]
pub trait TrustAuthority: Send + Sync {
    /// Whether the peer behind `conn` proved control of its key.
    async fn check(&self, conn: &dyn PeerConnection, request: &AdmissionRequest) -> Result<bool>;
}

/// Sequential admission pipeline.
///
/// Each stage short-circuits the remainder on failure, and any
/// underlying error collapses into `success: false` at the RPC
/// boundary; remote peers never see granular error kinds.
pub struct AdmissionPipeline {
    authority: Arc<dyn TrustAuthority>,
    trust: Arc<TrustCache>,
    reconciler: Arc<DnsReconciler>,
    sampler: Arc<DiscoverySampler>,
}

impl AdmissionPipeline {
    /// Assemble the pipeline from its shared components.
    #[must_use]
    pub fn new(
        authority: Arc<dyn TrustAuthority>,
        trust: Arc<TrustCache>,
        reconciler: Arc<DnsReconciler>,
        sampler: Arc<DiscoverySampler>,
    ) -> Self {
        Self {
            authority,
            trust,
            reconciler,
            sampler,
        }
    }

    /// Handle the `nodetrust` admission RPC.
    ///
    /// Authority check, trust grant, DNS update, announce - in that
    /// order. The response carries the canonical DNS name on success.
    pub async fn admit(
        &self,
        conn: &dyn PeerConnection,
        request: &AdmissionRequest,
    ) -> AdmissionResponse {
        match self.try_admit(conn, request).await {
            Ok(dns_name) => AdmissionResponse::ok(Some(dns_name)),
            Err(e) => {
                warn!(error = %e, "admission failed");
                AdmissionResponse::failed()
            }
        }
    }

    /// Handle the admission-update RPC: refresh trust for an already
    /// admitted peer and re-run the DNS and announce stages.
    pub async fn refresh(
        &self,
        conn: &dyn PeerConnection,
        _request: &AdmissionRequest,
    ) -> AdmissionResponse {
        match self.try_refresh(conn).await {
            Ok(()) => AdmissionResponse::ok(None),
            Err(e) => {
                warn!(error = %e, "admission update failed");
                AdmissionResponse::failed()
            }
        }
    }

    async fn try_admit(
        &self,
        conn: &dyn PeerConnection,
        request: &AdmissionRequest,
    ) -> Result<String> {
        let id = conn.peer_id()?;
        if !self.authority.check(conn, request).await? {
            return Err(nodetrust_core::NodetrustError::Admission(format!(
                "{id} was refused by the trust authority"
            )));
        }
        self.trust.set(&id);
        debug!(peer = %id, "peer admitted");

        let dns_name = self.reconciler.update(conn).await?;
        self.announce(conn).await?;
        Ok(dns_name)
    }

    async fn try_refresh(&self, conn: &dyn PeerConnection) -> Result<()> {
        let id = conn.peer_id()?;
        if !self.trust.refresh(&id) {
            return Err(nodetrust_core::NodetrustError::NotTrusted {
                peer: id.to_string(),
            });
        }
        self.reconciler.update(conn).await?;
        self.announce(conn).await?;
        Ok(())
    }

    async fn announce(&self, conn: &dyn PeerConnection) -> Result<()> {
        let id = conn.peer_id()?;
        let addrs = conn.observed_addrs().await?;
        let raw = addrs.into_iter().map(String::into_bytes).collect();
        self.sampler.announce(&id, raw)
    }
}
