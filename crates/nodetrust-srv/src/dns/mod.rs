//! DNS reconciliation: keeping the provider's record set in line with
//! the trusted peer population.
//!
//! On announce/update the reconciler computes the peer's canonical name,
//! maps its observed addresses to A/AAAA records and replaces the
//! domain's records at the provider. On trust eviction it clears the
//! domain, best-effort. A startup sweep seeds ownership tracking for
//! records that predate this process.

pub mod naming;
pub mod provider;
pub mod reconciler;

pub use provider::{DnsProvider, HttpDnsProvider};
pub use reconciler::DnsReconciler;
