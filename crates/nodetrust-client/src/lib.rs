//! Polling discovery client for the nodetrust rendezvous protocol.
//!
//! A [`DiscoveryClient`] periodically asks a rendezvous peer for a batch
//! of peers and emits every returned address as a discovered-peer event.
//! No deduplication is performed; consumers are expected to deduplicate.

mod client;
mod config;
mod transport;

pub use client::{DiscoveredAddress, DiscoveryClient, DiscoveryClientBuilder};
pub use config::PollConfig;
pub use transport::DiscoveryTransport;
pub use nodetrust_core::{NodetrustError, Result};
