//! nodetrust-srv: trust-gated peer caching and reconciliation engine.
//!
//! Grants short-lived network identity to peers in a p2p overlay. A peer
//! that proves control of its private key receives a trust record, a
//! stable DNS name pointing at its observed address, and becomes
//! discoverable to other peers through a sampling protocol.
//!
//! # Architecture
//!
//! Three interdependent caches sit at the center:
//!
//! - [`cache::TrustCache`] - bounded, TTL-based registry of admitted
//!   peers; source of truth for "is this peer currently trusted"
//! - a discovery directory - the peer's most recently announced addresses
//! - a DNS owner set - which peers currently hold records at the provider
//!
//! Evicting a trust entry cascades synchronously into both dependent
//! caches, and the owner-set eviction in turn triggers best-effort record
//! cleanup at the DNS provider. The protocol surfaces reading and
//! mutating these views live in [`discovery`], [`dns`] and [`admission`],
//! wired together by [`server::Node`].

pub mod admission;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod dns;
pub mod server;
pub mod transport;

// Re-exports for convenience.
pub use config::ServerConfig;
pub use nodetrust_core::{NodetrustError, Result};
pub use server::Node;
