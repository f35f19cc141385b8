//! Core types and errors for the nodetrust peer trust and discovery system.
//!
//! This crate provides the foundational types used across the nodetrust
//! workspace:
//!
//! - **Types**: Peer identities, DNS records, and the logical payloads of
//!   the announce, discovery and admission exchanges
//! - **Errors**: Comprehensive error handling with [`NodetrustError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use nodetrust_core::{PeerId, Result};
//!
//! fn domain_for(peer: &PeerId, zone: &str) -> String {
//!     format!("{}.{zone}", peer.dns_label())
//! }
//! ```

mod error;
pub mod types;

pub use error::{NodetrustError, Result};
pub use types::*;
