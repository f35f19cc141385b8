//! Short-lived network identity for p2p overlays.
//!
//! A peer proves control of its private key, receives a trust record, is
//! given a stable DNS name pointing at its observed address, and becomes
//! discoverable through a sampling protocol.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nodetrust::{Node, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> nodetrust::Result<()> {
//!     let config = ServerConfig::load("nodetrust.toml".as_ref())?;
//!     let provider = Arc::new(nodetrust::srv::dns::HttpDnsProvider::new(
//!         &config.dns.provider_url,
//!     )?);
//!
//!     let node = Arc::new(Node::new(config, my_authority(), provider)?);
//!     node.start().await?;
//!
//!     // Hand `node` to the transport layer's protocol handlers.
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use nodetrust_core::*;

// Re-export the server node and its configuration
pub use nodetrust_srv::{Node, ServerConfig};

// Re-export the discovery client
pub use nodetrust_client::{DiscoveryClient, DiscoveryClientBuilder, PollConfig};

// Full module access for advanced wiring
pub use nodetrust_client as client;
pub use nodetrust_srv as srv;

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
