//! Strongly-typed representations of the nodetrust data model and the
//! logical payloads of each protocol exchange.

mod admission;
mod discovery;
mod dns;
mod peer;

pub use admission::{AdmissionRequest, AdmissionResponse};
pub use discovery::{DiscoveredPeer, DiscoveryRequest, DiscoveryResponse};
pub use dns::{DnsNameEntry, DnsRecord, RecordType};
pub use peer::PeerId;
