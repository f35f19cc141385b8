use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type for peer address records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
}

impl RecordType {
    /// Map a multiaddr-style protocol tag (`ip4`/`ip6`) to a record type
    #[must_use]
    pub fn for_protocol(proto: &str) -> Option<Self> {
        match proto {
            "ip4" => Some(Self::A),
            "ip6" => Some(Self::AAAA),
            _ => None,
        }
    }

    /// The record type as its DNS presentation name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record handed to the provider during reconciliation.
///
/// Records are never stored locally; they exist transiently between
/// reading a connection's observed addresses and the provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Fully qualified domain name the record belongs to
    pub name: String,

    /// Record type (A or AAAA)
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Record value (the address literal)
    pub value: String,
}

impl DnsRecord {
    /// Create a record
    #[must_use]
    pub fn new(name: impl Into<String>, record_type: RecordType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
        }
    }
}

/// A name entry returned by the provider's name listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsNameEntry {
    /// Fully qualified domain name held at the provider
    pub name: String,
}
