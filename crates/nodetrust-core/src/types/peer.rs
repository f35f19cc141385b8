use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Prefix marking a DNS label as a nodetrust peer label.
const LABEL_PREFIX: &str = "ci";

/// An opaque peer identity.
///
/// The identity is a fixed-length identifier string produced by the peer
/// transport (e.g. a base58 multihash). Nothing in this crate interprets
/// its content beyond deriving the peer's DNS label from its bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap an identity string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The peer's DNS label: `ci` followed by the lowercase hex encoding
    /// of the identity bytes, truncated to fit a single DNS label.
    ///
    /// The result always matches `^ci[a-z0-9]+$`, the pattern the DNS
    /// reconciler uses to recognize peer-owned names inside its zone.
    #[must_use]
    pub fn dns_label(&self) -> String {
        let encoded = hex::encode(self.0.as_bytes());
        let budget = MAX_LABEL_LEN - LABEL_PREFIX.len();
        let prefix = if encoded.len() > budget {
            &encoded[..budget]
        } else {
            &encoded
        };
        format!("{LABEL_PREFIX}{prefix}")
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
