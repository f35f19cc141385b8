//! Canonical domain names and zone membership.

use nodetrust_core::{NodetrustError, PeerId, Result};
use regex::Regex;

/// The canonical domain for a peer: its DNS label under the zone.
///
/// Deterministic: each identity maps to exactly one name.
#[must_use]
pub fn canonical_domain(peer: &PeerId, zone: &str) -> String {
    format!("{}.{zone}", peer.dns_label())
}

/// Pattern matching names this node considers peer-owned inside `zone`.
///
/// Anchored on both ends and case-insensitive, so `ci<encoded>.other.org`
/// or `deep.ci<encoded>.<zone>` never match.
pub fn zone_pattern(zone: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)^ci[a-z0-9]+\.{}$", regex::escape(zone)))
        .map_err(|e| NodetrustError::Config(format!("zone pattern: {e}")))
}

/// The leading label of a fully qualified name.
#[must_use]
pub fn label_of(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_domain_is_deterministic() {
        let peer = PeerId::new("QmPeer");
        let a = canonical_domain(&peer, "example.com");
        let b = canonical_domain(&peer, "example.com");
        assert_eq!(a, b);
        assert!(a.ends_with(".example.com"));
        assert!(a.starts_with("ci"));
    }

    #[test]
    fn test_canonical_domain_matches_zone_pattern() {
        let pattern = zone_pattern("example.com").unwrap();
        let domain = canonical_domain(&PeerId::new("QmPeer"), "example.com");
        assert!(pattern.is_match(&domain));
    }

    #[test]
    fn test_zone_pattern_rejects_foreign_names() {
        let pattern = zone_pattern("example.com").unwrap();
        assert!(pattern.is_match("ciabc123.example.com"));
        assert!(pattern.is_match("CIABC123.EXAMPLE.COM"));
        assert!(!pattern.is_match("ciabc123.other.org"));
        assert!(!pattern.is_match("www.example.com"));
        assert!(!pattern.is_match("ci.example.com"));
        assert!(!pattern.is_match("deep.ciabc123.example.com"));
        // The escaped dot must not match an arbitrary character.
        assert!(!pattern.is_match("ciabc123.exampleXcom"));
    }

    #[test]
    fn test_label_of() {
        assert_eq!(label_of("ciabc.example.com"), "ciabc");
        assert_eq!(label_of("bare"), "bare");
    }
}
