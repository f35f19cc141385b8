//! Bounded caches and the eviction cascade.
//!
//! [`TrustCache`] is the source of truth; [`DependentCache`] instances
//! register as its eviction listeners and drop their own entry for an
//! evicted key in the same logical step, re-emitting their own
//! notification for second-order consumers (DNS cleanup).
//!
//! Listener callbacks run inline, after the cache mutation but before
//! the mutating call returns, so a caller never observes a trust entry
//! gone while a dependent entry remains.

pub mod dependent;
pub mod trust;

pub use dependent::DependentCache;
pub use trust::TrustCache;

/// The discovery directory: peer identity to announced raw addresses.
pub type Directory = DependentCache<Vec<Vec<u8>>>;

/// The DNS owner set: peer identity to the canonical domain it holds
/// records under.
pub type OwnerSet = DependentCache<String>;
