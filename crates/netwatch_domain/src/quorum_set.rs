//! Quorum-set structure as reported by a node.

use crate::PublicKey;
use serde::{Deserialize, Serialize};

/// A node's declared quorum set: a threshold over validators and nested
/// inner quorum sets.
///
/// A quorum set is pure data to the history engine; it is compared and
/// deduplicated by a content hash computed over a canonical encoding
/// (see `netwatch_history::quorum`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumSet {
    /// Number of members that must agree.
    pub threshold: u32,
    /// Directly listed validator public keys.
    pub validators: Vec<PublicKey>,
    /// Nested quorum sets.
    pub inner_quorum_sets: Vec<QuorumSet>,
}

impl QuorumSet {
    /// Creates an empty quorum set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the set declares no validators at all.
    ///
    /// Nodes that have not yet reported a quorum set show up as empty;
    /// the history engine treats an empty set the same as an absent one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty() && self.inner_quorum_sets.iter().all(QuorumSet::is_empty)
    }
}
