//! Content-addressed quorum-set records.
//!
//! A node's declared quorum set is stored once per distinct content and
//! shared by reference across snapshots of unrelated identities. Records
//! are keyed by a sha256 hash over a canonical encoding and are immutable
//! once interned.

use netwatch_domain::QuorumSet;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Content address of a quorum-set record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuorumSetHash([u8; 32]);

impl QuorumSetHash {
    /// Computes the content address of a quorum set.
    ///
    /// The encoding walks the structure depth-first; thresholds, validator
    /// lists and nesting all contribute, so two sets hash equal exactly
    /// when they are structurally identical.
    #[must_use]
    pub fn of(quorum_set: &QuorumSet) -> Self {
        let mut hasher = Sha256::new();
        hash_into(&mut hasher, quorum_set);
        Self(hasher.finalize().into())
    }

    /// Returns the raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

fn hash_into(hasher: &mut Sha256, quorum_set: &QuorumSet) {
    hasher.update(quorum_set.threshold.to_le_bytes());
    hasher.update((quorum_set.validators.len() as u64).to_le_bytes());
    for validator in &quorum_set.validators {
        hasher.update((validator.len() as u64).to_le_bytes());
        hasher.update(validator.as_bytes());
    }
    hasher.update((quorum_set.inner_quorum_sets.len() as u64).to_le_bytes());
    for inner in &quorum_set.inner_quorum_sets {
        hash_into(hasher, inner);
    }
}

impl fmt::Display for QuorumSetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// An interned, immutable quorum-set record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumSetRecord {
    /// Content address of `quorum_set`.
    pub hash: QuorumSetHash,
    /// The quorum-set contents.
    pub quorum_set: QuorumSet,
}

/// Deduplicating store of quorum-set records.
///
/// Interning the same contents twice returns the same shared record, which
/// is what lets snapshots of unrelated identities reference one row.
#[derive(Debug, Default)]
pub struct QuorumSetInterner {
    records: RwLock<HashMap<QuorumSetHash, Arc<QuorumSetRecord>>>,
}

impl QuorumSetInterner {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a quorum set, returning the shared record for its contents.
    pub fn intern(&self, quorum_set: &QuorumSet) -> Arc<QuorumSetRecord> {
        let hash = QuorumSetHash::of(quorum_set);
        if let Some(record) = self.records.read().get(&hash) {
            return Arc::clone(record);
        }

        let mut records = self.records.write();
        Arc::clone(records.entry(hash).or_insert_with(|| {
            Arc::new(QuorumSetRecord {
                hash,
                quorum_set: quorum_set.clone(),
            })
        }))
    }

    /// Returns the record for a content address, if interned.
    #[must_use]
    pub fn get(&self, hash: &QuorumSetHash) -> Option<Arc<QuorumSetRecord>> {
        self.records.read().get(hash).cloned()
    }

    /// Returns the number of distinct records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true when no records are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qset(threshold: u32, validators: &[&str]) -> QuorumSet {
        QuorumSet {
            threshold,
            validators: validators.iter().map(|v| (*v).to_string()).collect(),
            inner_quorum_sets: vec![],
        }
    }

    #[test]
    fn identical_contents_hash_equal() {
        assert_eq!(
            QuorumSetHash::of(&qset(2, &["A", "B"])),
            QuorumSetHash::of(&qset(2, &["A", "B"]))
        );
    }

    #[test]
    fn threshold_changes_the_hash() {
        assert_ne!(
            QuorumSetHash::of(&qset(1, &["A", "B"])),
            QuorumSetHash::of(&qset(2, &["A", "B"]))
        );
    }

    #[test]
    fn nesting_is_not_flattened() {
        let flat = qset(1, &["A"]);
        let nested = QuorumSet {
            threshold: 1,
            validators: vec![],
            inner_quorum_sets: vec![qset(1, &["A"])],
        };
        assert_ne!(QuorumSetHash::of(&flat), QuorumSetHash::of(&nested));
    }

    #[test]
    fn interning_deduplicates() {
        let interner = QuorumSetInterner::new();
        let a = interner.intern(&qset(2, &["A", "B"]));
        let b = interner.intern(&qset(2, &["A", "B"]));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_contents_get_distinct_records() {
        let interner = QuorumSetInterner::new();
        interner.intern(&qset(1, &["A"]));
        interner.intern(&qset(1, &["B"]));
        assert_eq!(interner.len(), 2);
    }
}
