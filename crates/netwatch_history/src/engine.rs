//! Generic snapshot reconciliation.
//!
//! [`VersioningEngine`] implements the change-detection-and-versioning
//! algorithm once; everything entity-specific - identity extraction, diff
//! rules, archival and suppression policy, snapshot construction - comes
//! in through a [`SnapshotAdapter`] value. Node and organization logic is
//! data handed to the engine, not a class hierarchy.

use crate::error::HistoryResult;
use crate::store::{SnapshotRecord, SnapshotStore};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// The per-group outcome of diffing an active snapshot against an
/// observed entity.
pub trait ChangeSet {
    /// Returns true when no tracked attribute group differs.
    fn is_empty(&self) -> bool;
}

/// Entity-specific capabilities the engine is parameterized by.
///
/// One adapter exists per entity kind. Adapters own whatever collaborators
/// their policies need (identity registries, the quorum-set interner, the
/// node snapshot map for organizations) and receive them at construction,
/// never through out-of-band mutable state.
pub trait SnapshotAdapter {
    /// The observed entity kind.
    type Entity;
    /// The snapshot record kind.
    type Snapshot: SnapshotRecord;
    /// The diff result kind.
    type Change: ChangeSet + fmt::Debug;

    /// Extracts the natural key from an observed entity.
    fn entity_key<'e>(&self, entity: &'e Self::Entity) -> &'e str;

    /// Returns false for observations that are malformed and must be
    /// neither created nor updated.
    fn should_track(&self, entity: &Self::Entity) -> bool;

    /// Policy for active snapshots whose entity was not observed this
    /// cycle: close the chain, or keep it (entity presumed still extant
    /// but unseen).
    fn should_archive_on_disappearance(&self, snapshot: &Self::Snapshot) -> bool;

    /// Computes the per-group change set between an active snapshot and
    /// the observed entity. Absent-in-storage and absent-on-entity
    /// compare equal.
    fn diff(&self, snapshot: &Self::Snapshot, entity: &Self::Entity) -> Self::Change;

    /// Noise policy: returns true when a detected change must be
    /// withheld from versioning this cycle.
    fn should_suppress(
        &self,
        snapshot: &Self::Snapshot,
        change: &Self::Change,
        as_of: DateTime<Utc>,
    ) -> bool;

    /// Materializes a chain-head snapshot for a newly tracked entity,
    /// resolving or creating its stable identity.
    fn build_snapshot(
        &self,
        entity: &Self::Entity,
        as_of: DateTime<Utc>,
    ) -> HistoryResult<Self::Snapshot>;

    /// Materializes the replacement for a versioned snapshot: changed
    /// groups fresh, unchanged groups carried forward by reference.
    fn build_updated_snapshot(
        &self,
        snapshot: &Self::Snapshot,
        entity: &Self::Entity,
        change: &Self::Change,
        as_of: DateTime<Utc>,
    ) -> HistoryResult<Self::Snapshot>;
}

/// Reconciles one observation batch against the stored snapshot chains.
pub struct VersioningEngine<A: SnapshotAdapter> {
    adapter: A,
    store: Arc<dyn SnapshotStore<A::Snapshot>>,
}

impl<A: SnapshotAdapter> VersioningEngine<A> {
    /// Creates an engine over an adapter and its snapshot store.
    pub fn new(adapter: A, store: Arc<dyn SnapshotStore<A::Snapshot>>) -> Self {
        Self { adapter, store }
    }

    /// Returns the underlying snapshot store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SnapshotStore<A::Snapshot>> {
        &self.store
    }

    /// Returns the adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Reconciles the full observed entity set at `as_of` and returns the
    /// new active snapshot set.
    ///
    /// Failures are isolated per identity: a snapshot that cannot be
    /// processed is reported and left as-is, an entity that cannot be
    /// created is reported and skipped, and the batch always completes.
    pub fn reconcile(
        &self,
        observed: &[A::Entity],
        as_of: DateTime<Utc>,
    ) -> HistoryResult<Vec<A::Snapshot>> {
        let active = self.verified_active()?;
        let observed_by_key: HashMap<&str, &A::Entity> = observed
            .iter()
            .map(|entity| (self.adapter.entity_key(entity), entity))
            .collect();

        // Keys with any prior chain head this cycle; entities matching one
        // of these are handled by the update pass, never rediscovered.
        let mut known_keys: HashSet<String> = active
            .iter()
            .map(|snapshot| snapshot.identity_key().to_string())
            .collect();

        let mut result = Vec::with_capacity(active.len());
        for snapshot in active {
            let entity = observed_by_key.get(snapshot.identity_key()).copied();
            match self.update_snapshot(&snapshot, entity, as_of) {
                Ok(Some(current)) => result.push(current),
                Ok(None) => {
                    debug!(identity = snapshot.identity_key(), "chain archived");
                }
                Err(e) => {
                    error!(
                        identity = snapshot.identity_key(),
                        error = %e,
                        "snapshot update failed, leaving chain as-is"
                    );
                    result.push(snapshot);
                }
            }
        }

        for entity in observed {
            let key = self.adapter.entity_key(entity);
            if known_keys.contains(key) || !self.adapter.should_track(entity) {
                continue;
            }
            match self
                .adapter
                .build_snapshot(entity, as_of)
                .and_then(|snapshot| self.store.create(snapshot))
            {
                Ok(snapshot) => {
                    debug!(identity = key, "new entity detected, chain started");
                    known_keys.insert(key.to_string());
                    result.push(snapshot);
                }
                Err(e) => {
                    error!(identity = key, error = %e, "snapshot creation failed");
                }
            }
        }

        Ok(result)
    }

    /// Runs the update pass for one active snapshot.
    ///
    /// Returns the surviving chain head, or `None` when the chain was
    /// archived.
    fn update_snapshot(
        &self,
        snapshot: &A::Snapshot,
        entity: Option<&A::Entity>,
        as_of: DateTime<Utc>,
    ) -> HistoryResult<Option<A::Snapshot>> {
        let Some(entity) = entity else {
            if self.adapter.should_archive_on_disappearance(snapshot) {
                self.store.close(snapshot.id(), as_of)?;
                return Ok(None);
            }
            return Ok(Some(snapshot.clone()));
        };

        if !self.adapter.should_track(entity) {
            return Ok(Some(snapshot.clone()));
        }

        let change = self.adapter.diff(snapshot, entity);
        if change.is_empty() {
            return Ok(Some(snapshot.clone()));
        }
        if self.adapter.should_suppress(snapshot, &change, as_of) {
            debug!(
                identity = snapshot.identity_key(),
                change = ?change,
                "change suppressed"
            );
            return Ok(Some(snapshot.clone()));
        }

        let replacement = self
            .adapter
            .build_updated_snapshot(snapshot, entity, &change, as_of)?;
        let stored = self.store.close_and_open(snapshot.id(), replacement)?;
        debug!(identity = stored.identity_key(), change = ?change, "chain versioned");
        Ok(Some(stored))
    }

    /// Reads the active set and screens it for duplicate chain heads.
    ///
    /// A duplicate is a data-quality alarm requiring out-of-band repair;
    /// the batch continues with the first row per identity.
    fn verified_active(&self) -> HistoryResult<Vec<A::Snapshot>> {
        let active = self.store.find_active()?;
        let mut seen: HashSet<&str> = HashSet::with_capacity(active.len());
        let mut duplicates: Vec<&str> = Vec::new();
        for snapshot in &active {
            if !seen.insert(snapshot.identity_key()) {
                duplicates.push(snapshot.identity_key());
            }
        }
        if duplicates.is_empty() {
            return Ok(active);
        }

        for identity in &duplicates {
            error!(identity, "integrity violation: multiple active snapshots for one identity");
        }
        let duplicates: HashSet<String> = duplicates.iter().map(|k| (*k).to_string()).collect();
        let mut kept: HashSet<&str> = HashSet::new();
        Ok(active
            .iter()
            .filter(|snapshot| {
                !duplicates.contains(snapshot.identity_key())
                    || kept.insert(snapshot.identity_key())
            })
            .cloned()
            .collect())
    }
}
