//! In-memory snapshot store.

use crate::error::{HistoryError, HistoryResult};
use crate::store::{SnapshotRecord, SnapshotStore};
use crate::types::SnapshotId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory snapshot store.
///
/// The reference implementation of [`SnapshotStore`], suitable for tests
/// and for deployments that rebuild history from an external source on
/// startup. All rows live behind one `RwLock`, which is what makes
/// `close_and_open` atomic and reads snapshot-consistent: every validation
/// runs before the first mutation, inside the same write-lock critical
/// section.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore<S> {
    rows: RwLock<Vec<S>>,
    next_id: AtomicU64,
}

impl<S: SnapshotRecord> InMemorySnapshotStore<S> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the total number of rows, closed ones included.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn allocate_id(&self) -> SnapshotId {
        SnapshotId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl<S: SnapshotRecord> SnapshotStore<S> for InMemorySnapshotStore<S> {
    fn find_active(&self) -> HistoryResult<Vec<S>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|row| row.is_active())
            .cloned()
            .collect())
    }

    fn find_active_at(&self, time: DateTime<Utc>) -> HistoryResult<Vec<S>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|row| {
                row.valid_from() <= time && row.valid_to().is_none_or(|valid_to| valid_to > time)
            })
            .cloned()
            .collect())
    }

    fn create(&self, mut snapshot: S) -> HistoryResult<S> {
        if snapshot.valid_to().is_some() {
            return Err(HistoryError::invalid_snapshot(
                "chain head must be open-ended",
            ));
        }

        let mut rows = self.rows.write();
        if rows
            .iter()
            .any(|row| row.is_active() && row.identity_key() == snapshot.identity_key())
        {
            return Err(HistoryError::integrity_violation(format!(
                "identity {} already has an active snapshot",
                snapshot.identity_key()
            )));
        }

        snapshot.set_id(self.allocate_id());
        rows.push(snapshot.clone());
        Ok(snapshot)
    }

    fn close_and_open(&self, old_id: SnapshotId, mut replacement: S) -> HistoryResult<S> {
        if replacement.valid_to().is_some() {
            return Err(HistoryError::invalid_snapshot(
                "replacement must be open-ended",
            ));
        }

        let mut rows = self.rows.write();
        let old = rows
            .iter_mut()
            .find(|row| row.id() == old_id)
            .ok_or(HistoryError::SnapshotNotFound { id: old_id })?;

        if !old.is_active() {
            return Err(HistoryError::SnapshotClosed { id: old_id });
        }
        if old.identity_key() != replacement.identity_key() {
            return Err(HistoryError::invalid_snapshot(format!(
                "replacement identity {} does not match {}",
                replacement.identity_key(),
                old.identity_key()
            )));
        }
        if replacement.valid_from() < old.valid_from() {
            return Err(HistoryError::invalid_snapshot(
                "replacement interval regresses behind its predecessor",
            ));
        }

        // All checks passed; both mutations happen under the held lock.
        old.close(replacement.valid_from());
        replacement.set_id(self.allocate_id());
        rows.push(replacement.clone());
        Ok(replacement)
    }

    fn close(&self, id: SnapshotId, at: DateTime<Utc>) -> HistoryResult<()> {
        let mut rows = self.rows.write();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(HistoryError::SnapshotNotFound { id })?;

        if !row.is_active() {
            return Err(HistoryError::SnapshotClosed { id });
        }
        if at < row.valid_from() {
            return Err(HistoryError::invalid_snapshot(
                "close time precedes the snapshot's start",
            ));
        }

        row.close(at);
        Ok(())
    }

    fn chain(&self, identity_key: &str) -> HistoryResult<Vec<S>> {
        let mut chain: Vec<S> = self
            .rows
            .read()
            .iter()
            .filter(|row| row.identity_key() == identity_key)
            .cloned()
            .collect();
        chain.sort_by_key(SnapshotRecord::valid_from);
        Ok(chain)
    }
}
