//! Snapshot store abstraction.
//!
//! The store is an append-only home for versioned records with validity
//! intervals. It knows nothing about entity kinds; anything implementing
//! [`SnapshotRecord`] can be stored. The one structural rule it enforces
//! is chain integrity: per identity at most one active record, and
//! replacement records whose interval continues the chain without gap or
//! overlap.

mod memory;

pub use memory::InMemorySnapshotStore;

use crate::error::HistoryResult;
use crate::types::SnapshotId;
use chrono::{DateTime, Utc};

/// Contract for records the snapshot store can manage.
///
/// A record is created open-ended (`valid_to = None`), mutated exactly
/// once when its chain is versioned or archived, and never deleted.
pub trait SnapshotRecord: Clone + Send + Sync + 'static {
    /// The record's store-assigned id.
    fn id(&self) -> SnapshotId;

    /// Assigns the store id. Called by the store on insert, never after.
    fn set_id(&mut self, id: SnapshotId);

    /// Natural key of the identity this record belongs to.
    fn identity_key(&self) -> &str;

    /// Start of the validity interval.
    fn valid_from(&self) -> DateTime<Utc>;

    /// End of the validity interval. `None` means currently active.
    fn valid_to(&self) -> Option<DateTime<Utc>>;

    /// Closes the record at `at`.
    fn close(&mut self, at: DateTime<Utc>);

    /// Returns true while the record is the active chain head.
    fn is_active(&self) -> bool {
        self.valid_to().is_none()
    }
}

/// Append-only persistence abstraction for snapshot chains.
///
/// Implementations must provide snapshot-consistent reads within one
/// reconciliation pass: `find_active` never observes a half-committed
/// close/open pair, and `close_and_open` commits both writes or neither.
pub trait SnapshotStore<S: SnapshotRecord>: Send + Sync {
    /// Returns all currently active records.
    fn find_active(&self) -> HistoryResult<Vec<S>>;

    /// Returns the records whose `[valid_from, valid_to)` interval
    /// contains `time`, open-ended for active records.
    fn find_active_at(&self, time: DateTime<Utc>) -> HistoryResult<Vec<S>>;

    /// Persists a brand-new chain head.
    ///
    /// Fails with an integrity violation if the identity already has an
    /// active record; a chain is only ever extended via `close_and_open`.
    fn create(&self, snapshot: S) -> HistoryResult<S>;

    /// Atomically closes `old_id` at the replacement's `valid_from` and
    /// inserts the replacement as the new chain head.
    ///
    /// Either both writes commit or neither does; a failed call leaves the
    /// chain in its last-committed form.
    fn close_and_open(&self, old_id: SnapshotId, replacement: S) -> HistoryResult<S>;

    /// Closes the record at `at` with no replacement (archival).
    fn close(&self, id: SnapshotId, at: DateTime<Utc>) -> HistoryResult<()>;

    /// Returns an identity's full chain, ordered by `valid_from`.
    fn chain(&self, identity_key: &str) -> HistoryResult<Vec<S>>;
}
