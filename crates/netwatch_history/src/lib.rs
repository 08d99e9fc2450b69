//! # netwatch History
//!
//! Temporal snapshot/versioning engine for the netwatch network monitor.
//!
//! Once per observation cycle the crawl-result processor hands the engine
//! the full observed entity set and a logical timestamp; the engine decides
//! per entity whether its historical record is unchanged, must be revised
//! into a new version, must be closed out, or must be created for the
//! first time, and returns the new active snapshot set for downstream
//! consumers (rollup, event detection, read API).
//!
//! This crate provides:
//! - Stable identity registries mapping natural keys to surrogate ids
//! - A snapshot store abstraction with atomic close-and-open
//! - Content-addressed quorum-set records
//! - Node and organization adapters with entity-specific diff, archival
//!   and noise-suppression policy
//! - The generic [`VersioningEngine`] tying it all together
//!
//! ## Running a cycle
//!
//! The organization pass depends on the node pass's result and must run
//! after it:
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Utc;
//! use netwatch_history::{
//!     EngineConfig, InMemorySnapshotStore, NodeAdapter, NodeRegistry,
//!     OrganizationAdapter, OrganizationRegistry, QuorumSetInterner,
//!     VersioningEngine,
//! };
//!
//! # fn main() -> netwatch_history::HistoryResult<()> {
//! let nodes = Arc::new(NodeRegistry::new());
//! let organizations = Arc::new(OrganizationRegistry::new());
//! let quorum_sets = Arc::new(QuorumSetInterner::new());
//!
//! let node_engine = VersioningEngine::new(
//!     NodeAdapter::new(
//!         Arc::clone(&nodes),
//!         Arc::clone(&organizations),
//!         quorum_sets,
//!         EngineConfig::default(),
//!     ),
//!     Arc::new(InMemorySnapshotStore::new()),
//! );
//!
//! let observed_nodes = vec![netwatch_domain::Node::new("GA", "10.0.0.1", 11625)];
//! let as_of = Utc::now();
//! let node_snapshots = node_engine.reconcile(&observed_nodes, as_of)?;
//!
//! let organization_engine = VersioningEngine::new(
//!     OrganizationAdapter::new(organizations, nodes, &node_snapshots),
//!     Arc::new(InMemorySnapshotStore::new()),
//! );
//! let organization_snapshots = organization_engine.reconcile(&[], as_of)?;
//! # assert!(organization_snapshots.is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod identity;
mod node;
mod organization;
mod quorum;
mod store;
mod types;

pub use config::EngineConfig;
pub use engine::{ChangeSet, SnapshotAdapter, VersioningEngine};
pub use error::{HistoryError, HistoryResult};
pub use identity::{
    IdentityId, NodeIdentity, NodeRegistry, OrganizationIdentity, OrganizationRegistry,
};
pub use node::{GeoRecord, NodeAdapter, NodeChangeSet, NodeDetailsRecord, NodeSnapshot};
pub use organization::{
    OrganizationAdapter, OrganizationChangeSet, OrganizationDetailsRecord, OrganizationSnapshot,
};
pub use quorum::{QuorumSetHash, QuorumSetInterner, QuorumSetRecord};
pub use store::{InMemorySnapshotStore, SnapshotRecord, SnapshotStore};
pub use types::SnapshotId;
