//! Organization entity adapter.

use crate::engine::SnapshotAdapter;
use crate::error::HistoryResult;
use crate::identity::{NodeIdentity, NodeRegistry, OrganizationIdentity, OrganizationRegistry};
use crate::node::NodeSnapshot;
use crate::organization::{
    OrganizationChangeSet, OrganizationDetailsRecord, OrganizationSnapshot,
};
use crate::store::SnapshotRecord;
use crate::types::SnapshotId;
use chrono::{DateTime, Utc};
use netwatch_domain::Organization;
use std::collections::HashSet;
use std::sync::Arc;

/// Adapter driving the versioning engine for organizations.
///
/// Depends on the node reconciliation result of the same cycle: an
/// organization is only worth tracking while at least one of its declared
/// members has a live node snapshot. The caller runs the node pass first
/// and hands its result to [`OrganizationAdapter::new`]; there is no
/// out-of-band state between the two passes.
pub struct OrganizationAdapter {
    organizations: Arc<OrganizationRegistry>,
    nodes: Arc<NodeRegistry>,
    /// Public keys with an active node snapshot this cycle.
    live_members: HashSet<String>,
}

impl OrganizationAdapter {
    /// Creates an organization adapter over its collaborators and the
    /// current cycle's post-reconciliation node snapshot set.
    pub fn new(
        organizations: Arc<OrganizationRegistry>,
        nodes: Arc<NodeRegistry>,
        node_snapshots: &[NodeSnapshot],
    ) -> Self {
        Self {
            organizations,
            nodes,
            live_members: node_snapshots
                .iter()
                .map(|snapshot| snapshot.identity_key().to_string())
                .collect(),
        }
    }

    fn resolve_validators(
        &self,
        organization: &Organization,
        as_of: DateTime<Utc>,
    ) -> Arc<Vec<Arc<NodeIdentity>>> {
        // Declared-but-never-crawled validators get an identity on sight;
        // they only gain a snapshot once the crawler actually finds them.
        Arc::new(
            organization
                .validators
                .iter()
                .map(|public_key| self.nodes.find_or_create(public_key, as_of))
                .collect(),
        )
    }

    fn backfill_home_domain(&self, identity: &OrganizationIdentity, entity: &Organization) {
        if let Some(domain) = &entity.home_domain {
            if identity.home_domain().as_deref() != Some(domain.as_str()) {
                identity.backfill_home_domain(domain);
            }
        }
    }
}

impl SnapshotAdapter for OrganizationAdapter {
    type Entity = Organization;
    type Snapshot = OrganizationSnapshot;
    type Change = OrganizationChangeSet;

    fn entity_key<'e>(&self, entity: &'e Organization) -> &'e str {
        &entity.id
    }

    fn should_track(&self, entity: &Organization) -> bool {
        !entity.id.is_empty()
    }

    /// An organization whose declared members all lost their active node
    /// snapshots is closed out until any member is rediscovered.
    fn should_archive_on_disappearance(&self, snapshot: &OrganizationSnapshot) -> bool {
        !snapshot
            .validators
            .iter()
            .any(|identity| self.live_members.contains(&identity.public_key))
    }

    fn diff(&self, snapshot: &OrganizationSnapshot, entity: &Organization) -> OrganizationChangeSet {
        snapshot.diff(entity)
    }

    fn should_suppress(
        &self,
        _snapshot: &OrganizationSnapshot,
        _change: &OrganizationChangeSet,
        _as_of: DateTime<Utc>,
    ) -> bool {
        // No organization changes are ignored.
        false
    }

    fn build_snapshot(
        &self,
        entity: &Organization,
        as_of: DateTime<Utc>,
    ) -> HistoryResult<OrganizationSnapshot> {
        let identity = self.organizations.find_or_create(&entity.id, as_of);
        // The identity may predate the first organization observation
        // (created through a node's organization reference) and then lacks
        // the home domain.
        self.backfill_home_domain(&identity, entity);

        Ok(OrganizationSnapshot {
            id: SnapshotId::new(0),
            details: OrganizationDetailsRecord::from_organization(entity),
            validators: self.resolve_validators(entity, as_of),
            identity,
            valid_from: as_of,
            valid_to: None,
        })
    }

    fn build_updated_snapshot(
        &self,
        snapshot: &OrganizationSnapshot,
        entity: &Organization,
        change: &OrganizationChangeSet,
        as_of: DateTime<Utc>,
    ) -> HistoryResult<OrganizationSnapshot> {
        let details = if change.details {
            OrganizationDetailsRecord::from_organization(entity)
        } else {
            Arc::clone(&snapshot.details)
        };
        let validators = if change.validators {
            self.resolve_validators(entity, as_of)
        } else {
            Arc::clone(&snapshot.validators)
        };
        self.backfill_home_domain(&snapshot.identity, entity);

        Ok(OrganizationSnapshot {
            id: SnapshotId::new(0),
            identity: Arc::clone(&snapshot.identity),
            details,
            validators,
            valid_from: as_of,
            valid_to: None,
        })
    }
}
