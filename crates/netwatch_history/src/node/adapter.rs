//! Node entity adapter.

use crate::config::EngineConfig;
use crate::engine::SnapshotAdapter;
use crate::error::HistoryResult;
use crate::identity::{NodeRegistry, OrganizationIdentity, OrganizationRegistry};
use crate::node::{GeoRecord, NodeChangeSet, NodeDetailsRecord, NodeSnapshot};
use crate::quorum::{QuorumSetInterner, QuorumSetRecord};
use crate::types::SnapshotId;
use chrono::{DateTime, Utc};
use netwatch_domain::Node;
use std::sync::Arc;

/// Adapter driving the versioning engine for validator nodes.
///
/// Nodes are tracked indefinitely once discovered: a node that goes
/// unobserved keeps its active snapshot (the crawler, not this engine,
/// decides why it is unreachable). The one noise policy is the
/// address-change cooldown, see [`should_suppress`](SnapshotAdapter::should_suppress).
pub struct NodeAdapter {
    nodes: Arc<NodeRegistry>,
    organizations: Arc<OrganizationRegistry>,
    quorum_sets: Arc<QuorumSetInterner>,
    config: EngineConfig,
}

impl NodeAdapter {
    /// Creates a node adapter over its collaborators.
    pub fn new(
        nodes: Arc<NodeRegistry>,
        organizations: Arc<OrganizationRegistry>,
        quorum_sets: Arc<QuorumSetInterner>,
        config: EngineConfig,
    ) -> Self {
        Self {
            nodes,
            organizations,
            quorum_sets,
            config,
        }
    }

    fn resolve_organization(
        &self,
        node: &Node,
        as_of: DateTime<Utc>,
    ) -> Option<Arc<OrganizationIdentity>> {
        node.organization_id
            .as_ref()
            .map(|id| self.organizations.find_or_create(id, as_of))
    }

    fn intern_quorum_set(&self, node: &Node) -> Option<Arc<QuorumSetRecord>> {
        node.quorum_set
            .as_ref()
            .filter(|quorum_set| !quorum_set.is_empty())
            .map(|quorum_set| self.quorum_sets.intern(quorum_set))
    }
}

impl SnapshotAdapter for NodeAdapter {
    type Entity = Node;
    type Snapshot = NodeSnapshot;
    type Change = NodeChangeSet;

    fn entity_key<'e>(&self, entity: &'e Node) -> &'e str {
        &entity.public_key
    }

    fn should_track(&self, entity: &Node) -> bool {
        !entity.public_key.is_empty()
    }

    fn should_archive_on_disappearance(&self, _snapshot: &NodeSnapshot) -> bool {
        // Nodes are tracked indefinitely once discovered.
        false
    }

    fn diff(&self, snapshot: &NodeSnapshot, entity: &Node) -> NodeChangeSet {
        snapshot.diff(entity)
    }

    /// Suppresses an address change when the active snapshot already
    /// carries the address-change flag and is younger than the cooldown.
    ///
    /// Note the flag is only reset by a version opened for an unrelated
    /// reason: a young flagged snapshot swallows the cycle's entire change
    /// set whenever the address moved too, until it ages past the window.
    fn should_suppress(
        &self,
        snapshot: &NodeSnapshot,
        change: &NodeChangeSet,
        as_of: DateTime<Utc>,
    ) -> bool {
        change.connection
            && snapshot.ip_changed
            && as_of - snapshot.valid_from < self.config.ip_change_cooldown
    }

    fn build_snapshot(&self, entity: &Node, as_of: DateTime<Utc>) -> HistoryResult<NodeSnapshot> {
        let identity = self.nodes.find_or_create(&entity.public_key, as_of);
        Ok(NodeSnapshot {
            id: SnapshotId::new(0),
            identity,
            ip: entity.ip.clone(),
            port: entity.port,
            details: NodeDetailsRecord::from_node(entity),
            quorum_set: self.intern_quorum_set(entity),
            geo: GeoRecord::from_geo(&entity.geo),
            organization: self.resolve_organization(entity, as_of),
            ip_changed: false,
            valid_from: as_of,
            valid_to: None,
        })
    }

    fn build_updated_snapshot(
        &self,
        snapshot: &NodeSnapshot,
        entity: &Node,
        change: &NodeChangeSet,
        as_of: DateTime<Utc>,
    ) -> HistoryResult<NodeSnapshot> {
        let details = if change.details {
            NodeDetailsRecord::from_node(entity)
        } else {
            snapshot.details.clone()
        };
        let quorum_set = if change.quorum_set {
            self.intern_quorum_set(entity)
        } else {
            snapshot.quorum_set.clone()
        };
        let geo = if change.geo {
            GeoRecord::from_geo(&entity.geo)
        } else {
            snapshot.geo.clone()
        };
        let organization = if change.organization {
            self.resolve_organization(entity, as_of)
        } else {
            snapshot.organization.clone()
        };

        Ok(NodeSnapshot {
            id: SnapshotId::new(0),
            identity: Arc::clone(&snapshot.identity),
            ip: entity.ip.clone(),
            port: entity.port,
            details,
            quorum_set,
            geo,
            organization,
            ip_changed: change.connection,
            valid_from: as_of,
            valid_to: None,
        })
    }
}
