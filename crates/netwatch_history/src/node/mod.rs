//! Node snapshots and their diff rules.

mod adapter;

pub use adapter::NodeAdapter;

use crate::engine::ChangeSet;
use crate::identity::{NodeIdentity, OrganizationIdentity};
use crate::quorum::{QuorumSetHash, QuorumSetRecord};
use crate::store::SnapshotRecord;
use crate::types::SnapshotId;
use chrono::{DateTime, Utc};
use netwatch_domain::{Node, NodeGeo};
use std::sync::Arc;

/// Detail metadata attribute group of a node snapshot.
///
/// Materialized only when the observed node carries at least one detail
/// field; otherwise the group stays absent and compares equal to an
/// entirely undetailed observation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDetailsRecord {
    /// Human-readable node name.
    pub name: Option<String>,
    /// Hostname.
    pub host: Option<String>,
    /// Advertised home domain.
    pub home_domain: Option<String>,
    /// History archive URL.
    pub history_url: Option<String>,
    /// Operator-assigned alias.
    pub alias: Option<String>,
    /// Internet service provider.
    pub isp: Option<String>,
    /// Node software version string.
    pub version: Option<String>,
    /// Overlay protocol version.
    pub overlay_version: Option<u32>,
    /// Minimum supported overlay protocol version.
    pub overlay_min_version: Option<u32>,
    /// Ledger protocol version.
    pub ledger_version: Option<u32>,
}

impl NodeDetailsRecord {
    /// Materializes the group from an observation, absent when the
    /// observation carries no detail fields.
    #[must_use]
    pub fn from_node(node: &Node) -> Option<Arc<Self>> {
        if !node.has_details() {
            return None;
        }
        Some(Arc::new(Self {
            name: node.name.clone(),
            host: node.host.clone(),
            home_domain: node.home_domain.clone(),
            history_url: node.history_url.clone(),
            alias: node.alias.clone(),
            isp: node.isp.clone(),
            version: node.version.clone(),
            overlay_version: node.overlay_version,
            overlay_min_version: node.overlay_min_version,
            ledger_version: node.ledger_version,
        }))
    }

    fn matches(&self, node: &Node) -> bool {
        self.name == node.name
            && self.host == node.host
            && self.home_domain == node.home_domain
            && self.history_url == node.history_url
            && self.alias == node.alias
            && self.isp == node.isp
            && self.version == node.version
            && self.overlay_version == node.overlay_version
            && self.overlay_min_version == node.overlay_min_version
            && self.ledger_version == node.ledger_version
    }
}

/// Geolocation attribute group of a node snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// ISO country code.
    pub country_code: Option<String>,
    /// Country name.
    pub country_name: Option<String>,
}

impl GeoRecord {
    /// Materializes the group from an observation, absent when no
    /// coordinates were resolved.
    #[must_use]
    pub fn from_geo(geo: &NodeGeo) -> Option<Arc<Self>> {
        if geo.is_empty() {
            return None;
        }
        Some(Arc::new(Self {
            latitude: geo.latitude,
            longitude: geo.longitude,
            country_code: geo.country_code.clone(),
            country_name: geo.country_name.clone(),
        }))
    }

    // Geo equality is by coordinates; country fields ride along as derived
    // metadata and never trigger a version on their own.
    fn matches(&self, geo: &NodeGeo) -> bool {
        self.latitude == geo.latitude && self.longitude == geo.longitude
    }
}

/// Per-group diff between an active node snapshot and an observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeChangeSet {
    /// IP address or port differ.
    pub connection: bool,
    /// Quorum-set content hash differs.
    pub quorum_set: bool,
    /// Detail metadata differs.
    pub details: bool,
    /// Geolocation differs.
    pub geo: bool,
    /// Organization linkage differs.
    pub organization: bool,
}

impl ChangeSet for NodeChangeSet {
    fn is_empty(&self) -> bool {
        !(self.connection || self.quorum_set || self.details || self.geo || self.organization)
    }
}

/// One version of a node's historical record.
///
/// Attribute groups are shared by reference with neighbouring versions
/// when unchanged; the quorum-set group is additionally content-addressed
/// and shared across unrelated identities.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    id: SnapshotId,
    /// The identity whose chain this snapshot belongs to.
    pub identity: Arc<NodeIdentity>,
    /// IP address at the time of this version.
    pub ip: String,
    /// Port at the time of this version.
    pub port: u16,
    /// Detail metadata group.
    pub details: Option<Arc<NodeDetailsRecord>>,
    /// Quorum-set group.
    pub quorum_set: Option<Arc<QuorumSetRecord>>,
    /// Geolocation group.
    pub geo: Option<Arc<GeoRecord>>,
    /// Organization linkage.
    pub organization: Option<Arc<OrganizationIdentity>>,
    /// Set when this version was opened because the connection info
    /// changed; drives the address-change suppression policy.
    pub ip_changed: bool,
    /// Start of the validity interval.
    pub valid_from: DateTime<Utc>,
    /// End of the validity interval; `None` while active.
    pub valid_to: Option<DateTime<Utc>>,
}

impl NodeSnapshot {
    /// Returns true when the observed connection info differs.
    #[must_use]
    pub fn connection_changed(&self, node: &Node) -> bool {
        self.ip != node.ip || self.port != node.port
    }

    /// Returns true when the observed quorum set differs by content hash.
    ///
    /// An absent group equals an absent or empty observed set.
    #[must_use]
    pub fn quorum_set_changed(&self, node: &Node) -> bool {
        match (&self.quorum_set, &node.quorum_set) {
            (None, observed) => observed.as_ref().is_some_and(|q| !q.is_empty()),
            (Some(_), None) => true,
            (Some(record), Some(observed)) => record.hash != QuorumSetHash::of(observed),
        }
    }

    /// Returns true when the observed detail metadata differs.
    #[must_use]
    pub fn details_changed(&self, node: &Node) -> bool {
        match &self.details {
            None => node.has_details(),
            Some(details) => !details.matches(node),
        }
    }

    /// Returns true when the observed geolocation differs.
    #[must_use]
    pub fn geo_changed(&self, node: &Node) -> bool {
        match &self.geo {
            None => !node.geo.is_empty(),
            Some(geo) => !geo.matches(&node.geo),
        }
    }

    /// Returns true when the observed organization linkage differs.
    #[must_use]
    pub fn organization_changed(&self, node: &Node) -> bool {
        self.organization
            .as_ref()
            .map(|identity| identity.organization_id.as_str())
            != node.organization_id.as_deref()
    }

    /// Diffs this snapshot against an observation, one flag per group.
    #[must_use]
    pub fn diff(&self, node: &Node) -> NodeChangeSet {
        NodeChangeSet {
            connection: self.connection_changed(node),
            quorum_set: self.quorum_set_changed(node),
            details: self.details_changed(node),
            geo: self.geo_changed(node),
            organization: self.organization_changed(node),
        }
    }
}

impl SnapshotRecord for NodeSnapshot {
    fn id(&self) -> SnapshotId {
        self.id
    }

    fn set_id(&mut self, id: SnapshotId) {
        self.id = id;
    }

    fn identity_key(&self) -> &str {
        &self.identity.public_key
    }

    fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    fn valid_to(&self) -> Option<DateTime<Utc>> {
        self.valid_to
    }

    fn close(&mut self, at: DateTime<Utc>) {
        self.valid_to = Some(at);
    }
}
