//! Observed validator node.

use crate::{OrganizationId, PublicKey, QuorumSet};
use serde::{Deserialize, Serialize};

/// A validator node as observed by the crawler in one cycle.
///
/// Fields that the crawler could not determine are `None`; the history
/// engine treats an absent field and a stored-as-null field as equal, so
/// optionality here never produces spurious versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The node's public key (natural key).
    pub public_key: PublicKey,
    /// Last known IP address.
    pub ip: String,
    /// Last known port.
    pub port: u16,
    /// Human-readable node name.
    pub name: Option<String>,
    /// Hostname, if resolvable.
    pub host: Option<String>,
    /// Home domain advertised by the node.
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
    /// Declared quorum set, if the node reported one.
    pub quorum_set: Option<QuorumSet>,
    /// Geolocation of the node's address.
    #[serde(default)]
    pub geo: NodeGeo,
    /// The organization this node claims to belong to.
    pub organization_id: Option<OrganizationId>,
}

impl Node {
    /// Creates a node observation with the mandatory connection fields set.
    #[must_use]
    pub fn new(public_key: impl Into<PublicKey>, ip: impl Into<String>, port: u16) -> Self {
        Self {
            public_key: public_key.into(),
            ip: ip.into(),
            port,
            ..Self::default()
        }
    }

    /// Returns true when any detail metadata field is present.
    #[must_use]
    pub fn has_details(&self) -> bool {
        self.name.is_some()
            || self.host.is_some()
            || self.home_domain.is_some()
            || self.history_url.is_some()
            || self.alias.is_some()
            || self.isp.is_some()
            || self.version.is_some()
            || self.overlay_version.is_some()
            || self.overlay_min_version.is_some()
            || self.ledger_version.is_some()
    }
}

/// Geolocation data for a node, as resolved from its IP address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGeo {
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// ISO country code.
    pub country_code: Option<String>,
    /// Country name.
    pub country_name: Option<String>,
}

impl NodeGeo {
    /// Returns true when no coordinates were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none()
    }
}
