//! Observed-entity fixtures.
//!
//! Builders for the crawler-side shapes the history engine consumes,
//! preconfigured to realistic values so tests only spell out what they
//! care about.

use netwatch_domain::{Node, NodeGeo, Organization, QuorumSet};

/// A fully populated validator node observation.
///
/// Carries details, geolocation and a quorum set over `peers`; tests
/// mutate individual fields from there.
#[must_use]
pub fn validator_node(public_key: &str, peers: &[&str]) -> Node {
    let mut node = Node::new(public_key, "203.0.113.10", 11625);
    node.name = Some(format!("validator-{public_key}"));
    node.host = Some(format!("{public_key}.example.org").to_lowercase());
    node.version = Some("v19.13.0".to_string());
    node.overlay_version = Some(29);
    node.overlay_min_version = Some(27);
    node.ledger_version = Some(19);
    node.geo = geo(50.85, 4.35);
    node.quorum_set = Some(quorum_set(peers));
    node
}

/// A quorum set requiring a simple majority of `validators`.
#[must_use]
pub fn quorum_set(validators: &[&str]) -> QuorumSet {
    QuorumSet {
        threshold: (validators.len() as u32 / 2) + 1,
        validators: validators.iter().map(|v| (*v).to_string()).collect(),
        inner_quorum_sets: vec![],
    }
}

/// Geolocation at the given coordinates.
#[must_use]
pub fn geo(latitude: f64, longitude: f64) -> NodeGeo {
    NodeGeo {
        latitude: Some(latitude),
        longitude: Some(longitude),
        country_code: Some("BE".to_string()),
        country_name: Some("Belgium".to_string()),
    }
}

/// An organization declaring `members` as its validators.
#[must_use]
pub fn organization(id: &str, members: &[&str]) -> Organization {
    let mut organization = Organization::new(id, format!("Organization {id}"));
    organization.home_domain = Some(format!("{id}.example.org"));
    organization.url = Some(format!("https://{id}.example.org"));
    organization.official_email = Some(format!("ops@{id}.example.org"));
    organization.validators = members.iter().map(|m| (*m).to_string()).collect();
    organization
}
