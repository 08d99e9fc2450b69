//! Full-cycle reconciliation tests.
//!
//! Drives the versioning engine the way the crawl-result processor does:
//! node pass first, organization pass second with the node result as
//! input, against shared stores and registries across cycles.

use chrono::{DateTime, Duration, TimeZone, Utc};
use netwatch_domain::{Node, Organization};
use netwatch_history::{
    EngineConfig, HistoryResult, InMemorySnapshotStore, NodeAdapter, NodeRegistry, NodeSnapshot,
    OrganizationAdapter, OrganizationRegistry, OrganizationSnapshot, QuorumSetInterner,
    SnapshotRecord, SnapshotStore, VersioningEngine,
};
use netwatch_testkit::prelude::*;
use std::sync::Arc;

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + minutes * 60, 0).unwrap()
}

/// Shared state of one monitor instance across observation cycles.
struct Harness {
    nodes: Arc<NodeRegistry>,
    organizations: Arc<OrganizationRegistry>,
    quorum_sets: Arc<QuorumSetInterner>,
    node_store: Arc<InMemorySnapshotStore<NodeSnapshot>>,
    organization_store: Arc<InMemorySnapshotStore<OrganizationSnapshot>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            nodes: Arc::new(NodeRegistry::new()),
            organizations: Arc::new(OrganizationRegistry::new()),
            quorum_sets: Arc::new(QuorumSetInterner::new()),
            node_store: Arc::new(InMemorySnapshotStore::new()),
            organization_store: Arc::new(InMemorySnapshotStore::new()),
        }
    }

    fn node_cycle(&self, observed: &[Node], as_of: DateTime<Utc>) -> HistoryResult<Vec<NodeSnapshot>> {
        let engine = VersioningEngine::new(
            NodeAdapter::new(
                Arc::clone(&self.nodes),
                Arc::clone(&self.organizations),
                Arc::clone(&self.quorum_sets),
                EngineConfig::default(),
            ),
            Arc::clone(&self.node_store) as Arc<dyn SnapshotStore<NodeSnapshot>>,
        );
        engine.reconcile(observed, as_of)
    }

    fn organization_cycle(
        &self,
        observed: &[Organization],
        node_snapshots: &[NodeSnapshot],
        as_of: DateTime<Utc>,
    ) -> HistoryResult<Vec<OrganizationSnapshot>> {
        let engine = VersioningEngine::new(
            OrganizationAdapter::new(
                Arc::clone(&self.organizations),
                Arc::clone(&self.nodes),
                node_snapshots,
            ),
            Arc::clone(&self.organization_store) as Arc<dyn SnapshotStore<OrganizationSnapshot>>,
        );
        engine.reconcile(observed, as_of)
    }
}

#[test]
fn scenario_a_new_node_without_quorum_set() {
    let harness = Harness::new();
    let node = Node::new("GA", "203.0.113.1", 11625);

    let result = harness.node_cycle(&[node], t(0)).unwrap();

    assert_eq!(result.len(), 1);
    assert!(result[0].is_active());
    assert!(result[0].quorum_set.is_none());
    assert_eq!(harness.node_store.chain("GA").unwrap().len(), 1);
}

#[test]
fn scenario_b_quorum_set_appears_later() {
    let harness = Harness::new();
    let mut node = validator_node("GA", &[]);
    node.quorum_set = None;

    let first = harness.node_cycle(&[node.clone()], t(0)).unwrap();

    node.quorum_set = Some(quorum_set(&["GB", "GC"]));
    let second = harness.node_cycle(&[node], t(60)).unwrap();

    assert_eq!(second.len(), 1);
    assert!(second[0].quorum_set.is_some());
    // Unchanged groups ride along by reference.
    assert!(Arc::ptr_eq(
        first[0].details.as_ref().unwrap(),
        second[0].details.as_ref().unwrap()
    ));
    assert!(Arc::ptr_eq(
        first[0].geo.as_ref().unwrap(),
        second[0].geo.as_ref().unwrap()
    ));

    let chain = harness.node_store.chain("GA").unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].valid_to(), Some(t(60)));
    assert!(chain[1].is_active());
}

#[test]
fn scenario_c_second_address_change_within_a_day_is_suppressed() {
    let harness = Harness::new();
    let mut node = validator_node("GA", &["GB"]);

    harness.node_cycle(&[node.clone()], t(0)).unwrap();

    node.ip = "203.0.113.2".to_string();
    let versioned = harness.node_cycle(&[node.clone()], t(60)).unwrap();
    assert!(versioned[0].ip_changed);
    assert_eq!(versioned[0].ip, "203.0.113.2");

    // Two hours later the address moves again: swallowed.
    node.ip = "203.0.113.3".to_string();
    let suppressed = harness.node_cycle(&[node.clone()], t(180)).unwrap();
    assert_eq!(suppressed[0].ip, "203.0.113.2");
    assert_eq!(suppressed[0].valid_from(), t(60));
    assert_eq!(harness.node_store.chain("GA").unwrap().len(), 2);

    // Past the one-day window the same change is versioned again.
    let aged = harness
        .node_cycle(&[node], t(60) + Duration::days(1) + Duration::minutes(1))
        .unwrap();
    assert_eq!(aged[0].ip, "203.0.113.3");
    assert_eq!(harness.node_store.chain("GA").unwrap().len(), 3);
}

#[test]
fn scenario_d_organization_archived_when_all_members_lose_snapshots() {
    let harness = Harness::new();
    let members = ["GA", "GB", "GC"];
    let observed_nodes: Vec<Node> = members
        .iter()
        .map(|key| validator_node(key, &members))
        .collect();
    let org = organization("org", &members);

    let node_snapshots = harness.node_cycle(&observed_nodes, t(0)).unwrap();
    let org_snapshots = harness
        .organization_cycle(&[org], &node_snapshots, t(0))
        .unwrap();
    assert_eq!(org_snapshots.len(), 1);

    // The out-of-scope archiver retires all member chains between cycles.
    for snapshot in &node_snapshots {
        harness.node_store.close(snapshot.id(), t(60)).unwrap();
    }

    let remaining_nodes = harness.node_store.find_active().unwrap();
    assert!(remaining_nodes.is_empty());
    let result = harness
        .organization_cycle(&[], &remaining_nodes, t(120))
        .unwrap();

    assert!(result.is_empty());
    let chain = harness.organization_store.chain("org").unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].valid_to(), Some(t(120)));
}

#[test]
fn organization_survives_while_one_member_is_live() {
    let harness = Harness::new();
    let members = ["GA", "GB"];
    let observed_nodes: Vec<Node> = members
        .iter()
        .map(|key| validator_node(key, &members))
        .collect();

    let node_snapshots = harness.node_cycle(&observed_nodes, t(0)).unwrap();
    harness
        .organization_cycle(&[organization("org", &members)], &node_snapshots, t(0))
        .unwrap();

    harness.node_store.close(node_snapshots[0].id(), t(60)).unwrap();
    let remaining = harness.node_store.find_active().unwrap();
    let result = harness.organization_cycle(&[], &remaining, t(120)).unwrap();

    assert_eq!(result.len(), 1);
    assert!(result[0].is_active());
}

#[test]
fn identical_batches_are_idempotent_across_both_passes() {
    let harness = Harness::new();
    let members = ["GA", "GB"];
    let observed_nodes: Vec<Node> = members
        .iter()
        .map(|key| validator_node(key, &members))
        .collect();
    let observed_orgs = vec![organization("org", &members)];

    let node_snapshots = harness.node_cycle(&observed_nodes, t(0)).unwrap();
    harness
        .organization_cycle(&observed_orgs, &node_snapshots, t(0))
        .unwrap();

    let node_snapshots = harness.node_cycle(&observed_nodes, t(60)).unwrap();
    harness
        .organization_cycle(&observed_orgs, &node_snapshots, t(60))
        .unwrap();

    for key in members {
        assert_eq!(harness.node_store.chain(key).unwrap().len(), 1);
    }
    assert_eq!(harness.organization_store.chain("org").unwrap().len(), 1);
}

#[test]
fn at_most_one_active_snapshot_per_identity() {
    let harness = Harness::new();
    let mut node = validator_node("GA", &["GB"]);

    for minute in 0..5 {
        // A detail change every cycle forces a version every cycle.
        node.name = Some(format!("validator-{minute}"));
        harness.node_cycle(&[node.clone()], t(minute * 60)).unwrap();
    }

    let chain = harness.node_store.chain("GA").unwrap();
    assert_eq!(chain.len(), 5);
    assert_eq!(chain.iter().filter(|row| row.is_active()).count(), 1);
    // Contiguity: intervals tile without gap or overlap.
    for pair in chain.windows(2) {
        assert_eq!(pair[0].valid_to(), Some(pair[1].valid_from()));
    }
}

#[test]
fn chains_restart_after_archival_on_the_same_identity() {
    let harness = Harness::new();
    let members = ["GA"];
    let observed_nodes: Vec<Node> = vec![validator_node("GA", &members)];
    let org = organization("org", &members);

    let node_snapshots = harness.node_cycle(&observed_nodes, t(0)).unwrap();
    harness
        .organization_cycle(&[org.clone()], &node_snapshots, t(0))
        .unwrap();
    let first_identity = harness.organizations.get("org").unwrap();

    // All members retire; the organization chain closes.
    harness.node_store.close(node_snapshots[0].id(), t(30)).unwrap();
    harness.organization_cycle(&[], &[], t(60)).unwrap();

    // The member comes back and the organization is rediscovered.
    let node_snapshots = harness.node_cycle(&observed_nodes, t(120)).unwrap();
    let result = harness
        .organization_cycle(&[org], &node_snapshots, t(120))
        .unwrap();

    assert_eq!(result.len(), 1);
    let chain = harness.organization_store.chain("org").unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].valid_to(), Some(t(60)));
    assert!(chain[1].is_active());
    // Rediscovery reuses the same stable identity.
    assert!(Arc::ptr_eq(&result[0].identity, &first_identity));
}

#[test]
fn quorum_set_records_are_shared_across_identities() {
    let harness = Harness::new();
    let peers = ["GX", "GY"];
    let observed: Vec<Node> = ["GA", "GB"]
        .iter()
        .map(|key| validator_node(key, &peers))
        .collect();

    let result = harness.node_cycle(&observed, t(0)).unwrap();

    let first = result[0].quorum_set.as_ref().unwrap();
    let second = result[1].quorum_set.as_ref().unwrap();
    assert!(Arc::ptr_eq(first, second));
    assert_eq!(harness.quorum_sets.len(), 1);
}

#[test]
fn organization_members_share_identities_with_the_node_registry() {
    let harness = Harness::new();
    let members = ["GA", "GB"];
    let observed_nodes: Vec<Node> = members
        .iter()
        .map(|key| validator_node(key, &members))
        .collect();

    let node_snapshots = harness.node_cycle(&observed_nodes, t(0)).unwrap();
    let result = harness
        .organization_cycle(&[organization("org", &members)], &node_snapshots, t(0))
        .unwrap();

    for member in result[0].validators.iter() {
        let registered = harness.nodes.get(&member.public_key).unwrap();
        assert!(Arc::ptr_eq(member, &registered));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Reordering an organization's membership list never creates a
        /// new version.
        #[test]
        fn membership_order_never_versions(
            (members, shuffled) in membership_set(6)
                .prop_flat_map(|m| (Just(m.clone()), permutation_of(m)))
        ) {
            let harness = Harness::new();
            let member_refs: Vec<&str> = members.iter().map(String::as_str).collect();
            let observed_nodes: Vec<Node> = member_refs
                .iter()
                .map(|key| validator_node(key, &member_refs))
                .collect();
            let node_snapshots = harness.node_cycle(&observed_nodes, t(0)).unwrap();

            let mut org = organization("org", &member_refs);
            harness
                .organization_cycle(&[org.clone()], &node_snapshots, t(0))
                .unwrap();

            org.validators = shuffled;
            harness
                .organization_cycle(&[org], &node_snapshots, t(60))
                .unwrap();

            prop_assert_eq!(
                harness.organization_store.chain("org").unwrap().len(),
                1
            );
        }
    }
}
