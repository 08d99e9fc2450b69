//! Identity registries with idempotent find-or-create.

use crate::identity::{NodeIdentity, OrganizationIdentity};
use chrono::{DateTime, Utc};
use netwatch_domain::{OrganizationId, PublicKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of node identities, keyed by public key.
///
/// `find_or_create` is idempotent under concurrent calls with the same
/// key: the existence check is re-done under the write lock, so two racing
/// discovery passes can never mint two identities for one public key.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    identities: RwLock<HashMap<PublicKey, Arc<NodeIdentity>>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity for `public_key`, creating it with
    /// `first_observed = as_of` if it does not exist yet.
    pub fn find_or_create(&self, public_key: &str, as_of: DateTime<Utc>) -> Arc<NodeIdentity> {
        if let Some(identity) = self.identities.read().get(public_key) {
            return Arc::clone(identity);
        }

        let mut identities = self.identities.write();
        // Re-check: another caller may have won the race for the write lock.
        if let Some(identity) = identities.get(public_key) {
            return Arc::clone(identity);
        }
        let identity = Arc::new(NodeIdentity::new(public_key, as_of));
        identities.insert(public_key.to_string(), Arc::clone(&identity));
        identity
    }

    /// Returns the identity for `public_key` if one exists.
    #[must_use]
    pub fn get(&self, public_key: &str) -> Option<Arc<NodeIdentity>> {
        self.identities.read().get(public_key).cloned()
    }

    /// Returns the number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.read().len()
    }

    /// Returns true when no identities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.read().is_empty()
    }
}

/// Registry of organization identities, keyed by organization id.
#[derive(Debug, Default)]
pub struct OrganizationRegistry {
    identities: RwLock<HashMap<OrganizationId, Arc<OrganizationIdentity>>>,
}

impl OrganizationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity for `organization_id`, creating it with
    /// `first_observed = as_of` if it does not exist yet.
    pub fn find_or_create(
        &self,
        organization_id: &str,
        as_of: DateTime<Utc>,
    ) -> Arc<OrganizationIdentity> {
        if let Some(identity) = self.identities.read().get(organization_id) {
            return Arc::clone(identity);
        }

        let mut identities = self.identities.write();
        if let Some(identity) = identities.get(organization_id) {
            return Arc::clone(identity);
        }
        let identity = Arc::new(OrganizationIdentity::new(organization_id, as_of));
        identities.insert(organization_id.to_string(), Arc::clone(&identity));
        identity
    }

    /// Returns the identity for `organization_id` if one exists.
    #[must_use]
    pub fn get(&self, organization_id: &str) -> Option<Arc<OrganizationIdentity>> {
        self.identities.read().get(organization_id).cloned()
    }

    /// Returns the number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.read().len()
    }

    /// Returns true when no identities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.read().is_empty()
    }
}
