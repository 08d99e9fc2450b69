//! Stable identities and their registries.
//!
//! A stable identity maps a natural key (a node's public key, an
//! organization's external id) to a permanent surrogate id plus the
//! timestamp it was first observed. Identities are created once and shared
//! by every snapshot in their chain; they are never deleted.

mod registry;

pub use registry::{NodeRegistry, OrganizationRegistry};

use chrono::{DateTime, Utc};
use netwatch_domain::{OrganizationId, PublicKey};
use parking_lot::RwLock;
use std::fmt;
use uuid::Uuid;

/// Permanent surrogate identifier for a stable identity.
///
/// Decoupled from the natural key's representation: renames or re-encodings
/// of the natural key never invalidate historical references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityId(Uuid);

impl IdentityId {
    /// Creates a new random identity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable identity of a validator node, keyed by its public key.
#[derive(Debug)]
pub struct NodeIdentity {
    /// Surrogate identifier.
    pub id: IdentityId,
    /// The public key this identity stands for.
    pub public_key: PublicKey,
    /// When the key was first observed.
    pub first_observed: DateTime<Utc>,
}

impl NodeIdentity {
    /// Creates an identity first observed at `as_of`.
    #[must_use]
    pub fn new(public_key: impl Into<PublicKey>, as_of: DateTime<Utc>) -> Self {
        Self {
            id: IdentityId::new(),
            public_key: public_key.into(),
            first_observed: as_of,
        }
    }
}

/// Stable identity of an organization, keyed by its external id.
///
/// Apart from the best-effort home-domain backfill, an identity is
/// immutable after creation.
#[derive(Debug)]
pub struct OrganizationIdentity {
    /// Surrogate identifier.
    pub id: IdentityId,
    /// The organization id this identity stands for.
    pub organization_id: OrganizationId,
    /// When the organization was first observed.
    pub first_observed: DateTime<Utc>,
    /// Auxiliary metadata: the organization's home domain. May be absent
    /// when the identity was created from a node's organization reference
    /// before the organization itself was ever observed.
    home_domain: RwLock<Option<String>>,
}

impl OrganizationIdentity {
    /// Creates an identity first observed at `as_of`.
    #[must_use]
    pub fn new(organization_id: impl Into<OrganizationId>, as_of: DateTime<Utc>) -> Self {
        Self {
            id: IdentityId::new(),
            organization_id: organization_id.into(),
            first_observed: as_of,
            home_domain: RwLock::new(None),
        }
    }

    /// Returns the currently recorded home domain.
    #[must_use]
    pub fn home_domain(&self) -> Option<String> {
        self.home_domain.read().clone()
    }

    /// Best-effort backfill of the home domain.
    ///
    /// Identities created via a node's organization reference lack the
    /// domain; the organization adapter fills it in once the organization
    /// is observed with one, and again whenever the observed value differs.
    pub fn backfill_home_domain(&self, domain: impl Into<String>) {
        *self.home_domain.write() = Some(domain.into());
    }
}
