//! Organization snapshots and their diff rules.

mod adapter;

pub use adapter::OrganizationAdapter;

use crate::engine::ChangeSet;
use crate::identity::{NodeIdentity, OrganizationIdentity};
use crate::store::SnapshotRecord;
use crate::types::SnapshotId;
use chrono::{DateTime, Utc};
use netwatch_domain::Organization;
use std::collections::HashSet;
use std::sync::Arc;

/// Published metadata attribute group of an organization snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationDetailsRecord {
    /// Organization name.
    pub name: String,
    /// "Doing business as" name.
    pub dba: Option<String>,
    /// Website URL.
    pub url: Option<String>,
    /// Official contact email.
    pub official_email: Option<String>,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Physical address.
    pub physical_address: Option<String>,
    /// Twitter handle.
    pub twitter: Option<String>,
    /// Github account.
    pub github: Option<String>,
    /// Keybase account.
    pub keybase: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

impl OrganizationDetailsRecord {
    /// Materializes the group from an observation.
    #[must_use]
    pub fn from_organization(organization: &Organization) -> Arc<Self> {
        Arc::new(Self {
            name: organization.name.clone(),
            dba: organization.dba.clone(),
            url: organization.url.clone(),
            official_email: organization.official_email.clone(),
            phone_number: organization.phone_number.clone(),
            physical_address: organization.physical_address.clone(),
            twitter: organization.twitter.clone(),
            github: organization.github.clone(),
            keybase: organization.keybase.clone(),
            description: organization.description.clone(),
        })
    }

    fn matches(&self, organization: &Organization) -> bool {
        self.name == organization.name
            && self.dba == organization.dba
            && self.url == organization.url
            && self.official_email == organization.official_email
            && self.phone_number == organization.phone_number
            && self.physical_address == organization.physical_address
            && self.twitter == organization.twitter
            && self.github == organization.github
            && self.keybase == organization.keybase
            && self.description == organization.description
    }
}

/// Per-group diff between an active organization snapshot and an
/// observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizationChangeSet {
    /// Published metadata differs.
    pub details: bool,
    /// Declared membership set differs.
    pub validators: bool,
}

impl ChangeSet for OrganizationChangeSet {
    fn is_empty(&self) -> bool {
        !(self.details || self.validators)
    }
}

/// One version of an organization's historical record.
#[derive(Debug, Clone)]
pub struct OrganizationSnapshot {
    id: SnapshotId,
    /// The identity whose chain this snapshot belongs to.
    pub identity: Arc<OrganizationIdentity>,
    /// Published metadata group.
    pub details: Arc<OrganizationDetailsRecord>,
    /// The declared membership set, as node identities. Declared members
    /// that were never crawled still get an identity, just no snapshot of
    /// their own.
    pub validators: Arc<Vec<Arc<NodeIdentity>>>,
    /// Start of the validity interval.
    pub valid_from: DateTime<Utc>,
    /// End of the validity interval; `None` while active.
    pub valid_to: Option<DateTime<Utc>>,
}

impl OrganizationSnapshot {
    /// Returns true when the observed metadata differs.
    #[must_use]
    pub fn details_changed(&self, organization: &Organization) -> bool {
        !self.details.matches(organization)
    }

    /// Returns true when the observed membership set differs.
    ///
    /// Compared as a set: reordering the declared validators is not a
    /// change.
    #[must_use]
    pub fn validators_changed(&self, organization: &Organization) -> bool {
        let stored: HashSet<&str> = self
            .validators
            .iter()
            .map(|identity| identity.public_key.as_str())
            .collect();
        let observed: HashSet<&str> = organization
            .validators
            .iter()
            .map(String::as_str)
            .collect();
        stored != observed
    }

    /// Diffs this snapshot against an observation, one flag per group.
    #[must_use]
    pub fn diff(&self, organization: &Organization) -> OrganizationChangeSet {
        OrganizationChangeSet {
            details: self.details_changed(organization),
            validators: self.validators_changed(organization),
        }
    }
}

impl SnapshotRecord for OrganizationSnapshot {
    fn id(&self) -> SnapshotId {
        self.id
    }

    fn set_id(&mut self, id: SnapshotId) {
        self.id = id;
    }

    fn identity_key(&self) -> &str {
        &self.identity.organization_id
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
