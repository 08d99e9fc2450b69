//! Observed organization.

use crate::{OrganizationId, PublicKey};
use serde::{Deserialize, Serialize};

/// An organization as observed in one cycle, assembled by the crawler from
/// the published metadata of its home domain.
///
/// The `validators` list is the organization's declared membership set.
/// Order carries no meaning; the history engine compares it as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// The organization's external identifier (natural key).
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
    /// "Doing business as" name.
    pub dba: Option<String>,
    /// Website URL.
    pub url: Option<String>,
    /// Home domain the metadata was fetched from.
    pub home_domain: Option<String>,
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
    /// Public keys of the validators this organization declares as members.
    pub validators: Vec<PublicKey>,
}

impl Organization {
    /// Creates an organization observation with id and name set.
    #[must_use]
    pub fn new(id: impl Into<OrganizationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let mut org = Organization::new("org-1", "Example");
        org.validators = vec!["A".to_string(), "B".to_string()];
        let json = serde_json::to_string(&org).unwrap();
        let back: Organization = serde_json::from_str(&json).unwrap();
        assert_eq!(org, back);
    }
}
