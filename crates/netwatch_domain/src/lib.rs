//! # netwatch Domain
//!
//! Observed-entity model for the netwatch history engine.
//!
//! These are the shapes the crawler hands over once per observation cycle:
//! validator [`Node`]s and the [`Organization`]s operating them, plus the
//! quorum-set and geolocation sub-structures they carry. The types here are
//! plain data - change detection, identity resolution and versioning all
//! live in `netwatch_history`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod node;
mod organization;
mod quorum_set;

pub use node::{Node, NodeGeo};
pub use organization::Organization;
pub use quorum_set::QuorumSet;

/// A validator's public key, the natural key for node identities.
pub type PublicKey = String;

/// An organization's external identifier, the natural key for
/// organization identities.
pub type OrganizationId = String;
