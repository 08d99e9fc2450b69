//! # netwatch Testkit
//!
//! Test utilities for netwatch.
//!
//! This crate provides:
//! - Observed-entity fixtures for unit and integration tests
//! - Property-based test generators using proptest

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::{geo, organization, quorum_set, validator_node};
    pub use crate::generators::{membership_set, permutation_of, public_key};
}
