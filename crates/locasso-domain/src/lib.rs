//! Domain types shared across Locasso services.
//!
//! This crate contains only pure types with no framework dependencies.

pub mod provider;
pub mod user;
