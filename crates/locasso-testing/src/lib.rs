//! Test utilities for Locasso services.
//!
//! Provides `MockIdentity`, which renders one identity as every kind of evidence the
//! claims extractor understands. Import in tests only, never in production code.

pub mod auth;
