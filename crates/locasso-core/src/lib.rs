//! Shared service plumbing for Locasso services: health probes, request middleware and
//! tracing setup.

pub mod health;
pub mod middleware;
pub mod tracing;
