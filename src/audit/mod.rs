//! On-page audit orchestration for SEO Maven.
//!
//! This module drives the full audit lifecycle: submitting an analysis task
//! to the vendor, polling the readiness endpoint at a fixed interval,
//! fetching the nine report facets as one fan-out, persisting each facet to
//! its own table, and assembling the in-memory report aggregate handed to
//! the caller. A second service keeps the per-user task inventory current
//! from change notifications. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
