//! SEO Maven: on-page SEO audit orchestration.
//!
//! This crate drives website audits end to end: it submits analysis tasks to
//! the DataForSEO on-page API, polls for readiness, fetches the nine report
//! facets, persists them to a relational store, and keeps a per-user task
//! inventory synchronised through change notifications. All SEO computation
//! happens vendor-side; the crate's job is orchestration.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, vendor API)
//!
//! # Modules
//!
//! - [`audit`]: Task lifecycle, report facets, and task-list synchronisation
//! - [`config`]: Startup configuration for vendor and store credentials

pub mod audit;
pub mod config;
