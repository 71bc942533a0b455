//! `PostgreSQL` adapters for audit task persistence.

mod models;
mod repository;
mod schema;

pub use repository::{AuditPgPool, PostgresAuditRepository};
