//! In-memory adapters for audit pipeline tests.

mod analysis;
mod repository;

pub use analysis::ScriptedAnalysisClient;
pub use repository::{InMemoryAuditRepository, RepositoryOp};
