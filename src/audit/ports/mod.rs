//! Port contracts for audit orchestration.
//!
//! Ports define infrastructure-agnostic interfaces used by audit services.

pub mod analysis;
pub mod repository;

pub use analysis::{
    AnalysisClient, AnalysisClientError, AnalysisClientResult, ReadyTask, TaskReceipt,
    VendorTaskListItem, is_vendor_error_code, is_vendor_success_code,
};
pub use repository::{
    AuditRepositoryError, AuditRepositoryResult, AuditTaskRepository, TaskChange, TaskChangeFeed,
    TaskChangeSubscription, TaskListEntry,
};
