//! Orchestration services for the audit context.

mod pipeline;
mod task_list;

pub use pipeline::{
    AuditPipeline, AuditPipelineError, AuditPipelineResult, DEFAULT_POLL_INTERVAL,
    SubmitAuditRequest,
};
pub use task_list::{TaskListService, TaskListView};
