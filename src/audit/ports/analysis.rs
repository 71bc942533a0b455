//! Remote analysis client port for the vendor's on-page API.

use crate::audit::domain::{CrawlParameters, FacetKind, FacetRows, TargetUrl, VendorTaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Vendor status code for a freshly created task.
pub const VENDOR_CODE_TASK_CREATED: u32 = 20_100;
/// Inclusive lower bound of the vendor's generic success range.
pub const VENDOR_CODE_SUCCESS_MIN: u32 = 20_000;
/// Exclusive upper bound of the vendor's generic success range.
pub const VENDOR_CODE_SUCCESS_END: u32 = 30_000;
/// Lower bound of the vendor's error range.
pub const VENDOR_CODE_ERROR_MIN: u32 = 40_000;

/// Returns `true` when the vendor code signals success.
#[must_use]
pub const fn is_vendor_success_code(code: u32) -> bool {
    code >= VENDOR_CODE_SUCCESS_MIN && code < VENDOR_CODE_SUCCESS_END
}

/// Returns `true` when the vendor code signals failure.
#[must_use]
pub const fn is_vendor_error_code(code: u32) -> bool {
    code >= VENDOR_CODE_ERROR_MIN
}

/// Result type for analysis client operations.
pub type AnalysisClientResult<T> = Result<T, AnalysisClientError>;

/// Vendor acknowledgement of an accepted analysis task.
///
/// Creating a task is billable vendor-side, so the receipt carries the cost
/// alongside the raw acknowledgement payload for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReceipt {
    /// Vendor-issued task identifier.
    pub task_id: VendorTaskId,
    /// Vendor numeric status code (`20100` for a created task).
    pub status_code: u32,
    /// Vendor status message.
    pub status_message: String,
    /// Cost billed for the submission.
    pub cost: f64,
    /// Raw vendor acknowledgement, persisted with the task.
    pub raw_response: Value,
}

/// One entry of the vendor's readiness listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyTask {
    /// Vendor task identifier.
    pub id: String,
    /// Audit target the task was created for.
    #[serde(default)]
    pub target: Option<String>,
    /// When the task was posted.
    #[serde(default)]
    pub date_posted: Option<String>,
}

/// One entry of the vendor's task id inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorTaskListItem {
    /// Vendor task identifier.
    pub id: String,
    /// Audit target, when the vendor reports it.
    #[serde(default)]
    pub url: Option<String>,
    /// When the task was posted.
    #[serde(default)]
    pub datetime_posted: Option<String>,
    /// When the task finished.
    #[serde(default)]
    pub datetime_done: Option<String>,
    /// Vendor-side status text.
    #[serde(default)]
    pub status: Option<String>,
    /// Cost billed for the task.
    #[serde(default)]
    pub cost: Option<f64>,
}

/// Typed access to the vendor's on-page analysis API.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Submits a new analysis task for the target.
    ///
    /// Remote effect: vendor-side task creation, which is billable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisClientError::InvalidResponse`] when the vendor
    /// payload lacks a task entry or task identifier, and
    /// [`AnalysisClientError::Vendor`] when the vendor's own status code
    /// signals failure.
    async fn create_task(
        &self,
        target: &TargetUrl,
        parameters: &CrawlParameters,
    ) -> AnalysisClientResult<TaskReceipt>;

    /// Lists tasks whose results are ready to fetch.
    ///
    /// Best-effort signal, not authoritative: any transport or shape
    /// failure yields an empty list so a transient vendor outage reads as
    /// "not ready yet".
    async fn list_ready_tasks(&self) -> Vec<ReadyTask>;

    /// Fetches one facet of a finished task.
    ///
    /// Returns `Ok(None)` when the vendor has no result for the facet yet.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisClientError::Vendor`] on HTTP failure and
    /// [`AnalysisClientError::InvalidResponse`] when the payload cannot be
    /// mapped to facet rows.
    async fn fetch_facet(
        &self,
        kind: FacetKind,
        task_id: &VendorTaskId,
    ) -> AnalysisClientResult<Option<FacetRows>>;

    /// Lists vendor-side task ids over the trailing month.
    ///
    /// Best-effort like [`AnalysisClient::list_ready_tasks`]; failures
    /// yield an empty list.
    async fn list_task_ids(&self) -> Vec<VendorTaskListItem>;
}

/// Errors returned by analysis client implementations.
#[derive(Debug, Clone, Error)]
pub enum AnalysisClientError {
    /// The vendor payload did not have the expected shape.
    #[error("invalid vendor response: {0}")]
    InvalidResponse(String),

    /// The vendor reported a failure, by numeric code or HTTP status.
    #[error("vendor error {code}: {message}")]
    Vendor {
        /// Vendor numeric code, or the HTTP status for transport-level
        /// rejections.
        code: u32,
        /// Vendor-supplied message, surfaced to the user verbatim.
        message: String,
    },

    /// The request never produced a vendor response.
    #[error("vendor request failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl AnalysisClientError {
    /// Wraps a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
