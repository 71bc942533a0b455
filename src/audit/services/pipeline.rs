//! End-to-end audit pipeline: submit, poll, fetch, persist.
//!
//! The pipeline drives one audit run through its full lifecycle. Ordering
//! is the core contract: the task is marked `processing` before any facet
//! is stored, `completed` only after every fetched facet stored cleanly,
//! and `failed` on the first fetch or store error. Completion is never
//! written after a failure.

use crate::audit::domain::{
    AuditDomainError, AuditTask, CrawlParameters, FacetKind, ReportAggregate, ReportBuilder,
    TargetUrl, TaskStatus, UserId, VendorTaskId,
};
use crate::audit::ports::{
    AnalysisClient, AnalysisClientError, AuditRepositoryError, AuditTaskRepository,
    VendorTaskListItem,
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Interval between readiness polls.
///
/// Polling is unbounded by design: a vendor-side crawl has no useful upper
/// bound, so runs wait until readiness or cancellation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// User request to start a new audit.
#[derive(Debug, Clone)]
pub struct SubmitAuditRequest {
    /// Raw target as entered by the user.
    pub target: String,
    /// Requesting user.
    pub owner: UserId,
    /// Crawl options forwarded to the vendor.
    pub parameters: CrawlParameters,
}

/// Errors returned by the audit pipeline.
#[derive(Debug, Clone, Error)]
pub enum AuditPipelineError {
    /// Input validation failed before anything was submitted.
    #[error(transparent)]
    Domain(#[from] AuditDomainError),

    /// The vendor rejected a request or returned an unusable payload.
    #[error(transparent)]
    Analysis(#[from] AnalysisClientError),

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] AuditRepositoryError),

    /// The run was cancelled while waiting for readiness.
    #[error("audit run cancelled")]
    Cancelled,
}

/// Result type for audit pipeline operations.
pub type AuditPipelineResult<T> = Result<T, AuditPipelineError>;

/// Audit pipeline orchestration service.
pub struct AuditPipeline<A, R, C = DefaultClock>
where
    A: AnalysisClient,
    R: AuditTaskRepository + 'static,
    C: Clock + Send + Sync,
{
    analysis: Arc<A>,
    repository: Arc<R>,
    clock: Arc<C>,
    poll_interval: Duration,
}

impl<A, R, C> Clone for AuditPipeline<A, R, C>
where
    A: AnalysisClient,
    R: AuditTaskRepository + 'static,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            analysis: Arc::clone(&self.analysis),
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            poll_interval: self.poll_interval,
        }
    }
}

impl<A, R> AuditPipeline<A, R, DefaultClock>
where
    A: AnalysisClient,
    R: AuditTaskRepository + 'static,
{
    /// Creates a pipeline with the default poll interval and wall clock.
    #[must_use]
    pub fn new(analysis: Arc<A>, repository: Arc<R>) -> Self {
        Self::with_clock(analysis, repository, Arc::new(DefaultClock))
    }
}

impl<A, R, C> AuditPipeline<A, R, C>
where
    A: AnalysisClient,
    R: AuditTaskRepository + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a pipeline with an explicit clock.
    #[must_use]
    pub const fn with_clock(analysis: Arc<A>, repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            analysis,
            repository,
            clock,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the readiness poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submits a new audit and persists the accepted task.
    ///
    /// The target is validated and normalised before the vendor is
    /// contacted, so invalid input never creates a billable task. On
    /// success the task row and the raw vendor acknowledgement are stored
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AuditPipelineError::Domain`] for unusable targets,
    /// [`AuditPipelineError::Analysis`] when the vendor rejects the
    /// submission, and [`AuditPipelineError::Repository`] when persistence
    /// fails after acceptance.
    pub async fn submit(&self, request: &SubmitAuditRequest) -> AuditPipelineResult<AuditTask> {
        let target = TargetUrl::parse(&request.target)?;
        let receipt = self
            .analysis
            .create_task(&target, &request.parameters)
            .await?;
        info!(task_id = %receipt.task_id, target = %target, "analysis task accepted");

        let task = AuditTask::new(receipt.task_id, target, request.owner, &*self.clock);
        self.repository
            .create_task_with_response(&task, &receipt.raw_response)
            .await?;
        Ok(task)
    }

    /// Polls the vendor until the task appears in the readiness listing.
    ///
    /// Checks immediately, then at the configured interval with no upper
    /// bound on attempts. A poll that fails transport-wise reads as "not
    /// ready yet" rather than aborting the run.
    ///
    /// # Errors
    ///
    /// Returns [`AuditPipelineError::Cancelled`] when the token fires
    /// before the task becomes ready.
    pub async fn poll_until_ready(
        &self,
        task_id: &VendorTaskId,
        cancel: &CancellationToken,
    ) -> AuditPipelineResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(AuditPipelineError::Cancelled);
            }
            let ready = self.analysis.list_ready_tasks().await;
            if ready.iter().any(|entry| entry.id == task_id.as_str()) {
                info!(task_id = %task_id, "analysis results ready");
                return Ok(());
            }
            tokio::select! {
                () = cancel.cancelled() => return Err(AuditPipelineError::Cancelled),
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Fetches every facet of a ready task and persists the results.
    ///
    /// Marks the task `processing` first, then fetches the nine facets
    /// concurrently, stores each fetched facet, and marks the task
    /// `completed`. The first fetch or store error marks the task `failed`
    /// instead and is returned.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or store error after the task has been
    /// marked `failed`.
    pub async fn fetch_and_store(
        &self,
        task_id: &VendorTaskId,
    ) -> AuditPipelineResult<ReportAggregate> {
        self.repository
            .update_status(task_id, TaskStatus::Processing)
            .await?;

        match self.collect_and_store(task_id).await {
            Ok(report) => {
                self.repository
                    .update_status(task_id, TaskStatus::Completed)
                    .await?;
                info!(task_id = %task_id, "audit run completed");
                Ok(report)
            }
            Err(err) => {
                warn!(task_id = %task_id, error = %err, "audit run failed");
                if let Err(mark_err) = self
                    .repository
                    .update_status(task_id, TaskStatus::Failed)
                    .await
                {
                    warn!(task_id = %task_id, error = %mark_err, "could not mark task failed");
                }
                Err(err)
            }
        }
    }

    /// Runs a full audit: submit, wait for readiness, fetch and persist.
    ///
    /// # Errors
    ///
    /// Propagates the first error of any stage; see [`AuditPipeline::submit`],
    /// [`AuditPipeline::poll_until_ready`], and
    /// [`AuditPipeline::fetch_and_store`].
    pub async fn run(
        &self,
        request: &SubmitAuditRequest,
        cancel: &CancellationToken,
    ) -> AuditPipelineResult<(VendorTaskId, ReportAggregate)> {
        let task = self.submit(request).await?;
        let task_id = task.vendor_task_id().clone();
        self.poll_until_ready(&task_id, cancel).await?;
        let report = self.fetch_and_store(&task_id).await?;
        Ok((task_id, report))
    }

    /// Lists vendor-side task ids over the trailing month.
    pub async fn vendor_task_inventory(&self) -> Vec<VendorTaskListItem> {
        self.analysis.list_task_ids().await
    }

    async fn collect_and_store(
        &self,
        task_id: &VendorTaskId,
    ) -> AuditPipelineResult<ReportAggregate> {
        let report = self.fetch_report(task_id).await?;
        self.store_report(task_id, &report).await?;
        Ok(report)
    }

    async fn fetch_report(&self, task_id: &VendorTaskId) -> AuditPipelineResult<ReportAggregate> {
        let fetch = |kind| self.analysis.fetch_facet(kind, task_id);
        let outcomes = tokio::join!(
            fetch(FacetKind::Summary),
            fetch(FacetKind::Pages),
            fetch(FacetKind::Resources),
            fetch(FacetKind::Links),
            fetch(FacetKind::NonIndexable),
            fetch(FacetKind::DuplicateTags),
            fetch(FacetKind::DuplicateContent),
            fetch(FacetKind::KeywordDensity),
            fetch(FacetKind::RedirectChains),
        );

        let mut builder = ReportBuilder::new();
        for outcome in [
            outcomes.0, outcomes.1, outcomes.2, outcomes.3, outcomes.4, outcomes.5, outcomes.6,
            outcomes.7, outcomes.8,
        ] {
            if let Some(rows) = outcome? {
                builder.insert(rows);
            }
        }
        Ok(builder.build())
    }

    async fn store_report(
        &self,
        task_id: &VendorTaskId,
        report: &ReportAggregate,
    ) -> AuditPipelineResult<()> {
        let mut stores = JoinSet::new();
        for kind in FacetKind::ALL {
            let Some(rows) = report.facet(kind) else {
                continue;
            };
            let repository = Arc::clone(&self.repository);
            let row_task_id = task_id.clone();
            stores.spawn(async move { repository.store_facet(&row_task_id, &rows).await });
        }

        // Drain every store before reporting, so a failure cannot leave
        // writes racing a `failed` status update.
        let mut first_error: Option<AuditRepositoryError> = None;
        while let Some(joined) = stores.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(task_id = %task_id, error = %err, "facet store failed");
                    first_error.get_or_insert(err);
                }
                Err(join_err) => {
                    warn!(task_id = %task_id, error = %join_err, "facet store task panicked");
                    first_error.get_or_insert(AuditRepositoryError::persistence(join_err));
                }
            }
        }

        first_error.map_or(Ok(()), |err| Err(err.into()))
    }
}
