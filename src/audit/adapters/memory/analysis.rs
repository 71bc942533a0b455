//! Scripted analysis client for audit pipeline tests.

use crate::audit::domain::{CrawlParameters, FacetKind, FacetRows, TargetUrl, VendorTaskId};
use crate::audit::ports::{
    AnalysisClient, AnalysisClientError, AnalysisClientResult, ReadyTask, TaskReceipt,
    VendorTaskListItem,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct ScriptState {
    create_results: VecDeque<AnalysisClientResult<TaskReceipt>>,
    ready_batches: VecDeque<Vec<ReadyTask>>,
    facet_results: HashMap<FacetKind, AnalysisClientResult<Option<FacetRows>>>,
    task_id_list: Vec<VendorTaskListItem>,
    create_calls: usize,
    ready_calls: usize,
}

/// [`AnalysisClient`] that replays scripted responses.
///
/// Readiness batches are consumed front to back; once exhausted, every
/// further poll reads as "nothing ready".
#[derive(Debug, Default)]
pub struct ScriptedAnalysisClient {
    state: Mutex<ScriptState>,
}

impl ScriptedAnalysisClient {
    /// Creates a client with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the outcome of the next task submission.
    pub fn script_create(&self, result: AnalysisClientResult<TaskReceipt>) {
        self.state().create_results.push_back(result);
    }

    /// Queues the next readiness listing.
    pub fn script_ready_batch(&self, batch: Vec<ReadyTask>) {
        self.state().ready_batches.push_back(batch);
    }

    /// Sets the outcome of fetching the given facet.
    pub fn script_facet(&self, kind: FacetKind, result: AnalysisClientResult<Option<FacetRows>>) {
        self.state().facet_results.insert(kind, result);
    }

    /// Sets the vendor-side task id inventory.
    pub fn script_task_ids(&self, items: Vec<VendorTaskListItem>) {
        self.state().task_id_list = items;
    }

    /// Returns how many submissions were attempted.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    /// Returns how many readiness polls were made.
    #[must_use]
    pub fn ready_calls(&self) -> usize {
        self.state().ready_calls
    }
}

#[async_trait]
impl AnalysisClient for ScriptedAnalysisClient {
    async fn create_task(
        &self,
        _target: &TargetUrl,
        _parameters: &CrawlParameters,
    ) -> AnalysisClientResult<TaskReceipt> {
        let mut state = self.state();
        state.create_calls += 1;
        state.create_results.pop_front().unwrap_or_else(|| {
            Err(AnalysisClientError::InvalidResponse(
                "no scripted submission outcome".to_owned(),
            ))
        })
    }

    async fn list_ready_tasks(&self) -> Vec<ReadyTask> {
        let mut state = self.state();
        state.ready_calls += 1;
        state.ready_batches.pop_front().unwrap_or_default()
    }

    async fn fetch_facet(
        &self,
        kind: FacetKind,
        _task_id: &VendorTaskId,
    ) -> AnalysisClientResult<Option<FacetRows>> {
        self.state()
            .facet_results
            .get(&kind)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn list_task_ids(&self) -> Vec<VendorTaskListItem> {
        self.state().task_id_list.clone()
    }
}
