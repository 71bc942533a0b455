//! In-memory repository for audit pipeline tests.
//!
//! Beyond the repository contract, the adapter records every write in
//! arrival order so tests can assert the pipeline's ordering guarantees,
//! and can be told to reject a given facet's store.

use crate::audit::adapters::TaskChangeHub;
use crate::audit::domain::{
    AuditTask, FacetKind, FacetRows, PersistedAuditTask, TaskStatus, UserId, VendorTaskId,
};
use crate::audit::ports::{
    AuditRepositoryError, AuditRepositoryResult, AuditTaskRepository, TaskChange, TaskChangeFeed,
    TaskChangeSubscription, TaskListEntry,
};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One recorded repository write, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOp {
    /// A task row and its vendor response were created.
    CreateTask(VendorTaskId),
    /// A task's lifecycle status was set.
    UpdateStatus(VendorTaskId, TaskStatus),
    /// One facet's rows were stored.
    StoreFacet(VendorTaskId, FacetKind),
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<StoredTask>,
    ops: Vec<RepositoryOp>,
    failing_facets: HashSet<FacetKind>,
}

#[derive(Debug)]
struct StoredTask {
    task: AuditTask,
    response: Value,
    facets: HashMap<FacetKind, FacetRows>,
}

/// Thread-safe in-memory audit repository.
#[derive(Clone)]
pub struct InMemoryAuditRepository<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<MemoryState>>,
    hub: Arc<TaskChangeHub>,
    clock: Arc<C>,
}

impl InMemoryAuditRepository<DefaultClock> {
    /// Creates an empty repository with its own change hub.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryAuditRepository<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryAuditRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty repository with an explicit clock.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            hub: Arc::new(TaskChangeHub::new()),
            clock,
        }
    }

    /// Returns the change hub backing this repository's feed.
    #[must_use]
    pub const fn hub(&self) -> &Arc<TaskChangeHub> {
        &self.hub
    }

    fn read_state(&self) -> AuditRepositoryResult<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|err| {
            AuditRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> AuditRepositoryResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|err| {
            AuditRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    /// Returns every recorded write in arrival order.
    #[must_use]
    pub fn recorded_ops(&self) -> Vec<RepositoryOp> {
        self.read_state()
            .map(|state| state.ops.clone())
            .unwrap_or_default()
    }

    /// Makes the next stores of the given facet kind fail.
    pub fn fail_facet_store(&self, kind: FacetKind) {
        if let Ok(mut state) = self.write_state() {
            state.failing_facets.insert(kind);
        }
    }

    /// Returns the facet kinds stored for the task so far.
    #[must_use]
    pub fn stored_facet_kinds(&self, task_id: &VendorTaskId) -> Vec<FacetKind> {
        self.read_state()
            .map(|state| {
                state
                    .tasks
                    .iter()
                    .find(|stored| stored.task.vendor_task_id() == task_id)
                    .map(|stored| stored.facets.keys().copied().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl<C> AuditTaskRepository for InMemoryAuditRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create_task_with_response(
        &self,
        task: &AuditTask,
        response: &Value,
    ) -> AuditRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state
            .tasks
            .iter()
            .any(|stored| stored.task.vendor_task_id() == task.vendor_task_id())
        {
            return Err(AuditRepositoryError::DuplicateTask(
                task.vendor_task_id().clone(),
            ));
        }
        state.tasks.push(StoredTask {
            task: task.clone(),
            response: response.clone(),
            facets: HashMap::new(),
        });
        state
            .ops
            .push(RepositoryOp::CreateTask(task.vendor_task_id().clone()));
        Ok(())
    }

    async fn list_for_user(&self, user: UserId) -> AuditRepositoryResult<Vec<TaskListEntry>> {
        let state = self.read_state()?;
        let mut entries: Vec<TaskListEntry> = state
            .tasks
            .iter()
            .filter(|stored| stored.task.owner() == user)
            .map(|stored| TaskListEntry {
                task_id: stored.task.vendor_task_id().clone(),
                target_url: stored.task.target().as_str().to_owned(),
                status: stored.task.status(),
                created_at: stored.task.created_at(),
                updated_at: stored.task.updated_at(),
                cost: stored.response.get("cost").and_then(Value::as_f64),
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn find_by_vendor_id(
        &self,
        task_id: &VendorTaskId,
    ) -> AuditRepositoryResult<Option<AuditTask>> {
        let state = self.read_state()?;
        Ok(state
            .tasks
            .iter()
            .find(|stored| stored.task.vendor_task_id() == task_id)
            .map(|stored| stored.task.clone()))
    }

    async fn update_status(
        &self,
        task_id: &VendorTaskId,
        status: TaskStatus,
    ) -> AuditRepositoryResult<()> {
        let now = self.clock.utc();
        let owner = {
            let mut state = self.write_state()?;
            let stored = state
                .tasks
                .iter_mut()
                .find(|stored| stored.task.vendor_task_id() == task_id)
                .ok_or_else(|| AuditRepositoryError::NotFound(task_id.clone()))?;

            // The gateway itself is unvalidated; lifecycle order is the
            // caller's responsibility.
            stored.task = AuditTask::from_persisted(PersistedAuditTask {
                vendor_task_id: stored.task.vendor_task_id().clone(),
                target: stored.task.target().clone(),
                owner: stored.task.owner(),
                status,
                created_at: stored.task.created_at(),
                updated_at: now,
            });
            let owner = stored.task.owner();
            state
                .ops
                .push(RepositoryOp::UpdateStatus(task_id.clone(), status));
            owner
        };

        self.hub.publish(
            owner,
            TaskChange {
                task_id: task_id.clone(),
                status,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn store_facet(
        &self,
        task_id: &VendorTaskId,
        rows: &FacetRows,
    ) -> AuditRepositoryResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let kind = rows.kind();
        let mut state = self.write_state()?;
        if state.failing_facets.contains(&kind) {
            return Err(AuditRepositoryError::persistence(std::io::Error::other(
                format!("injected {kind} store failure"),
            )));
        }
        let stored = state
            .tasks
            .iter_mut()
            .find(|stored| stored.task.vendor_task_id() == task_id)
            .ok_or_else(|| AuditRepositoryError::NotFound(task_id.clone()))?;
        stored.facets.insert(kind, rows.clone());
        state
            .ops
            .push(RepositoryOp::StoreFacet(task_id.clone(), kind));
        Ok(())
    }
}

impl<C> TaskChangeFeed for InMemoryAuditRepository<C>
where
    C: Clock + Send + Sync,
{
    fn subscribe(&self, user: UserId) -> TaskChangeSubscription {
        self.hub.subscribe(user)
    }
}
