//! Per-user task list projection with live change application.

use crate::audit::domain::UserId;
use crate::audit::ports::{
    AuditRepositoryResult, AuditTaskRepository, TaskChange, TaskChangeFeed, TaskChangeSubscription,
    TaskListEntry,
};
use std::sync::Arc;

/// Loads per-user task lists and wires change subscriptions.
#[derive(Clone)]
pub struct TaskListService<R>
where
    R: AuditTaskRepository + TaskChangeFeed,
{
    repository: Arc<R>,
}

impl<R> TaskListService<R>
where
    R: AuditTaskRepository + TaskChangeFeed,
{
    /// Creates a task list service over the repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Loads the user's current task list, newest first.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the listing cannot be read.
    pub async fn load(&self, user: UserId) -> AuditRepositoryResult<TaskListView> {
        let entries = self.repository.list_for_user(user).await?;
        Ok(TaskListView::new(entries))
    }

    /// Subscribes to changes of the user's tasks.
    ///
    /// At most one subscription is live per user; subscribing again
    /// replaces the previous one.
    #[must_use]
    pub fn subscribe(&self, user: UserId) -> TaskChangeSubscription {
        self.repository.subscribe(user)
    }
}

/// Materialised task list for one user.
///
/// Changes apply in place: a notification updates the matching entry's
/// status and timestamp without reordering the list or touching any other
/// field. A full reload replaces the view wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListView {
    entries: Vec<TaskListEntry>,
}

impl TaskListView {
    /// Creates a view over loaded entries.
    #[must_use]
    pub const fn new(entries: Vec<TaskListEntry>) -> Self {
        Self { entries }
    }

    /// Returns the entries in their loaded order.
    #[must_use]
    pub fn entries(&self) -> &[TaskListEntry] {
        &self.entries
    }

    /// Applies one change notification in place.
    ///
    /// Returns `true` when an entry matched; a change for a task the view
    /// does not hold is ignored.
    pub fn apply(&mut self, change: &TaskChange) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.task_id == change.task_id)
        else {
            return false;
        };
        entry.status = change.status;
        entry.updated_at = change.updated_at;
        true
    }

    /// Replaces the view with freshly loaded entries.
    pub fn replace(&mut self, entries: Vec<TaskListEntry>) {
        self.entries = entries;
    }
}
