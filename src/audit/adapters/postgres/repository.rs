//! `PostgreSQL` repository implementation for audit task persistence.

use super::{
    models::{
        NewDuplicateContentRow, NewDuplicateTagRow, NewKeywordDensityRow, NewLinkRow,
        NewNonIndexableRow, NewPageRow, NewRedirectChainRow, NewResourceRow, NewSummaryRow,
        NewTaskResponseRow, NewTaskRow, TaskRow,
    },
    schema::{
        seo_duplicate_content, seo_duplicate_tags, seo_keyword_density, seo_links,
        seo_non_indexable, seo_pages, seo_redirect_chains, seo_resources, seo_summaries,
        seo_task_responses, seo_tasks,
    },
};
use crate::audit::adapters::TaskChangeHub;
use crate::audit::domain::{
    AuditTask, FacetRows, PersistedAuditTask, TargetUrl, TaskStatus, UserId, VendorTaskId,
};
use crate::audit::ports::{
    AuditRepositoryError, AuditRepositoryResult, AuditTaskRepository, TaskChange, TaskChangeFeed,
    TaskChangeSubscription, TaskListEntry,
};
use crate::config::DatabaseSettings;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by audit adapters.
pub type AuditPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed audit task repository.
///
/// Also serves as the change feed: every successful status write publishes
/// a [`TaskChange`] to the shared hub.
pub struct PostgresAuditRepository<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    pool: AuditPgPool,
    hub: Arc<TaskChangeHub>,
    clock: Arc<C>,
}

impl PostgresAuditRepository<DefaultClock> {
    /// Creates a repository over an existing connection pool.
    #[must_use]
    pub fn new(pool: AuditPgPool, hub: Arc<TaskChangeHub>) -> Self {
        Self::with_clock(pool, hub, Arc::new(DefaultClock))
    }

    /// Builds a pool from database settings and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`AuditRepositoryError::Persistence`] when the pool cannot
    /// be established.
    pub fn connect(
        settings: &DatabaseSettings,
        hub: Arc<TaskChangeHub>,
    ) -> AuditRepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(settings.pool_url());
        let pool = Pool::builder()
            .build(manager)
            .map_err(AuditRepositoryError::persistence)?;
        Ok(Self::new(pool, hub))
    }
}

impl<C> PostgresAuditRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a repository with an explicit clock.
    #[must_use]
    pub const fn with_clock(pool: AuditPgPool, hub: Arc<TaskChangeHub>, clock: Arc<C>) -> Self {
        Self { pool, hub, clock }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AuditRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AuditRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditRepositoryError::persistence)?
    }
}

#[async_trait]
impl<C> AuditTaskRepository for PostgresAuditRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create_task_with_response(
        &self,
        task: &AuditTask,
        response: &Value,
    ) -> AuditRepositoryResult<()> {
        let task_id = task.vendor_task_id().clone();
        let new_task = NewTaskRow {
            task_id: task.vendor_task_id().as_str().to_owned(),
            user_id: task.owner().into_inner(),
            target_url: task.target().as_str().to_owned(),
            status: task.status().as_str().to_owned(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        };
        let new_response = NewTaskResponseRow {
            task_id: new_task.task_id.clone(),
            response_data: response.clone(),
            created_at: task.created_at(),
        };

        self.run_blocking(move |connection| {
            connection
                .transaction(|txn| {
                    diesel::insert_into(seo_tasks::table)
                        .values(&new_task)
                        .execute(txn)?;
                    diesel::insert_into(seo_task_responses::table)
                        .values(&new_response)
                        .execute(txn)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AuditRepositoryError::DuplicateTask(task_id.clone())
                    }
                    _ => AuditRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn list_for_user(&self, user: UserId) -> AuditRepositoryResult<Vec<TaskListEntry>> {
        let user_uuid = user.into_inner();
        self.run_blocking(move |connection| {
            let rows = seo_tasks::table
                .filter(seo_tasks::user_id.eq(user_uuid))
                .order(seo_tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(AuditRepositoryError::persistence)?;

            let ids: Vec<String> = rows.iter().map(|row| row.task_id.clone()).collect();
            let responses: Vec<(String, Value)> = seo_task_responses::table
                .filter(seo_task_responses::task_id.eq_any(&ids))
                .select((seo_task_responses::task_id, seo_task_responses::response_data))
                .load(connection)
                .map_err(AuditRepositoryError::persistence)?;
            let cost_by_id: HashMap<String, f64> = responses
                .into_iter()
                .filter_map(|(id, payload)| {
                    payload
                        .get("cost")
                        .and_then(Value::as_f64)
                        .map(|cost| (id, cost))
                })
                .collect();

            rows.into_iter()
                .map(|row| {
                    let cost = cost_by_id.get(&row.task_id).copied();
                    let status = TaskStatus::try_from(row.status.as_str())
                        .map_err(AuditRepositoryError::persistence)?;
                    let task_id = VendorTaskId::new(row.task_id)
                        .map_err(AuditRepositoryError::persistence)?;
                    Ok(TaskListEntry {
                        task_id,
                        target_url: row.target_url,
                        status,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                        cost,
                    })
                })
                .collect()
        })
        .await
    }

    async fn find_by_vendor_id(
        &self,
        task_id: &VendorTaskId,
    ) -> AuditRepositoryResult<Option<AuditTask>> {
        let lookup_id = task_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = seo_tasks::table
                .filter(seo_tasks::task_id.eq(lookup_id))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(AuditRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update_status(
        &self,
        task_id: &VendorTaskId,
        status: TaskStatus,
    ) -> AuditRepositoryResult<()> {
        let row_id = task_id.as_str().to_owned();
        let now = self.clock.utc();
        let owner = self
            .run_blocking(move |connection| {
                diesel::update(seo_tasks::table.filter(seo_tasks::task_id.eq(row_id)))
                    .set((
                        seo_tasks::status.eq(status.as_str()),
                        seo_tasks::updated_at.eq(now),
                    ))
                    .returning(seo_tasks::user_id)
                    .get_result::<uuid::Uuid>(connection)
                    .optional()
                    .map_err(AuditRepositoryError::persistence)
            })
            .await?;

        let Some(owner) = owner else {
            return Err(AuditRepositoryError::NotFound(task_id.clone()));
        };
        self.hub.publish(
            UserId::from_uuid(owner),
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
        let row_id = task_id.as_str().to_owned();
        let facet = rows.clone();
        self.run_blocking(move |connection| {
            insert_facet(connection, &row_id, &facet).map_err(AuditRepositoryError::persistence)
        })
        .await
    }
}

impl<C> TaskChangeFeed for PostgresAuditRepository<C>
where
    C: Clock + Send + Sync,
{
    fn subscribe(&self, user: UserId) -> TaskChangeSubscription {
        self.hub.subscribe(user)
    }
}

fn row_to_task(row: TaskRow) -> AuditRepositoryResult<AuditTask> {
    let vendor_task_id =
        VendorTaskId::new(row.task_id).map_err(AuditRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(AuditRepositoryError::persistence)?;

    Ok(AuditTask::from_persisted(PersistedAuditTask {
        vendor_task_id,
        target: TargetUrl::from_persisted(row.target_url),
        owner: UserId::from_uuid(row.user_id),
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn insert_facet(
    connection: &mut PgConnection,
    task_id: &str,
    rows: &FacetRows,
) -> Result<(), DieselError> {
    match rows {
        FacetRows::Summary(row) => {
            diesel::insert_into(seo_summaries::table)
                .values(&NewSummaryRow::from_domain(task_id, row))
                .execute(connection)?;
        }
        FacetRows::Pages(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewPageRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_pages::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::Resources(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewResourceRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_resources::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::Links(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewLinkRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_links::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::NonIndexable(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewNonIndexableRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_non_indexable::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::DuplicateTags(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewDuplicateTagRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_duplicate_tags::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::DuplicateContent(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewDuplicateContentRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_duplicate_content::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::KeywordDensity(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewKeywordDensityRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_keyword_density::table)
                .values(&records)
                .execute(connection)?;
        }
        FacetRows::RedirectChains(items) => {
            let records: Vec<_> = items
                .iter()
                .map(|row| NewRedirectChainRow::from_domain(task_id, row))
                .collect();
            diesel::insert_into(seo_redirect_chains::table)
                .values(&records)
                .execute(connection)?;
        }
    }
    Ok(())
}
