//! End-to-end audit flow over the in-memory adapters.
//!
//! Drives a full run through the public crate surface: submit, wait for
//! readiness, fetch and persist, then observe the owner's task list move
//! through the lifecycle via the change feed.

use seomaven::audit::adapters::memory::{InMemoryAuditRepository, ScriptedAnalysisClient};
use seomaven::audit::domain::{
    CrawlParameters, FacetKind, FacetRows, PageRow, SummaryRow, TaskStatus, UserId, VendorTaskId,
};
use seomaven::audit::ports::{AuditTaskRepository, ReadyTask, TaskReceipt};
use seomaven::audit::services::{AuditPipeline, SubmitAuditRequest, TaskListService};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn accepted_receipt(id: &str) -> TaskReceipt {
    TaskReceipt {
        task_id: VendorTaskId::new(id).expect("valid id"),
        status_code: 20_100,
        status_message: "Task Created.".to_owned(),
        cost: 0.0125,
        raw_response: json!({ "id": id, "status_code": 20_100, "cost": 0.0125 }),
    }
}

#[tokio::test(start_paused = true)]
async fn audit_run_reaches_completion_and_updates_the_task_list() {
    let analysis = Arc::new(ScriptedAnalysisClient::new());
    let repository = Arc::new(InMemoryAuditRepository::new());
    let pipeline = AuditPipeline::new(Arc::clone(&analysis), Arc::clone(&repository));
    let task_list = TaskListService::new(Arc::clone(&repository));
    let owner = UserId::new();

    analysis.script_create(Ok(accepted_receipt("task-42")));
    analysis.script_ready_batch(Vec::new());
    analysis.script_ready_batch(vec![ReadyTask {
        id: "task-42".to_owned(),
        target: Some("https://example.com/".to_owned()),
        date_posted: None,
    }]);
    analysis.script_facet(
        FacetKind::Summary,
        Ok(Some(FacetRows::Summary(SummaryRow {
            crawl_progress: Some("finished".to_owned()),
            pages_crawled: Some(12),
            ..SummaryRow::default()
        }))),
    );
    analysis.script_facet(
        FacetKind::Pages,
        Ok(Some(FacetRows::Pages(vec![PageRow {
            url: "https://example.com/".to_owned(),
            status_code: Some(200),
            ..PageRow::default()
        }]))),
    );

    let mut subscription = task_list.subscribe(owner);

    let (task_id, report) = pipeline
        .run(
            &SubmitAuditRequest {
                target: "example.com".to_owned(),
                owner,
                parameters: CrawlParameters::default(),
            },
            &CancellationToken::new(),
        )
        .await
        .expect("run should complete");

    assert!(report.has(FacetKind::Summary));
    assert!(report.has(FacetKind::Pages));

    // The change feed saw the lifecycle in order.
    let first = subscription
        .next_change()
        .await
        .expect("processing change should arrive");
    assert_eq!(first.status, TaskStatus::Processing);
    let second = subscription
        .next_change()
        .await
        .expect("completion change should arrive");
    assert_eq!(second.status, TaskStatus::Completed);

    // Applying the buffered changes to a stale view converges with a
    // fresh load.
    let mut stale = task_list.load(owner).await.expect("load should succeed");
    let loaded = stale.entries().first().expect("one task listed");
    assert_eq!(loaded.task_id, task_id);

    let mut replayed = seomaven::audit::services::TaskListView::new(vec![
        seomaven::audit::ports::TaskListEntry {
            status: TaskStatus::Pending,
            ..loaded.clone()
        },
    ]);
    assert!(replayed.apply(&first));
    assert!(replayed.apply(&second));
    assert_eq!(
        replayed.entries().first().map(|entry| entry.status),
        Some(TaskStatus::Completed)
    );

    stale.replace(
        repository
            .list_for_user(owner)
            .await
            .expect("listing should succeed"),
    );
    assert_eq!(
        stale.entries().first().map(|entry| entry.status),
        Some(TaskStatus::Completed)
    );

    let task = repository
        .find_by_vendor_id(&task_id)
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(
        repository.stored_facet_kinds(&task_id).len(),
        2,
        "summary and pages should both be stored"
    );
}
