//! Pipeline orchestration tests over the in-memory adapters.

use crate::audit::adapters::memory::{
    InMemoryAuditRepository, RepositoryOp, ScriptedAnalysisClient,
};
use crate::audit::domain::{
    AuditDomainError, CrawlParameters, FacetKind, FacetRows, PageRow, SummaryRow, TaskStatus,
    UserId, VendorTaskId,
};
use crate::audit::ports::{
    AnalysisClientError, AuditRepositoryError, AuditTaskRepository, ReadyTask, TaskReceipt,
};
use crate::audit::services::{
    AuditPipeline, AuditPipelineError, DEFAULT_POLL_INTERVAL, SubmitAuditRequest,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type TestPipeline = AuditPipeline<ScriptedAnalysisClient, InMemoryAuditRepository, DefaultClock>;

struct Harness {
    analysis: Arc<ScriptedAnalysisClient>,
    repository: Arc<InMemoryAuditRepository>,
    pipeline: TestPipeline,
}

#[fixture]
fn harness() -> Harness {
    let analysis = Arc::new(ScriptedAnalysisClient::new());
    let repository = Arc::new(InMemoryAuditRepository::new());
    let pipeline = AuditPipeline::new(Arc::clone(&analysis), Arc::clone(&repository));
    Harness {
        analysis,
        repository,
        pipeline,
    }
}

fn accepted_receipt(id: &str) -> TaskReceipt {
    TaskReceipt {
        task_id: VendorTaskId::new(id).expect("valid id"),
        status_code: 20_100,
        status_message: "Task Created.".to_owned(),
        cost: 0.0125,
        raw_response: json!({ "id": id, "status_code": 20_100, "cost": 0.0125 }),
    }
}

fn request(target: &str) -> SubmitAuditRequest {
    SubmitAuditRequest {
        target: target.to_owned(),
        owner: UserId::new(),
        parameters: CrawlParameters::default(),
    }
}

fn ready(id: &str) -> ReadyTask {
    ReadyTask {
        id: id.to_owned(),
        target: None,
        date_posted: None,
    }
}

fn summary_rows() -> FacetRows {
    FacetRows::Summary(SummaryRow {
        crawl_progress: Some("finished".to_owned()),
        ..SummaryRow::default()
    })
}

fn page_rows() -> FacetRows {
    FacetRows::Pages(vec![PageRow {
        url: "https://example.com/".to_owned(),
        ..PageRow::default()
    }])
}

fn task_id(id: &str) -> VendorTaskId {
    VendorTaskId::new(id).expect("valid id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submit_validates_target_before_contacting_vendor(harness: Harness) {
    let result = harness.pipeline.submit(&request("   ")).await;

    assert!(matches!(
        result,
        Err(AuditPipelineError::Domain(AuditDomainError::EmptyTargetUrl))
    ));
    assert_eq!(harness.analysis.create_calls(), 0);
    assert!(harness.repository.recorded_ops().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submit_persists_accepted_task_with_response(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    let submit_request = request("example.com");

    let task = harness
        .pipeline
        .submit(&submit_request)
        .await
        .expect("submission should succeed");

    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.target().as_str(), "https://example.com/");
    assert_eq!(
        harness.repository.recorded_ops(),
        vec![RepositoryOp::CreateTask(task_id("task-9"))]
    );

    let entries = harness
        .repository
        .list_for_user(submit_request.owner)
        .await
        .expect("listing should succeed");
    let entry = entries.first().expect("one task listed");
    assert_eq!(entry.status, TaskStatus::Pending);
    assert_eq!(entry.cost, Some(0.0125));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vendor_rejection_persists_nothing(harness: Harness) {
    harness.analysis.script_create(Err(AnalysisClientError::Vendor {
        code: 40_501,
        message: "Invalid Field: 'target'.".to_owned(),
    }));

    let result = harness.pipeline.submit(&request("example.com")).await;

    assert!(matches!(
        result,
        Err(AuditPipelineError::Analysis(AnalysisClientError::Vendor {
            code: 40_501,
            ..
        }))
    ));
    assert!(harness.repository.recorded_ops().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_vendor_id_surfaces_repository_error(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));

    harness
        .pipeline
        .submit(&request("example.com"))
        .await
        .expect("first submission should succeed");
    let result = harness.pipeline.submit(&request("example.com")).await;

    assert!(matches!(
        result,
        Err(AuditPipelineError::Repository(
            AuditRepositoryError::DuplicateTask(_)
        ))
    ));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn poll_checks_immediately_then_at_constant_interval(harness: Harness) {
    harness.analysis.script_ready_batch(Vec::new());
    harness.analysis.script_ready_batch(Vec::new());
    harness.analysis.script_ready_batch(vec![ready("task-9")]);

    let started = tokio::time::Instant::now();
    harness
        .pipeline
        .poll_until_ready(&task_id("task-9"), &CancellationToken::new())
        .await
        .expect("task should become ready");

    assert_eq!(started.elapsed(), 2 * DEFAULT_POLL_INTERVAL);
    assert_eq!(harness.analysis.ready_calls(), 3);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn poll_ignores_other_ready_tasks(harness: Harness) {
    harness
        .analysis
        .script_ready_batch(vec![ready("someone-else")]);
    harness
        .analysis
        .script_ready_batch(vec![ready("someone-else"), ready("task-9")]);

    harness
        .pipeline
        .poll_until_ready(&task_id("task-9"), &CancellationToken::new())
        .await
        .expect("task should become ready");

    assert_eq!(harness.analysis.ready_calls(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn poll_stops_without_calling_vendor_when_already_cancelled(harness: Harness) {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = harness
        .pipeline
        .poll_until_ready(&task_id("task-9"), &cancel)
        .await;

    assert!(matches!(result, Err(AuditPipelineError::Cancelled)));
    assert_eq!(harness.analysis.ready_calls(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn poll_stops_when_cancelled_mid_wait(harness: Harness) {
    let cancel = CancellationToken::new();
    let pipeline = harness.pipeline.clone();
    let poll_cancel = cancel.clone();
    let poll = tokio::spawn(async move {
        pipeline
            .poll_until_ready(&task_id("task-9"), &poll_cancel)
            .await
    });

    // Let the first poll and the sleep registration happen, then cancel.
    tokio::task::yield_now().await;
    cancel.cancel();

    let result = poll.await.expect("poll task should not panic");
    assert!(matches!(result, Err(AuditPipelineError::Cancelled)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_marks_processing_before_stores_and_completed_last(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    harness
        .analysis
        .script_facet(FacetKind::Summary, Ok(Some(summary_rows())));
    harness
        .analysis
        .script_facet(FacetKind::Pages, Ok(Some(page_rows())));
    let task = harness
        .pipeline
        .submit(&request("example.com"))
        .await
        .expect("submission should succeed");

    let report = harness
        .pipeline
        .fetch_and_store(task.vendor_task_id())
        .await
        .expect("fetch and store should succeed");

    assert!(report.has(FacetKind::Summary));
    assert!(report.has(FacetKind::Pages));
    assert!(!report.has(FacetKind::Links));

    let ops = harness.repository.recorded_ops();
    let id = task_id("task-9");
    let processing_at = ops
        .iter()
        .position(|op| *op == RepositoryOp::UpdateStatus(id.clone(), TaskStatus::Processing))
        .expect("task should have been marked processing");
    let first_store = ops
        .iter()
        .position(|op| matches!(op, RepositoryOp::StoreFacet(_, _)))
        .expect("facets should have been stored");
    let store_count = ops
        .iter()
        .filter(|op| matches!(op, RepositoryOp::StoreFacet(_, _)))
        .count();

    assert!(processing_at < first_store);
    assert_eq!(store_count, 2);
    assert_eq!(
        ops.last(),
        Some(&RepositoryOp::UpdateStatus(id, TaskStatus::Completed))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_failure_marks_failed_and_never_completes(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    harness
        .analysis
        .script_facet(FacetKind::Summary, Ok(Some(summary_rows())));
    harness
        .analysis
        .script_facet(FacetKind::Pages, Ok(Some(page_rows())));
    harness.repository.fail_facet_store(FacetKind::Pages);
    let task = harness
        .pipeline
        .submit(&request("example.com"))
        .await
        .expect("submission should succeed");

    let result = harness.pipeline.fetch_and_store(task.vendor_task_id()).await;

    assert!(matches!(
        result,
        Err(AuditPipelineError::Repository(
            AuditRepositoryError::Persistence(_)
        ))
    ));

    let ops = harness.repository.recorded_ops();
    let id = task_id("task-9");
    assert_eq!(
        ops.last(),
        Some(&RepositoryOp::UpdateStatus(id.clone(), TaskStatus::Failed))
    );
    assert!(!ops
        .iter()
        .any(|op| *op == RepositoryOp::UpdateStatus(id.clone(), TaskStatus::Completed)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_failure_marks_failed_without_storing(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    harness
        .analysis
        .script_facet(FacetKind::Summary, Ok(Some(summary_rows())));
    harness.analysis.script_facet(
        FacetKind::Links,
        Err(AnalysisClientError::Vendor {
            code: 50_000,
            message: "Internal Error.".to_owned(),
        }),
    );
    let task = harness
        .pipeline
        .submit(&request("example.com"))
        .await
        .expect("submission should succeed");

    let result = harness.pipeline.fetch_and_store(task.vendor_task_id()).await;

    assert!(matches!(result, Err(AuditPipelineError::Analysis(_))));

    let ops = harness.repository.recorded_ops();
    assert!(!ops.iter().any(|op| matches!(op, RepositoryOp::StoreFacet(_, _))));
    assert_eq!(
        ops.last(),
        Some(&RepositoryOp::UpdateStatus(
            task_id("task-9"),
            TaskStatus::Failed
        ))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_facets_are_fetched_but_not_stored(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    harness
        .analysis
        .script_facet(FacetKind::Summary, Ok(Some(summary_rows())));
    harness
        .analysis
        .script_facet(FacetKind::Pages, Ok(Some(FacetRows::Pages(Vec::new()))));
    let task = harness
        .pipeline
        .submit(&request("example.com"))
        .await
        .expect("submission should succeed");

    let report = harness
        .pipeline
        .fetch_and_store(task.vendor_task_id())
        .await
        .expect("fetch and store should succeed");

    assert!(report.has(FacetKind::Pages));
    assert_eq!(
        harness.repository.stored_facet_kinds(task.vendor_task_id()),
        vec![FacetKind::Summary]
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn run_completes_the_full_lifecycle(harness: Harness) {
    harness
        .analysis
        .script_create(Ok(accepted_receipt("task-9")));
    harness.analysis.script_ready_batch(Vec::new());
    harness.analysis.script_ready_batch(vec![ready("task-9")]);
    harness
        .analysis
        .script_facet(FacetKind::Summary, Ok(Some(summary_rows())));

    let (id, report) = harness
        .pipeline
        .run(&request("example.com"), &CancellationToken::new())
        .await
        .expect("run should complete");

    assert_eq!(id, task_id("task-9"));
    assert!(report.has(FacetKind::Summary));

    let task = harness
        .repository
        .find_by_vendor_id(&id)
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(task.status(), TaskStatus::Completed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn vendor_task_inventory_passes_through(harness: Harness) {
    let item = crate::audit::ports::VendorTaskListItem {
        id: "task-9".to_owned(),
        url: Some("https://example.com/".to_owned()),
        status: Some("task_handed".to_owned()),
        ..crate::audit::ports::VendorTaskListItem::default()
    };
    harness.analysis.script_task_ids(vec![item.clone()]);

    assert_eq!(harness.pipeline.vendor_task_inventory().await, vec![item]);
}
