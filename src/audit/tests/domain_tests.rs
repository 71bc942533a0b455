//! Domain-focused tests for targets, identifiers, facets, and reports.

use crate::audit::domain::{
    AuditDomainError, AuditTask, CrawlParameters, FacetKind, FacetRows, PageRow, ReportBuilder,
    SummaryRow, TargetUrl, TaskStatus, UserId, VendorTaskId,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[rstest]
#[case("example.com", "https://example.com/")]
#[case("  example.com/path  ", "https://example.com/path")]
#[case("http://example.com", "http://example.com/")]
#[case("https://example.com", "https://example.com/")]
fn target_url_normalises_input(#[case] input: &str, #[case] expected: &str) {
    let target = TargetUrl::parse(input).expect("target should parse");
    assert_eq!(target.as_str(), expected);
}

#[rstest]
fn target_url_rejects_blank_input_with_user_facing_message() {
    let error = TargetUrl::parse("   ").expect_err("blank target should fail");
    assert_eq!(error, AuditDomainError::EmptyTargetUrl);
    assert_eq!(error.to_string(), "please enter a URL");
}

#[rstest]
#[case("not a url")]
#[case("https://")]
fn target_url_rejects_unparseable_input(#[case] input: &str) {
    let error = TargetUrl::parse(input).expect_err("invalid target should fail");
    assert!(matches!(error, AuditDomainError::InvalidTargetUrl(_)));
}

#[rstest]
fn vendor_task_id_trims_and_rejects_empty() {
    let id = VendorTaskId::new("  abc-123  ").expect("id should parse");
    assert_eq!(id.as_str(), "abc-123");

    let error = VendorTaskId::new("   ").expect_err("blank id should fail");
    assert_eq!(error, AuditDomainError::EmptyVendorTaskId);
}

#[rstest]
fn crawl_parameters_default_to_full_analysis() {
    let parameters = CrawlParameters::default();
    assert!(!parameters.store_raw_html);
    assert!(parameters.load_resources);
    assert!(parameters.enable_javascript);
    assert!(parameters.enable_browser_rendering);
    assert!(parameters.calculate_keyword_density);
    assert_eq!(parameters.max_crawl_pages, 100);
}

#[rstest]
fn new_task_starts_pending_with_matching_timestamps(clock: DefaultClock) {
    let task = AuditTask::new(
        VendorTaskId::new("task-1").expect("valid id"),
        TargetUrl::parse("example.com").expect("valid target"),
        UserId::new(),
        &clock,
    );

    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.created_at(), task.updated_at());
}

#[rstest]
fn facet_kind_names_round_trip() {
    for kind in FacetKind::ALL {
        assert_eq!(FacetKind::try_from(kind.as_str()).ok(), Some(kind));
    }
    assert!(FacetKind::try_from("waterfalls").is_err());
}

#[rstest]
fn facet_kind_table_names_are_distinct() {
    let mut names: Vec<&str> = FacetKind::ALL.iter().map(|kind| kind.table_name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), FacetKind::ALL.len());
}

#[rstest]
fn facet_rows_know_their_kind_and_emptiness() {
    let summary = FacetRows::Summary(SummaryRow::default());
    assert_eq!(summary.kind(), FacetKind::Summary);
    assert!(!summary.is_empty());

    let pages = FacetRows::Pages(Vec::new());
    assert_eq!(pages.kind(), FacetKind::Pages);
    assert!(pages.is_empty());
}

#[rstest]
fn report_builder_places_each_facet_and_leaves_the_rest_absent() {
    let mut builder = ReportBuilder::new();
    builder.insert(FacetRows::Summary(SummaryRow {
        crawl_progress: Some("finished".to_owned()),
        ..SummaryRow::default()
    }));
    builder.insert(FacetRows::Pages(vec![PageRow {
        url: "https://example.com/".to_owned(),
        ..PageRow::default()
    }]));

    let report = builder.build();

    assert!(report.has(FacetKind::Summary));
    assert!(report.has(FacetKind::Pages));
    assert!(!report.has(FacetKind::Links));
    assert_eq!(
        report
            .summary
            .as_ref()
            .and_then(|row| row.crawl_progress.as_deref()),
        Some("finished")
    );

    let Some(FacetRows::Pages(rows)) = report.facet(FacetKind::Pages) else {
        panic!("expected page rows back from the aggregate");
    };
    assert_eq!(rows.len(), 1);
    assert!(report.facet(FacetKind::RedirectChains).is_none());
}
