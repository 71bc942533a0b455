//! Vendor envelope parsing and facet row mapping.
//!
//! Every vendor response wraps results in the same envelope:
//! `{ tasks: [ { id, status_code, status_message, cost, result: [...] } ] }`.
//! The helpers here unwrap that envelope and normalise per-facet result
//! payloads into domain rows, keeping the HTTP client itself thin.

use crate::audit::domain::{
    DuplicateContentRow, DuplicateTagRow, FacetKind, FacetRows, KeywordDensityRow, LinkRow,
    NonIndexableRow, PageRow, RedirectChainRow, ResourceRow, SummaryRow, VendorTaskId,
};
use crate::audit::ports::{
    AnalysisClientError, AnalysisClientResult, ReadyTask, TaskReceipt, VendorTaskListItem,
    is_vendor_error_code,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Unwraps the first task entry of a vendor envelope.
fn first_task(envelope: &Value) -> Option<&Value> {
    envelope.get("tasks")?.as_array()?.first()
}

/// Unwraps `tasks[0].result[0]` of a vendor envelope.
pub(crate) fn first_result(envelope: &Value) -> Option<&Value> {
    first_task(envelope)?.get("result")?.as_array()?.first()
}

/// Extracts the most specific failure message a vendor error body carries.
pub(crate) fn failure_message(payload: &Value) -> Option<String> {
    if let Some(message) = payload.get("error_message").and_then(Value::as_str) {
        return Some(message.to_owned());
    }
    first_task(payload)?
        .get("status_message")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Parses the acknowledgement of a `task_post` submission.
pub(crate) fn parse_task_receipt(envelope: &Value) -> AnalysisClientResult<TaskReceipt> {
    let task = first_task(envelope).ok_or_else(|| {
        AnalysisClientError::InvalidResponse("missing tasks array".to_owned())
    })?;

    let status_code = task
        .get("status_code")
        .and_then(Value::as_u64)
        .and_then(|code| u32::try_from(code).ok())
        .ok_or_else(|| {
            AnalysisClientError::InvalidResponse("missing task status code".to_owned())
        })?;
    let status_message = task
        .get("status_message")
        .and_then(Value::as_str)
        .unwrap_or("API Error")
        .to_owned();

    if is_vendor_error_code(status_code) {
        return Err(AnalysisClientError::Vendor {
            code: status_code,
            message: status_message,
        });
    }

    let task_id = task
        .get("id")
        .and_then(Value::as_str)
        .map(VendorTaskId::new)
        .transpose()
        .ok()
        .flatten()
        .ok_or_else(|| {
            AnalysisClientError::InvalidResponse("no task ID received".to_owned())
        })?;

    Ok(TaskReceipt {
        task_id,
        status_code,
        status_message,
        cost: task.get("cost").and_then(Value::as_f64).unwrap_or(0.0),
        raw_response: task.clone(),
    })
}

/// Parses the `tasks_ready` listing; any shape surprise yields an empty
/// list.
pub(crate) fn parse_ready_tasks(envelope: &Value) -> Vec<ReadyTask> {
    parse_result_sequence(envelope)
}

/// Parses the `id_list` inventory; any shape surprise yields an empty list.
pub(crate) fn parse_task_id_list(envelope: &Value) -> Vec<VendorTaskListItem> {
    parse_result_sequence(envelope)
}

fn parse_result_sequence<T: DeserializeOwned>(envelope: &Value) -> Vec<T> {
    first_task(envelope)
        .and_then(|task| task.get("result"))
        .cloned()
        .and_then(|result| serde_json::from_value::<Vec<Option<T>>>(result).ok())
        .map(|entries| entries.into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Maps one facet result payload into normalised domain rows.
pub(crate) fn map_facet(kind: FacetKind, result: &Value) -> AnalysisClientResult<FacetRows> {
    match kind {
        FacetKind::Summary => Ok(FacetRows::Summary(map_summary(result))),
        FacetKind::Pages => Ok(FacetRows::Pages(
            parse_items::<PageItemWire>(kind, result)?
                .into_iter()
                .map(PageItemWire::into_row)
                .collect(),
        )),
        FacetKind::Resources => Ok(FacetRows::Resources(
            parse_items::<ResourceItemWire>(kind, result)?
                .into_iter()
                .map(ResourceItemWire::into_row)
                .collect(),
        )),
        FacetKind::Links => Ok(FacetRows::Links(
            parse_items::<LinkItemWire>(kind, result)?
                .into_iter()
                .map(LinkItemWire::into_row)
                .collect(),
        )),
        FacetKind::NonIndexable => Ok(FacetRows::NonIndexable(
            parse_items::<NonIndexableItemWire>(kind, result)?
                .into_iter()
                .map(NonIndexableItemWire::into_row)
                .collect(),
        )),
        FacetKind::DuplicateTags => Ok(FacetRows::DuplicateTags(
            parse_items::<DuplicateTagItemWire>(kind, result)?
                .into_iter()
                .map(DuplicateTagItemWire::into_row)
                .collect(),
        )),
        FacetKind::DuplicateContent => Ok(FacetRows::DuplicateContent(
            parse_items::<DuplicateContentItemWire>(kind, result)?
                .into_iter()
                .map(DuplicateContentItemWire::into_row)
                .collect(),
        )),
        FacetKind::KeywordDensity => Ok(FacetRows::KeywordDensity(
            parse_items::<KeywordDensityItemWire>(kind, result)?
                .into_iter()
                .map(KeywordDensityItemWire::into_row)
                .collect(),
        )),
        FacetKind::RedirectChains => Ok(FacetRows::RedirectChains(
            parse_items::<RedirectChainItemWire>(kind, result)?
                .into_iter()
                .map(RedirectChainItemWire::into_row)
                .collect(),
        )),
    }
}

/// Deserialises the `items` array of a facet result, tolerating a missing
/// or null array and dropping null entries.
fn parse_items<T: DeserializeOwned>(
    kind: FacetKind,
    result: &Value,
) -> AnalysisClientResult<Vec<T>> {
    let Some(items) = result.get("items") else {
        return Ok(Vec::new());
    };
    if items.is_null() {
        return Ok(Vec::new());
    }
    let entries: Vec<Option<T>> = serde_json::from_value(items.clone()).map_err(|err| {
        AnalysisClientError::InvalidResponse(format!("malformed {kind} items: {err}"))
    })?;
    Ok(entries.into_iter().flatten().collect())
}

fn map_summary(result: &Value) -> SummaryRow {
    let crawl_status = result.get("crawl_status").cloned();
    let page_metrics = result.get("page_metrics").cloned();
    let metric = |name: &str| {
        page_metrics
            .as_ref()
            .and_then(|metrics| metrics.get(name))
            .and_then(Value::as_i64)
    };

    SummaryRow {
        crawl_progress: result
            .get("crawl_progress")
            .and_then(Value::as_str)
            .map(str::to_owned),
        pages_crawled: crawl_status
            .as_ref()
            .and_then(|status| status.get("pages_crawled"))
            .and_then(Value::as_i64),
        total_pages: result
            .get("domain_info")
            .and_then(|info| info.get("total_pages"))
            .and_then(Value::as_i64),
        broken_links_count: metric("broken_links"),
        broken_resources_count: metric("broken_resources"),
        duplicate_title_count: metric("duplicate_title"),
        duplicate_description_count: metric("duplicate_description"),
        duplicate_content_count: metric("duplicate_content"),
        internal_links_count: metric("links_internal"),
        external_links_count: metric("links_external"),
        checks: page_metrics
            .as_ref()
            .and_then(|metrics| metrics.get("checks"))
            .cloned(),
        schema_types: result.get("schema_types").cloned(),
        crawl_status,
        page_metrics,
    }
}

/// Parses the vendor's timestamp format (`2024-01-15 12:00:00 +00:00`),
/// falling back to RFC 3339.
fn parse_vendor_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?;
    DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageTimingWire {
    download_time: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageItemWire {
    url: Option<String>,
    status_code: Option<i64>,
    size: Option<i64>,
    page_timing: Option<PageTimingWire>,
    content_encoding: Option<String>,
    media_type: Option<String>,
    meta: Option<Value>,
}

impl PageItemWire {
    fn into_row(self) -> PageRow {
        PageRow {
            url: self.url.unwrap_or_default(),
            status_code: self.status_code,
            size: self.size,
            load_time: self.page_timing.and_then(|timing| timing.download_time),
            content_encoding: self.content_encoding,
            media_type: self.media_type,
            meta: self.meta,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResourceItemWire {
    url: Option<String>,
    resource_type: Option<String>,
    size: Option<i64>,
    encoded_size: Option<i64>,
    total_transfer_size: Option<i64>,
    fetch_time: Option<String>,
    fetch_timing: Option<Value>,
}

impl ResourceItemWire {
    fn into_row(self) -> ResourceRow {
        ResourceRow {
            url: self.url.unwrap_or_default(),
            resource_type: self.resource_type,
            size: self.size,
            encoded_size: self.encoded_size,
            total_transfer_size: self.total_transfer_size,
            fetch_time: parse_vendor_time(self.fetch_time.as_deref()),
            fetch_timing: self.fetch_timing,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LinkItemWire {
    link_from: Option<String>,
    link_to: Option<String>,
    #[serde(rename = "type")]
    link_type: Option<String>,
    dofollow: Option<bool>,
    link_attribute: Option<Value>,
}

impl LinkItemWire {
    fn into_row(self) -> LinkRow {
        LinkRow {
            url_from: self.link_from.unwrap_or_default(),
            url_to: self.link_to.unwrap_or_default(),
            link_type: self.link_type,
            dofollow: self.dofollow,
            link_attributes: self.link_attribute,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NonIndexableItemWire {
    url: Option<String>,
    reason: Option<String>,
    meta_robots: Option<Value>,
}

impl NonIndexableItemWire {
    fn into_row(self) -> NonIndexableRow {
        NonIndexableRow {
            url: self.url.unwrap_or_default(),
            reason: self.reason,
            meta_robots: self.meta_robots,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DuplicateTagItemWire {
    accumulator: Option<String>,
    count: Option<i64>,
    pages: Option<Value>,
    urls: Option<Value>,
}

impl DuplicateTagItemWire {
    fn into_row(self) -> DuplicateTagRow {
        DuplicateTagRow {
            accumulator: self.accumulator.unwrap_or_default(),
            total_count: self.count,
            pages: self.pages,
            urls: self.urls,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DuplicateContentItemWire {
    url: Option<String>,
    total_count: Option<i64>,
    pages: Option<Value>,
}

impl DuplicateContentItemWire {
    fn into_row(self) -> DuplicateContentRow {
        DuplicateContentRow {
            url: self.url.unwrap_or_default(),
            total_count: self.total_count,
            pages: self.pages,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeywordDensityItemWire {
    keyword: Option<String>,
    frequency: Option<i64>,
    density: Option<f64>,
}

impl KeywordDensityItemWire {
    fn into_row(self) -> KeywordDensityRow {
        KeywordDensityRow {
            keyword: self.keyword.unwrap_or_default(),
            frequency: self.frequency.unwrap_or_default(),
            density: self.density.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RedirectChainItemWire {
    url: Option<String>,
    is_redirect_loop: Option<bool>,
    chain: Option<Value>,
}

impl RedirectChainItemWire {
    fn into_row(self) -> RedirectChainRow {
        RedirectChainRow {
            url: self.url.unwrap_or_default(),
            is_redirect_loop: self.is_redirect_loop,
            chain: self.chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn receipt_parses_created_task() {
        let envelope = json!({
            "tasks": [{
                "id": "01170401-1535-0216-0000-d17b4647e692",
                "status_code": 20_100,
                "status_message": "Task Created.",
                "cost": 0.0125,
                "result": null
            }]
        });

        let receipt = parse_task_receipt(&envelope).expect("receipt should parse");
        assert_eq!(
            receipt.task_id.as_str(),
            "01170401-1535-0216-0000-d17b4647e692"
        );
        assert_eq!(receipt.status_code, 20_100);
        assert!(receipt.cost > 0.0);
    }

    #[test]
    fn receipt_rejects_missing_tasks_array() {
        let envelope = json!({ "status_code": 20_000 });

        let error = parse_task_receipt(&envelope).expect_err("parse should fail");

        assert!(matches!(error, AnalysisClientError::InvalidResponse(_)));
    }

    #[test]
    fn receipt_rejects_empty_tasks_array() {
        let envelope = json!({ "tasks": [] });

        let error = parse_task_receipt(&envelope).expect_err("parse should fail");

        assert!(matches!(error, AnalysisClientError::InvalidResponse(_)));
    }

    #[test]
    fn receipt_surfaces_vendor_failure_message() {
        let envelope = json!({
            "tasks": [{
                "id": "x",
                "status_code": 40_501,
                "status_message": "Invalid Field: 'target'."
            }]
        });

        let error = parse_task_receipt(&envelope).expect_err("parse should fail");

        assert!(matches!(
            error,
            AnalysisClientError::Vendor { code: 40_501, ref message }
                if message == "Invalid Field: 'target'."
        ));
    }

    #[test]
    fn receipt_requires_task_identifier() {
        let envelope = json!({
            "tasks": [{ "status_code": 20_100, "status_message": "Task Created." }]
        });

        let error = parse_task_receipt(&envelope).expect_err("parse should fail");

        assert!(matches!(error, AnalysisClientError::InvalidResponse(_)));
    }

    #[test]
    fn ready_tasks_parse_and_tolerate_missing_result() {
        let envelope = json!({
            "tasks": [{
                "result": [
                    { "id": "abc123", "target": "https://example.com/", "date_posted": "2024-01-15 12:00:00 +00:00" },
                    null
                ]
            }]
        });
        assert_eq!(
            parse_ready_tasks(&envelope)
                .iter()
                .map(|task| task.id.as_str())
                .collect::<Vec<_>>(),
            vec!["abc123"]
        );

        assert!(parse_ready_tasks(&json!({ "tasks": [{}] })).is_empty());
        assert!(parse_ready_tasks(&json!({})).is_empty());
    }

    #[test]
    fn summary_maps_metrics_and_keeps_raw_payloads() {
        let result = json!({
            "crawl_progress": "finished",
            "crawl_status": { "pages_crawled": 5, "max_crawl_pages": 100 },
            "domain_info": { "total_pages": 12 },
            "page_metrics": {
                "broken_links": 3,
                "broken_resources": 1,
                "duplicate_title": 2,
                "duplicate_description": 0,
                "duplicate_content": 0,
                "links_internal": 40,
                "links_external": 7,
                "checks": { "no_description": 4 }
            }
        });

        let FacetRows::Summary(row) =
            map_facet(FacetKind::Summary, &result).expect("summary should map")
        else {
            panic!("expected summary rows");
        };

        assert_eq!(row.crawl_progress.as_deref(), Some("finished"));
        assert_eq!(row.pages_crawled, Some(5));
        assert_eq!(row.total_pages, Some(12));
        assert_eq!(row.broken_links_count, Some(3));
        assert_eq!(row.internal_links_count, Some(40));
        assert_eq!(row.checks, Some(json!({ "no_description": 4 })));
        assert!(row.page_metrics.is_some());
    }

    #[test]
    fn pages_map_nested_timing_and_drop_null_items() {
        let result = json!({
            "items": [
                {
                    "url": "https://example.com/",
                    "status_code": 200,
                    "size": 14_320,
                    "page_timing": { "download_time": 183.5 },
                    "media_type": "text/html"
                },
                null
            ]
        });

        let FacetRows::Pages(rows) =
            map_facet(FacetKind::Pages, &result).expect("pages should map")
        else {
            panic!("expected page rows");
        };

        assert_eq!(rows.len(), 1);
        let row = rows.first().expect("one page row");
        assert_eq!(row.url, "https://example.com/");
        assert_eq!(row.load_time, Some(183.5));
        assert_eq!(row.media_type.as_deref(), Some("text/html"));
    }

    #[test]
    fn links_rename_vendor_fields() {
        let result = json!({
            "items": [{
                "link_from": "https://example.com/",
                "link_to": "https://example.com/about",
                "type": "anchor",
                "dofollow": true
            }]
        });

        let FacetRows::Links(rows) =
            map_facet(FacetKind::Links, &result).expect("links should map")
        else {
            panic!("expected link rows");
        };

        let row = rows.first().expect("one link row");
        assert_eq!(row.url_from, "https://example.com/");
        assert_eq!(row.link_type.as_deref(), Some("anchor"));
        assert_eq!(row.dofollow, Some(true));
    }

    #[test]
    fn resources_parse_vendor_timestamps() {
        let result = json!({
            "items": [{
                "url": "https://example.com/app.js",
                "resource_type": "script",
                "fetch_time": "2024-01-15 12:00:00 +00:00"
            }]
        });

        let FacetRows::Resources(rows) =
            map_facet(FacetKind::Resources, &result).expect("resources should map")
        else {
            panic!("expected resource rows");
        };

        let row = rows.first().expect("one resource row");
        assert!(row.fetch_time.is_some());
        assert_eq!(row.resource_type.as_deref(), Some("script"));
    }

    #[test]
    fn keyword_density_defaults_missing_numbers() {
        let result = json!({ "items": [{ "keyword": "seo" }] });

        let FacetRows::KeywordDensity(rows) =
            map_facet(FacetKind::KeywordDensity, &result).expect("density should map")
        else {
            panic!("expected keyword density rows");
        };

        let row = rows.first().expect("one density row");
        assert_eq!(row.keyword, "seo");
        assert_eq!(row.frequency, 0);
    }

    #[test]
    fn facet_with_missing_items_maps_to_no_rows() {
        let FacetRows::DuplicateTags(rows) =
            map_facet(FacetKind::DuplicateTags, &json!({})).expect("should map")
        else {
            panic!("expected duplicate tag rows");
        };
        assert!(rows.is_empty());
    }

    #[test]
    fn failure_message_prefers_top_level_error() {
        let payload = json!({
            "error_message": "Not authorised.",
            "tasks": [{ "status_message": "ignored" }]
        });
        assert_eq!(failure_message(&payload).as_deref(), Some("Not authorised."));

        let nested = json!({ "tasks": [{ "status_message": "You are over your limit." }] });
        assert_eq!(
            failure_message(&nested).as_deref(),
            Some("You are over your limit.")
        );
    }
}
