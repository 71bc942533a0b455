//! Diesel row models for audit persistence.

use super::schema::{
    seo_duplicate_content, seo_duplicate_tags, seo_keyword_density, seo_links, seo_non_indexable,
    seo_pages, seo_redirect_chains, seo_resources, seo_summaries, seo_task_responses, seo_tasks,
};
use crate::audit::domain::{
    DuplicateContentRow, DuplicateTagRow, KeywordDensityRow, LinkRow, NonIndexableRow, PageRow,
    RedirectChainRow, ResourceRow, SummaryRow,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for audit tasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = seo_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Audit target URL.
    pub target_url: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for audit tasks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_tasks)]
pub struct NewTaskRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Audit target URL.
    pub target_url: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for raw vendor acknowledgements.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_task_responses)]
pub struct NewTaskResponseRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Raw vendor acknowledgement payload.
    pub response_data: Value,
    /// Capture timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for crawl summary metrics.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_summaries)]
pub struct NewSummaryRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Vendor crawl progress indicator.
    pub crawl_progress: Option<String>,
    /// Raw crawl status payload.
    pub crawl_status: Option<Value>,
    /// Total pages known to the crawl.
    pub total_pages: Option<i64>,
    /// Pages crawled so far.
    pub pages_crawled: Option<i64>,
    /// Count of broken links.
    pub broken_links_count: Option<i64>,
    /// Count of broken resources.
    pub broken_resources_count: Option<i64>,
    /// Count of duplicated titles.
    pub duplicate_title_count: Option<i64>,
    /// Count of duplicated descriptions.
    pub duplicate_description_count: Option<i64>,
    /// Count of near-duplicate pages.
    pub duplicate_content_count: Option<i64>,
    /// Count of internal links.
    pub internal_links_count: Option<i64>,
    /// Count of external links.
    pub external_links_count: Option<i64>,
    /// Raw per-check counters.
    pub checks: Option<Value>,
    /// Raw page metrics payload.
    pub page_metrics: Option<Value>,
    /// Structured-data schema types.
    pub schema_types: Option<Value>,
}

impl NewSummaryRow {
    /// Builds an insert row from a normalised summary.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &SummaryRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            crawl_progress: row.crawl_progress.clone(),
            crawl_status: row.crawl_status.clone(),
            total_pages: row.total_pages,
            pages_crawled: row.pages_crawled,
            broken_links_count: row.broken_links_count,
            broken_resources_count: row.broken_resources_count,
            duplicate_title_count: row.duplicate_title_count,
            duplicate_description_count: row.duplicate_description_count,
            duplicate_content_count: row.duplicate_content_count,
            internal_links_count: row.internal_links_count,
            external_links_count: row.external_links_count,
            checks: row.checks.clone(),
            page_metrics: row.page_metrics.clone(),
            schema_types: row.schema_types.clone(),
        }
    }
}

/// Insert model for crawled pages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_pages)]
pub struct NewPageRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Page URL.
    pub url: String,
    /// HTTP status code.
    pub status_code: Option<i64>,
    /// Page size in bytes.
    pub size: Option<i64>,
    /// Download time in milliseconds.
    pub load_time: Option<f64>,
    /// Content encoding reported by the server.
    pub content_encoding: Option<String>,
    /// Media type of the page body.
    pub media_type: Option<String>,
    /// Raw on-page meta payload.
    pub meta: Option<Value>,
}

impl NewPageRow {
    /// Builds an insert row from a normalised page.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &PageRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            url: row.url.clone(),
            status_code: row.status_code,
            size: row.size,
            load_time: row.load_time,
            content_encoding: row.content_encoding.clone(),
            media_type: row.media_type.clone(),
            meta: row.meta.clone(),
        }
    }
}

/// Insert model for fetched resources.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_resources)]
pub struct NewResourceRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Resource URL.
    pub url: String,
    /// Resource category.
    pub resource_type: Option<String>,
    /// Decoded size in bytes.
    pub size: Option<i64>,
    /// Encoded size in bytes.
    pub encoded_size: Option<i64>,
    /// Total transfer size in bytes.
    pub total_transfer_size: Option<i64>,
    /// When the vendor fetched the resource.
    pub fetch_time: Option<DateTime<Utc>>,
    /// Raw fetch timing breakdown.
    pub fetch_timing: Option<Value>,
}

impl NewResourceRow {
    /// Builds an insert row from a normalised resource.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &ResourceRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            url: row.url.clone(),
            resource_type: row.resource_type.clone(),
            size: row.size,
            encoded_size: row.encoded_size,
            total_transfer_size: row.total_transfer_size,
            fetch_time: row.fetch_time,
            fetch_timing: row.fetch_timing.clone(),
        }
    }
}

/// Insert model for discovered links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_links)]
pub struct NewLinkRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Page the link appears on.
    pub url_from: String,
    /// Page the link points at.
    pub url_to: String,
    /// Link category.
    pub link_type: Option<String>,
    /// Whether the link passes follow signals.
    pub dofollow: Option<bool>,
    /// Raw link attribute payload.
    pub link_attributes: Option<Value>,
}

impl NewLinkRow {
    /// Builds an insert row from a normalised link.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &LinkRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            url_from: row.url_from.clone(),
            url_to: row.url_to.clone(),
            link_type: row.link_type.clone(),
            dofollow: row.dofollow,
            link_attributes: row.link_attributes.clone(),
        }
    }
}

/// Insert model for non-indexable pages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_non_indexable)]
pub struct NewNonIndexableRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// Page URL.
    pub url: String,
    /// Vendor-reported exclusion reason.
    pub reason: Option<String>,
    /// Raw robots meta payload.
    pub meta_robots: Option<Value>,
}

impl NewNonIndexableRow {
    /// Builds an insert row from a normalised non-indexable page.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &NonIndexableRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            url: row.url.clone(),
            reason: row.reason.clone(),
            meta_robots: row.meta_robots.clone(),
        }
    }
}

/// Insert model for duplicated tags.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_duplicate_tags)]
pub struct NewDuplicateTagRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// The duplicated tag value.
    pub accumulator: String,
    /// Number of pages sharing the tag.
    pub total_count: Option<i64>,
    /// Raw affected-pages payload.
    pub pages: Option<Value>,
    /// Raw affected-URLs payload.
    pub urls: Option<Value>,
}

impl NewDuplicateTagRow {
    /// Builds an insert row from a normalised duplicated tag group.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &DuplicateTagRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            accumulator: row.accumulator.clone(),
            total_count: row.total_count,
            pages: row.pages.clone(),
            urls: row.urls.clone(),
        }
    }
}

/// Insert model for near-duplicate content groups.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_duplicate_content)]
pub struct NewDuplicateContentRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// URL of the reference page.
    pub url: String,
    /// Number of near-duplicate pages.
    pub total_count: Option<i64>,
    /// Raw similar-pages payload.
    pub pages: Option<Value>,
}

impl NewDuplicateContentRow {
    /// Builds an insert row from a normalised duplicate content group.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &DuplicateContentRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            url: row.url.clone(),
            total_count: row.total_count,
            pages: row.pages.clone(),
        }
    }
}

/// Insert model for keyword density entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_keyword_density)]
pub struct NewKeywordDensityRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// The keyword.
    pub keyword: String,
    /// Occurrences across the crawl.
    pub frequency: i64,
    /// Density ratio.
    pub density: f64,
}

impl NewKeywordDensityRow {
    /// Builds an insert row from a normalised keyword density entry.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &KeywordDensityRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            keyword: row.keyword.clone(),
            frequency: row.frequency,
            density: row.density,
        }
    }
}

/// Insert model for redirect chains.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seo_redirect_chains)]
pub struct NewRedirectChainRow {
    /// Vendor task identifier.
    pub task_id: String,
    /// URL the chain starts from.
    pub url: String,
    /// Whether the chain loops.
    pub is_redirect_loop: Option<bool>,
    /// Raw chain payload.
    pub chain: Option<Value>,
}

impl NewRedirectChainRow {
    /// Builds an insert row from a normalised redirect chain.
    #[must_use]
    pub fn from_domain(task_id: &str, row: &RedirectChainRow) -> Self {
        Self {
            task_id: task_id.to_owned(),
            url: row.url.clone(),
            is_redirect_loop: row.is_redirect_loop,
            chain: row.chain.clone(),
        }
    }
}
