//! Report facet kinds and their normalised row shapes.
//!
//! A facet is one of the nine analysis result categories the vendor exposes
//! for a finished task. Every facet carries its own endpoint path and target
//! table so fetch and store can be written once, generically, instead of
//! nine near-identical times.

use super::ParseFacetKindError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The nine analysis result categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    /// Crawl-wide metrics and check counts.
    Summary,
    /// Per-page crawl results.
    Pages,
    /// Fetched page resources.
    Resources,
    /// Internal and external links.
    Links,
    /// Pages excluded from indexing.
    NonIndexable,
    /// Duplicate title/description tags.
    DuplicateTags,
    /// Near-duplicate page content.
    DuplicateContent,
    /// Keyword density statistics.
    KeywordDensity,
    /// Redirect chains discovered during the crawl.
    RedirectChains,
}

impl FacetKind {
    /// Every facet kind, in the order the pipeline fans out.
    pub const ALL: [Self; 9] = [
        Self::Summary,
        Self::Pages,
        Self::Resources,
        Self::Links,
        Self::NonIndexable,
        Self::DuplicateTags,
        Self::DuplicateContent,
        Self::KeywordDensity,
        Self::RedirectChains,
    ];

    /// Returns the canonical facet name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Pages => "pages",
            Self::Resources => "resources",
            Self::Links => "links",
            Self::NonIndexable => "non_indexable",
            Self::DuplicateTags => "duplicate_tags",
            Self::DuplicateContent => "duplicate_content",
            Self::KeywordDensity => "keyword_density",
            Self::RedirectChains => "redirect_chains",
        }
    }

    /// Returns the vendor endpoint path segment under `/on_page/`.
    #[must_use]
    pub const fn endpoint_path(self) -> &'static str {
        self.as_str()
    }

    /// Returns the store table the facet's rows persist into.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Summary => "seo_summaries",
            Self::Pages => "seo_pages",
            Self::Resources => "seo_resources",
            Self::Links => "seo_links",
            Self::NonIndexable => "seo_non_indexable",
            Self::DuplicateTags => "seo_duplicate_tags",
            Self::DuplicateContent => "seo_duplicate_content",
            Self::KeywordDensity => "seo_keyword_density",
            Self::RedirectChains => "seo_redirect_chains",
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FacetKind {
    type Error = ParseFacetKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ParseFacetKindError(value.to_owned()))
    }
}

/// Crawl-wide summary metrics for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Vendor crawl progress indicator (`finished`, `in_progress`, ...).
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
    /// Structured-data schema types seen on the site.
    pub schema_types: Option<Value>,
}

/// One crawled page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRow {
    /// Page URL.
    pub url: String,
    /// HTTP status code returned for the page.
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

/// One fetched page resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    /// Resource URL.
    pub url: String,
    /// Resource category (`script`, `image`, ...).
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

/// One discovered link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRow {
    /// Page the link appears on.
    pub url_from: String,
    /// Page the link points at.
    pub url_to: String,
    /// Link category (`anchor`, `redirect`, ...).
    pub link_type: Option<String>,
    /// Whether the link passes follow signals.
    pub dofollow: Option<bool>,
    /// Raw link attribute payload.
    pub link_attributes: Option<Value>,
}

/// One page excluded from indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NonIndexableRow {
    /// Page URL.
    pub url: String,
    /// Vendor-reported exclusion reason.
    pub reason: Option<String>,
    /// Raw robots meta payload.
    pub meta_robots: Option<Value>,
}

/// One duplicated tag group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateTagRow {
    /// The duplicated tag value.
    pub accumulator: String,
    /// Number of pages sharing the tag.
    pub total_count: Option<i64>,
    /// Raw affected-pages payload.
    pub pages: Option<Value>,
    /// Raw affected-URLs payload.
    pub urls: Option<Value>,
}

/// One near-duplicate content group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateContentRow {
    /// URL of the reference page.
    pub url: String,
    /// Number of near-duplicate pages.
    pub total_count: Option<i64>,
    /// Raw similar-pages payload including similarity scores.
    pub pages: Option<Value>,
}

/// One keyword density entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensityRow {
    /// The keyword.
    pub keyword: String,
    /// Occurrences across the crawl.
    pub frequency: i64,
    /// Density ratio.
    pub density: f64,
}

/// One redirect chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectChainRow {
    /// URL the chain starts from.
    pub url: String,
    /// Whether the chain loops.
    pub is_redirect_loop: Option<bool>,
    /// Raw chain payload.
    pub chain: Option<Value>,
}

/// Normalised rows for one fetched facet.
///
/// The variant fixes the facet kind, so fan-out code can carry facets
/// uniformly and still store each into its own table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FacetRows {
    /// Summary metrics (always a single row).
    Summary(SummaryRow),
    /// Crawled pages.
    Pages(Vec<PageRow>),
    /// Fetched resources.
    Resources(Vec<ResourceRow>),
    /// Discovered links.
    Links(Vec<LinkRow>),
    /// Non-indexable pages.
    NonIndexable(Vec<NonIndexableRow>),
    /// Duplicated tags.
    DuplicateTags(Vec<DuplicateTagRow>),
    /// Near-duplicate content groups.
    DuplicateContent(Vec<DuplicateContentRow>),
    /// Keyword density entries.
    KeywordDensity(Vec<KeywordDensityRow>),
    /// Redirect chains.
    RedirectChains(Vec<RedirectChainRow>),
}

impl FacetRows {
    /// Returns the kind these rows belong to.
    #[must_use]
    pub const fn kind(&self) -> FacetKind {
        match self {
            Self::Summary(_) => FacetKind::Summary,
            Self::Pages(_) => FacetKind::Pages,
            Self::Resources(_) => FacetKind::Resources,
            Self::Links(_) => FacetKind::Links,
            Self::NonIndexable(_) => FacetKind::NonIndexable,
            Self::DuplicateTags(_) => FacetKind::DuplicateTags,
            Self::DuplicateContent(_) => FacetKind::DuplicateContent,
            Self::KeywordDensity(_) => FacetKind::KeywordDensity,
            Self::RedirectChains(_) => FacetKind::RedirectChains,
        }
    }

    /// Returns `true` when the facet carries no rows to store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Summary(_) => false,
            Self::Pages(rows) => rows.is_empty(),
            Self::Resources(rows) => rows.is_empty(),
            Self::Links(rows) => rows.is_empty(),
            Self::NonIndexable(rows) => rows.is_empty(),
            Self::DuplicateTags(rows) => rows.is_empty(),
            Self::DuplicateContent(rows) => rows.is_empty(),
            Self::KeywordDensity(rows) => rows.is_empty(),
            Self::RedirectChains(rows) => rows.is_empty(),
        }
    }
}
