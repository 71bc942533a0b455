//! Crawl parameter set forwarded to the vendor on task creation.

use serde::{Deserialize, Serialize};

/// Advanced crawl options for a vendor analysis task.
///
/// Field names match the vendor's `task_post` payload and serialise
/// directly into it alongside the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrawlParameters {
    /// Keep raw page HTML on the vendor side.
    pub store_raw_html: bool,
    /// Fetch page resources (scripts, styles, images).
    pub load_resources: bool,
    /// Execute page JavaScript during the crawl.
    pub enable_javascript: bool,
    /// Render pages in a headless browser.
    pub enable_browser_rendering: bool,
    /// Compute keyword density statistics.
    pub calculate_keyword_density: bool,
    /// Upper bound on crawled pages.
    pub max_crawl_pages: u32,
}

impl Default for CrawlParameters {
    fn default() -> Self {
        Self {
            store_raw_html: false,
            load_resources: true,
            enable_javascript: true,
            enable_browser_rendering: true,
            calculate_keyword_density: true,
            max_crawl_pages: 100,
        }
    }
}
