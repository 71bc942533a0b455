//! Diesel schema for audit task and facet persistence.

diesel::table! {
    /// Audit task rows, keyed by the vendor task identifier.
    seo_tasks (task_id) {
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Owning user identifier.
        user_id -> Uuid,
        /// Audit target URL.
        target_url -> Text,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last lifecycle timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Raw vendor acknowledgements captured at task creation.
    seo_task_responses (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Raw vendor acknowledgement payload.
        response_data -> Jsonb,
        /// Capture timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Crawl-wide summary metrics, one row per completed audit.
    seo_summaries (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Vendor crawl progress indicator.
        #[max_length = 50]
        crawl_progress -> Nullable<Varchar>,
        /// Raw crawl status payload.
        crawl_status -> Nullable<Jsonb>,
        /// Total pages known to the crawl.
        total_pages -> Nullable<Int8>,
        /// Pages crawled so far.
        pages_crawled -> Nullable<Int8>,
        /// Count of broken links.
        broken_links_count -> Nullable<Int8>,
        /// Count of broken resources.
        broken_resources_count -> Nullable<Int8>,
        /// Count of duplicated titles.
        duplicate_title_count -> Nullable<Int8>,
        /// Count of duplicated descriptions.
        duplicate_description_count -> Nullable<Int8>,
        /// Count of near-duplicate pages.
        duplicate_content_count -> Nullable<Int8>,
        /// Count of internal links.
        internal_links_count -> Nullable<Int8>,
        /// Count of external links.
        external_links_count -> Nullable<Int8>,
        /// Raw per-check counters.
        checks -> Nullable<Jsonb>,
        /// Raw page metrics payload.
        page_metrics -> Nullable<Jsonb>,
        /// Structured-data schema types.
        schema_types -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Per-page crawl results.
    seo_pages (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Page URL.
        url -> Text,
        /// HTTP status code.
        status_code -> Nullable<Int8>,
        /// Page size in bytes.
        size -> Nullable<Int8>,
        /// Download time in milliseconds.
        load_time -> Nullable<Float8>,
        /// Content encoding reported by the server.
        #[max_length = 100]
        content_encoding -> Nullable<Varchar>,
        /// Media type of the page body.
        #[max_length = 100]
        media_type -> Nullable<Varchar>,
        /// Raw on-page meta payload.
        meta -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Fetched page resources.
    seo_resources (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Resource URL.
        url -> Text,
        /// Resource category.
        #[max_length = 50]
        resource_type -> Nullable<Varchar>,
        /// Decoded size in bytes.
        size -> Nullable<Int8>,
        /// Encoded size in bytes.
        encoded_size -> Nullable<Int8>,
        /// Total transfer size in bytes.
        total_transfer_size -> Nullable<Int8>,
        /// When the vendor fetched the resource.
        fetch_time -> Nullable<Timestamptz>,
        /// Raw fetch timing breakdown.
        fetch_timing -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Discovered links.
    seo_links (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Page the link appears on.
        url_from -> Text,
        /// Page the link points at.
        url_to -> Text,
        /// Link category.
        #[max_length = 50]
        link_type -> Nullable<Varchar>,
        /// Whether the link passes follow signals.
        dofollow -> Nullable<Bool>,
        /// Raw link attribute payload.
        link_attributes -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Pages excluded from indexing.
    seo_non_indexable (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Page URL.
        url -> Text,
        /// Vendor-reported exclusion reason.
        #[max_length = 100]
        reason -> Nullable<Varchar>,
        /// Raw robots meta payload.
        meta_robots -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Duplicated title and description tags.
    seo_duplicate_tags (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// The duplicated tag value.
        accumulator -> Text,
        /// Number of pages sharing the tag.
        total_count -> Nullable<Int8>,
        /// Raw affected-pages payload.
        pages -> Nullable<Jsonb>,
        /// Raw affected-URLs payload.
        urls -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Near-duplicate content groups.
    seo_duplicate_content (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// URL of the reference page.
        url -> Text,
        /// Number of near-duplicate pages.
        total_count -> Nullable<Int8>,
        /// Raw similar-pages payload.
        pages -> Nullable<Jsonb>,
    }
}

diesel::table! {
    /// Keyword density statistics.
    seo_keyword_density (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// The keyword.
        keyword -> Text,
        /// Occurrences across the crawl.
        frequency -> Int8,
        /// Density ratio.
        density -> Float8,
    }
}

diesel::table! {
    /// Redirect chains discovered during the crawl.
    seo_redirect_chains (id) {
        /// Row identifier.
        id -> Int8,
        /// Vendor task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// URL the chain starts from.
        url -> Text,
        /// Whether the chain loops.
        is_redirect_loop -> Nullable<Bool>,
        /// Raw chain payload.
        chain -> Nullable<Jsonb>,
    }
}
