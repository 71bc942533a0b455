//! In-memory report aggregate assembled from fetched facets.

use super::{
    DuplicateContentRow, DuplicateTagRow, FacetKind, FacetRows, KeywordDensityRow, LinkRow,
    NonIndexableRow, PageRow, RedirectChainRow, ResourceRow, SummaryRow,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Union of the nine facet results for one task.
///
/// Transient and owned by the caller that ran the pipeline; each facet
/// persists independently, never this object as a whole. An absent facet
/// stays absent so the presentation layer can render a per-facet empty
/// state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportAggregate {
    /// Crawl summary, when the vendor returned one.
    pub summary: Option<SummaryRow>,
    /// Crawled pages.
    pub pages: Option<Vec<PageRow>>,
    /// Fetched resources.
    pub resources: Option<Vec<ResourceRow>>,
    /// Discovered links.
    pub links: Option<Vec<LinkRow>>,
    /// Non-indexable pages.
    pub non_indexable: Option<Vec<NonIndexableRow>>,
    /// Duplicated tags.
    pub duplicate_tags: Option<Vec<DuplicateTagRow>>,
    /// Near-duplicate content groups.
    pub duplicate_content: Option<Vec<DuplicateContentRow>>,
    /// Keyword density entries.
    pub keyword_density: Option<Vec<KeywordDensityRow>>,
    /// Redirect chains.
    pub redirect_chains: Option<Vec<RedirectChainRow>>,
}

impl ReportAggregate {
    /// Returns `true` when the given facet was fetched.
    #[must_use]
    pub const fn has(&self, kind: FacetKind) -> bool {
        match kind {
            FacetKind::Summary => self.summary.is_some(),
            FacetKind::Pages => self.pages.is_some(),
            FacetKind::Resources => self.resources.is_some(),
            FacetKind::Links => self.links.is_some(),
            FacetKind::NonIndexable => self.non_indexable.is_some(),
            FacetKind::DuplicateTags => self.duplicate_tags.is_some(),
            FacetKind::DuplicateContent => self.duplicate_content.is_some(),
            FacetKind::KeywordDensity => self.keyword_density.is_some(),
            FacetKind::RedirectChains => self.redirect_chains.is_some(),
        }
    }

    /// Returns the given facet's rows, cloned back into their transport
    /// shape for storage fan-out.
    #[must_use]
    pub fn facet(&self, kind: FacetKind) -> Option<FacetRows> {
        match kind {
            FacetKind::Summary => self.summary.clone().map(FacetRows::Summary),
            FacetKind::Pages => self.pages.clone().map(FacetRows::Pages),
            FacetKind::Resources => self.resources.clone().map(FacetRows::Resources),
            FacetKind::Links => self.links.clone().map(FacetRows::Links),
            FacetKind::NonIndexable => self.non_indexable.clone().map(FacetRows::NonIndexable),
            FacetKind::DuplicateTags => self.duplicate_tags.clone().map(FacetRows::DuplicateTags),
            FacetKind::DuplicateContent => {
                self.duplicate_content.clone().map(FacetRows::DuplicateContent)
            }
            FacetKind::KeywordDensity => {
                self.keyword_density.clone().map(FacetRows::KeywordDensity)
            }
            FacetKind::RedirectChains => {
                self.redirect_chains.clone().map(FacetRows::RedirectChains)
            }
        }
    }
}

/// Accumulates fetched facets into a [`ReportAggregate`].
///
/// Pure merge: no validation beyond keying each facet by its kind. The
/// last insert per kind wins, though the pipeline only inserts each kind
/// once per run.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    facets: HashMap<FacetKind, FacetRows>,
}

impl ReportBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fetched facet under its own kind.
    pub fn insert(&mut self, rows: FacetRows) {
        self.facets.insert(rows.kind(), rows);
    }

    /// Iterates the facets recorded so far.
    pub fn facets(&self) -> impl Iterator<Item = &FacetRows> {
        self.facets.values()
    }

    /// Merges the recorded facets into the final aggregate.
    #[must_use]
    pub fn build(mut self) -> ReportAggregate {
        let mut aggregate = ReportAggregate::default();
        for kind in FacetKind::ALL {
            match self.facets.remove(&kind) {
                Some(FacetRows::Summary(row)) => aggregate.summary = Some(row),
                Some(FacetRows::Pages(rows)) => aggregate.pages = Some(rows),
                Some(FacetRows::Resources(rows)) => aggregate.resources = Some(rows),
                Some(FacetRows::Links(rows)) => aggregate.links = Some(rows),
                Some(FacetRows::NonIndexable(rows)) => aggregate.non_indexable = Some(rows),
                Some(FacetRows::DuplicateTags(rows)) => aggregate.duplicate_tags = Some(rows),
                Some(FacetRows::DuplicateContent(rows)) => {
                    aggregate.duplicate_content = Some(rows);
                }
                Some(FacetRows::KeywordDensity(rows)) => aggregate.keyword_density = Some(rows),
                Some(FacetRows::RedirectChains(rows)) => aggregate.redirect_chains = Some(rows),
                None => {}
            }
        }
        aggregate
    }
}
