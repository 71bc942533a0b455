//! Domain model for audit task lifecycle and report facets.
//!
//! The audit domain models vendor-issued task identity, target URL
//! normalisation, monotonic task status, the nine report facet kinds with
//! their normalised row shapes, and the in-memory report aggregate, while
//! keeping all infrastructure concerns outside of the domain boundary.

mod error;
mod facet;
mod ids;
mod parameters;
mod report;
mod status;
mod target;
mod task;

pub use error::{AuditDomainError, ParseFacetKindError, ParseTaskStatusError};
pub use facet::{
    DuplicateContentRow, DuplicateTagRow, FacetKind, FacetRows, KeywordDensityRow, LinkRow,
    NonIndexableRow, PageRow, RedirectChainRow, ResourceRow, SummaryRow,
};
pub use ids::{UserId, VendorTaskId};
pub use parameters::CrawlParameters;
pub use report::{ReportAggregate, ReportBuilder};
pub use status::TaskStatus;
pub use target::TargetUrl;
pub use task::{AuditTask, PersistedAuditTask};
