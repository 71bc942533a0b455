//! Error types for audit domain validation and parsing.

use super::TaskStatus;
use thiserror::Error;

/// Errors returned while constructing domain audit values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditDomainError {
    /// The submitted target URL is empty after trimming.
    #[error("please enter a URL")]
    EmptyTargetUrl,

    /// The submitted target URL does not parse as an absolute URL.
    #[error("'{0}' is not a valid URL")]
    InvalidTargetUrl(String),

    /// The vendor task identifier is empty after trimming.
    #[error("vendor task identifier must not be empty")]
    EmptyVendorTaskId,

    /// The requested status change violates lifecycle monotonicity.
    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status the transition requested.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing facet kind names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown facet kind: {0}")]
pub struct ParseFacetKindError(pub String);
