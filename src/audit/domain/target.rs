//! Validated audit target URL.

use super::AuditDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Normalised absolute URL of the site under audit.
///
/// Input without an `http` prefix gets `https://` prepended before parsing,
/// so `example.com` is accepted and submitted as `https://example.com/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// Parses and normalises a user-supplied target.
    ///
    /// # Errors
    ///
    /// Returns [`AuditDomainError::EmptyTargetUrl`] for blank input and
    /// [`AuditDomainError::InvalidTargetUrl`] when the (possibly prefixed)
    /// value does not parse as an absolute URL with a host.
    pub fn parse(input: &str) -> Result<Self, AuditDomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AuditDomainError::EmptyTargetUrl);
        }

        let candidate = if trimmed.starts_with("http") {
            trimmed.to_owned()
        } else {
            format!("https://{trimmed}")
        };

        let parsed = Url::parse(&candidate)
            .map_err(|_| AuditDomainError::InvalidTargetUrl(input.to_owned()))?;
        if parsed.host_str().is_none() {
            return Err(AuditDomainError::InvalidTargetUrl(input.to_owned()));
        }

        Ok(Self(parsed.into()))
    }

    /// Reconstructs a target from its persisted representation.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the normalised URL as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TargetUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
