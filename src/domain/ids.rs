use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Provider-side transaction identifier: checkout session id (`cs_xxx`),
/// payment-intent id (`pi_xxx`), or a Gumroad sale id. Opaque apart from
/// being non-empty — each provider mints its own shape.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRef(String);

impl ExternalRef {
    pub fn new(id: impl Into<String>) -> Result<Self, PipelineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PipelineError::Validation(
                "ExternalRef must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Provider-side product reference (template slug or catalog id).
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(String);

impl ProductRef {
    pub fn new(slug: impl Into<String>) -> Result<Self, PipelineError> {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(PipelineError::Validation(
                "ProductRef must not be empty".to_string(),
            ));
        }
        Ok(Self(slug))
    }

    /// Stand-in for a notification that genuinely carried no product
    /// reference. Keeps the reference list non-empty so the sale is still
    /// recorded and revenue is never dropped.
    pub fn placeholder() -> Self {
        Self("unknown".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
