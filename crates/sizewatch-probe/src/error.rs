use thiserror::Error;

/// Faults raised by the page capability.
///
/// Lookup misses are not errors: they surface as `Ok(None)` or an empty
/// `Vec`. A `PageError` reaching the product orchestrator aborts that
/// product with `error:<category>`.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element is detached from the page")]
    Detached,

    #[error("invalid selector {selector:?}")]
    InvalidSelector { selector: String },

    #[error("browser error: {0}")]
    Browser(String),
}

impl PageError {
    /// Short fault category recorded in the result status.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            PageError::Timeout { .. } => "timeout",
            PageError::Navigation { .. } => "navigation",
            PageError::Detached => "detached",
            PageError::InvalidSelector { .. } | PageError::Browser(_) => "browser",
        }
    }
}
