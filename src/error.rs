use thiserror::Error;

#[derive(Error, Debug)]
pub enum GizmoError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Catalog Error: {0}")]
    Catalog(String),

    /// The request cannot be searched as stated; the caller should fix it.
    #[error("Invalid Request: {0}")]
    Validation(String),

    /// A logic or data-table defect detected mid-search.
    #[error("Internal Invariant Violated ({context}): {detail}")]
    Invariant { context: String, detail: String },

    #[error("Search Cancelled")]
    Cancelled,
}

impl GizmoError {
    pub fn invariant(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Invariant {
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type GfResult<T> = Result<T, GizmoError>;
