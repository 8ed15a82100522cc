/// Failures that end a pipeline run. Lookups that fail during enrichment
/// are absorbed and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input is not a list page URL.
    #[error("invalid list URL: {0}")]
    Validation(String),

    /// The list page could not be fetched.
    #[error("list page fetch failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The page was fetched but no films were recognized on it.
    #[error("no films found on the list page")]
    NotFound,
}

impl PipelineError {
    /// HTTP-style status a caller should report for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Transport { status, .. } => status.unwrap_or(502),
            Self::NotFound => 404,
        }
    }
}
