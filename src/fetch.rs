use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::USER_AGENT;
use tracing::info;

use crate::error::PipelineError;

static LIST_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?letterboxd\.com/[A-Za-z0-9_-]+/(?:list/[A-Za-z0-9_-]+|watchlist)/?(?:[?#].*)?$",
    )
    .unwrap()
});

/// Check that `url` points at a list or watchlist page. Returns it trimmed.
pub fn validate_list_url(url: &str) -> Result<&str, PipelineError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(PipelineError::Validation("no list URL given".into()));
    }
    if !LIST_URL_RE.is_match(url) {
        return Err(PipelineError::Validation(format!(
            "{} is not a Letterboxd list or watchlist URL",
            url
        )));
    }
    Ok(url)
}

/// Where list pages come from.
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, PipelineError>;
}

/// Fetches list pages over HTTP with an identifying User-Agent.
pub struct HttpPageSource {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpPageSource {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: user_agent.into(),
        }
    }
}

impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String, PipelineError> {
        info!("Fetching list page: {}", url);
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Transport {
                status: Some(status.as_u16()),
                message: format!("{} returned HTTP {}", url, status),
            });
        }

        response.text().await.map_err(transport_error)
    }
}

fn transport_error(e: reqwest::Error) -> PipelineError {
    PipelineError::Transport {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}
