use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::enrich::PosterLookup;
use crate::settings::Settings;

const SEARCH_URL: &str = "https://api.themoviedb.org/3/search/movie";
pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    poster_path: Option<String>,
}

/// TMDB movie search, used to find posters the list page lacked.
pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    search_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_search_url(api_key, SEARCH_URL)
    }

    /// Point the client at another search endpoint.
    pub fn with_search_url(api_key: impl Into<String>, search_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            search_url: search_url.into(),
        }
    }

    /// `None` when no credential is configured, which disables enrichment.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings.tmdb_api_key.as_deref().map(Self::new)
    }

    async fn search(&self, title: &str, year: &str) -> Result<Option<String>> {
        let mut query = vec![("api_key", self.api_key.as_str()), ("query", title)];
        if let Some(year) = search_year(year) {
            query.push(("year", year));
        }

        let response = self
            .client
            .get(&self.search_url)
            .query(&query)
            .send()
            .await
            .context("TMDB request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("TMDB returned HTTP {}", status);
        }

        let body = response.text().await.context("Failed to read TMDB response")?;
        poster_from_response(&body)
    }
}

impl PosterLookup for TmdbClient {
    async fn find_poster(&self, title: &str, year: &str) -> Option<String> {
        match self.search(title, year).await {
            Ok(poster) => {
                debug!("TMDB poster for {:?}: {:?}", title, poster);
                poster
            }
            Err(e) => {
                warn!("Poster lookup failed for {:?}: {:#}", title, e);
                None
            }
        }
    }
}

/// The poster of the first search hit, as an absolute image URL.
pub fn poster_from_response(body: &str) -> Result<Option<String>> {
    let parsed: SearchResponse =
        serde_json::from_str(body).context("Unexpected TMDB search response")?;
    Ok(parsed
        .results
        .into_iter()
        .next()
        .and_then(|hit| hit.poster_path)
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .map(|path| poster_url(&path)))
}

pub fn poster_url(path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", POSTER_BASE, path)
    } else {
        format!("{}/{}", POSTER_BASE, path)
    }
}

/// Only a leading four-digit year narrows the search; full dates are cut
/// down and anything else is dropped.
fn search_year(year: &str) -> Option<&str> {
    let head = year.trim().get(..4)?;
    head.bytes().all(|b| b.is_ascii_digit()).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hit_poster() {
        let body = r#"{"page":1,"results":[{"id":1,"poster_path":"/abc.jpg"},{"id":2,"poster_path":"/zzz.jpg"}]}"#;
        assert_eq!(
            poster_from_response(body).unwrap().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
    }

    #[test]
    fn first_hit_without_poster_is_no_match() {
        let body = r#"{"results":[{"id":1,"poster_path":null},{"id":2,"poster_path":"/zzz.jpg"}]}"#;
        assert_eq!(poster_from_response(body).unwrap(), None);
        assert_eq!(poster_from_response(r#"{"results":[]}"#).unwrap(), None);
        assert_eq!(poster_from_response(r#"{"status_code":7}"#).unwrap(), None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(poster_from_response("<html>").is_err());
    }

    #[test]
    fn year_parameter() {
        assert_eq!(search_year("1999"), Some("1999"));
        assert_eq!(search_year("2019-05-19"), Some("2019"));
        assert_eq!(search_year(""), None);
        assert_eq!(search_year("19"), None);
        assert_eq!(search_year("c. 1920"), None);
    }

    #[test]
    fn missing_credential_means_no_client() {
        assert!(TmdbClient::from_settings(&Settings::default()).is_none());
        let settings = Settings {
            tmdb_api_key: Some("key".into()),
            ..Settings::default()
        };
        assert!(TmdbClient::from_settings(&settings).is_some());
    }

    mod http {
        use httpmock::prelude::*;

        use crate::enrich::PosterLookup;
        use crate::tmdb::TmdbClient;

        const HIT: &str = r#"{"results":[{"poster_path":"/heat.jpg"}]}"#;

        fn client_for(server: &MockServer) -> TmdbClient {
            TmdbClient::with_search_url("secret", server.url("/3/search/movie"))
        }

        #[tokio::test]
        async fn sends_key_title_and_year() {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/3/search/movie")
                        .query_param("api_key", "secret")
                        .query_param("query", "Heat")
                        .query_param("year", "1995");
                    then.status(200)
                        .header("content-type", "application/json")
                        .body(HIT);
                })
                .await;

            let poster = client_for(&server).find_poster("Heat", "1995-12-15").await;
            mock.assert_async().await;
            assert_eq!(poster.as_deref(), Some("https://image.tmdb.org/t/p/w500/heat.jpg"));
        }

        #[tokio::test]
        async fn unusable_year_is_not_sent() {
            let server = MockServer::start_async().await;
            let with_year = server
                .mock_async(|when, then| {
                    when.method(GET).path("/3/search/movie").query_param_exists("year");
                    then.status(500);
                })
                .await;
            let without_year = server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/3/search/movie")
                        .query_param("query", "Nosferatu");
                    then.status(200).body(HIT);
                })
                .await;

            let poster = client_for(&server).find_poster("Nosferatu", "c. 1922").await;
            assert!(poster.is_some());
            with_year.assert_hits_async(0).await;
            without_year.assert_async().await;
        }

        #[tokio::test]
        async fn error_status_is_no_match() {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(GET).path("/3/search/movie");
                    then.status(401).body(r#"{"status_code":7,"status_message":"Invalid API key"}"#);
                })
                .await;

            assert_eq!(client_for(&server).find_poster("Heat", "1995").await, None);
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn unreachable_service_is_no_match() {
            let client = TmdbClient::with_search_url("secret", "http://127.0.0.1:9/3/search/movie");
            assert_eq!(client.find_poster("Heat", "1995").await, None);
        }
    }
}
