use tracing::info;

use crate::enrich::{enrich_posters, Pacing, PosterLookup};
use crate::error::PipelineError;
use crate::fetch::{validate_list_url, PageSource};
use crate::parser::{extract_movies, Extraction};

/// Fetch a list page, extract its films and fill in missing posters.
///
/// `lookup` is `None` when enrichment is not configured. Only validation,
/// transport and not-found outcomes are returned as errors.
pub async fn run<S, L>(
    url: &str,
    source: &S,
    lookup: Option<&L>,
    pacing: Pacing,
) -> Result<Extraction, PipelineError>
where
    S: PageSource,
    L: PosterLookup,
{
    let url = validate_list_url(url)?;
    let document = source.fetch(url).await?;

    let Some(extraction) = extract_movies(&document) else {
        info!("No films recognized on {}", url);
        return Err(PipelineError::NotFound);
    };

    let movies = enrich_posters(extraction.movies, lookup, pacing).await;
    Ok(Extraction {
        strategy: extraction.strategy,
        movies,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::tmdb::poster_from_response;

    const LIST_URL: &str = "https://letterboxd.com/someone/list/favourites/";

    enum Page {
        Body(String),
        Status(u16),
    }

    struct FakeSource {
        page: Page,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn body(body: impl Into<String>) -> Self {
            Self {
                page: Page::Body(body.into()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fixture(name: &str) -> Self {
            Self::body(std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap())
        }

        fn status(code: u16) -> Self {
            Self {
                page: Page::Status(code),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl PageSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<String, PipelineError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match &self.page {
                Page::Body(body) => Ok(body.clone()),
                Page::Status(code) => Err(PipelineError::Transport {
                    status: Some(*code),
                    message: format!("{} returned HTTP {}", url, code),
                }),
            }
        }
    }

    /// Replays one canned TMDB search body for every lookup.
    struct CannedTmdb {
        body: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl PosterLookup for CannedTmdb {
        async fn find_poster(&self, title: &str, _year: &str) -> Option<String> {
            self.calls.lock().unwrap().push(title.to_string());
            poster_from_response(self.body).ok().flatten()
        }
    }

    fn canned(body: &'static str) -> CannedTmdb {
        CannedTmdb {
            body,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn structured_list_end_to_end() {
        let source = FakeSource::fixture("json_ld_list");
        let out = run::<_, CannedTmdb>(LIST_URL, &source, None, Pacing::default())
            .await
            .unwrap();
        let titles: Vec<&str> = out.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Movie A", "Movie B", "Movie C"]);
        assert!(out.movies.iter().all(|m| !m.poster.is_empty()));
    }

    #[tokio::test]
    async fn unrecognized_page_is_not_found() {
        let source = FakeSource::fixture("no_items");
        let err = run::<_, CannedTmdb>(LIST_URL, &source, None, Pacing::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound));
    }

    #[tokio::test]
    async fn upstream_404_is_transport_error() {
        let source = FakeSource::status(404);
        let err = run::<_, CannedTmdb>(LIST_URL, &source, None, Pacing::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transport { status: Some(404), .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_fetching() {
        let source = FakeSource::fixture("json_ld_list");
        let err = run::<_, CannedTmdb>("https://example.com/x", &source, None, Pacing::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn placeholder_poster_is_replaced_from_tmdb() {
        let html = r#"<ul><li class="posteritem">
            <div data-film-name="Lost Film" data-film-release-year="1931"></div>
            <img src="https://s.ltrbxd.com/static/img/empty-poster-230.png">
        </li></ul>"#;
        let source = FakeSource::body(html);
        let tmdb = canned(r#"{"results":[{"poster_path":"/abc.jpg"}]}"#);

        let out = run(LIST_URL, &source, Some(&tmdb), Pacing::default())
            .await
            .unwrap();
        assert_eq!(out.strategy, "list-items");
        assert_eq!(out.movies.len(), 1);
        assert_eq!(out.movies[0].poster, "https://image.tmdb.org/t/p/w500/abc.jpg");
        assert_eq!(*tmdb.calls.lock().unwrap(), ["Lost Film"]);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_the_film() {
        let source = FakeSource::fixture("poster_grid");
        let tmdb = canned("not json");
        let out = run(LIST_URL, &source, Some(&tmdb), Pacing::default())
            .await
            .unwrap();
        assert_eq!(out.movies.len(), 3);
        assert_eq!(out.movies[2].title, "Amélie");
        assert_eq!(out.movies[2].poster, "");
        assert_eq!(*tmdb.calls.lock().unwrap(), ["Amélie"]);
    }
}
