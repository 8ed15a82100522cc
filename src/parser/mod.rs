pub mod extract;
pub mod text;
pub mod urls;

use scraper::Html;
use tracing::{debug, info};

use crate::movie::MovieRecord;
use extract::{Strategy, STRATEGIES};

/// Films read from one page, and the strategy that found them.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub strategy: &'static str,
    pub movies: Vec<MovieRecord>,
}

/// Run the extraction strategies in order over a fetched page. Returns the
/// first non-empty result, or `None` when no strategy recognized any film.
pub fn extract_movies(document: &str) -> Option<Extraction> {
    extract_with(&STRATEGIES, &Html::parse_document(document))
}

fn extract_with(strategies: &[&dyn Strategy], document: &Html) -> Option<Extraction> {
    for strategy in strategies {
        let movies = strategy.extract(document);
        if movies.is_empty() {
            debug!("Strategy {} found nothing", strategy.name());
            continue;
        }
        info!("Strategy {} found {} films", strategy.name(), movies.len());
        return Some(Extraction {
            strategy: strategy.name(),
            movies,
        });
    }
    None
}

// ── Tests ──
