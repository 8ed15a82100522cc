use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::movie::MovieRecord;
use crate::parser::urls::is_placeholder;

const BATCH_SIZE: usize = 5;
const PACING_MS: u64 = 250;

/// Finds a poster for a film the list page showed without one.
///
/// Lookups never fail outward: any error means "no match".
pub trait PosterLookup {
    async fn find_poster(&self, title: &str, year: &str) -> Option<String>;
}

/// How lookups are grouped and spaced to stay under the lookup service's
/// rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub batch_size: usize,
    /// Pause between consecutive groups.
    pub delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            delay: Duration::from_millis(PACING_MS),
        }
    }
}

pub fn needs_poster(movie: &MovieRecord) -> bool {
    movie.poster.is_empty() || is_placeholder(&movie.poster)
}

/// Fill in missing posters. Films needing one are looked up in groups of
/// `pacing.batch_size`; lookups in a group run concurrently and groups are
/// separated by `pacing.delay`. Only `poster` fields change; order and count
/// are preserved. With no `lookup`, the films come back untouched.
///
/// Groups are cut from the films that need a poster, not from the whole
/// list, so films that already have one never cost a group or a pause.
/// No group ever holds more than `batch_size` lookups.
pub async fn enrich_posters<L: PosterLookup>(
    mut movies: Vec<MovieRecord>,
    lookup: Option<&L>,
    pacing: Pacing,
) -> Vec<MovieRecord> {
    let Some(lookup) = lookup else {
        return movies;
    };

    let pending: Vec<usize> = movies
        .iter()
        .enumerate()
        .filter(|(_, m)| needs_poster(m))
        .map(|(i, _)| i)
        .collect();
    if pending.is_empty() {
        return movies;
    }

    let groups: Vec<&[usize]> = pending.chunks(pacing.batch_size.max(1)).collect();
    info!(
        "Looking up {} missing posters in {} batches",
        pending.len(),
        groups.len()
    );

    let mut filled = 0usize;
    for (n, group) in groups.iter().enumerate() {
        if n > 0 {
            tokio::time::sleep(pacing.delay).await;
        }

        let lookups = group.iter().map(|&i| {
            let movie = &movies[i];
            async move { (i, lookup.find_poster(&movie.title, &movie.year).await) }
        });
        let updates = join_all(lookups).await;

        for (i, poster) in updates {
            match poster.filter(|p| !p.is_empty()) {
                Some(p) => {
                    movies[i].poster = p;
                    filled += 1;
                }
                None => debug!("No poster found for {}", movies[i].title),
            }
        }
    }

    info!("Filled {}/{} missing posters", filled, pending.len());
    movies
}
