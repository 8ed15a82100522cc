use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{
    attr_nonempty, element_text, elements, film_anchor_link, img_poster, Strategy, FILM_ANCHOR,
};
use crate::movie::MovieRecord;
use crate::parser::text::decode_entities;
use crate::parser::urls::{normalize_url, ORIGIN};

/// `<li>` classes that mark one film entry.
static ITEM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("li.posteritem, li.listitem, li.film-list-entry").unwrap()
});
static PERMALINK_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/film/[^/?#]*-(\d{4})(?:/|$)").unwrap());

const TITLE_ATTRS: &[&str] = &["data-film-name", "data-item-name"];
const PERMALINK_ATTRS: &[&str] = &["data-film-link", "data-item-link", "data-target-link", "href"];
/// Attributes that may carry a poster image URL, lazily loaded or not.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "srcset", "data-srcset", "data-poster-url", "data-image"];
const FILM_POSTER_SEGMENT: &str = "film-poster";

/// Reads `<li>` film entries from regular list markup.
pub struct ListItems;

impl Strategy for ListItems {
    fn name(&self) -> &'static str {
        "list-items"
    }

    fn extract(&self, document: &Html) -> Vec<MovieRecord> {
        document
            .select(&ITEM)
            .enumerate()
            .filter_map(|(n, li)| {
                let movie = parse_item(li);
                if movie.is_none() {
                    debug!("List item #{} has no title, skipping", n);
                }
                movie
            })
            .collect()
    }
}

/// Attributes on the `<li>` itself count as much as those inside it.
fn parse_item(li: ElementRef<'_>) -> Option<MovieRecord> {
    let title = elements(li)
        .find_map(|e| TITLE_ATTRS.iter().find_map(|a| attr_nonempty(e, a)))
        .map(decode_entities)
        .or_else(|| film_link_text(li))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())?;

    let year = elements(li)
        .find_map(|e| attr_nonempty(e, "data-film-release-year"))
        .map(|y| y.trim().to_string())
        .or_else(|| permalink_year(li))
        .unwrap_or_default();

    Some(MovieRecord {
        title,
        year,
        director: String::new(),
        poster: img_poster(li)
            .or_else(|| film_poster_attr(li))
            .unwrap_or_default(),
        link: film_anchor_link(li, true),
    })
}

/// Text of the first film anchor that has any.
fn film_link_text(li: ElementRef<'_>) -> Option<String> {
    li.select(&FILM_ANCHOR)
        .map(|a| decode_entities(&element_text(a)))
        .find(|text| !text.trim().is_empty())
}

fn permalink_year(li: ElementRef<'_>) -> Option<String> {
    elements(li)
        .flat_map(|e| PERMALINK_ATTRS.iter().filter_map(move |a| e.value().attr(a)))
        .find_map(|link| PERMALINK_YEAR_RE.captures(link).map(|c| c[1].to_string()))
}

/// Last resort: any image-ish attribute pointing into the poster store.
fn film_poster_attr(li: ElementRef<'_>) -> Option<String> {
    elements(li)
        .flat_map(|e| IMAGE_ATTRS.iter().filter_map(move |a| e.value().attr(a)))
        .filter(|v| v.contains(FILM_POSTER_SEGMENT))
        // srcset lists "url 2x, url 1x"; the first URL is enough.
        .filter_map(|v| v.split_whitespace().next())
        .map(|v| normalize_url(v.trim_end_matches(','), ORIGIN))
        .find(|url| !url.is_empty())
}
