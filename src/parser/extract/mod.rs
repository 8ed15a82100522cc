pub mod json_ld;
pub mod list_items;
pub mod poster_grid;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::urls::{normalize_url, ORIGIN};
use crate::movie::MovieRecord;

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static FILM_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="/film/"]"#).unwrap());
static FRAME_FILM_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a.frame[href^="/film/"]"#).unwrap());

/// One way of reading films out of a list page.
///
/// Strategies never fail: a malformed item is skipped, and a page the
/// strategy does not recognize yields an empty list.
pub trait Strategy: Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, document: &Html) -> Vec<MovieRecord>;
}

/// Tried in order; the first non-empty result wins.
pub static STRATEGIES: [&dyn Strategy; 3] = [
    &json_ld::JsonLd,
    &list_items::ListItems,
    &poster_grid::PosterGrid,
];

/// `scope` itself, then every element inside it in document order.
fn elements(scope: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    scope.descendants().filter_map(ElementRef::wrap)
}

fn attr_nonempty<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).filter(|v| !v.trim().is_empty())
}

/// Text content with whitespace runs collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First usable poster among `<img src>` then `<img data-src>`.
fn img_poster(scope: ElementRef<'_>) -> Option<String> {
    let imgs = || scope.select(&IMG);
    imgs()
        .filter_map(|img| img.value().attr("src"))
        .chain(imgs().filter_map(|img| img.value().attr("data-src")))
        .map(|src| normalize_url(src, ORIGIN))
        .find(|url| !url.is_empty())
}

/// href of the first anchor pointing at a film, normalized. With
/// `frame_only`, only anchors classed `frame` are considered.
fn film_anchor_link(scope: ElementRef<'_>, frame_only: bool) -> String {
    let selector: &Selector = if frame_only { &*FRAME_FILM_ANCHOR } else { &*FILM_ANCHOR };
    scope
        .select(selector)
        .filter_map(|a| attr_nonempty(a, "href"))
        .map(|href| normalize_url(href, ORIGIN))
        .find(|url| !url.is_empty())
        .unwrap_or_default()
}
