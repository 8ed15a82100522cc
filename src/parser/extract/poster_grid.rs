use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{attr_nonempty, elements, film_anchor_link, img_poster, Strategy};
use crate::movie::MovieRecord;
use crate::parser::text::{decode_entities, title_from_slug};

static CONTAINER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".poster-list").unwrap());
static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static IMG_ALT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[alt]").unwrap());

const SLUG_ATTRS: &[&str] = &["data-film-slug", "data-item-slug"];

/// Reads the bare poster grid some list pages fall back to. Only titles,
/// posters and links are available here.
pub struct PosterGrid;

impl Strategy for PosterGrid {
    fn name(&self) -> &'static str {
        "poster-grid"
    }

    fn extract(&self, document: &Html) -> Vec<MovieRecord> {
        let Some(container) = document.select(&CONTAINER).next() else {
            return Vec::new();
        };
        container.select(&ITEM).filter_map(parse_item).collect()
    }
}

fn parse_item(li: ElementRef<'_>) -> Option<MovieRecord> {
    let title = elements(li)
        .find_map(|e| SLUG_ATTRS.iter().find_map(|a| attr_nonempty(e, a)))
        .map(title_from_slug)
        .or_else(|| {
            li.select(&IMG_ALT)
                .find_map(|img| attr_nonempty(img, "alt"))
                .map(str::to_string)
        })
        .map(|t| decode_entities(&t).trim().to_string())
        .filter(|t| !t.is_empty())?;

    Some(MovieRecord {
        title,
        year: String::new(),
        director: String::new(),
        poster: img_poster(li).unwrap_or_default(),
        link: film_anchor_link(li, false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<MovieRecord> {
        PosterGrid.extract(&Html::parse_document(html))
    }

    #[test]
    fn fixture_grid() {
        let html = std::fs::read_to_string("tests/fixtures/poster_grid.html").unwrap();
        let movies = extract(&html);
        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["The Thing 1982", "Portrait of a Lady on Fire", "Amélie"]);

        assert_eq!(
            movies[0].poster,
            "https://a.ltrbxd.com/resized/film-poster/7/8/the-thing-0-1000-0-1500-crop.jpg"
        );
        assert_eq!(movies[0].link, "https://letterboxd.com/film/the-thing-1982/");
        // Alt text fallback, lazy poster.
        assert_eq!(
            movies[1].poster,
            "https://a.ltrbxd.com/resized/film-poster/9/9/portrait-0-1000-0-1500-crop.jpg"
        );
        assert_eq!(movies[2].poster, "");
        assert!(movies.iter().all(|m| m.year.is_empty() && m.director.is_empty()));
    }

    #[test]
    fn items_outside_container_are_ignored() {
        let html = r#"<ul><li data-film-slug="outside"></li></ul>
            <ul class="poster-list"><li data-film-slug="inside"></li></ul>"#;
        let movies = extract(html);
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Inside");
    }

    #[test]
    fn no_container_no_items() {
        assert!(extract("<ul><li data-film-slug=\"x\"></li></ul>").is_empty());
    }
}
