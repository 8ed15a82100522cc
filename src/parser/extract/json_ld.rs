use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::Strategy;
use crate::movie::MovieRecord;
use crate::parser::text::decode_entities;
use crate::parser::urls::{normalize_url, ORIGIN};

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Reads `ItemList` blocks from embedded JSON-LD.
pub struct JsonLd;

impl Strategy for JsonLd {
    fn name(&self) -> &'static str {
        "json-ld"
    }

    fn extract(&self, document: &Html) -> Vec<MovieRecord> {
        let mut movies = Vec::new();

        for (n, script) in document.select(&SCRIPT).enumerate() {
            let body: String = script.text().collect();
            let Some(json) = json_payload(&body) else {
                continue;
            };
            // Cheap filter before paying for a full decode.
            if !json.contains("ItemList") {
                continue;
            }
            let data: Value = match serde_json::from_str(&json) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Skipping undecodable JSON-LD block #{}: {}", n, e);
                    continue;
                }
            };

            for list in item_lists(&data) {
                let Some(elements) = list.get("itemListElement").and_then(Value::as_array) else {
                    continue;
                };
                movies.extend(elements.iter().filter_map(movie_from_element));
            }
        }

        movies
    }
}

/// Drop the `/* <![CDATA[ */` wrapper and keep the outermost JSON brackets.
fn json_payload(body: &str) -> Option<String> {
    let cleaned = body.replace("<![CDATA[", "").replace("]]>", "");
    let start = cleaned.find(['{', '['])?;
    let end = cleaned.rfind(['}', ']'])?;
    (start <= end).then(|| cleaned[start..=end].to_string())
}

/// Every node typed `ItemList`, looking through top-level arrays and `@graph`.
fn item_lists(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(item_lists).collect(),
        Value::Object(map) => {
            if has_type(value, "ItemList") {
                vec![value]
            } else {
                map.get("@graph").map(item_lists).unwrap_or_default()
            }
        }
        _ => Vec::new(),
    }
}

fn has_type(value: &Value, wanted: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(ts)) => ts.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

fn movie_from_element(element: &Value) -> Option<MovieRecord> {
    let item = element.get("item")?;
    let title = decode_entities(str_field(item, "name").unwrap_or_default().trim());
    if title.is_empty() {
        return None;
    }

    Some(MovieRecord {
        title,
        year: release_date(item).unwrap_or_default().to_string(),
        director: director_name(item).map(decode_entities).unwrap_or_default(),
        poster: normalize_url(image_url(item).unwrap_or_default(), ORIGIN),
        link: normalize_url(str_field(item, "url").unwrap_or_default(), ORIGIN),
    })
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn release_date(item: &Value) -> Option<&str> {
    str_field(item, "datePublished")
        .or_else(|| str_field(item, "dateCreated"))
        .or_else(|| {
            item.get("releasedEvent")
                .and_then(|e| e.as_array().and_then(|a| a.first()).or(Some(e)))
                .and_then(|e| str_field(e, "startDate"))
        })
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

/// `director` shows up as a string, a Person, or an array of Persons.
fn director_name(item: &Value) -> Option<&str> {
    let director = item.get("director")?;
    let first = match director {
        Value::Array(people) => people.first()?,
        other => other,
    };
    first
        .as_str()
        .or_else(|| str_field(first, "name"))
        .map(str::trim)
        .filter(|n| !n.is_empty())
}

/// `image` shows up as a URL, an ImageObject, or an array of either.
fn image_url(item: &Value) -> Option<&str> {
    let image = item.get("image")?;
    let first = match image {
        Value::Array(images) => images.first()?,
        other => other,
    };
    first.as_str().or_else(|| str_field(first, "url"))
}
