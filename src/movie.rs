use serde::Serialize;

/// One film read off a list page. Every field is a display string and
/// only `title` is guaranteed non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovieRecord {
    pub title: String,
    /// Empty, a bare year, or whatever date string the page gave.
    pub year: String,
    pub director: String,
    /// Empty or an absolute http(s) URL, never a placeholder image.
    pub poster: String,
    pub link: String,
}
