/// Origin used to absolutize relative links and images.
pub const ORIGIN: &str = "https://letterboxd.com";

/// Path marker of the image served in place of unavailable posters.
pub const PLACEHOLDER_MARKER: &str = "empty-poster";

const LOW_RES_CROP: &str = "-0-150-0-225-crop";
const HIGH_RES_CROP: &str = "-0-1000-0-1500-crop";

/// Canonicalize a link or image reference taken from markup.
///
/// Returns an absolute URL with the low-res poster crop upgraded, or an
/// empty string when the input is empty, a `data:` URI, or a placeholder
/// image. Applying it twice gives the same result as applying it once.
pub fn normalize_url(raw: &str, origin: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return String::new();
    }

    let upgraded = raw.replace(LOW_RES_CROP, HIGH_RES_CROP);
    let absolute = if has_http_scheme(&upgraded) {
        upgraded
    } else if let Some(rest) = upgraded.strip_prefix("//") {
        format!("https://{rest}")
    } else if upgraded.starts_with('/') {
        format!("{origin}{upgraded}")
    } else {
        format!("{origin}/{upgraded}")
    };

    if is_placeholder(&absolute) {
        return String::new();
    }
    absolute
}

pub fn is_placeholder(url: &str) -> bool {
    url.contains(PLACEHOLDER_MARKER)
}

fn has_http_scheme(s: &str) -> bool {
    let head = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}
