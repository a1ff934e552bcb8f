// ABOUTME: Reference resolution for URL-valued fields: base-relative joins and http(s) filtering.
// ABOUTME: Also pulls the url(...) target out of inline background-image declarations.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static CSS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\(\s*['"]?(.*?)['"]?\s*\)"#).unwrap());

/// Resolves `reference` against `base` and keeps it only if the result is http(s).
///
/// Returns `None` for blank references, references the URL parser rejects, and
/// anything resolving to another scheme (`mailto:`, `javascript:`, `ftp:`, `data:`).
pub fn resolve_reference(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let resolved = base.join(reference).ok()?;
    match resolved.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    resolved.host_str()?;
    Some(resolved.into())
}

/// The URL inside the first `url(...)` of an inline style's background image.
///
/// Quotes around the URL are stripped. Looks from the `background-image`
/// declaration onward when present, otherwise at the whole style.
pub fn background_image_url(style: &str) -> Option<String> {
    let lower = style.to_ascii_lowercase();
    let from = lower.find("background-image").unwrap_or(0);
    let caps = CSS_URL_RE.captures(&style[from..])?;
    let inner = caps.get(1)?.as_str().trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}
