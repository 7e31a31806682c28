//! Hostname extraction from browsed URLs.
//!
//! The hostname is the unit of attribution for time tracking. Browser
//! UI pages, extension pages, and non-web schemes are not trackable and
//! map to `None`, which the tracker treats as "pause".

use url::Url;

/// Schemes that never attribute browsing time.
const INTERNAL_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "about",
    "edge",
    "moz-extension",
    "brave",
    "file",
    "data",
    "javascript",
    "view-source",
];

/// Extract the trackable hostname from a URL, if any.
///
/// Returns `None` for unparsable URLs, URLs without a host, and
/// browser-internal schemes. Only `http`/`https` pages are trackable.
pub fn hostname_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let scheme = url.scheme();
    if INTERNAL_SCHEMES.contains(&scheme) {
        return None;
    }
    if scheme != "http" && scheme != "https" {
        return None;
    }
    url.host_str().map(str::to_owned)
}
