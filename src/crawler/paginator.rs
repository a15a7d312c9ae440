//! Next-page discovery for paginated listings

use crate::url::absolutize;
use scraper::{Html, Selector};
use url::Url;

/// Pagination markers, checked in order
///
/// A `<link rel="next">` in the head takes precedence over any anchor.
const NEXT_PAGE_SELECTORS: &[&str] = &[
    r#"link[rel~="next"][href]"#,
    r#"a[rel~="next"][href], a.pagination__next[href], a[aria-label="Next"][href]"#,
];

/// Finds the next page link in a parsed document
///
/// Only HTTP(S) targets are returned; `javascript:` placeholders and similar
/// dead links on the last page are ignored.
pub fn next_page_url(document: &Html, base: &Url) -> Option<Url> {
    for selector in NEXT_PAGE_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_next(href, base) {
                return Some(url);
            }
        }
    }

    None
}

/// Finds the next page link in a raw page body
///
/// # Example
///
/// ```
/// use brand_watcher::crawler::find_next_page;
/// use url::Url;
///
/// let html = r#"<a class="pagination__next" href="/search?page=2">Next</a>"#;
/// let base = Url::parse("https://example.com/search").unwrap();
/// let next = find_next_page(html, &base).unwrap();
/// assert_eq!(next.as_str(), "https://example.com/search?page=2");
/// ```
pub fn find_next_page(body: &str, base: &Url) -> Option<Url> {
    next_page_url(&Html::parse_document(body), base)
}

fn resolve_next(href: &str, base: &Url) -> Option<Url> {
    let resolved = absolutize(href, base);
    if resolved.is_empty() {
        return None;
    }

    // Protocol-relative hrefs come back untouched and still need a scheme
    let url = base.join(&resolved).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        other => {
            tracing::debug!("Ignoring next-page link with scheme '{}': {}", other, href);
            None
        }
    }
}
