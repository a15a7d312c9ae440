use url::Url;

/// Returns true if the href already names a host (`https://host/...` or `//host/...`)
pub fn has_network_location(href: &str) -> bool {
    if href.starts_with("//") {
        return href.len() > 2;
    }

    match Url::parse(href) {
        Ok(url) => url.host_str().map_or(false, |host| !host.is_empty()),
        Err(_) => false,
    }
}

/// Makes an href absolute against the page it was found on
///
/// # Resolution Rules
///
/// 1. Empty (or whitespace-only) hrefs resolve to an empty string
/// 2. Hrefs that already carry a network location are returned unmodified
/// 3. Everything else is joined onto `base`
///
/// An href that cannot be joined also resolves to an empty string, so callers
/// can treat "no usable URL" uniformly.
///
/// # Examples
///
/// ```
/// use brand_watcher::url::absolutize;
/// use url::Url;
///
/// let base = Url::parse("https://example.com").unwrap();
/// assert_eq!(absolutize("/p/123", &base), "https://example.com/p/123");
/// assert_eq!(absolutize("https://other.com/x", &base), "https://other.com/x");
/// ```
pub fn absolutize(href: &str, base: &Url) -> String {
    let href = href.trim();

    if href.is_empty() {
        return String::new();
    }

    if has_network_location(href) {
        return href.to_string();
    }

    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!("Could not resolve href '{}' against {}: {}", href, base, e);
            String::new()
        }
    }
}

/// Absolute URL for a link found on a page
///
/// Like [`absolutize`], except protocol-relative hrefs (`//host/...`) take the
/// page's scheme so the result can be followed as-is.
pub fn link_url(href: &str, base: &Url) -> String {
    let url = absolutize(href, base);
    if url.starts_with("//") {
        format!("{}:{}", base.scheme(), url)
    } else {
        url
    }
}

/// Key under which a page counts as visited: the URL without its fragment
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}
