//! Product extraction from listing pages
//!
//! Extraction runs an ordered chain of strategies; the first one that yields any
//! product wins:
//!
//! 1. **product-cards**: structural card selection, with per-card id lookup
//!    (data attributes first, then patterns over the card's markup)
//! 2. **raw-text**: patterns over the whole raw body, for pages whose structure
//!    is not recognised at all; products found this way carry no URL

use crate::crawler::paginator::next_page_url;
use crate::state::Product;
use crate::url::link_url;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Elements treated as product cards
const CARD_SELECTOR: &str = r#"[data-testid*="product-card"], .product-tile, li[data-productid]"#;

/// Title-like nodes inside a card, used when the card link has no usable text
const TITLE_NODE_SELECTOR: &str = r#".product-name, .name, [data-testid="product-name"]"#;

/// Card attributes holding the product id, in priority order
const ID_ATTRIBUTES: &[&str] = &["data-productid", "data-sku", "data-itemid", "data-id"];

/// Embedded id shapes, in priority order
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_patterns(&[
        r#"(?i)data-productid="([^"]+)""#,
        r#"(?i)"productID"\s*:\s*"([^"]+)""#,
        r#"(?i)"id"\s*:\s*"([^"]+)""#,
        r#"(?i)"sku"\s*:\s*"([^"]+)""#,
    ])
});

/// Embedded title shapes, in priority order
static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_patterns(&[
        r#"(?i)data-productname="([^"]+)""#,
        r#"(?i)"productName"\s*:\s*"([^"]+)""#,
    ])
});

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("hardcoded extraction pattern is valid"))
        .collect()
}

/// A single extraction strategy
pub type Strategy = fn(&ListingPage<'_>) -> Vec<Product>;

/// Extraction strategies in the order they are tried
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("product-cards", products_from_cards),
    ("raw-text", products_from_raw_text),
];

/// A fetched listing page, parsed once and queried for products and pagination
pub struct ListingPage<'a> {
    raw: &'a str,
    document: Html,
    base: &'a Url,
}

impl<'a> ListingPage<'a> {
    /// Parses a page body; `base` is the URL the body was served from
    pub fn parse(raw: &'a str, base: &'a Url) -> Self {
        Self {
            raw,
            document: Html::parse_document(raw),
            base,
        }
    }

    /// Runs the strategy chain and returns the first non-empty result
    pub fn products(&self) -> Vec<Product> {
        for (name, strategy) in STRATEGIES {
            let products = strategy(self);
            if !products.is_empty() {
                tracing::debug!(
                    "Strategy '{}' found {} product(s) on {}",
                    name,
                    products.len(),
                    self.base
                );
                return products;
            }
            tracing::trace!("Strategy '{}' found nothing on {}", name, self.base);
        }

        tracing::debug!("No products recognised on {}", self.base);
        Vec::new()
    }

    /// URL of the next listing page, if the page links one
    pub fn next_page(&self) -> Option<Url> {
        next_page_url(&self.document, self.base)
    }
}

/// Extracts the products on a listing page
///
/// # Arguments
///
/// * `body` - The raw page body
/// * `base` - The URL the body was served from, for resolving relative links
///
/// # Example
///
/// ```
/// use brand_watcher::crawler::extract_products;
/// use url::Url;
///
/// let html = r#"<li data-productid="1001"><a href="/p/1001">Oxford Shirt</a></li>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let products = extract_products(html, &base);
/// assert_eq!(products[0].url, "https://example.com/p/1001");
/// ```
pub fn extract_products(body: &str, base: &Url) -> Vec<Product> {
    ListingPage::parse(body, base).products()
}

/// Card strategy: structured selection, then per-card id, URL and title lookup
fn products_from_cards(page: &ListingPage<'_>) -> Vec<Product> {
    let (Ok(card_selector), Ok(link_selector), Ok(title_selector)) = (
        Selector::parse(CARD_SELECTOR),
        Selector::parse("a[href]"),
        Selector::parse(TITLE_NODE_SELECTOR),
    ) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut products = Vec::new();

    for card in page.document.select(&card_selector) {
        let Some(pid) = card_id(&card) else {
            tracing::trace!("Skipping card without a product id");
            continue;
        };

        // First occurrence wins within a page
        if !seen.insert(pid.clone()) {
            continue;
        }

        let link = card.select(&link_selector).next();
        let url = link
            .and_then(|a| a.value().attr("href"))
            .map(|href| link_url(href, page.base))
            .unwrap_or_default();
        let title = card_title(link, &card, &title_selector);

        if let Some(product) = Product::new(&pid, &url, &title) {
            products.push(product);
        }
    }

    products
}

/// Resolves a card's id from its data attributes, then from its markup
fn card_id(card: &ElementRef<'_>) -> Option<String> {
    ID_ATTRIBUTES
        .iter()
        .filter_map(|attr| card.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| first_capture(&ID_PATTERNS, &card.html()))
}

/// Title from the link's title attribute, the link text, or a title-like node
fn card_title(
    link: Option<ElementRef<'_>>,
    card: &ElementRef<'_>,
    title_selector: &Selector,
) -> String {
    if let Some(link) = link {
        if let Some(title) = link
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return title.to_string();
        }

        let text = visible_text(&link);
        if !text.is_empty() {
            return text;
        }
    }

    card.select(title_selector)
        .map(|node| visible_text(&node))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Element text with whitespace runs collapsed
fn visible_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-blank capture of the first pattern that has one
fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    })
}

/// Raw-text strategy: every embedded id in the body, titled when possible
fn products_from_raw_text(page: &ListingPage<'_>) -> Vec<Product> {
    let raw = page.raw;
    let mut seen = HashSet::new();
    let mut products = Vec::new();

    for pattern in ID_PATTERNS.iter() {
        for m in pattern.captures_iter(raw).filter_map(|caps| caps.get(1)) {
            let pid = m.as_str().trim();
            if pid.is_empty() || !seen.insert(pid.to_string()) {
                continue;
            }

            let title = enclosing_title(raw, m.start(), m.end()).unwrap_or_default();
            if let Some(product) = Product::new(pid, "", &title) {
                products.push(product);
            }
        }
    }

    products
}

/// Looks for a title inside the JSON object or tag surrounding `start..end`
fn enclosing_title(raw: &str, start: usize, end: usize) -> Option<String> {
    let open = segment_start(&raw[..start]);
    let close = end + segment_end(&raw[end..]);

    first_capture(&TITLE_PATTERNS, &raw[open..close])
        .map(|title| html_escape::decode_html_entities(&title).into_owned())
}

/// Offset of the `{` or `<` opening the segment that `text` ends inside of
///
/// Balanced inner objects are stepped over.
fn segment_start(text: &str) -> usize {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            '}' => depth += 1,
            '{' if depth > 0 => depth -= 1,
            '{' | '<' if depth == 0 => return i,
            _ => {}
        }
    }
    0
}

/// Offset just past the `}` or `>` closing the segment that `text` starts inside of
fn segment_end(text: &str) -> usize {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            '}' | '>' if depth == 0 => return i + 1,
            _ => {}
        }
    }
    text.len()
}
