use crate::state::Product;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// A composed message, ready for any `Mailer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Formats the notification for a run's new items
///
/// Items without a title are shown by id, and items without a URL link to the
/// brand listing itself.
///
/// # Example
///
/// ```
/// use brand_watcher::notify::compose;
///
/// let n = compose(&[], "TK Maxx GANT", "https://example.com/gant");
/// assert_eq!(n.subject, "TK Maxx GANT watcher: no new items");
/// ```
pub fn compose(new_items: &[Product], brand_name: &str, brand_url: &str) -> Notification {
    if new_items.is_empty() {
        return Notification {
            subject: format!("{} watcher: no new items", brand_name),
            html_body: format!(
                "<p>No new items found. <a href=\"{}\">Check manually</a>.</p>",
                encode_double_quoted_attribute(brand_url)
            ),
            text_body: "No new items found.".to_string(),
        };
    }

    let mut text_body = String::from("New items:\n");
    let mut list = String::new();

    for item in new_items {
        let title = item.display_title();
        let url = if item.url.is_empty() {
            brand_url
        } else {
            item.url.as_str()
        };

        let _ = writeln!(text_body, "- {} — {}", title, url);
        let _ = writeln!(
            list,
            "<li><a href=\"{}\">{}</a> <small>(ID: {})</small></li>",
            encode_double_quoted_attribute(url),
            encode_text(title),
            encode_text(&item.pid)
        );
    }

    let html_body = format!(
        "<h3>New {brand} item(s): {count}</h3>\n<ul>\n{list}</ul>\n<p><a href=\"{url}\">See all {brand}</a></p>",
        brand = encode_text(brand_name),
        count = new_items.len(),
        list = list,
        url = encode_double_quoted_attribute(brand_url),
    );

    Notification {
        subject: format!("New {} item(s): {} found", brand_name, new_items.len()),
        html_body,
        text_body,
    }
}
