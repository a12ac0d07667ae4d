//! HTML link extraction for the HTTP fetcher
//!
//! Turns a fetched HTML body into the page title and the ordered list of
//! child identifiers the coordinator should expand next.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Title and outgoing links extracted from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from the first `<title>` tag)
    pub title: Option<String>,

    /// Absolute http(s) links in document order, duplicates kept
    pub links: Vec<Url>,
}

/// Parses an HTML body and extracts its title and links
///
/// Links come from `<a href>` (except anchors carrying `download`) and from
/// `<link rel="canonical">`, resolved against `base_url`. Duplicates are left
/// in place; the visited registry deduplicates during the crawl.
///
/// # Example
///
/// ```
/// use fanout_crawl::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<title>Docs</title><a href="/pkg/">Packages</a>"#;
/// let base = Url::parse("https://golang.org/").unwrap();
/// let parsed = parse_html(html, &base);
///
/// assert_eq!(parsed.title.as_deref(), Some("Docs"));
/// assert_eq!(parsed.links[0].as_str(), "https://golang.org/pkg/");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href], link[rel='canonical'][href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| !is_download_anchor(element))
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

fn is_download_anchor(element: &ElementRef<'_>) -> bool {
    element.value().name() == "a" && element.value().attr("download").is_some()
}

/// Resolves an href against the page URL
///
/// Returns None for empty hrefs, same-page fragments, script/mail/phone/data
/// links, anything that fails to parse, and anything that is not http(s).
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];
    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then_some(absolute)
}
