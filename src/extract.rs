//! Content extraction from source-site HTML.
//!
//! The source blog is a stock WordPress theme, so extraction is a chain of
//! selector strategies tried in order until one yields non-empty text:
//! `.entry-content`, `.post-content`, any `article` container, and finally
//! the concatenated text of all `p` elements. An empty result means "no
//! extractable content"; callers apply their own fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Character budget for listing excerpts before the ellipsis marker.
pub const EXCERPT_CHAR_BUDGET: usize = 500;

static ENTRY_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse(".entry-content").unwrap());
static POST_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse(".post-content").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static PAGE_NUMBER: Lazy<Selector> = Lazy::new(|| Selector::parse(".page-numbers").unwrap());

// scraper::Html exposes no node removal, so script/style bodies are
// stripped textually before the document is parsed.
static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Short text excerpt for listing stubs, truncated with an ellipsis.
    Excerpt,
    /// Full article content; markup when a known container matches.
    Full,
}

/// Infer the last page number of a paginated listing.
///
/// Scans all `.page-numbers` elements (the WordPress pagination markers)
/// and returns the largest integer found. Elements with non-numeric text
/// (Next, Previous, ellipsis) are skipped. A listing without pagination
/// resolves to `1`.
pub fn resolve_last_page(html: &str) -> u32 {
    let doc = Html::parse_document(html);
    doc.select(&PAGE_NUMBER)
        .filter_map(|el| element_text(&el).parse::<u32>().ok())
        .max()
        .unwrap_or(1)
}

/// Extract the best available article content from an HTML document.
///
/// Returns an empty string when every strategy misses; never errors.
pub fn extract(html: &str, mode: ExtractMode) -> String {
    let cleaned = SCRIPT_STYLE.replace_all(html, "");
    let doc = Html::parse_document(&cleaned);
    match mode {
        ExtractMode::Full => {
            for selector in [&*ENTRY_CONTENT, &*POST_CONTENT, &*ARTICLE] {
                if let Some(el) = doc.select(selector).next() {
                    if !element_text(&el).is_empty() {
                        return el.inner_html().trim().to_string();
                    }
                }
            }
            paragraph_text(&doc)
        }
        ExtractMode::Excerpt => {
            let text = container_text(&doc);
            if text.is_empty() {
                return String::new();
            }
            truncate_excerpt(&text)
        }
    }
}

/// Extract plain body text from an HTML document, same strategy chain as
/// [`extract`] but text-only regardless of which strategy matches. Used
/// for scrape contexts handed to the rewrite engine.
pub fn extract_text(html: &str) -> String {
    let cleaned = SCRIPT_STYLE.replace_all(html, "");
    let doc = Html::parse_document(&cleaned);
    container_text(&doc)
}

fn container_text(doc: &Html) -> String {
    for selector in [&*ENTRY_CONTENT, &*POST_CONTENT, &*ARTICLE] {
        if let Some(el) = doc.select(selector).next() {
            let text = element_text(&el);
            if !text.is_empty() {
                return text;
            }
        }
    }
    paragraph_text(doc)
}

fn paragraph_text(doc: &Html) -> String {
    doc.select(&PARAGRAPH)
        .map(|p| element_text(&p))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whitespace-collapsed text content of one element.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_excerpt(text: &str) -> String {
    let truncated: String = text.chars().take(EXCERPT_CHAR_BUDGET).collect();
    format!("{}...", truncated.trim_end())
}
