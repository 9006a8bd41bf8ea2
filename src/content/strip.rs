//! External link stripping: guarantees no outbound links reach a rendered
//! page, plus the fail-closed URL predicate used by the validation endpoint.

use std::sync::OnceLock;

use regex::Regex;

// Static patterns, compiled once at first use.
static MARKDOWN_LINK: OnceLock<Regex> = OnceLock::new();
static HTTP_ANCHOR: OnceLock<Regex> = OnceLock::new();
static BARE_URL: OnceLock<Regex> = OnceLock::new();
static URL_MARKER: OnceLock<Regex> = OnceLock::new();

fn markdown_link() -> &'static Regex {
    MARKDOWN_LINK.get_or_init(|| Regex::new(r"(?i)\[([^\]]+)\]\(https?://[^)]+\)").unwrap())
}

fn http_anchor() -> &'static Regex {
    // Any anchor whose open tag carries an http(s) URL, multi-line inner
    // content, non-greedy on the closing tag. Relative internal anchors do
    // not match and survive.
    HTTP_ANCHOR.get_or_init(|| Regex::new(r"(?is)<a[^>]*https?://[^>]*>(.*?)</a>").unwrap())
}

fn bare_url() -> &'static Regex {
    BARE_URL.get_or_init(|| Regex::new(r"(?i)https?://[^\s)]+").unwrap())
}

fn url_marker() -> &'static Regex {
    URL_MARKER.get_or_init(|| Regex::new(r"(?i)(https?://|www\.)").unwrap())
}

/// Remove every external outbound reference from the text, in order:
///
/// 1. Markdown links `[text](http…)` are replaced by their text.
/// 2. HTML anchors carrying an `http(s)` URL are replaced by their inner
///    content; anchors with relative hrefs are left alone.
/// 3. Remaining bare `http(s)://…` tokens are deleted outright, which can
///    leave whitespace or punctuation artifacts (accepted cosmetic defect).
///
/// One pass is a fixed point: stripping a stripped string changes nothing.
///
/// `allow_same_site` is reserved and currently has no effect.
pub fn strip_external_links(html: &str, allow_same_site: bool) -> String {
    let _ = allow_same_site;

    if html.is_empty() {
        return html.to_string();
    }

    let out = markdown_link().replace_all(html, "$1");
    let out = http_anchor().replace_all(&out, "$1");
    bare_url().replace_all(&out, "").into_owned()
}

/// True when the text contains any `http(s)://` or `www.` substring.
///
/// Used as a pre-publish validation gate: content with links is rejected,
/// never silently cleaned.
pub fn contains_external_url(text: &str) -> bool {
    url_marker().is_match(text)
}
