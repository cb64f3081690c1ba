//! Markup stripping for indexed text.
//!
//! Content bodies arrive as HTML. Before indexing, `<script>` and
//! `<style>` elements are dropped with their contents, every remaining
//! tag is removed, and whitespace runs are collapsed to a single space.
//! Entities are left as-is.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("static regex")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Strip all markup from `input`, returning trimmed plain text.
///
/// ```rust
/// use sitebot_core::markup::strip_tags;
///
/// let text = strip_tags("<p>Hello <b>world</b></p><script>alert(1)</script>");
/// assert_eq!(text, "Hello world");
/// ```
pub fn strip_tags(input: &str) -> String {
    if !input.contains('<') {
        return collapse_whitespace(input);
    }
    let without_scripts = SCRIPT_OR_STYLE.replace_all(input, "");
    let without_tags = TAG.replace_all(&without_scripts, "");
    collapse_whitespace(&without_tags)
}

fn collapse_whitespace(input: &str) -> String {
    WHITESPACE.replace_all(input, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_tags("Our plans start at $10/mo"), "Our plans start at $10/mo");
    }

    #[test]
    fn test_removes_nested_tags() {
        let html = "<div class=\"x\"><h2>Pricing</h2>\n<p>From <em>$10</em></p></div>";
        assert_eq!(strip_tags(html), "Pricing From $10");
    }

    #[test]
    fn test_drops_script_and_style_contents() {
        let html = "<style>p { color: red }</style><p>Visible</p><SCRIPT type=\"x\">var a = 1;</SCRIPT>";
        assert_eq!(strip_tags(html), "Visible");
    }

    #[test]
    fn test_multiline_tag() {
        let html = "<a\n href=\"/about\">About us</a>";
        assert_eq!(strip_tags(html), "About us");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(strip_tags("  a\n\n\tb   c  "), "a b c");
    }

    #[test]
    fn test_empty() {
        assert_eq!(strip_tags(""), "");
        assert_eq!(strip_tags("<br/>"), "");
    }

    #[test]
    fn test_entities_preserved() {
        assert_eq!(strip_tags("<p>Fish &amp; Chips</p>"), "Fish &amp; Chips");
    }
}
