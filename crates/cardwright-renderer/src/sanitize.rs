//! Escaping and link handling for card text.

use std::borrow::Cow;
use std::sync::LazyLock;

use crate::Regex;

/// `[label](url)`, tolerating one level of balanced parentheses in the url.
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]\((?:[^()]|\([^()]*\))+\)").unwrap());

/// URL prefixes that may become an `href`.
const ALLOWED_HREF_PREFIXES: [&str; 6] = ["http://", "https://", "/", "./", "../", "#"];

/// Escape `& < > " '` for use in HTML text and attribute values.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Returns the trimmed url if its scheme is allowed, `None` otherwise.
///
/// Anything not on the allow-list is rejected, including `javascript:` and
/// `data:` in any letter case.
pub fn sanitize_href(raw: &str) -> Option<&str> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let lowered = value.to_ascii_lowercase();
    ALLOWED_HREF_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
        .then_some(value)
}

pub fn is_external_href(href: &str) -> bool {
    let lowered = href.to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Replace every `[label](url)` with `label`. Text without links is
/// returned unchanged.
pub fn strip_markdown_links(value: &str) -> Cow<'_, str> {
    MARKDOWN_LINK_RE.replace_all(value, "${1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_href_allow_list() {
        assert_eq!(sanitize_href(" https://example.com "), Some("https://example.com"));
        assert_eq!(sanitize_href("/image/a.avif"), Some("/image/a.avif"));
        assert_eq!(sanitize_href("../up"), Some("../up"));
        assert_eq!(sanitize_href("#anchor"), Some("#anchor"));
        assert_eq!(sanitize_href("JavaScript:alert(1)"), None);
        assert_eq!(sanitize_href("data:text/html,hi"), None);
        assert_eq!(sanitize_href("mailto:a@b.c"), None);
        assert_eq!(sanitize_href("   "), None);
    }

    #[test]
    fn test_strip_markdown_links() {
        assert_eq!(
            strip_markdown_links("See [the rules](https://example.com/rules) and [more](/x)."),
            "See the rules and more."
        );
        assert_eq!(strip_markdown_links("[x](javascript:alert(1))"), "x");
        assert_eq!(strip_markdown_links(""), "");
    }

    #[test]
    fn test_strip_leaves_non_links_alone() {
        for value in [
            "no links here",
            "[brackets] (parens)",
            "[unterminated](",
            "***bold*** and `code`",
            "Проворность + 2",
        ] {
            assert!(matches!(strip_markdown_links(value), Cow::Borrowed(s) if s == value));
        }
    }
}
