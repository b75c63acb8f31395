//! Card markdown to HTML.
//!
//! The dialect is deliberately small: `#`..`###` headings, `- ` bullet
//! lists, paragraphs, links, `***bold italic***`, `**bold**`, `*italic*`
//! and `` `code` ``. Input never fails to render; anything unrecognized
//! comes out as escaped paragraph text.
//!
//! Emphasis markers are matched in a fixed order (bold italic, bold,
//! italic, code) with no nesting validation, so overlapping markers such as
//! `**a*b**c*` resolve to whatever that order produces. Emphasis runs after
//! links are built, so `*` pairs inside a url end up in the `href`.

use std::sync::LazyLock;

use crate::sanitize::{escape_html, is_external_href, sanitize_href};
use crate::{Captures, Regex};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s+(.*)$").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(((?:[^()\s]|\([^()\s]*\))+)\)").unwrap()
});
static BOLD_ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*([^*]+)\*\*\*").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Render card markdown to an HTML fragment. Blocks are concatenated with
/// no separator.
pub fn render_markdown(source: &str) -> String {
    let normalized = source.replace("\r\n", "\n");
    let mut html = String::with_capacity(normalized.len() + normalized.len() / 2);
    let mut list: Vec<String> = Vec::new();

    for raw_line in normalized.split('\n') {
        let line = raw_line.trim_end();

        if line.is_empty() {
            flush_list(&mut html, &mut list);
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            flush_list(&mut html, &mut list);
            let level = caps[1].len();
            let content = render_inline(caps[2].trim());
            html.push_str(&format!("<h{level}>{content}</h{level}>"));
            continue;
        }

        if let Some(caps) = LIST_ITEM_RE.captures(line) {
            list.push(format!("<li>{}</li>", render_inline(caps[1].trim())));
            continue;
        }

        flush_list(&mut html, &mut list);
        html.push_str(&format!("<p>{}</p>", render_inline(line)));
    }

    flush_list(&mut html, &mut list);
    html
}

fn flush_list(html: &mut String, list: &mut Vec<String>) {
    if list.is_empty() {
        return;
    }
    html.push_str("<ul>");
    for item in list.drain(..) {
        html.push_str(&item);
    }
    html.push_str("</ul>");
}

/// Inline transforms for a single block of text.
///
/// The text is escaped before any markup is injected, so captured labels
/// and urls are already safe to emit as-is.
pub fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);

    let linked = LINK_RE.replace_all(&escaped, |caps: &Captures| {
        let label = &caps[1];
        match sanitize_href(&caps[2]) {
            Some(href) if is_external_href(href) => format!(
                r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{label}</a>"#
            ),
            Some(href) => format!(r#"<a href="{href}">{label}</a>"#),
            None => label.to_string(),
        }
    });

    let output = BOLD_ITALIC_RE.replace_all(&linked, "<strong><em>${1}</em></strong>");
    let output = BOLD_RE.replace_all(&output, "<strong>${1}</strong>");
    let output = ITALIC_RE.replace_all(&output, "<em>${1}</em>");
    let output = CODE_RE.replace_all(&output, "<code>${1}</code>");
    output.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_escaped_paragraph() {
        insta::assert_snapshot!(render_markdown("Tom & Jerry <3 \"quotes\""), @"<p>Tom &amp; Jerry &lt;3 &quot;quotes&quot;</p>");
    }

    #[test]
    fn test_link_scheme_allow_list() {
        insta::assert_snapshot!(render_markdown("[x](javascript:alert(1))"), @"<p>x</p>");
        insta::assert_snapshot!(render_markdown("[x](data:text/html,hi)"), @"<p>x</p>");
        insta::assert_snapshot!(
            render_markdown("[x](https://example.com)"),
            @r#"<p><a href="https://example.com" target="_blank" rel="noopener noreferrer">x</a></p>"#
        );
        insta::assert_snapshot!(
            render_markdown("[rules](/rules#two)"),
            @r#"<p><a href="/rules#two">rules</a></p>"#
        );
    }

    #[test]
    fn test_link_text_is_escaped_once() {
        insta::assert_snapshot!(
            render_markdown("[a & b](https://x.com/?q=1&r=2)"),
            @r#"<p><a href="https://x.com/?q=1&amp;r=2" target="_blank" rel="noopener noreferrer">a &amp; b</a></p>"#
        );
    }

    #[test]
    fn test_attribute_breakout_is_not_linkified() {
        insta::assert_snapshot!(
            render_markdown(r#"[x](https://e.com" onmouseover="alert(1))"#),
            @"<p>[x](https://e.com&quot; onmouseover=&quot;alert(1))</p>"
        );
    }

    #[test]
    fn test_heading_levels() {
        insta::assert_snapshot!(render_markdown("### Title"), @"<h3>Title</h3>");
        insta::assert_snapshot!(render_markdown("# **Big**"), @"<h1><strong>Big</strong></h1>");
        insta::assert_snapshot!(render_markdown("#### Title"), @"<p>#### Title</p>");
        insta::assert_snapshot!(render_markdown("#NoSpace"), @"<p>#NoSpace</p>");
    }

    #[test]
    fn test_consecutive_list_items_merge() {
        insta::assert_snapshot!(render_markdown("- a\n- b"), @"<ul><li>a</li><li>b</li></ul>");
        insta::assert_snapshot!(
            render_markdown("- a\n\n- b"),
            @"<ul><li>a</li></ul><ul><li>b</li></ul>"
        );
        insta::assert_snapshot!(render_markdown("- a\n## H"), @"<ul><li>a</li></ul><h2>H</h2>");
        insta::assert_snapshot!(render_markdown("-a"), @"<p>-a</p>");
    }

    #[test]
    fn test_mixed_document() {
        let source = "# Heading\r\n\r\nSome ***bold italic*** and **bold** and *it* with `code`.\n- one\n- [two](/rules#two)\nAfter list";
        insta::assert_snapshot!(
            render_markdown(source),
            @r#"<h1>Heading</h1><p>Some <strong><em>bold italic</em></strong> and <strong>bold</strong> and <em>it</em> with <code>code</code>.</p><ul><li>one</li><li><a href="/rules#two">two</a></li></ul><p>After list</p>"#
        );
    }

    #[test]
    fn test_feature_line() {
        insta::assert_snapshot!(
            render_markdown("***Заклинатель:*** Знание"),
            @"<p><strong><em>Заклинатель:</em></strong> Знание</p>"
        );
    }

    #[test]
    fn test_overlapping_emphasis_follows_match_order() {
        insta::assert_snapshot!(render_markdown("**a*b**c*"), @"<p>*<em>a</em>b*<em>c</em></p>");
    }

    #[test]
    fn test_emphasis_applies_inside_link_urls() {
        insta::assert_snapshot!(render_markdown("[a](/x*y*z)"), @r#"<p><a href="/x<em>y</em>z">a</a></p>"#);
        insta::assert_snapshot!(render_markdown("[a](/x_y_z)"), @r#"<p><a href="/x_y_z">a</a></p>"#);
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(render_markdown(""), "");
        assert_eq!(render_markdown("  \n\t\n"), "");
    }
}
