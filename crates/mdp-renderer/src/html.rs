//! HTML fragments for block elements with non-trivial markup.

use std::fmt::Write;

use pulldown_cmark::BlockQuoteKind;

use crate::state::escape_html;

/// GitHub-style alert flavor (`> [!NOTE]` and friends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

impl AlertKind {
    fn class_and_title(self) -> (&'static str, &'static str) {
        match self {
            Self::Note => ("note", "Note"),
            Self::Tip => ("tip", "Tip"),
            Self::Important => ("important", "Important"),
            Self::Warning => ("warning", "Warning"),
            Self::Caution => ("caution", "Caution"),
        }
    }
}

pub(crate) fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        write!(
            out,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )
        .unwrap();
    } else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
    }
}

pub(crate) fn alert_start(kind: AlertKind, out: &mut String) {
    let (class, title) = kind.class_and_title();
    write!(
        out,
        r#"<div class="markdown-alert markdown-alert-{class}"><p class="markdown-alert-title">{title}</p>"#
    )
    .unwrap();
}

pub(crate) fn alert_end(out: &mut String) {
    out.push_str("</div>");
}

pub(crate) fn footnote_reference(label: &str, number: usize, out: &mut String) {
    let label = escape_html(label);
    write!(
        out,
        r##"<sup class="footnote-reference"><a href="#fn-{label}" id="fnref-{label}">{number}</a></sup>"##
    )
    .unwrap();
}

pub(crate) fn footnote_definition_start(label: &str, number: usize, out: &mut String) {
    write!(
        out,
        r#"<div class="footnote-definition" id="fn-{}"><sup class="footnote-definition-label">{number}</sup>"#,
        escape_html(label)
    )
    .unwrap();
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        code_block(Some("rust"), "fn main() {}", &mut out);
        assert_eq!(
            out,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn test_code_block_escapes_content() {
        let mut out = String::new();
        code_block(None, "a < b && c", &mut out);
        assert_eq!(out, "<pre><code>a &lt; b &amp;&amp; c</code></pre>");
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        image("image.png", "Alt text", "Image title", &mut out);
        assert_eq!(
            out,
            r#"<img src="image.png" title="Image title" alt="Alt text">"#
        );
    }

    #[test]
    fn test_alert_markup() {
        let mut out = String::new();
        alert_start(AlertKind::Warning, &mut out);
        out.push_str("<p>careful</p>");
        alert_end(&mut out);
        assert_eq!(
            out,
            r#"<div class="markdown-alert markdown-alert-warning"><p class="markdown-alert-title">Warning</p><p>careful</p></div>"#
        );
    }
}
