//! `@user` mentions.

use std::fmt::Write;
use std::sync::LazyLock;

use mdp_renderer::escape_html;
use regex::Regex;

use super::text::{replace_text, text_nodes};
use crate::context::Context;
use crate::document::Document;
use crate::filter::{Filter, FilterError};

/// `@name` preceded by start of text or a non-word character.
///
/// The leading character is part of the match (no look-behind); group 1 is the name.
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w@/.\-])@([A-Za-z0-9][A-Za-z0-9\-]*)").unwrap()
});

/// Links `@name` mentions to `{base_url}/name`. Reads `base_url`.
///
/// Text inside links, code and preformatted blocks is left alone.
pub struct MentionFilter;

impl Filter for MentionFilter {
    fn name(&self) -> &'static str {
        "mention"
    }

    fn apply(&self, doc: Document, ctx: &Context) -> Result<Document, FilterError> {
        let base = ctx.base_url.trim_end_matches('/');
        for node in text_nodes(doc.root()) {
            let Some(text) = node.text() else { continue };
            if let Some(html) = mention_html(&text, base) {
                replace_text(&node, &html)?;
            }
        }
        Ok(doc)
    }
}

/// Escaped HTML for `text` with mentions linked, or `None` without mentions.
fn mention_html(text: &str, base: &str) -> Option<String> {
    let mut html = String::with_capacity(text.len() + 64);
    let mut last = 0;

    for caps in MENTION_RE.captures_iter(text) {
        let name = caps.get(1)?;
        let at = name.start() - 1;
        html.push_str(&escape_html(&text[last..at]));
        write!(
            html,
            r#"<a href="{}/{}" class="user-mention">@{}</a>"#,
            escape_html(base),
            name.as_str(),
            name.as_str()
        )
        .unwrap();
        last = name.end();
    }

    if last == 0 {
        return None;
    }
    html.push_str(&escape_html(&text[last..]));
    Some(html)
}
