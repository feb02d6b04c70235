//! `:shortcode:` emoji images.

use std::fmt::Write;
use std::sync::LazyLock;

use mdp_renderer::escape_html;
use regex::Regex;

use super::text::{replace_text, text_nodes};
use crate::context::Context;
use crate::document::Document;
use crate::filter::{Filter, FilterError};

static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z0-9_+\-]+):").unwrap());

/// Replaces gemoji `:shortcode:`s with emoji images served from
/// `{asset_root}/emoji/{name}.png`. Reads `asset_root`.
///
/// Unknown shortcodes and text inside links, code and preformatted blocks
/// are left alone.
pub struct EmojiFilter;

impl EmojiFilter {
    /// Whether `name` is a known emoji shortcode.
    pub fn supports(name: &str) -> bool {
        emojis::get_by_shortcode(name).is_some()
    }
}

impl Filter for EmojiFilter {
    fn name(&self) -> &'static str {
        "emoji"
    }

    fn apply(&self, doc: Document, ctx: &Context) -> Result<Document, FilterError> {
        let root = ctx.asset_root.trim_end_matches('/');
        for node in text_nodes(doc.root()) {
            let Some(text) = node.text() else { continue };
            if let Some(html) = emoji_html(&text, root) {
                replace_text(&node, &html)?;
            }
        }
        Ok(doc)
    }
}

fn emoji_html(text: &str, asset_root: &str) -> Option<String> {
    let mut html = String::with_capacity(text.len() + 128);
    let mut last = 0;
    let mut replaced = false;

    for caps in SHORTCODE_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !EmojiFilter::supports(name.as_str()) {
            continue;
        }
        html.push_str(&escape_html(&text[last..whole.start()]));
        let name = name.as_str();
        write!(
            html,
            r#"<img class="emoji" title=":{name}:" alt=":{name}:" src="{}/emoji/{}.png" height="20" width="20" align="absmiddle">"#,
            escape_html(asset_root),
            name.replace('+', "%2B")
        )
        .unwrap();
        last = whole.end();
        replaced = true;
    }

    if !replaced {
        return None;
    }
    html.push_str(&escape_html(&text[last..]));
    Some(html)
}
