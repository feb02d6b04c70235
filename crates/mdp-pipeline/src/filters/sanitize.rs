//! Allow-list HTML sanitizer.
//!
//! Runs last in the chain. The document is serialized, cleaned by an
//! [`ammonia::Builder`] and parsed again. Elements are classified as:
//!
//! - **dropped**: removed together with their content (`script`, `style`, ...)
//! - **allowed**: kept, with attributes filtered per tag
//! - **unknown**: replaced by their (sanitized) children
//!
//! Comments are always removed. `<input>` survives only as a checkbox.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ammonia::{Builder, UrlRelative};

use crate::context::Context;
use crate::document::Document;
use crate::filter::{Filter, FilterError};

const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "title", "textarea",
];

const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl", "dt", "em",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "input", "ins", "kbd", "li", "ol", "p",
    "pre", "q", "s", "span", "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot",
    "th", "thead", "tr", "ul",
];

const GLOBAL_ATTRIBUTES: &[&str] = &["class", "id", "title"];

const ELEMENT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "rel", "target"]),
    ("img", &["src", "alt", "height", "width", "align"]),
    (
        "input",
        &["type", "checked", "disabled", "data-checkbox-index"],
    ),
    ("ol", &["start"]),
    ("td", &["style"]),
    ("th", &["style"]),
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

const TABLE_ALIGN_STYLES: &[&str] = &["text-align:left", "text-align:center", "text-align:right"];

/// Strips everything outside the allow-list.
///
/// The default allow-list keeps all markup the built-in filters and the
/// markdown renderer emit. Extend it with [`with_element`](Self::with_element)
/// and [`with_attribute`](Self::with_attribute).
pub struct SanitizeFilter {
    cleaner: Builder<'static>,
}

impl Default for SanitizeFilter {
    fn default() -> Self {
        let mut cleaner = Builder::empty();
        cleaner
            .tags(ALLOWED_ELEMENTS.iter().copied().collect())
            .clean_content_tags(DROPPED_ELEMENTS.iter().copied().collect())
            .generic_attributes(GLOBAL_ATTRIBUTES.iter().copied().collect())
            .tag_attributes(
                ELEMENT_ATTRIBUTES
                    .iter()
                    .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect::<HashSet<_>>()))
                    .collect::<HashMap<_, _>>(),
            )
            .url_schemes(URL_SCHEMES.iter().copied().collect())
            .url_relative(UrlRelative::PassThrough)
            .link_rel(None)
            .strip_comments(true)
            .attribute_filter(filter_attribute);
        Self { cleaner }
    }
}

impl SanitizeFilter {
    /// Allow an additional element.
    #[must_use]
    pub fn with_element(mut self, tag: &'static str) -> Self {
        self.cleaner.add_tags([tag]);
        self
    }

    /// Allow an additional attribute on `tag`.
    #[must_use]
    pub fn with_attribute(mut self, tag: &'static str, attribute: &'static str) -> Self {
        self.cleaner.add_tag_attributes(tag, [attribute]);
        self
    }
}

/// Value checks the allow-list tables cannot express.
fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    match (element, attribute) {
        ("input", "type") if !value.eq_ignore_ascii_case("checkbox") => None,
        (_, "style") if !is_table_align_style(value) => None,
        _ => Some(Cow::Borrowed(value)),
    }
}

fn is_table_align_style(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    TABLE_ALIGN_STYLES.contains(&compact.trim_end_matches(';'))
}

/// Remove `<input>` elements other than checkboxes.
fn drop_non_checkbox_inputs(doc: &Document) {
    for input in doc.select("input") {
        let is_checkbox = input
            .attribute("type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("checkbox"));
        if !is_checkbox {
            tracing::debug!("Dropped non-checkbox input");
            input.detach();
        }
    }
}

impl Filter for SanitizeFilter {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    fn apply(&self, doc: Document, _ctx: &Context) -> Result<Document, FilterError> {
        drop_non_checkbox_inputs(&doc);
        let html = doc.to_html()?;
        let cleaned = self.cleaner.clean(&html).to_string();
        tracing::debug!(
            input_len = html.len(),
            output_len = cleaned.len(),
            "Sanitized document"
        );
        Ok(Document::parse(&cleaned)?)
    }
}
