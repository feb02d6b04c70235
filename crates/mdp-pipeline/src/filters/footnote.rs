//! Footnote reference titles.

use crate::context::Context;
use crate::document::{Document, NodeRef};
use crate::filter::{Filter, FilterError};

const DEFINITION_LABEL_CLASS: &str = "footnote-definition-label";

/// Copies each footnote's text into the `title` of the links pointing at it,
/// so readers can see the note on hover.
///
/// Handles `<sup><a href="#fn-…">` references. References whose definition
/// is missing are left alone.
pub struct FootnoteFilter;

impl Filter for FootnoteFilter {
    fn name(&self) -> &'static str {
        "footnote"
    }

    fn apply(&self, doc: Document, _ctx: &Context) -> Result<Document, FilterError> {
        for sup in doc.select("sup") {
            for link in sup.children().into_iter().filter(|c| c.is_element("a")) {
                let Some(href) = link.attribute("href") else {
                    continue;
                };
                let Some(id) = href.strip_prefix('#').filter(|id| id.starts_with("fn-")) else {
                    continue;
                };
                if let Some(definition) = doc.element_by_id(id) {
                    link.set_attribute("title", &footnote_text(&definition));
                }
            }
        }
        Ok(doc)
    }
}

/// Text of a definition without its number label, whitespace collapsed.
fn footnote_text(definition: &NodeRef) -> String {
    let text: String = definition
        .children()
        .iter()
        .filter(|child| {
            !(child.is_element("sup")
                && child.attribute("class").as_deref() == Some(DEFINITION_LABEL_CLASS))
        })
        .map(NodeRef::text_content)
        .collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter_html(html: &str) -> Document {
        let doc = Document::parse(html).unwrap();
        FootnoteFilter.apply(doc, &Context::default()).unwrap()
    }

    #[test]
    fn test_sets_title_from_definition() {
        let doc = filter_html(concat!(
            r##"<p>Text<sup class="footnote-reference"><a href="#fn-note" id="fnref-note">1</a></sup></p>"##,
            r#"<div class="footnote-definition" id="fn-note"><sup class="footnote-definition-label">1</sup>"#,
            "<p>The\n<em>long</em> note.</p></div>",
        ));
        let link = doc.select("a").remove(0);
        assert_eq!(link.attribute("title").as_deref(), Some("The long note."));
    }

    #[test]
    fn test_missing_definition_untouched() {
        let html = r##"<p>Text<sup><a href="#fn-gone">1</a></sup></p>"##;
        let doc = filter_html(html);
        assert_eq!(doc.to_html().unwrap(), html);
    }

    #[test]
    fn test_ignores_other_superscript_links() {
        let html = r##"<p>x<sup><a href="#section">2</a></sup></p><h2 id="section">S</h2>"##;
        let doc = filter_html(html);
        assert!(doc.select("a")[0].attribute("title").is_none());
    }
}
