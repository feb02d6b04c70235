//! Parsing stages.

use mdp_renderer::MarkdownRenderer;

use crate::context::Context;
use crate::document::Document;
use crate::filter::{FilterError, ParseFilter};

/// Renders markdown with [`MarkdownRenderer`] and parses the result.
///
/// Task-list markers are left in the list-item text for [`TaskListFilter`].
///
/// [`TaskListFilter`]: super::TaskListFilter
pub struct MarkdownFilter;

impl ParseFilter for MarkdownFilter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn parse(&self, text: &str, ctx: &Context) -> Result<Document, FilterError> {
        let html = MarkdownRenderer::new()
            .with_gfm(ctx.gfm)
            .render_markdown(text);
        Ok(Document::parse(&html)?)
    }
}

/// Parses input that is already HTML.
pub struct HtmlFilter;

impl ParseFilter for HtmlFilter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn parse(&self, text: &str, _ctx: &Context) -> Result<Document, FilterError> {
        Ok(Document::parse(text)?)
    }
}
