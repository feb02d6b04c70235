//! Ordered filter execution.

use std::fmt;
use std::str::FromStr;

use crate::context::{Context, ContextOverrides};
use crate::document::{Document, DocumentError};
use crate::filter::{Filter, FilterError, ParseFilter};
use crate::filters::{
    EmojiFilter, ExternalLinkFilter, FootnoteFilter, ImageLinkFilter, MarkdownFilter,
    MentionFilter, SanitizeFilter, TaskListFilter,
};

/// Error returned when a render call fails.
///
/// Rendering is all-or-nothing: no partial HTML accompanies an error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A filter failed; no later filter ran.
    #[error("Filter '{filter}' failed: {source}")]
    Filter {
        /// Name of the failing filter.
        filter: &'static str,
        #[source]
        source: FilterError,
    },
    /// The final document could not be serialized.
    #[error("{0}")]
    Serialize(#[source] DocumentError),
}

/// Built-in structural filters that can be named in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKind {
    ImageLink,
    Footnote,
    TaskList,
    Emoji,
    Mention,
    ExternalLink,
    Sanitize,
}

impl FilterKind {
    /// Order used by [`Pipeline::default_chain`].
    ///
    /// Task lists are converted before emoji and mentions rewrite item text,
    /// and external links are marked after mentions have added theirs.
    pub const DEFAULT_CHAIN: [FilterKind; 7] = [
        FilterKind::ImageLink,
        FilterKind::Footnote,
        FilterKind::TaskList,
        FilterKind::Emoji,
        FilterKind::Mention,
        FilterKind::ExternalLink,
        FilterKind::Sanitize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageLink => "image_link",
            Self::Footnote => "footnote",
            Self::TaskList => "task_list",
            Self::Emoji => "emoji",
            Self::Mention => "mention",
            Self::ExternalLink => "external_link",
            Self::Sanitize => "sanitize",
        }
    }

    fn build(self) -> Box<dyn Filter> {
        match self {
            Self::ImageLink => Box::new(ImageLinkFilter),
            Self::Footnote => Box::new(FootnoteFilter),
            Self::TaskList => Box::new(TaskListFilter),
            Self::Emoji => Box::new(EmojiFilter),
            Self::Mention => Box::new(MentionFilter),
            Self::ExternalLink => Box::new(ExternalLinkFilter),
            Self::Sanitize => Box::new(SanitizeFilter::default()),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::DEFAULT_CHAIN
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown filter '{s}'"))
    }
}

/// Fixed, ordered chain of filters with a default context.
///
/// The chain is assembled once at startup and only read afterwards; each
/// [`render`](Self::render) call owns its document and effective context.
///
/// # Example
///
/// ```
/// use mdp_pipeline::{Context, ContextOverrides, Pipeline};
///
/// let pipeline = Pipeline::default_chain(Context::default());
/// let html = pipeline
///     .render("- [x] Ship it", &ContextOverrides::default())
///     .unwrap();
/// assert!(html.contains(r#"class="task-list-item""#));
/// ```
pub struct Pipeline {
    parser: Box<dyn ParseFilter>,
    filters: Vec<Box<dyn Filter>>,
    default_context: Context,
}

impl Pipeline {
    /// Create a pipeline with only a parsing stage.
    #[must_use]
    pub fn new<P: ParseFilter + 'static>(parser: P, default_context: Context) -> Self {
        Self {
            parser: Box::new(parser),
            filters: Vec::new(),
            default_context,
        }
    }

    /// Markdown parsing followed by the built-in filters in their default order.
    #[must_use]
    pub fn default_chain(default_context: Context) -> Self {
        Self::with_kinds(default_context, &FilterKind::DEFAULT_CHAIN)
    }

    /// Markdown parsing followed by the given built-in filters, in order.
    #[must_use]
    pub fn with_kinds(default_context: Context, kinds: &[FilterKind]) -> Self {
        let mut pipeline = Self::new(MarkdownFilter, default_context);
        pipeline
            .filters
            .extend(kinds.iter().map(|kind| kind.build()));
        pipeline
    }

    /// Append a filter to the end of the chain.
    #[must_use]
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn default_context(&self) -> &Context {
        &self.default_context
    }

    /// Names of all stages in execution order, parser first.
    pub fn filter_names(&self) -> Vec<&'static str> {
        std::iter::once(self.parser.name())
            .chain(self.filters.iter().map(|filter| filter.name()))
            .collect()
    }

    /// Run every stage over `text` and return the final document.
    pub fn call(&self, text: &str, overrides: &ContextOverrides) -> Result<Document, PipelineError> {
        let context = self.default_context.merge(overrides);

        let mut doc = self
            .parser
            .parse(text, &context)
            .map_err(|source| abort(self.parser.name(), source))?;

        for filter in &self.filters {
            tracing::trace!(filter = filter.name(), "Applying filter");
            doc = filter
                .apply(doc, &context)
                .map_err(|source| abort(filter.name(), source))?;
        }

        Ok(doc)
    }

    /// Run every stage over `text` and serialize the result to HTML.
    pub fn render(&self, text: &str, overrides: &ContextOverrides) -> Result<String, PipelineError> {
        let doc = self.call(text, overrides)?;
        let html = doc.to_html().map_err(PipelineError::Serialize)?;
        tracing::debug!(
            input_len = text.len(),
            output_len = html.len(),
            "Rendered document"
        );
        Ok(html)
    }
}

fn abort(filter: &'static str, source: FilterError) -> PipelineError {
    tracing::warn!(filter, error = %source, "Filter failed, aborting render");
    PipelineError::Filter { filter, source }
}

#[cfg(test)]
mod tests {
    // Ensure Pipeline is Send + Sync for use with Arc
    static_assertions::assert_impl_all!(super::Pipeline: Send, Sync);
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::filters::HtmlFilter;
    use pretty_assertions::assert_eq;

    struct Failing;

    impl Filter for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _doc: Document, _ctx: &Context) -> Result<Document, FilterError> {
            Err(FilterError::Failed("boom".to_owned()))
        }
    }

    /// Records how often it ran and appends its tag to every paragraph.
    struct Recording {
        tag: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl Filter for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn apply(&self, doc: Document, _ctx: &Context) -> Result<Document, FilterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for p in doc.select("p") {
                let trail = p.attribute("data-trail").unwrap_or_default();
                p.set_attribute("data-trail", &format!("{trail}{}", self.tag));
            }
            Ok(doc)
        }
    }

    struct ContextProbe;

    impl Filter for ContextProbe {
        fn name(&self) -> &'static str {
            "context_probe"
        }

        fn apply(&self, doc: Document, ctx: &Context) -> Result<Document, FilterError> {
            for p in doc.select("p") {
                p.set_attribute("data-base", &ctx.base_url);
            }
            Ok(doc)
        }
    }

    #[test]
    fn test_filters_run_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new(HtmlFilter, Context::default())
            .with_filter(Recording {
                tag: "a",
                calls: Arc::clone(&calls),
            })
            .with_filter(Recording {
                tag: "b",
                calls: Arc::clone(&calls),
            });

        let html = pipeline
            .render("<p>x</p>", &ContextOverrides::default())
            .unwrap();
        assert_eq!(html, r#"<p data-trail="ab">x</p>"#);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failure_aborts_remaining_filters() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new(HtmlFilter, Context::default())
            .with_filter(Failing)
            .with_filter(Recording {
                tag: "a",
                calls: Arc::clone(&calls),
            });

        let err = pipeline
            .render("<p>x</p>", &ContextOverrides::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Filter {
                filter: "failing",
                ..
            }
        ));
        assert_eq!(err.to_string(), "Filter 'failing' failed: boom");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_overrides_applied_per_call() {
        let pipeline = Pipeline::new(HtmlFilter, Context::default()).with_filter(ContextProbe);

        let overridden = pipeline
            .render(
                "<p>x</p>",
                &ContextOverrides {
                    base_url: Some("/users".to_owned()),
                    ..ContextOverrides::default()
                },
            )
            .unwrap();
        assert_eq!(overridden, r#"<p data-base="/users">x</p>"#);

        let defaulted = pipeline
            .render("<p>x</p>", &ContextOverrides::default())
            .unwrap();
        assert_eq!(defaulted, r#"<p data-base="/">x</p>"#);
        assert_eq!(pipeline.default_context().base_url, "/");
    }

    #[test]
    fn test_default_chain_names() {
        let pipeline = Pipeline::default_chain(Context::default());
        assert_eq!(
            pipeline.filter_names(),
            vec![
                "markdown",
                "image_link",
                "footnote",
                "task_list",
                "emoji",
                "mention",
                "external_link",
                "sanitize"
            ]
        );
    }

    #[test]
    fn test_filter_kind_from_str() {
        assert_eq!("task_list".parse::<FilterKind>(), Ok(FilterKind::TaskList));
        assert_eq!(
            "external_link".parse::<FilterKind>(),
            Ok(FilterKind::ExternalLink)
        );
        assert!("tasklist".parse::<FilterKind>().is_err());
        assert_eq!(FilterKind::Sanitize.to_string(), "sanitize");
    }
}
