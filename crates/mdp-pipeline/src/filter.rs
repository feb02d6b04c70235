//! Filter contract.

use crate::context::Context;
use crate::document::{Document, DocumentError};

/// Error returned by a failing filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Tree operation failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Filter-specific failure.
    #[error("{0}")]
    Failed(String),
}

/// A transformation stage of the pipeline.
///
/// A filter receives the document produced by the previous stage, mutates it
/// in place and hands it on. It reads only the context options it documents
/// and performs no I/O.
///
/// # Example
///
/// ```
/// use mdp_pipeline::{Context, Document, Filter, FilterError};
///
/// struct NoFollow;
///
/// impl Filter for NoFollow {
///     fn name(&self) -> &'static str {
///         "no_follow"
///     }
///
///     fn apply(&self, doc: Document, _ctx: &Context) -> Result<Document, FilterError> {
///         for link in doc.select("a") {
///             link.set_attribute("rel", "nofollow");
///         }
///         Ok(doc)
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Transform the document.
    fn apply(&self, doc: Document, ctx: &Context) -> Result<Document, FilterError>;
}

/// The first stage of a pipeline: turns raw text into a document.
pub trait ParseFilter: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Parse `text` into the initial document.
    fn parse(&self, text: &str, ctx: &Context) -> Result<Document, FilterError>;
}
