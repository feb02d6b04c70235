//! Ordered HTML filter pipeline.
//!
//! A [`Pipeline`] turns author markdown into sanitized HTML by running a
//! fixed chain of filters over one shared [`Document`]:
//!
//! ```text
//! text → markdown → image_link → footnote → task_list → emoji → mention
//!      → external_link → sanitize → HTML
//! ```
//!
//! Every filter implements the [`Filter`] contract: it receives the document
//! produced by the previous stage together with a read-only [`Context`],
//! mutates the tree and returns it. The first failing filter aborts the
//! render call; no partial output is produced.
//!
//! # Example
//!
//! ```
//! use mdp_pipeline::{Context, ContextOverrides, Pipeline};
//!
//! let pipeline = Pipeline::default_chain(Context::default());
//! let overrides = ContextOverrides {
//!     checkbox_disabled: Some(true),
//!     ..ContextOverrides::default()
//! };
//! let html = pipeline.render("- [ ] Review @octocat", &overrides).unwrap();
//! assert!(html.contains(r#"disabled="disabled""#));
//! assert!(html.contains(r#"class="user-mention""#));
//! ```

mod context;
mod document;
mod filter;
pub mod filters;
mod pipeline;

pub use context::{Context, ContextOverrides, DEFAULT_ASSET_ROOT, DEFAULT_BASE_URL};
pub use document::{Document, DocumentError, NodeRef};
pub use filter::{Filter, FilterError, ParseFilter};
pub use pipeline::{FilterKind, Pipeline, PipelineError};
