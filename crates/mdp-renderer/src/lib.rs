//! Markdown to HTML renderer.
//!
//! This crate provides a [`MarkdownRenderer`] that walks pulldown-cmark events
//! and writes semantic HTML5. It is the grammar stage of the `mdp` pipeline:
//! everything downstream works on the HTML tree this renderer produces.
//!
//! Task-list syntax is deliberately left to the pipeline. The renderer never
//! enables pulldown-cmark's task-list extension, so `[ ] ` and `[x] ` markers
//! reach the output as plain list-item text.
//!
//! # Example
//!
//! ```
//! use mdp_renderer::MarkdownRenderer;
//!
//! let html = MarkdownRenderer::new().render_markdown("- [x] Done\n- Todo");
//! assert_eq!(html, "<ul><li>[x] Done</li><li>Todo</li></ul>");
//! ```

mod html;
mod renderer;
mod state;

pub use html::AlertKind;
pub use renderer::MarkdownRenderer;
pub use state::escape_html;
