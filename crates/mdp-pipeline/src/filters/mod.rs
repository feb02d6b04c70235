//! Built-in filters.
//!
//! Parsing stages:
//! - [`MarkdownFilter`]: markdown text → document (reads `gfm`)
//! - [`HtmlFilter`]: HTML text → document
//!
//! Structural filters, in default chain order:
//! - [`ImageLinkFilter`]: standalone `<img>` → linked to its source
//! - [`FootnoteFilter`]: footnote references get the note text as `title`
//! - [`TaskListFilter`]: `[ ] `/`[x] ` list items → checkboxes (reads `checkbox_disabled`)
//! - [`EmojiFilter`]: `:shortcode:` → emoji image (reads `asset_root`)
//! - [`MentionFilter`]: `@name` → profile link (reads `base_url`)
//! - [`ExternalLinkFilter`]: off-site links get `rel`/`target` (reads `hostname`)
//! - [`SanitizeFilter`]: allow-list sanitizer; must run last

mod emoji;
mod external_link;
mod footnote;
mod image_link;
mod markdown;
mod mention;
mod sanitize;
mod task_list;
mod text;

pub use emoji::EmojiFilter;
pub use external_link::ExternalLinkFilter;
pub use footnote::FootnoteFilter;
pub use image_link::ImageLinkFilter;
pub use markdown::{HtmlFilter, MarkdownFilter};
pub use mention::MentionFilter;
pub use sanitize::SanitizeFilter;
pub use task_list::TaskListFilter;
