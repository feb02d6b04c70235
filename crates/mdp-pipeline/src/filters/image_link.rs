//! Links around standalone images.

use mdp_renderer::escape_html;

use crate::context::Context;
use crate::document::Document;
use crate::filter::{Filter, FilterError};

/// Wraps every `<img>` that is not already inside a link in
/// `<a href="{src}" target="_blank">`, so a click opens the full image.
pub struct ImageLinkFilter;

impl Filter for ImageLinkFilter {
    fn name(&self) -> &'static str {
        "image_link"
    }

    fn apply(&self, doc: Document, _ctx: &Context) -> Result<Document, FilterError> {
        for img in doc.select("img") {
            if img.has_ancestor("a") {
                continue;
            }
            let Some(src) = img.attribute("src") else {
                continue;
            };
            let link = Document::create_node(&format!(
                r#"<a href="{}" target="_blank"></a>"#,
                escape_html(&src)
            ))?;
            img.insert_before(&link)?;
            link.append_child(&img);
        }
        Ok(doc)
    }
}
