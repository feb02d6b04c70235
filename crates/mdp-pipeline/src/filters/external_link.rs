//! Off-site link attributes.

use url::Url;

use crate::context::Context;
use crate::document::Document;
use crate::filter::{Filter, FilterError};

const EXTERNAL_REL: &str = "nofollow noopener";

/// Marks absolute links to other hosts with `rel="nofollow noopener"` and
/// `target="_blank"`. Reads `hostname`.
///
/// Relative links and links without a host (`mailto:`) are internal.
pub struct ExternalLinkFilter;

impl Filter for ExternalLinkFilter {
    fn name(&self) -> &'static str {
        "external_link"
    }

    fn apply(&self, doc: Document, ctx: &Context) -> Result<Document, FilterError> {
        for link in doc.select("a") {
            let Some(href) = link.attribute("href") else {
                continue;
            };
            if is_external(&href, ctx.hostname.as_deref()) {
                link.set_attribute("rel", EXTERNAL_REL);
                link.set_attribute("target", "_blank");
            }
        }
        Ok(doc)
    }
}

fn is_external(href: &str, hostname: Option<&str>) -> bool {
    let Ok(url) = Url::parse(href.trim()) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    !hostname.is_some_and(|site| site.eq_ignore_ascii_case(host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter_html(html: &str, hostname: Option<&str>) -> String {
        let doc = Document::parse(html).unwrap();
        let ctx = Context {
            hostname: hostname.map(str::to_owned),
            ..Context::default()
        };
        ExternalLinkFilter
            .apply(doc, &ctx)
            .unwrap()
            .to_html()
            .unwrap()
    }

    #[test]
    fn test_marks_off_site_link() {
        assert_eq!(
            filter_html(r#"<a href="https://rust-lang.org/learn">x</a>"#, Some("example.com")),
            r#"<a href="https://rust-lang.org/learn" rel="nofollow noopener" target="_blank">x</a>"#
        );
    }

    #[test]
    fn test_same_host_untouched() {
        let html = r#"<a href="https://Example.com/users/bob">@bob</a>"#;
        assert_eq!(filter_html(html, Some("example.com")), html);
    }

    #[test]
    fn test_relative_and_mailto_untouched() {
        let html = r##"<a href="/users/bob">a</a><a href="#fn-1">b</a><a href="mailto:a@example.com">c</a>"##;
        assert_eq!(filter_html(html, None), html);
    }

    #[test]
    fn test_without_hostname_every_absolute_link_is_external() {
        assert!(is_external("http://example.com/", None));
        assert!(!is_external("page.html", None));
    }
}
