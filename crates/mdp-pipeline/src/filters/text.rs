//! Text-node rewriting shared by the inline filters.

use crate::document::{Document, DocumentError, NodeRef};

/// Elements whose text is never rewritten.
pub(crate) const IGNORED_ANCESTORS: &[&str] = &["a", "code", "pre", "script", "style"];

/// Text nodes under `root` that have no ignored ancestor, in document order.
pub(crate) fn text_nodes(root: &NodeRef) -> Vec<NodeRef> {
    let mut found = Vec::new();
    collect(root, &mut found);
    found
}

fn collect(node: &NodeRef, found: &mut Vec<NodeRef>) {
    for child in node.children() {
        if child.is_text() {
            found.push(child);
        } else if child
            .tag_name()
            .is_some_and(|tag| !IGNORED_ANCESTORS.contains(&tag))
        {
            collect(&child, found);
        }
    }
}

/// Replace a text node with the nodes parsed from `html`.
pub(crate) fn replace_text(node: &NodeRef, html: &str) -> Result<(), DocumentError> {
    let nodes = Document::parse_fragment(html)?;
    node.replace_with(&nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_nodes_skip_ignored_ancestors() {
        let doc =
            Document::parse("<p>one <a>two</a> <em>three</em></p><pre><code>four</code></pre>")
                .unwrap();
        let texts: Vec<String> = text_nodes(doc.root())
            .iter()
            .filter_map(NodeRef::text)
            .collect();
        assert_eq!(texts, vec!["one ", " ", "three"]);
    }

    #[test]
    fn test_replace_text() {
        let doc = Document::parse("<p>a b</p>").unwrap();
        let text = doc.select("p")[0].first_child().unwrap();
        replace_text(&text, "a <b>b</b>").unwrap();
        assert_eq!(doc.to_html().unwrap(), "<p>a <b>b</b></p>");
    }
}
