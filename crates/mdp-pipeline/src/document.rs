//! Mutable HTML document tree shared by all filters of a render call.
//!
//! [`Document`] wraps an `html5ever` parse into a `markup5ever_rcdom` tree and
//! exposes the small set of operations the filters need: tag selection,
//! child inspection, text and attribute mutation, sibling insertion and
//! fragment parsing. All operations are scoped to the document `<body>`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, ParseOpts, QualName, ns, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// Error raised by document tree operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The parser produced no `<body>` element.
    #[error("Parsed document has no body element")]
    MissingBody,
    /// A fragment parsed to zero nodes.
    #[error("HTML fragment produced no nodes: {0:?}")]
    EmptyFragment(String),
    /// Sibling insertion on a node that has no parent.
    #[error("Node is not attached to a parent")]
    Detached,
    /// Serializer I/O failure.
    #[error("HTML serialization failed: {0}")]
    Serialize(#[from] std::io::Error),
    /// Serializer emitted invalid UTF-8.
    #[error("Serialized HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A parsed HTML document.
///
/// One document is created per render call and moved through every filter
/// of the pipeline. It is not `Send`: it never leaves the rendering thread.
pub struct Document {
    // Owns the html/head nodes; `body` is borrowed from this tree.
    _dom: RcDom,
    body: NodeRef,
}

impl Document {
    /// Parse an HTML string into a document.
    ///
    /// Content is parsed as the children of `<body>`, so leading whitespace
    /// and head-only tags (`<title>`, `<meta>`) stay in the body.
    pub fn parse(html: &str) -> Result<Self, DocumentError> {
        let dom = parse_body(html);
        let body = find_body(&dom.document).ok_or(DocumentError::MissingBody)?;
        Ok(Self {
            _dom: dom,
            body: NodeRef(body),
        })
    }

    /// Parse an HTML fragment into detached top-level nodes.
    pub fn parse_fragment(html: &str) -> Result<Vec<NodeRef>, DocumentError> {
        let dom = parse_body(html);
        let body = find_body(&dom.document).ok_or(DocumentError::MissingBody)?;
        let nodes: Vec<NodeRef> = body
            .children
            .borrow()
            .iter()
            .map(|child| NodeRef(Rc::clone(child)))
            .collect();
        for node in &nodes {
            node.detach();
        }
        Ok(nodes)
    }

    /// Parse an HTML fragment and return its first node, detached.
    ///
    /// # Example
    ///
    /// ```
    /// use mdp_pipeline::Document;
    ///
    /// let input = Document::create_node(r#"<input type="checkbox" checked>"#).unwrap();
    /// assert!(input.is_element("input"));
    /// assert!(input.has_attribute("checked"));
    /// ```
    pub fn create_node(html: &str) -> Result<NodeRef, DocumentError> {
        Self::parse_fragment(html)?
            .into_iter()
            .next()
            .ok_or_else(|| DocumentError::EmptyFragment(html.to_owned()))
    }

    /// The `<body>` element; every node of the document descends from it.
    pub fn root(&self) -> &NodeRef {
        &self.body
    }

    /// All elements with the given tag name, in document order.
    pub fn select(&self, tag: &str) -> Vec<NodeRef> {
        let mut found = Vec::new();
        collect_elements(&self.body.0, tag, &mut found);
        found
    }

    /// First element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        find_element(&self.body.0, &|node: &NodeRef| {
            node.attribute("id").as_deref() == Some(id)
        })
    }

    /// Serialize the body's children to an HTML string.
    pub fn to_html(&self) -> Result<String, DocumentError> {
        let mut buf = Vec::new();
        let handle = SerializableHandle::from(Rc::clone(&self.body.0));
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut buf, &handle, opts)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("body", &self.body).finish()
    }
}

/// Shared reference to a node of a [`Document`].
///
/// Cloning is cheap and yields another reference to the same node.
#[derive(Clone)]
pub struct NodeRef(Handle);

impl NodeRef {
    /// Create a detached text node.
    pub fn new_text(text: &str) -> Self {
        Self(Rc::new(Node {
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
            data: NodeData::Text {
                contents: RefCell::new(StrTendril::from(text)),
            },
        }))
    }

    /// Whether both references point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.data, NodeData::Text { .. })
    }

    /// Whether this is an element with the given (lowercase) tag name.
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag_name() == Some(tag)
    }

    /// Tag name for elements, `None` for any other node kind.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { name, .. } => Some(&*name.local),
            _ => None,
        }
    }

    /// Ordered child nodes.
    pub fn children(&self) -> Vec<NodeRef> {
        self.0
            .children
            .borrow()
            .iter()
            .map(|child| NodeRef(Rc::clone(child)))
            .collect()
    }

    pub fn first_child(&self) -> Option<NodeRef> {
        self.0
            .children
            .borrow()
            .first()
            .map(|child| NodeRef(Rc::clone(child)))
    }

    pub fn parent(&self) -> Option<NodeRef> {
        parent_handle(&self.0).map(NodeRef)
    }

    /// Content of a text node, `None` for other node kinds.
    pub fn text(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        }
    }

    /// Replace the content of a text node. Has no effect on other node kinds.
    pub fn set_text(&self, text: &str) {
        if let NodeData::Text { contents } = &self.0.data {
            *contents.borrow_mut() = StrTendril::from(text);
        }
    }

    /// Concatenated content of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_text_content(&self.0, &mut out);
        out
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| &*attr.name.local == name)
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, replacing an existing value. Has no effect on non-elements.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let NodeData::Element { attrs, .. } = &self.0.data else {
            return;
        };
        let mut attrs = attrs.borrow_mut();
        if let Some(existing) = attrs.iter_mut().find(|attr| &*attr.name.local == name) {
            existing.value = StrTendril::from(value);
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: StrTendril::from(value),
            });
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        self.retain_attributes(|attr_name, _| attr_name != name);
    }

    /// Keep only the attributes for which `keep(name, value)` returns true.
    pub fn retain_attributes(&self, mut keep: impl FnMut(&str, &str) -> bool) {
        if let NodeData::Element { attrs, .. } = &self.0.data {
            attrs
                .borrow_mut()
                .retain(|attr| keep(&attr.name.local, &attr.value));
        }
    }

    /// Insert `sibling` immediately before this node.
    ///
    /// `sibling` is detached from its current position first.
    pub fn insert_before(&self, sibling: &NodeRef) -> Result<(), DocumentError> {
        let parent = parent_handle(&self.0).ok_or(DocumentError::Detached)?;
        sibling.detach();

        let mut children = parent.children.borrow_mut();
        let index = children
            .iter()
            .position(|child| Rc::ptr_eq(child, &self.0))
            .ok_or(DocumentError::Detached)?;
        sibling.0.parent.set(Some(Rc::downgrade(&parent)));
        children.insert(index, Rc::clone(&sibling.0));
        Ok(())
    }

    /// Append `child` as the last child of this node.
    ///
    /// `child` is detached from its current position first.
    pub fn append_child(&self, child: &NodeRef) {
        child.detach();
        child.0.parent.set(Some(Rc::downgrade(&self.0)));
        self.0.children.borrow_mut().push(Rc::clone(&child.0));
    }

    /// Whether any ancestor is an element with the given tag name.
    pub fn has_ancestor(&self, tag: &str) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_element(tag) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Replace this node with `nodes`, keeping their order.
    pub fn replace_with(&self, nodes: &[NodeRef]) -> Result<(), DocumentError> {
        for node in nodes {
            self.insert_before(node)?;
        }
        self.detach();
        Ok(())
    }

    /// Replace this element with its own children.
    pub fn unwrap_children(&self) -> Result<(), DocumentError> {
        self.replace_with(&self.children())
    }

    /// Remove this node from its parent. No-op for detached nodes.
    pub fn detach(&self) {
        if let Some(weak) = self.0.parent.take()
            && let Some(parent) = weak.upgrade()
        {
            parent
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(child, &self.0));
        }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "<{}>", &*name.local),
            NodeData::Text { contents } => write!(f, "{:?}", &**contents.borrow()),
            NodeData::Comment { .. } => f.write_str("<!-- -->"),
            NodeData::Document => f.write_str("#document"),
            NodeData::Doctype { .. } => f.write_str("<!DOCTYPE>"),
            NodeData::ProcessingInstruction { .. } => f.write_str("<?pi?>"),
        }
    }
}

/// Parse `html` as body content of a full document.
fn parse_body(html: &str) -> RcDom {
    // The explicit <body> switches the tree builder to "in body" before any
    // content, so leading whitespace text is kept.
    parse_document(RcDom::default(), ParseOpts::default()).one(format!("<body>{html}"))
}

fn find_body(document: &Handle) -> Option<Handle> {
    let html = find_child_element(document, "html")?;
    find_child_element(&html, "body")
}

fn find_child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, NodeData::Element { name, .. } if &*name.local == tag))
        .map(Rc::clone)
}

fn parent_handle(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take()?;
    let parent = weak.upgrade();
    handle.parent.set(Some(weak));
    parent
}

fn collect_elements(handle: &Handle, tag: &str, found: &mut Vec<NodeRef>) {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data
            && &*name.local == tag
        {
            found.push(NodeRef(Rc::clone(child)));
        }
        collect_elements(child, tag, found);
    }
}

fn find_element(handle: &Handle, matches: &dyn Fn(&NodeRef) -> bool) -> Option<NodeRef> {
    for child in handle.children.borrow().iter() {
        let node = NodeRef(Rc::clone(child));
        if node.tag_name().is_some() && matches(&node) {
            return Some(node);
        }
        if let Some(found) = find_element(child, matches) {
            return Some(found);
        }
    }
    None
}

fn push_text_content(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        push_text_content(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_serialize_round_trip() {
        let doc = Document::parse("<ul><li>One</li><li>Two</li></ul>").unwrap();
        assert_eq!(doc.to_html().unwrap(), "<ul><li>One</li><li>Two</li></ul>");
    }

    #[test]
    fn test_parse_keeps_leading_whitespace() {
        let nodes = Document::parse_fragment(" hi <b>there</b>").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text().as_deref(), Some(" hi "));
        assert!(nodes[1].is_element("b"));
        assert!(nodes[1].parent().is_none());
    }

    #[test]
    fn test_select_in_document_order() {
        let doc =
            Document::parse("<ul><li>A<ul><li>B</li></ul></li><li>C</li></ul><ol><li>D</li></ol>")
                .unwrap();
        let items: Vec<String> = doc
            .select("li")
            .iter()
            .map(|li| li.first_child().unwrap().text().unwrap())
            .collect();
        assert_eq!(items, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_select_ignores_other_tags() {
        let doc = Document::parse("<p>text</p>").unwrap();
        assert!(doc.select("li").is_empty());
    }

    #[test]
    fn test_set_text() {
        let doc = Document::parse("<p>before</p>").unwrap();
        let text = doc.select("p")[0].first_child().unwrap();
        text.set_text("after & more");
        assert_eq!(doc.to_html().unwrap(), "<p>after &amp; more</p>");
    }

    #[test]
    fn test_set_attribute_replaces_existing() {
        let doc = Document::parse(r#"<li class="old">x</li>"#).unwrap();
        let li = doc.select("li").remove(0);
        li.set_attribute("class", "task-list-item");
        li.set_attribute("id", "item");
        assert_eq!(li.attribute("class").as_deref(), Some("task-list-item"));
        assert_eq!(
            doc.to_html().unwrap(),
            r#"<li class="task-list-item" id="item">x</li>"#
        );
    }

    #[test]
    fn test_remove_attribute() {
        let doc = Document::parse(r#"<input type="checkbox" checked disabled>"#).unwrap();
        let input = doc.select("input").remove(0);
        input.remove_attribute("disabled");
        input.remove_attribute("missing");
        assert!(!input.has_attribute("disabled"));
        assert!(input.has_attribute("checked"));
    }

    #[test]
    fn test_set_attribute_on_text_is_noop() {
        let text = NodeRef::new_text("plain");
        text.set_attribute("class", "x");
        assert!(text.attribute("class").is_none());
    }

    #[test]
    fn test_insert_before() {
        let doc = Document::parse("<li>Foo</li>").unwrap();
        let text = doc.select("li")[0].first_child().unwrap();
        let input = Document::create_node(r#"<input type="checkbox">"#).unwrap();
        text.insert_before(&input).unwrap();
        assert_eq!(
            doc.to_html().unwrap(),
            r#"<li><input type="checkbox">Foo</li>"#
        );
        assert!(input.parent().unwrap().is_element("li"));
    }

    #[test]
    fn test_insert_before_detached_fails() {
        let orphan = NodeRef::new_text("orphan");
        let other = NodeRef::new_text("other");
        assert!(matches!(
            orphan.insert_before(&other),
            Err(DocumentError::Detached)
        ));
    }

    #[test]
    fn test_replace_with() {
        let doc = Document::parse("<p>hello @bob</p>").unwrap();
        let text = doc.select("p")[0].first_child().unwrap();
        let nodes = Document::parse_fragment(r#"hello <a href="/bob">@bob</a>"#).unwrap();
        text.replace_with(&nodes).unwrap();
        assert_eq!(
            doc.to_html().unwrap(),
            r#"<p>hello <a href="/bob">@bob</a></p>"#
        );
    }

    #[test]
    fn test_unwrap_children() {
        let doc = Document::parse("<div><font>a<b>b</b></font></div>").unwrap();
        doc.select("font")[0].unwrap_children().unwrap();
        assert_eq!(doc.to_html().unwrap(), "<div>a<b>b</b></div>");
    }

    #[test]
    fn test_append_child_moves_node() {
        let doc = Document::parse("<p><img src=\"a.png\"></p>").unwrap();
        let img = doc.select("img").remove(0);
        let link = Document::create_node(r#"<a href="a.png"></a>"#).unwrap();
        img.insert_before(&link).unwrap();
        link.append_child(&img);
        assert_eq!(
            doc.to_html().unwrap(),
            r#"<p><a href="a.png"><img src="a.png"></a></p>"#
        );
        assert!(img.has_ancestor("a"));
        assert!(img.has_ancestor("p"));
        assert!(!link.has_ancestor("a"));
    }

    #[test]
    fn test_element_by_id() {
        let doc = Document::parse(r#"<p id="a">x</p><div><span id="b">y</span></div>"#).unwrap();
        assert!(doc.element_by_id("b").unwrap().is_element("span"));
        assert!(doc.element_by_id("c").is_none());
    }

    #[test]
    fn test_create_node_empty_fragment() {
        assert!(matches!(
            Document::create_node(""),
            Err(DocumentError::EmptyFragment(_))
        ));
    }

    #[test]
    fn test_retain_attributes() {
        let doc = Document::parse(r#"<a href="/x" onclick="evil()">x</a>"#).unwrap();
        let a = doc.select("a").remove(0);
        a.retain_attributes(|name, _| !name.starts_with("on"));
        assert_eq!(doc.to_html().unwrap(), r#"<a href="/x">x</a>"#);
    }

    #[test]
    fn test_text_content() {
        let doc = Document::parse("<li><p>[x] <em>Foo</em></p></li>").unwrap();
        assert_eq!(doc.select("li")[0].text_content(), "[x] Foo");
    }
}
