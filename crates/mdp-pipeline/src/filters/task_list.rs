//! Task-list checkboxes.
//!
//! Converts list items whose text starts with `[ ] ` or `[x] ` into task-list
//! items carrying a checkbox input:
//!
//! ```text
//! <li>[x] Foo</li>
//! ↓
//! <li class="task-list-item"><input type="checkbox" class="task-list-item-checkbox"
//!     data-checkbox-index="0" checked="checked">Foo</li>
//! ```
//!
//! `data-checkbox-index` is the position of the `<li>` among *all* list items
//! of the document, including the ones without a marker.

use crate::context::Context;
use crate::document::{Document, NodeRef};
use crate::filter::{Filter, FilterError};

const INCOMPLETE_MARKER: &str = "[ ] ";
const COMPLETE_MARKER: &str = "[x] ";

const ITEM_CLASS: &str = "task-list-item";
const CHECKBOX_CLASS: &str = "task-list-item-checkbox";

/// Reads `checkbox_disabled`.
pub struct TaskListFilter;

impl Filter for TaskListFilter {
    fn name(&self) -> &'static str {
        "task_list"
    }

    fn apply(&self, doc: Document, ctx: &Context) -> Result<Document, FilterError> {
        for (index, node) in doc.select("li").into_iter().enumerate() {
            let item = ListItem::new(index, node, ctx.checkbox_disabled);
            item.convert()?;
        }
        Ok(doc)
    }
}

/// Leading marker of a list item's first text node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Unmarked,
    Open,
    Closed,
}

impl Marker {
    fn classify(text: &str) -> Self {
        if text.starts_with(COMPLETE_MARKER) {
            Self::Closed
        } else if text.starts_with(INCOMPLETE_MARKER) {
            Self::Open
        } else {
            Self::Unmarked
        }
    }

    fn len(self) -> usize {
        match self {
            Self::Unmarked => 0,
            Self::Open => INCOMPLETE_MARKER.len(),
            Self::Closed => COMPLETE_MARKER.len(),
        }
    }
}

/// One `<li>` of the current pass.
///
/// The marker is classified once at construction; every later query reads
/// the cached result.
struct ListItem {
    index: usize,
    disabled: bool,
    node: NodeRef,
    text_node: Option<NodeRef>,
    marker: Marker,
}

impl ListItem {
    fn new(index: usize, node: NodeRef, disabled: bool) -> Self {
        let text_node = first_text_node(&node);
        let marker = text_node
            .as_ref()
            .and_then(NodeRef::text)
            .map_or(Marker::Unmarked, |text| Marker::classify(&text));
        Self {
            index,
            disabled,
            node,
            text_node,
            marker,
        }
    }

    fn is_checkbox(&self) -> bool {
        self.marker != Marker::Unmarked
    }

    fn is_complete(&self) -> bool {
        self.marker == Marker::Closed
    }

    fn checkbox_html(&self) -> String {
        let mut html = format!(
            r#"<input type="checkbox" class="{CHECKBOX_CLASS}" data-checkbox-index="{}""#,
            self.index
        );
        if self.is_complete() {
            html.push_str(r#" checked="checked""#);
        }
        if self.disabled {
            html.push_str(r#" disabled="disabled""#);
        }
        html.push('>');
        html
    }

    /// Strip the marker and insert the checkbox. Unmarked items are left untouched.
    fn convert(self) -> Result<(), FilterError> {
        if !self.is_checkbox() {
            return Ok(());
        }
        let Some(text_node) = &self.text_node else {
            return Ok(());
        };

        let text = text_node.text().unwrap_or_default();
        text_node.set_text(&text[self.marker.len()..]);

        let checkbox = Document::create_node(&self.checkbox_html())?;
        text_node.insert_before(&checkbox)?;
        self.node.set_attribute("class", ITEM_CLASS);

        tracing::trace!(
            index = self.index,
            checked = self.is_complete(),
            "Converted task list item"
        );
        Ok(())
    }
}

/// First child of the item, or of its leading `<p>` wrapper, if it is text.
fn first_text_node(item: &NodeRef) -> Option<NodeRef> {
    let first = item.first_child()?;
    let candidate = if first.is_element("p") {
        first.first_child()?
    } else {
        first
    };
    candidate.is_text().then_some(candidate)
}
