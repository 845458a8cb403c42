//! Markup fragments
//!
//! Fragments are stored as complete HTML documents and referenced from the tree. Fragments
//! placed into table cells first lose any `<table>` elements, since the host cannot place a
//! table inside a cell. Stripping goes through a real DOM (html5ever + RcDom) rather than text
//! matching, so nested and unclosed tables are handled the way a browser would parse them.

use super::error::{MergeError, Result};
use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, serialize};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Wrap `markup` in the minimal document shell fragments are stored as.
pub fn wrap_in_shell(markup: &str) -> String {
    format!(
        "<html><head><meta charset=utf-8></head><body>{}</body></html>",
        markup
    )
}

/// Remove every `<table>` element, with its content, from `markup`.
pub fn strip_tables(markup: &str) -> Result<String> {
    let dom = parse_document(RcDom::default(), Default::default()).one(wrap_in_shell(markup));

    let body = find_element(&dom.document, "body")
        .ok_or_else(|| MergeError::Fragment("parsed fragment has no body".to_string()))?;
    remove_tables(&body);

    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let mut output = Vec::new();
    for child in body.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone())
            .map_err(|e| MergeError::Fragment(format!("HTML serialization failed: {}", e)))?;
    }

    String::from_utf8(output)
        .map_err(|e| MergeError::Fragment(format!("UTF-8 conversion failed: {}", e)))
}

fn is_element(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { name, .. } if &*name.local == tag)
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if is_element(handle, tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn remove_tables(handle: &Handle) {
    handle
        .children
        .borrow_mut()
        .retain(|child| !is_element(child, "table"));
    for child in handle.children.borrow().iter() {
        remove_tables(child);
    }
}
