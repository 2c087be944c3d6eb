//! Document host abstraction.
//!
//! The engine never touches a concrete DOM. Everything it needs from the
//! embedded document goes through [`Document`], which the wasm build
//! implements over `web-sys` and which [`MemoryDocument`] implements for
//! headless use and tests.
//!
//! Methods take `&self`: a live DOM is shared mutable state, and the engine
//! mutates it from inside event handlers.

mod memory;

pub use memory::{MemoryDocument, MemoryRange, NodeId};

use crate::error::EngineResult;
use kurbo::{Rect, Size};
use std::fmt::Debug;
use std::rc::Rc;

/// Trait for the embedded document the engine edits.
pub trait Document {
    /// Handle to an element in the live tree. Cheap to clone, compared by identity.
    type Element: Clone + PartialEq + Debug;
    /// A detached snapshot of a text selection.
    type Range: Clone + Debug;

    /// The document root (`<html>`), if the document is loaded.
    fn root(&self) -> Option<Self::Element>;

    /// The `<body>` element, if the document is loaded.
    fn body(&self) -> Option<Self::Element>;

    /// Size of the hosting frame's visible area in viewport pixels.
    fn viewport_size(&self) -> Size;

    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> EngineResult<Self::Element>;

    /// Append `child` to `parent`, detaching it from its previous parent.
    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> EngineResult<()>;

    /// Element children of `parent` in document order.
    fn children(&self, parent: &Self::Element) -> Vec<Self::Element>;

    /// Move every child node (text included) of `from` to the end of `to`.
    fn move_children(&self, from: &Self::Element, to: &Self::Element) -> EngineResult<()>;

    fn set_style(&self, element: &Self::Element, property: &str, value: &str);

    fn remove_style(&self, element: &Self::Element, property: &str);

    /// Inline style value, `None` when the property is not set inline.
    fn inline_style(&self, element: &Self::Element, property: &str) -> Option<String>;

    /// Resolved (computed) style value.
    fn computed_style(&self, element: &Self::Element, property: &str) -> String;

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str) -> EngineResult<()>;

    fn remove_attribute(&self, element: &Self::Element, name: &str);

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Replace all children of `element` with a single text node.
    fn set_text_content(&self, element: &Self::Element, text: &str);

    fn text_content(&self, element: &Self::Element) -> String;

    /// Move keyboard focus to `element`.
    fn focus(&self, element: &Self::Element);

    fn is_content_editable(&self, element: &Self::Element) -> bool;

    /// Whether `element` or one of its ancestors matches any of `selectors`.
    fn closest_matches(&self, element: &Self::Element, selectors: &[String]) -> bool;

    /// Scrollable content extent of `element`, unscaled.
    fn scroll_size(&self, element: &Self::Element) -> Size;

    /// Layout box size of `element`, unscaled.
    fn offset_size(&self, element: &Self::Element) -> Size;

    /// Rendered bounding box in viewport pixels.
    fn client_rect(&self, element: &Self::Element) -> Rect;

    /// Serialized markup of `element` and its subtree.
    fn outer_html(&self, element: &Self::Element) -> String;

    fn is_range_collapsed(&self, range: &Self::Range) -> bool;

    /// Move the contents of `range` into `wrapper` and insert it in their place.
    ///
    /// Fails with [`EngineError::RangeWrap`](crate::EngineError::RangeWrap) when
    /// the range partially selects an element.
    fn surround_range(&self, range: &Self::Range, wrapper: &Self::Element) -> EngineResult<()>;

    /// The range's deepest common ancestor, if that node is an element.
    fn range_common_ancestor(&self, range: &Self::Range) -> Option<Self::Element>;

    /// Mark the document as carrying the editor's listeners. Returns `false`
    /// when the mark is already set, whichever editor set it.
    fn claim_listeners(&self) -> bool;

    /// Clear the mark set by [`claim_listeners`](Self::claim_listeners).
    fn release_listeners(&self);
}

/// A shared handle edits the same document.
impl<D: Document + ?Sized> Document for Rc<D> {
    type Element = D::Element;
    type Range = D::Range;

    fn root(&self) -> Option<Self::Element> {
        (**self).root()
    }

    fn body(&self) -> Option<Self::Element> {
        (**self).body()
    }

    fn viewport_size(&self) -> Size {
        (**self).viewport_size()
    }

    fn element_by_id(&self, id: &str) -> Option<Self::Element> {
        (**self).element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> EngineResult<Self::Element> {
        (**self).create_element(tag)
    }

    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> EngineResult<()> {
        (**self).append_child(parent, child)
    }

    fn children(&self, parent: &Self::Element) -> Vec<Self::Element> {
        (**self).children(parent)
    }

    fn move_children(&self, from: &Self::Element, to: &Self::Element) -> EngineResult<()> {
        (**self).move_children(from, to)
    }

    fn set_style(&self, element: &Self::Element, property: &str, value: &str) {
        (**self).set_style(element, property, value)
    }

    fn remove_style(&self, element: &Self::Element, property: &str) {
        (**self).remove_style(element, property)
    }

    fn inline_style(&self, element: &Self::Element, property: &str) -> Option<String> {
        (**self).inline_style(element, property)
    }

    fn computed_style(&self, element: &Self::Element, property: &str) -> String {
        (**self).computed_style(element, property)
    }

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str) -> EngineResult<()> {
        (**self).set_attribute(element, name, value)
    }

    fn remove_attribute(&self, element: &Self::Element, name: &str) {
        (**self).remove_attribute(element, name)
    }

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String> {
        (**self).attribute(element, name)
    }

    fn set_text_content(&self, element: &Self::Element, text: &str) {
        (**self).set_text_content(element, text)
    }

    fn text_content(&self, element: &Self::Element) -> String {
        (**self).text_content(element)
    }

    fn focus(&self, element: &Self::Element) {
        (**self).focus(element)
    }

    fn is_content_editable(&self, element: &Self::Element) -> bool {
        (**self).is_content_editable(element)
    }

    fn closest_matches(&self, element: &Self::Element, selectors: &[String]) -> bool {
        (**self).closest_matches(element, selectors)
    }

    fn scroll_size(&self, element: &Self::Element) -> Size {
        (**self).scroll_size(element)
    }

    fn offset_size(&self, element: &Self::Element) -> Size {
        (**self).offset_size(element)
    }

    fn client_rect(&self, element: &Self::Element) -> Rect {
        (**self).client_rect(element)
    }

    fn outer_html(&self, element: &Self::Element) -> String {
        (**self).outer_html(element)
    }

    fn is_range_collapsed(&self, range: &Self::Range) -> bool {
        (**self).is_range_collapsed(range)
    }

    fn surround_range(&self, range: &Self::Range, wrapper: &Self::Element) -> EngineResult<()> {
        (**self).surround_range(range, wrapper)
    }

    fn range_common_ancestor(&self, range: &Self::Range) -> Option<Self::Element> {
        (**self).range_common_ancestor(range)
    }

    fn claim_listeners(&self) -> bool {
        (**self).claim_listeners()
    }

    fn release_listeners(&self) {
        (**self).release_listeners()
    }
}
