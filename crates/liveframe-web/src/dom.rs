//! [`Document`] over a live frame document.
//!
//! Frame nodes belong to the frame's JS realm, so `instanceof`-based casts
//! (`dyn_ref`, `dyn_into`) reject them. Casts here use `unchecked_*` after a
//! realm-independent check, and element properties shared by HTML and SVG are
//! read with `Reflect`.

use js_sys::{Function, Reflect};
use kurbo::{Rect, Size};
use liveframe_core::{Document, EngineError, EngineResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Element, EventTarget, HtmlIFrameElement, Node, Range, Window};

/// Window property marking a frame whose document already has editor listeners.
const LISTENERS_MARK: &str = "__liveframeInstalled";

pub(crate) fn js_error(value: JsValue) -> EngineError {
    EngineError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn style_of(element: &Element) -> Option<CssStyleDeclaration> {
    property(element, "style").map(JsValue::unchecked_into)
}

/// The element behind an event target, if it is one.
pub(crate) fn as_element(target: Option<EventTarget>) -> Option<Element> {
    let target = target?;
    let is_element = property(&target, "nodeType").and_then(|v| v.as_f64()) == Some(f64::from(Node::ELEMENT_NODE));
    is_element.then(|| target.unchecked_into())
}

/// The document loaded in an iframe.
#[derive(Debug, Clone)]
pub struct DomDocument {
    window: Window,
    document: web_sys::Document,
}

impl DomDocument {
    /// Fails with [`EngineError::EnvironmentNotReady`] until the frame has a document.
    pub fn from_frame(frame: &HtmlIFrameElement) -> EngineResult<Self> {
        let window = frame.content_window().ok_or(EngineError::EnvironmentNotReady)?;
        let document = frame.content_document().ok_or(EngineError::EnvironmentNotReady)?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// A detached clone of the first range of the current text selection.
    pub fn current_range(&self) -> Option<Range> {
        let selection = self.document.get_selection().ok().flatten()?;
        if selection.range_count() == 0 {
            return None;
        }
        selection.get_range_at(0).ok().map(|range| range.clone_range())
    }
}

impl Document for DomDocument {
    type Element = Element;
    type Range = Range;

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Into::into)
    }

    fn viewport_size(&self) -> Size {
        let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> EngineResult<Element> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> EngineResult<()> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn children(&self, parent: &Element) -> Vec<Element> {
        let collection = parent.children();
        (0..collection.length()).filter_map(|i| collection.item(i)).collect()
    }

    fn move_children(&self, from: &Element, to: &Element) -> EngineResult<()> {
        while let Some(child) = from.first_child() {
            to.append_child(&child).map_err(js_error)?;
        }
        Ok(())
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        if let Some(style) = style_of(element) {
            if let Err(e) = style.set_property(property, value) {
                log::debug!("Failed to set {}: {:?}", property, e);
            }
        }
    }

    fn remove_style(&self, element: &Element, property: &str) {
        if let Some(style) = style_of(element) {
            let _ = style.remove_property(property);
        }
    }

    fn inline_style(&self, element: &Element, property: &str) -> Option<String> {
        style_of(element)?
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn computed_style(&self, element: &Element, property: &str) -> String {
        self.window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> EngineResult<()> {
        element.set_attribute(name, value).map_err(js_error)
    }

    fn remove_attribute(&self, element: &Element, name: &str) {
        let _ = element.remove_attribute(name);
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_text_content(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn focus(&self, element: &Element) {
        if let Some(focus) = property(element, "focus").filter(JsValue::is_function) {
            let _ = focus.unchecked_into::<Function>().call0(element);
        }
    }

    fn is_content_editable(&self, element: &Element) -> bool {
        property(element, "isContentEditable")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn closest_matches(&self, element: &Element, selectors: &[String]) -> bool {
        if selectors.is_empty() {
            return false;
        }
        element
            .closest(&selectors.join(", "))
            .ok()
            .flatten()
            .is_some()
    }

    fn scroll_size(&self, element: &Element) -> Size {
        Size::new(f64::from(element.scroll_width()), f64::from(element.scroll_height()))
    }

    fn offset_size(&self, element: &Element) -> Size {
        let dimension = |name| property(element, name).and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(dimension("offsetWidth"), dimension("offsetHeight"))
    }

    fn client_rect(&self, element: &Element) -> Rect {
        let r = element.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn outer_html(&self, element: &Element) -> String {
        element.outer_html()
    }

    fn is_range_collapsed(&self, range: &Range) -> bool {
        range.collapsed()
    }

    fn surround_range(&self, range: &Range, wrapper: &Element) -> EngineResult<()> {
        range
            .surround_contents(wrapper)
            .map_err(|e| EngineError::RangeWrap(format!("{:?}", e)))
    }

    fn range_common_ancestor(&self, range: &Range) -> Option<Element> {
        let node = range.common_ancestor_container().ok()?;
        if node.node_type() == Node::ELEMENT_NODE {
            Some(node.unchecked_into())
        } else {
            node.parent_element()
        }
    }

    fn claim_listeners(&self) -> bool {
        let key = JsValue::from_str(LISTENERS_MARK);
        if property(&self.window, LISTENERS_MARK).is_some_and(|v| v.is_truthy()) {
            return false;
        }
        match Reflect::set(&self.window, &key, &JsValue::TRUE) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("Cannot mark frame listeners: {:?}", e);
                false
            }
        }
    }

    fn release_listeners(&self) {
        if let Err(e) = Reflect::delete_property(self.window.unchecked_ref(), &JsValue::from_str(LISTENERS_MARK)) {
            log::debug!("Cannot clear frame listener mark: {:?}", e);
        }
    }
}
