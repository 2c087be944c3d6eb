//! Event router: decides which component handles an input event.
//!
//! Routing is pure: [`EventRouter::route`] only inspects the document and
//! returns a [`Route`]. The [`Editor`](crate::Editor) carries it out.

use crate::document::Document;
use crate::input::{EditorEvent, Key};
use crate::scale::SCALE_WRAPPER_ID;
use kurbo::Point;

/// The component an event is dispatched to.
#[derive(Debug, Clone, PartialEq)]
pub enum Route<E, R> {
    /// Consume the armed one-shot insert at this viewport point.
    InsertText { client: Point },
    /// The pointer hit the manipulation overlay itself.
    OverlayControl,
    Select(E),
    EnterEdit(E),
    SelectionChanged(Option<R>),
    Key(Key),
    Ignore,
}

/// Listener set installed once per document.
#[derive(Debug, Clone)]
pub struct EventRouter {
    installed: bool,
    overlay_selectors: Vec<String>,
}

impl EventRouter {
    pub fn new(overlay_selectors: Vec<String>) -> Self {
        Self {
            installed: false,
            overlay_selectors,
        }
    }

    /// Mark listeners as installed. Returns `true` only on the first call,
    /// telling the platform layer to actually attach its listeners.
    pub fn install(&mut self) -> bool {
        if self.installed {
            return false;
        }
        self.installed = true;
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Classify `event`. `insert_armed` is the one-shot insert flag.
    pub fn route<D: Document>(
        &self,
        doc: &D,
        event: EditorEvent<D::Element, D::Range>,
        insert_armed: bool,
    ) -> Route<D::Element, D::Range> {
        if !self.installed {
            return Route::Ignore;
        }
        match event {
            EditorEvent::PointerDown { client, .. } if insert_armed => Route::InsertText { client },
            EditorEvent::PointerDown { target: Some(el), .. } => {
                if doc.closest_matches(&el, &self.overlay_selectors) {
                    Route::OverlayControl
                } else if is_canvas_surface(doc, &el) {
                    Route::Ignore
                } else {
                    Route::Select(el)
                }
            }
            EditorEvent::DoubleClick { target: Some(el) } => {
                if doc.closest_matches(&el, &self.overlay_selectors) || is_canvas_surface(doc, &el) {
                    Route::Ignore
                } else {
                    Route::EnterEdit(el)
                }
            }
            EditorEvent::SelectionChange { range } => Route::SelectionChanged(range),
            EditorEvent::KeyDown { key: Key::Other(_) } => Route::Ignore,
            EditorEvent::KeyDown { key } => Route::Key(key),
            EditorEvent::PointerDown { target: None, .. } | EditorEvent::DoubleClick { target: None } => {
                Route::Ignore
            }
        }
    }
}

/// Root, body and scale wrapper are the canvas itself, never selectable content.
fn is_canvas_surface<D: Document>(doc: &D, el: &D::Element) -> bool {
    doc.root().as_ref() == Some(el)
        || doc.body().as_ref() == Some(el)
        || doc.element_by_id(SCALE_WRAPPER_ID).as_ref() == Some(el)
}
