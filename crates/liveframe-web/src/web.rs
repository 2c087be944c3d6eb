//! WebAssembly entry point and the JS-facing editor handle.

use crate::dom::{DomDocument, as_element, js_error};
use crate::loader;
use crate::moveable::{ManipulationQueue, MoveableManipulator};
use kurbo::Point;
use liveframe_core::{EditorConfig, EditorEvent, EngineResult, EventOutcome, Key, ScaleStrategy, StyleProps};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlIFrameElement, KeyboardEvent, MouseEvent};

type Editor = liveframe_core::Editor<DomDocument, MoveableManipulator>;
type SharedEditor = Rc<RefCell<Editor>>;

/// Initialize panic reporting and logging.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"LiveFrame logger already initialized".into());
    }
}

/// Apply queued manipulation events. Events stay queued while the editor is
/// busy and are applied by the next drain.
fn drain(editor: &SharedEditor, queue: &ManipulationQueue) {
    let Ok(mut editor) = editor.try_borrow_mut() else {
        return;
    };
    loop {
        let Some(event) = queue.borrow_mut().pop_front() else {
            break;
        };
        editor.handle_manipulation(event);
    }
}

/// A DOM listener removed when dropped.
struct DomListener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl DomListener {
    fn new(target: &EventTarget, kind: &'static str, capture: bool, handler: impl FnMut(Event) + 'static) -> EngineResult<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), capture)
            .map_err(js_error)?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            closure,
        })
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

fn apply_outcome(event: &Event, outcome: EventOutcome) {
    if outcome.prevent_default {
        event.prevent_default();
    }
    if outcome.stop_propagation {
        event.stop_propagation();
    }
}

/// Editing session on one iframe.
#[wasm_bindgen]
pub struct FrameEditor {
    editor: SharedEditor,
    queue: ManipulationQueue,
    listeners: Vec<DomListener>,
}

#[wasm_bindgen]
impl FrameEditor {
    /// Start editing the document loaded in `frame`.
    ///
    /// `config` is an optional JSON editor configuration. Resolves to
    /// `undefined` when the frame has no document yet.
    pub async fn initialize(frame: HtmlIFrameElement, config: Option<String>) -> Option<FrameEditor> {
        let config = match config.as_deref().map(EditorConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("Invalid editor config, using defaults: {}", e);
                EditorConfig::default()
            }
            None => EditorConfig::default(),
        };
        let doc = match DomDocument::from_frame(&frame) {
            Ok(doc) => doc,
            Err(e) => {
                log::debug!("Frame not ready: {}", e);
                return None;
            }
        };

        let editor: SharedEditor = Rc::new(RefCell::new(Editor::new(doc.clone(), config)));
        let queue = ManipulationQueue::default();
        let mut session = FrameEditor {
            editor: editor.clone(),
            queue: queue.clone(),
            listeners: Vec::new(),
        };
        if editor.borrow_mut().install_listeners() {
            if let Err(e) = session.install(&doc) {
                log::warn!("Failed to install listeners: {}", e);
            }
        } else {
            log::info!("Frame already has an editor; this session stays passive");
        }

        let weak: Weak<RefCell<Editor>> = Rc::downgrade(&editor);
        let notify_queue = queue.clone();
        let notify: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(editor) = weak.upgrade() {
                drain(&editor, &notify_queue);
            }
        });
        match loader::load_moveable(doc, queue, notify).await {
            Ok(manipulator) => editor.borrow_mut().attach_manipulator(manipulator),
            Err(e) => log::warn!("Manipulation library unavailable: {}", e),
        }
        log::info!("Frame editor ready");
        Some(session)
    }

    /// Release the manipulation overlay.
    pub fn teardown(&self) {
        self.with_editor(|editor| editor.teardown());
    }

    /// Full markup of the frame document.
    #[wasm_bindgen(js_name = serializeDocument)]
    pub fn serialize_document(&self) -> String {
        self.editor
            .try_borrow()
            .map(|editor| editor.serialize_document())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = fitToViewport)]
    pub fn fit_to_viewport(&self) {
        self.with_editor(|editor| editor.fit_to_viewport());
    }

    /// Switch scaling strategy by name: `transform`, `zoom` or `rect_ratio`.
    #[wasm_bindgen(js_name = setStrategy)]
    pub fn set_strategy(&self, name: &str) {
        match serde_json::from_value::<ScaleStrategy>(serde_json::Value::String(name.to_string())) {
            Ok(strategy) => self.with_editor(|editor| editor.set_strategy(strategy)),
            Err(e) => log::warn!("Unknown scale strategy {:?}: {}", name, e),
        }
    }

    #[wasm_bindgen(js_name = armTextInsert)]
    pub fn arm_text_insert(&self) {
        self.with_editor(|editor| editor.arm_text_insert());
    }

    /// Apply a plain object of CSS declarations (`{ fontWeight: "700" }`).
    #[wasm_bindgen(js_name = applyInlineStyle)]
    pub fn apply_inline_style(&self, props: JsValue) {
        match serde_wasm_bindgen::from_value::<StyleProps>(props) {
            Ok(props) => self.with_editor(|editor| editor.apply_inline_style(&props)),
            Err(e) => log::warn!("Invalid style object: {}", e),
        }
    }

    #[wasm_bindgen(js_name = boldSelected)]
    pub fn bold_selected(&self) {
        self.with_editor(|editor| editor.bold_selected());
    }

    #[wasm_bindgen(js_name = toggleBold)]
    pub fn toggle_bold(&self) {
        self.with_editor(|editor| editor.toggle_bold());
    }

    #[wasm_bindgen(js_name = toggleItalic)]
    pub fn toggle_italic(&self) {
        self.with_editor(|editor| editor.toggle_italic());
    }

    #[wasm_bindgen(js_name = setTextColor)]
    pub fn set_text_color(&self, color: &str) {
        self.with_editor(|editor| editor.set_text_color(color));
    }
}

impl FrameEditor {
    fn install(&mut self, doc: &DomDocument) -> EngineResult<()> {
        let target: EventTarget = doc.document().clone().into();

        let (editor, queue) = (self.editor.clone(), self.queue.clone());
        self.listeners.push(DomListener::new(&target, "pointerdown", true, move |event: Event| {
            let mouse = event.unchecked_ref::<MouseEvent>();
            let dispatched = EditorEvent::PointerDown {
                target: as_element(event.target()),
                client: Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())),
            };
            dispatch(&editor, &queue, &event, dispatched);
        })?);

        let (editor, queue) = (self.editor.clone(), self.queue.clone());
        self.listeners.push(DomListener::new(&target, "dblclick", false, move |event: Event| {
            let dispatched = EditorEvent::DoubleClick {
                target: as_element(event.target()),
            };
            dispatch(&editor, &queue, &event, dispatched);
        })?);

        let (editor, queue) = (self.editor.clone(), self.queue.clone());
        let selection_doc = doc.clone();
        self.listeners.push(DomListener::new(&target, "selectionchange", false, move |event: Event| {
            let dispatched = EditorEvent::SelectionChange {
                range: selection_doc.current_range(),
            };
            dispatch(&editor, &queue, &event, dispatched);
        })?);

        let (editor, queue) = (self.editor.clone(), self.queue.clone());
        self.listeners.push(DomListener::new(&target, "keydown", false, move |event: Event| {
            let key = Key::from_dom(&event.unchecked_ref::<KeyboardEvent>().key());
            dispatch(&editor, &queue, &event, EditorEvent::KeyDown { key });
        })?);

        log::debug!("Installed {} frame listeners", self.listeners.len());
        Ok(())
    }

    fn with_editor(&self, f: impl FnOnce(&mut Editor)) {
        match self.editor.try_borrow_mut() {
            Ok(mut editor) => f(&mut editor),
            Err(_) => log::debug!("Editor busy, call skipped"),
        }
        drain(&self.editor, &self.queue);
    }
}

fn dispatch(
    editor: &SharedEditor,
    queue: &ManipulationQueue,
    event: &Event,
    dispatched: EditorEvent<web_sys::Element, web_sys::Range>,
) {
    let outcome = match editor.try_borrow_mut() {
        Ok(mut editor) => editor.handle_event(dispatched),
        Err(_) => EventOutcome::PASS,
    };
    apply_outcome(event, outcome);
    drain(editor, queue);
}
