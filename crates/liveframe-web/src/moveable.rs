//! Moveable-backed [`Manipulator`].

use crate::dom::{DomDocument, js_error};
use crate::payload::{MANIPULATION_EVENTS, RawManipulation};
use js_sys::{Array, Function, Object, Reflect};
use liveframe_core::{
    BindingOptions, EngineError, EngineResult, ManipulationBinding, ManipulationEvent, Manipulator,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

/// Global the library script defines on the frame window.
pub const MOVEABLE_GLOBAL: &str = "Moveable";

/// Typed events waiting to be applied by the editor.
pub type ManipulationQueue = Rc<RefCell<VecDeque<ManipulationEvent>>>;

fn set(target: &Object, key: &str, value: &JsValue) -> EngineResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

fn method(target: &JsValue, name: &str) -> EngineResult<Function> {
    let value = Reflect::get(target, &JsValue::from_str(name)).map_err(js_error)?;
    if value.is_function() {
        Ok(value.unchecked_into())
    } else {
        Err(EngineError::Dom(format!("missing method `{}`", name)))
    }
}

/// Creates Moveable instances in the frame's realm.
pub struct MoveableManipulator {
    constructor: Function,
    queue: ManipulationQueue,
    /// Called after an event is queued so the owner can drain it.
    notify: Rc<dyn Fn()>,
}

impl MoveableManipulator {
    /// Look up the library constructor on the frame window.
    pub fn from_window(doc: &DomDocument, queue: ManipulationQueue, notify: Rc<dyn Fn()>) -> EngineResult<Self> {
        let constructor = Reflect::get(doc.window(), &JsValue::from_str(MOVEABLE_GLOBAL))
            .ok()
            .filter(JsValue::is_function)
            .ok_or(EngineError::LibraryUnavailable)?;
        Ok(Self {
            constructor: constructor.unchecked_into(),
            queue,
            notify,
        })
    }

    fn options(options: &BindingOptions<Element>) -> EngineResult<Object> {
        let caps = &options.capabilities;
        let js = Object::new();
        set(&js, "target", &options.target)?;
        set(&js, "draggable", &caps.draggable.into())?;
        set(&js, "resizable", &caps.resizable.into())?;
        set(&js, "scalable", &caps.scalable.into())?;
        set(&js, "rotatable", &caps.rotatable.into())?;
        set(&js, "pinchable", &caps.pinchable.into())?;
        set(&js, "origin", &caps.origin.into())?;
        set(&js, "snappable", &caps.snappable.into())?;
        set(&js, "snapThreshold", &caps.snap_threshold.into())?;
        let guidelines: Array = options.guidelines.iter().collect();
        set(&js, "elementGuidelines", &guidelines)?;
        Ok(js)
    }

    fn handler(&self, name: &'static str) -> Closure<dyn FnMut(JsValue)> {
        let queue = self.queue.clone();
        let notify = self.notify.clone();
        Closure::wrap(Box::new(move |payload: JsValue| {
            let raw: RawManipulation = match serde_wasm_bindgen::from_value(payload) {
                Ok(raw) => raw,
                Err(e) => {
                    log::debug!("Unreadable {} payload: {}", name, e);
                    return;
                }
            };
            if let Some(event) = raw.into_event(name) {
                queue.borrow_mut().push_back(event);
                notify();
            }
        }) as Box<dyn FnMut(JsValue)>)
    }
}

impl Manipulator<DomDocument> for MoveableManipulator {
    type Binding = MoveableBinding;

    fn create(&mut self, _doc: &DomDocument, options: BindingOptions<Element>) -> EngineResult<MoveableBinding> {
        let js_options = Self::options(&options)?;
        let args = Array::of2(&options.container, &js_options);
        let instance = Reflect::construct(&self.constructor, &args).map_err(js_error)?;

        let on = method(&instance, "on")?;
        let mut handlers = Vec::with_capacity(MANIPULATION_EVENTS.len());
        for name in MANIPULATION_EVENTS {
            let handler = self.handler(name);
            on.call2(&instance, &JsValue::from_str(name), handler.as_ref())
                .map_err(js_error)?;
            handlers.push(handler);
        }

        Ok(MoveableBinding {
            instance: Some(instance),
            target: options.target,
            container: options.container,
            handlers,
        })
    }
}

/// One Moveable instance bound to one element.
pub struct MoveableBinding {
    instance: Option<JsValue>,
    target: Element,
    container: Element,
    // Kept alive for as long as the instance may call them
    handlers: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl MoveableBinding {
    fn call(&self, name: &str) {
        let Some(instance) = &self.instance else {
            return;
        };
        match method(instance, name) {
            Ok(f) => {
                if let Err(e) = f.call0(instance) {
                    log::warn!("Moveable {} failed: {:?}", name, e);
                }
            }
            Err(e) => log::warn!("{}", e),
        }
    }
}

impl ManipulationBinding<Element> for MoveableBinding {
    fn target(&self) -> &Element {
        &self.target
    }

    fn container(&self) -> &Element {
        &self.container
    }

    fn fit_controls_to_size(&mut self) {
        self.call("updateRect");
    }

    fn destroy(&mut self) {
        self.call("destroy");
        self.instance = None;
        self.handlers.clear();
    }
}

impl Drop for MoveableBinding {
    fn drop(&mut self) {
        if self.instance.is_some() {
            self.destroy();
        }
    }
}
