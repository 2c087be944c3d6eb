//! Library script injection.

use crate::dom::{DomDocument, js_error};
use crate::moveable::{MOVEABLE_GLOBAL, ManipulationQueue, MoveableManipulator};
use crate::script::{STATE_ATTR, ScriptState};
use js_sys::{Promise, Reflect};
use liveframe_core::{Document, EngineError, EngineResult};
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::Element;

pub const MOVEABLE_SCRIPT_ID: &str = "__liveframe_moveable";
pub const MOVEABLE_SCRIPT_SRC: &str = "https://unpkg.com/moveable/dist/moveable.min.js";

/// Make sure the script `src` is present exactly once and wait until
/// `global` is defined on the frame window.
///
/// Returns at once when the global already exists. A tag left by an earlier
/// call that is still loading is awaited rather than duplicated. A tag whose
/// load already finished without defining `global` will never fire again, so
/// it is replaced by a fresh one.
pub async fn ensure_script(doc: &DomDocument, id: &str, src: &str, global: &str) -> EngineResult<()> {
    if has_global(doc, global) {
        return Ok(());
    }
    let existing = doc.element_by_id(id).map(|tag| {
        let state = ScriptState::from_attr(doc.attribute(&tag, STATE_ATTR).as_deref());
        (tag, state)
    });
    let script = match existing {
        Some((tag, state)) if ScriptState::can_await(state) => tag,
        Some((stale, _)) => {
            log::debug!("Replacing stale script tag #{}", id);
            stale.remove();
            inject(doc, id, src)?
        }
        None => inject(doc, id, src)?,
    };

    let mut listen_error = None;
    let loaded = Promise::new(&mut |resolve, reject| {
        let added = script
            .add_event_listener_with_callback("load", &resolve)
            .and_then(|()| script.add_event_listener_with_callback("error", &reject));
        if let Err(e) = added {
            listen_error = Some(js_error(e));
        }
    });
    if let Some(e) = listen_error {
        log::warn!("Cannot watch {} loading: {}", src, e);
        doc.set_attribute(&script, STATE_ATTR, ScriptState::Failed.as_attr())?;
        return Err(EngineError::LibraryUnavailable);
    }

    let result = JsFuture::from(loaded).await;
    let state = if result.is_ok() { ScriptState::Loaded } else { ScriptState::Failed };
    doc.set_attribute(&script, STATE_ATTR, state.as_attr())?;
    if let Err(e) = result {
        log::warn!("Failed to load {}: {:?}", src, e);
        return Err(EngineError::LibraryUnavailable);
    }
    if has_global(doc, global) {
        Ok(())
    } else {
        Err(EngineError::LibraryUnavailable)
    }
}

fn inject(doc: &DomDocument, id: &str, src: &str) -> EngineResult<Element> {
    let script = doc.create_element("script")?;
    doc.set_attribute(&script, "id", id)?;
    doc.set_attribute(&script, STATE_ATTR, ScriptState::Loading.as_attr())?;
    doc.set_attribute(&script, "src", src)?;
    let parent = doc
        .document()
        .head()
        .map(Into::into)
        .or_else(|| doc.root())
        .ok_or(EngineError::EnvironmentNotReady)?;
    doc.append_child(&parent, &script)?;
    log::debug!("Injected {}", src);
    Ok(script)
}

fn has_global(doc: &DomDocument, global: &str) -> bool {
    Reflect::get(doc.window(), &JsValue::from_str(global))
        .map(|v| v.is_function())
        .unwrap_or(false)
}

/// Load Moveable into the frame and wrap its constructor.
pub async fn load_moveable(
    doc: DomDocument,
    queue: ManipulationQueue,
    notify: Rc<dyn Fn()>,
) -> EngineResult<MoveableManipulator> {
    ensure_script(&doc, MOVEABLE_SCRIPT_ID, MOVEABLE_SCRIPT_SRC, MOVEABLE_GLOBAL).await?;
    MoveableManipulator::from_window(&doc, queue, notify)
}

