//! LiveFrame Web
//!
//! Browser bindings for the editing engine: a `Document` over the frame's
//! live DOM, a Moveable-backed manipulator and the JS-facing `FrameEditor`.
//! Native builds get a headless manipulator for running the engine against
//! an in-memory document.

pub mod payload;
pub mod script;

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod loader;
#[cfg(target_arch = "wasm32")]
mod moveable;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use dom::DomDocument;
#[cfg(target_arch = "wasm32")]
pub use moveable::{MoveableBinding, MoveableManipulator};
#[cfg(target_arch = "wasm32")]
pub use web::{FrameEditor, start};
