//! LiveFrame Core Library
//!
//! Platform-agnostic engine for visually editing a document embedded in a
//! frame: fit-to-viewport scaling, pointer mapping, element selection with a
//! manipulation overlay, inline text editing and text insertion.

pub mod config;
pub mod document;
pub mod edit;
pub mod editor;
pub mod error;
pub mod input;
pub mod manipulation;
pub mod router;
pub mod scale;
pub mod selection;
pub mod style;
pub mod tools;

#[cfg(test)]
mod testing;

pub use config::{Capabilities, EditorConfig, InsertTextStyle};
pub use document::{Document, MemoryDocument, MemoryRange, NodeId};
pub use edit::EditMode;
pub use editor::{Editor, EditorState};
pub use error::{EngineError, EngineResult};
pub use input::{EditorEvent, EventOutcome, Key};
pub use manipulation::{BindingOptions, ManipulationBinding, ManipulationEvent, Manipulator};
pub use router::{EventRouter, Route};
pub use scale::{PointerMapping, SCALE_WRAPPER_ID, ScaleSnapshot, ScaleStrategy};
pub use selection::SelectionController;
pub use style::{StyleProps, StyledRegion};
pub use tools::{InsertMode, InsertTool};
