//! Manipulation library adapter.
//!
//! The drag/resize/rotate overlay is provided by an external library. The
//! engine talks to it only through [`Manipulator`] (a factory for bindings)
//! and [`ManipulationBinding`] (one live overlay bound to one element).
//! Geometry changes come back as typed [`ManipulationEvent`]s.

use crate::config::Capabilities;
use crate::document::Document;
use crate::error::EngineResult;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Geometry events emitted by the manipulation overlay.
///
/// Every variant carries the CSS transform (or box size) the library computed
/// for the target, ready to be written back onto its inline style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManipulationEvent {
    Drag {
        /// Translation since the gesture started, in content pixels.
        translate: Vec2,
        transform: String,
    },
    Resize {
        width: f64,
        height: f64,
        /// Per-axis change for this step. A zero component leaves that axis untouched.
        delta: Vec2,
    },
    Scale {
        scale: Vec2,
        transform: String,
    },
    Rotate {
        /// Absolute rotation in degrees.
        rotation: f64,
        transform: String,
    },
    Pinch {
        transform: String,
    },
}

impl ManipulationEvent {
    /// Event name as used by the manipulation library.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Drag { .. } => "drag",
            Self::Resize { .. } => "resize",
            Self::Scale { .. } => "scale",
            Self::Rotate { .. } => "rotate",
            Self::Pinch { .. } => "pinch",
        }
    }

    /// The transform to write onto the target, if this event carries one.
    pub fn transform(&self) -> Option<&str> {
        match self {
            Self::Drag { transform, .. }
            | Self::Scale { transform, .. }
            | Self::Rotate { transform, .. }
            | Self::Pinch { transform } => Some(transform),
            Self::Resize { .. } => None,
        }
    }
}

/// Everything a [`Manipulator`] needs to create a binding.
#[derive(Debug, Clone)]
pub struct BindingOptions<E> {
    /// Element to manipulate.
    pub target: E,
    /// Scaled element acting as both coordinate container and overlay container.
    pub container: E,
    pub capabilities: Capabilities,
    /// Elements whose edges are snap guidelines.
    pub guidelines: Vec<E>,
}

/// A live overlay bound to exactly one target.
pub trait ManipulationBinding<E> {
    /// Element this binding manipulates.
    fn target(&self) -> &E;

    /// Container the overlay lives in.
    fn container(&self) -> &E;

    /// Recompute handle positions after the target or its container changed geometry.
    fn fit_controls_to_size(&mut self);

    /// Release the overlay and every listener it installed.
    fn destroy(&mut self);
}

/// Factory for manipulation bindings, backed by a concrete library.
pub trait Manipulator<D: Document> {
    type Binding: ManipulationBinding<D::Element>;

    /// Create a binding on `options.target`.
    fn create(&mut self, doc: &D, options: BindingOptions<D::Element>) -> EngineResult<Self::Binding>;
}
