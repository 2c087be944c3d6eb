//! Input events delivered to the editor.
//!
//! The platform layer translates raw DOM events into [`EditorEvent`]s and
//! applies the returned [`EventOutcome`] to the original event.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An input event, with element and range handles from the hosting document.
#[derive(Debug, Clone)]
pub enum EditorEvent<E, R> {
    /// Pointer pressed. `client` is in viewport coordinates.
    PointerDown { target: Option<E>, client: Point },
    /// Double click on an element.
    DoubleClick { target: Option<E> },
    /// The document's text selection changed. `None` when nothing is selected.
    SelectionChange { range: Option<R> },
    KeyDown { key: Key },
}

/// What the platform layer must do with the original event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventOutcome {
    /// Let the event continue untouched.
    pub const PASS: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    pub fn prevent_default() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: false,
        }
    }

    pub fn stop_propagation() -> Self {
        Self {
            prevent_default: false,
            stop_propagation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_dom() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("Esc"), Key::Escape);
        assert_eq!(Key::from_dom("Enter"), Key::Enter);
        assert_eq!(Key::from_dom("a"), Key::Other("a".to_string()));
    }

    #[test]
    fn test_outcome_constructors() {
        assert_eq!(EventOutcome::default(), EventOutcome::PASS);
        assert!(EventOutcome::prevent_default().prevent_default);
        assert!(!EventOutcome::prevent_default().stop_propagation);
        assert!(EventOutcome::stop_propagation().stop_propagation);
    }
}
