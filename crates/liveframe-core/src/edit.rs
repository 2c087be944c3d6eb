//! Inline text editing state machine.

use crate::document::Document;
use crate::error::EngineResult;
use crate::input::{EventOutcome, Key};

/// Editing state of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMode<E> {
    /// No element is being edited.
    Idle,
    /// `contenteditable` is set on this element and it holds focus.
    Editing(E),
}

impl<E> Default for EditMode<E> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<E: Clone + PartialEq + std::fmt::Debug> EditMode<E> {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// Element currently being edited.
    pub fn element(&self) -> Option<&E> {
        match self {
            Self::Editing(el) => Some(el),
            Self::Idle => None,
        }
    }

    /// Start editing `element`. A different element already being edited is
    /// exited first, so only one element is ever editable.
    pub fn enter<D>(&mut self, doc: &D, element: E) -> EngineResult<()>
    where
        D: Document<Element = E>,
    {
        if let Self::Editing(current) = self {
            if *current == element {
                doc.focus(&element);
                return Ok(());
            }
            self.exit(doc);
        }
        doc.set_attribute(&element, "contenteditable", "true")?;
        doc.focus(&element);
        log::debug!("Entered text editing on {:?}", element);
        *self = Self::Editing(element);
        Ok(())
    }

    /// Stop editing, returning the element that was being edited.
    pub fn exit<D>(&mut self, doc: &D) -> Option<E>
    where
        D: Document<Element = E>,
    {
        match std::mem::take(self) {
            Self::Editing(el) => {
                doc.remove_attribute(&el, "contenteditable");
                log::debug!("Exited text editing on {:?}", el);
                Some(el)
            }
            Self::Idle => None,
        }
    }

    /// React to a key press.
    ///
    /// Escape cancels editing. Enter commits it, and while the element is
    /// editable the default action (inserting a line break) is suppressed.
    pub fn handle_key<D>(&mut self, doc: &D, key: &Key) -> EventOutcome
    where
        D: Document<Element = E>,
    {
        let Self::Editing(el) = self else {
            return EventOutcome::PASS;
        };
        match key {
            Key::Escape => {
                self.exit(doc);
                EventOutcome::PASS
            }
            Key::Enter => {
                let editable = doc.is_content_editable(el);
                self.exit(doc);
                if editable {
                    EventOutcome::prevent_default()
                } else {
                    EventOutcome::PASS
                }
            }
            Key::Other(_) => EventOutcome::PASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, NodeId};

    fn setup() -> (MemoryDocument, NodeId, NodeId) {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let a = doc.append_element(body, "p");
        doc.append_text(a, "first");
        let b = doc.append_element(body, "p");
        doc.append_text(b, "second");
        (doc, a, b)
    }

    #[test]
    fn test_enter_sets_editable_and_focus() {
        let (doc, a, _) = setup();
        let mut mode = EditMode::default();
        mode.enter(&doc, a).unwrap();
        assert_eq!(mode, EditMode::Editing(a));
        assert!(doc.is_content_editable(&a));
        assert_eq!(doc.focused(), Some(a));
    }

    #[test]
    fn test_escape_returns_to_idle() {
        let (doc, a, _) = setup();
        let mut mode = EditMode::default();
        mode.enter(&doc, a).unwrap();
        let outcome = mode.handle_key(&doc, &Key::Escape);
        assert_eq!(mode, EditMode::Idle);
        assert_eq!(doc.attribute(&a, "contenteditable"), None);
        assert!(!outcome.prevent_default);
    }

    #[test]
    fn test_enter_commits_without_newline() {
        let (doc, a, _) = setup();
        let mut mode = EditMode::default();
        mode.enter(&doc, a).unwrap();
        let outcome = mode.handle_key(&doc, &Key::Enter);
        assert!(outcome.prevent_default);
        assert_eq!(mode, EditMode::Idle);
        assert!(!doc.is_content_editable(&a));
        assert_eq!(doc.text_content(&a), "first");
    }

    #[test]
    fn test_keys_while_idle_pass_through() {
        let (doc, _, _) = setup();
        let mut mode: EditMode<NodeId> = EditMode::default();
        assert_eq!(mode.handle_key(&doc, &Key::Enter), EventOutcome::PASS);
        assert_eq!(mode.handle_key(&doc, &Key::Escape), EventOutcome::PASS);
    }

    #[test]
    fn test_entering_other_element_exits_previous() {
        let (doc, a, b) = setup();
        let mut mode = EditMode::default();
        mode.enter(&doc, a).unwrap();
        mode.enter(&doc, b).unwrap();
        assert_eq!(mode.element(), Some(&b));
        assert!(!doc.is_content_editable(&a));
        assert!(doc.is_content_editable(&b));
    }

    #[test]
    fn test_other_keys_keep_editing() {
        let (doc, a, _) = setup();
        let mut mode = EditMode::default();
        mode.enter(&doc, a).unwrap();
        mode.handle_key(&doc, &Key::Other("a".to_string()));
        assert!(mode.is_editing());
    }
}
