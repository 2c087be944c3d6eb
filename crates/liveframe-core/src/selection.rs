//! Selection controller.
//!
//! Owns the current manipulation target and the single manipulation binding
//! attached to it. The binding always lives in the scaled container so its
//! handles share the content's coordinate space; a binding whose target or
//! container is stale is destroyed before a new one is created.

use crate::config::Capabilities;
use crate::document::Document;
use crate::error::{EngineError, EngineResult};
use crate::manipulation::{BindingOptions, ManipulationBinding, ManipulationEvent, Manipulator};
use crate::scale::{self, ScaleStrategy, px};

/// Tracks the selected element and its overlay binding.
#[derive(Debug)]
pub struct SelectionController<E, B> {
    target: Option<E>,
    binding: Option<B>,
}

impl<E, B> Default for SelectionController<E, B> {
    fn default() -> Self {
        Self {
            target: None,
            binding: None,
        }
    }
}

impl<E, B> SelectionController<E, B>
where
    E: Clone + PartialEq + std::fmt::Debug,
    B: ManipulationBinding<E>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected element.
    pub fn target(&self) -> Option<&E> {
        self.target.as_ref()
    }

    /// Live manipulation binding, if any.
    pub fn binding(&self) -> Option<&B> {
        self.binding.as_ref()
    }

    /// Select `element` and bind the overlay to it.
    ///
    /// The target is recorded even when no manipulator is available; the
    /// returned [`EngineError::LibraryUnavailable`] only reports that no
    /// overlay was bound.
    pub fn select<D, M>(
        &mut self,
        doc: &D,
        manipulator: Option<&mut M>,
        element: E,
        strategy: ScaleStrategy,
        capabilities: &Capabilities,
    ) -> EngineResult<()>
    where
        D: Document<Element = E>,
        M: Manipulator<D, Binding = B>,
    {
        self.target = Some(element.clone());

        let Some(manipulator) = manipulator else {
            return Err(EngineError::LibraryUnavailable);
        };
        let container = scale::scale_container(doc, strategy).ok_or(EngineError::EnvironmentNotReady)?;

        if let Some(binding) = self.binding.as_mut() {
            if *binding.target() == element && *binding.container() == container {
                binding.fit_controls_to_size();
                return Ok(());
            }
        }
        self.release();

        let guidelines = scale::content_root(doc)
            .map(|root| doc.children(&root))
            .unwrap_or_default()
            .into_iter()
            .filter(|el| *el != element)
            .collect();
        let binding = manipulator.create(
            doc,
            BindingOptions {
                target: element,
                container,
                capabilities: capabilities.clone(),
                guidelines,
            },
        )?;
        log::debug!("Bound manipulation overlay to {:?}", binding.target());
        self.binding = Some(binding);
        Ok(())
    }

    /// Re-bind or re-fit the overlay after a geometry or strategy change.
    pub fn refresh<D, M>(
        &mut self,
        doc: &D,
        manipulator: Option<&mut M>,
        strategy: ScaleStrategy,
        capabilities: &Capabilities,
    ) -> EngineResult<()>
    where
        D: Document<Element = E>,
        M: Manipulator<D, Binding = B>,
    {
        match self.target.clone() {
            Some(target) if manipulator.is_some() => {
                self.select(doc, manipulator, target, strategy, capabilities)
            }
            _ => {
                if let Some(binding) = self.binding.as_mut() {
                    binding.fit_controls_to_size();
                }
                Ok(())
            }
        }
    }

    /// Write a geometry change from the overlay back onto its target, then re-fit.
    pub fn apply_manipulation<D>(&mut self, doc: &D, event: &ManipulationEvent) -> EngineResult<()>
    where
        D: Document<Element = E>,
    {
        let binding = self.binding.as_mut().ok_or(EngineError::LibraryUnavailable)?;
        let target = binding.target().clone();
        match event {
            ManipulationEvent::Resize { width, height, delta } => {
                if delta.x != 0.0 {
                    doc.set_style(&target, "width", &px(*width));
                }
                if delta.y != 0.0 {
                    doc.set_style(&target, "height", &px(*height));
                }
            }
            other => {
                if let Some(transform) = other.transform() {
                    doc.set_style(&target, "transform", transform);
                }
            }
        }
        binding.fit_controls_to_size();
        Ok(())
    }

    /// Destroy the binding, keeping the target.
    pub fn release(&mut self) {
        if let Some(mut binding) = self.binding.take() {
            binding.destroy();
            log::debug!("Released manipulation overlay");
        }
    }

    /// Destroy the binding and forget the target.
    pub fn clear(&mut self) {
        self.release();
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, NodeId};
    use crate::scale::ensure_wrapper;
    use crate::testing::{RecordingBinding, RecordingManipulator};
    use kurbo::Vec2;

    type Controller = SelectionController<NodeId, RecordingBinding>;

    fn doc_with(n: usize) -> (MemoryDocument, Vec<NodeId>) {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let els = (0..n).map(|_| doc.append_element(body, "div")).collect();
        (doc, els)
    }

    #[test]
    fn test_at_most_one_binding_on_latest_target() {
        let (doc, els) = doc_with(4);
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();
        let caps = Capabilities::default();

        for &el in els.iter().chain([els[1], els[1], els[3], els[0]].iter()) {
            controller
                .select(&doc, Some(&mut manipulator), el, ScaleStrategy::Transform, &caps)
                .unwrap();
            let log = log.borrow();
            assert_eq!(log.live.len(), 1);
            assert_eq!(log.live[0], el);
            assert_eq!(controller.target(), Some(&el));
        }
        let log = log.borrow();
        assert_eq!(log.created - log.destroyed, 1);
    }

    #[test]
    fn test_reselecting_same_target_refits() {
        let (doc, els) = doc_with(1);
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();
        let caps = Capabilities::default();

        controller.select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Transform, &caps).unwrap();
        controller.select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Transform, &caps).unwrap();
        assert_eq!(log.borrow().created, 1);
        assert_eq!(log.borrow().fits, 1);
    }

    #[test]
    fn test_library_unavailable_records_target() {
        let (doc, els) = doc_with(1);
        let mut controller = Controller::new();
        let result = controller.select::<_, RecordingManipulator>(
            &doc,
            None,
            els[0],
            ScaleStrategy::Zoom,
            &Capabilities::default(),
        );
        assert_eq!(result, Err(EngineError::LibraryUnavailable));
        assert_eq!(controller.target(), Some(&els[0]));
        assert!(controller.binding().is_none());
    }

    #[test]
    fn test_binding_uses_scale_container() {
        let (doc, els) = doc_with(2);
        let wrapper = ensure_wrapper(&doc).unwrap();
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();

        controller
            .select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Zoom, &Capabilities::default())
            .unwrap();
        assert_eq!(*controller.binding().unwrap().container(), wrapper);
        assert_eq!(log.borrow().last_guidelines, vec![els[1]]);
    }

    #[test]
    fn test_container_change_rebinds() {
        let (doc, els) = doc_with(1);
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();
        let caps = Capabilities::default();

        controller.select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Zoom, &caps).unwrap();
        assert_eq!(*controller.binding().unwrap().container(), doc.body().unwrap());

        let wrapper = ensure_wrapper(&doc).unwrap();
        controller.refresh(&doc, Some(&mut manipulator), ScaleStrategy::Zoom, &caps).unwrap();
        assert_eq!(*controller.binding().unwrap().container(), wrapper);
        let log = log.borrow();
        assert_eq!(log.created, 2);
        assert_eq!(log.destroyed, 1);
        assert_eq!(log.live, vec![els[0]]);
    }

    #[test]
    fn test_manipulation_writes_back_and_refits() {
        let (doc, els) = doc_with(1);
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();
        controller
            .select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Transform, &Capabilities::default())
            .unwrap();

        controller
            .apply_manipulation(
                &doc,
                &ManipulationEvent::Rotate {
                    rotation: 30.0,
                    transform: "rotate(30deg)".to_string(),
                },
            )
            .unwrap();
        assert_eq!(doc.inline_style(&els[0], "transform").as_deref(), Some("rotate(30deg)"));

        controller
            .apply_manipulation(
                &doc,
                &ManipulationEvent::Resize {
                    width: 240.0,
                    height: 80.0,
                    delta: Vec2::new(4.0, 0.0),
                },
            )
            .unwrap();
        assert_eq!(doc.inline_style(&els[0], "width").as_deref(), Some("240px"));
        assert_eq!(doc.inline_style(&els[0], "height"), None);
        assert_eq!(log.borrow().fits, 2);
    }

    #[test]
    fn test_failed_create_leaves_target_without_binding() {
        let (doc, els) = doc_with(2);
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();
        let caps = Capabilities::default();
        controller.select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Transform, &caps).unwrap();

        manipulator.set_failing(true);
        let result = controller.select(&doc, Some(&mut manipulator), els[1], ScaleStrategy::Transform, &caps);
        assert!(matches!(result, Err(EngineError::Dom(_))));
        assert_eq!(controller.target(), Some(&els[1]));
        assert!(controller.binding().is_none());
        assert!(log.borrow().live.is_empty());
        assert_eq!(log.borrow().destroyed, 1);

        manipulator.set_failing(false);
        controller.select(&doc, Some(&mut manipulator), els[1], ScaleStrategy::Transform, &caps).unwrap();
        assert_eq!(log.borrow().live, vec![els[1]]);
    }

    #[test]
    fn test_clear_releases_binding() {
        let (doc, els) = doc_with(1);
        let mut manipulator = RecordingManipulator::new();
        let log = manipulator.log();
        let mut controller = Controller::new();
        controller
            .select(&doc, Some(&mut manipulator), els[0], ScaleStrategy::Transform, &Capabilities::default())
            .unwrap();
        controller.clear();
        assert!(controller.target().is_none());
        assert!(log.borrow().live.is_empty());
    }
}
