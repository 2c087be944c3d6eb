//! Manipulator for headless runs: bindings only log what an overlay would do.

use liveframe_core::{
    BindingOptions, EngineResult, ManipulationBinding, Manipulator, MemoryDocument, NodeId,
};

#[derive(Debug, Default)]
pub struct HeadlessManipulator {
    created: usize,
}

impl HeadlessManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings created so far.
    pub fn created(&self) -> usize {
        self.created
    }
}

#[derive(Debug)]
pub struct HeadlessBinding {
    target: NodeId,
    container: NodeId,
    guidelines: usize,
}

impl Manipulator<MemoryDocument> for HeadlessManipulator {
    type Binding = HeadlessBinding;

    fn create(&mut self, doc: &MemoryDocument, options: BindingOptions<NodeId>) -> EngineResult<HeadlessBinding> {
        self.created += 1;
        log::info!(
            "Overlay on <{}> ({} guidelines, snap {}px)",
            doc.tag_name(options.target).unwrap_or_default(),
            options.guidelines.len(),
            options.capabilities.snap_threshold
        );
        Ok(HeadlessBinding {
            target: options.target,
            container: options.container,
            guidelines: options.guidelines.len(),
        })
    }
}

impl HeadlessBinding {
    pub fn guidelines(&self) -> usize {
        self.guidelines
    }
}

impl ManipulationBinding<NodeId> for HeadlessBinding {
    fn target(&self) -> &NodeId {
        &self.target
    }

    fn container(&self) -> &NodeId {
        &self.container
    }

    fn fit_controls_to_size(&mut self) {
        log::debug!("Overlay refit on {}", self.target);
    }

    fn destroy(&mut self) {
        log::debug!("Overlay destroyed on {}", self.target);
    }
}
