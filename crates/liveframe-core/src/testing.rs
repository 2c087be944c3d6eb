//! Test fixtures shared across modules.

use crate::document::{Document, NodeId};
use crate::error::{EngineError, EngineResult};
use crate::manipulation::{BindingOptions, ManipulationBinding, Manipulator};
use std::cell::RefCell;
use std::rc::Rc;

/// What the recording manipulator observed.
#[derive(Debug, Default)]
pub struct ManipulatorLog {
    pub created: usize,
    pub destroyed: usize,
    pub fits: usize,
    /// Targets of bindings that were created and not yet destroyed.
    pub live: Vec<NodeId>,
    pub last_guidelines: Vec<NodeId>,
}

/// Manipulator that records calls instead of drawing an overlay. Clones
/// share one log.
#[derive(Debug, Default, Clone)]
pub struct RecordingManipulator {
    log: Rc<RefCell<ManipulatorLog>>,
    fail: bool,
}

impl RecordingManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create` fail until reset.
    pub fn set_failing(&mut self, fail: bool) {
        self.fail = fail;
    }

    pub fn log(&self) -> Rc<RefCell<ManipulatorLog>> {
        self.log.clone()
    }
}

#[derive(Debug)]
pub struct RecordingBinding {
    target: NodeId,
    container: NodeId,
    log: Rc<RefCell<ManipulatorLog>>,
}

impl ManipulationBinding<NodeId> for RecordingBinding {
    fn target(&self) -> &NodeId {
        &self.target
    }

    fn container(&self) -> &NodeId {
        &self.container
    }

    fn fit_controls_to_size(&mut self) {
        self.log.borrow_mut().fits += 1;
    }

    fn destroy(&mut self) {
        let mut log = self.log.borrow_mut();
        log.destroyed += 1;
        if let Some(index) = log.live.iter().position(|&t| t == self.target) {
            log.live.remove(index);
        }
    }
}

impl<D: Document<Element = NodeId>> Manipulator<D> for RecordingManipulator {
    type Binding = RecordingBinding;

    fn create(
        &mut self,
        _doc: &D,
        options: BindingOptions<NodeId>,
    ) -> EngineResult<RecordingBinding> {
        if self.fail {
            return Err(EngineError::Dom("constructor threw".to_string()));
        }
        let mut log = self.log.borrow_mut();
        log.created += 1;
        log.live.push(options.target);
        log.last_guidelines = options.guidelines;
        Ok(RecordingBinding {
            target: options.target,
            container: options.container,
            log: self.log.clone(),
        })
    }
}

/// Minimal executor for futures that never actually wait.
pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
