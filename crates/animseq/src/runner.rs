// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handle to one in-flight chain execution.

use crate::builder::ChainInner;
use crate::scheduler::{Scheduler, TaskId};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

struct RunnerInner {
    stopped: Cell<bool>,
    finished: Cell<bool>,
    /// The suspended task currently driving the chain, if any
    active: Cell<Option<TaskId>>,
    scheduler: Scheduler,
    /// Weak so a step callback capturing its own runner cannot keep the
    /// chain alive in a cycle
    chain: Weak<RefCell<ChainInner>>,
}

/// Cancellation handle for one execution of a built chain.
///
/// One runner is created per `start`; it is terminal once the chain's last
/// step finishes or [`Runner::stop`] is called. Clones share the same
/// execution.
#[derive(Clone)]
pub struct Runner {
    inner: Rc<RunnerInner>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("stopped", &self.inner.stopped.get())
            .field("finished", &self.inner.finished.get())
            .finish_non_exhaustive()
    }
}

impl Runner {
    pub(crate) fn new(scheduler: Scheduler, chain: &Rc<RefCell<ChainInner>>) -> Self {
        Self {
            inner: Rc::new(RunnerInner {
                stopped: Cell::new(false),
                finished: Cell::new(false),
                active: Cell::new(None),
                scheduler,
                chain: Rc::downgrade(chain),
            }),
        }
    }

    /// Cancel this execution.
    ///
    /// The outstanding suspension (if any) is dropped immediately, so no
    /// further ticks reach it; the sequencer observes the flag at the next
    /// step boundary and never invokes the chain finisher. Stopping a
    /// completed execution, or stopping twice, is a no-op.
    pub fn stop(&self) {
        if self.inner.finished.get() || self.inner.stopped.get() {
            return;
        }
        self.inner.stopped.set(true);
        if let Some(id) = self.inner.active.take() {
            self.inner.scheduler.cancel(id);
        }
        if let Some(chain) = self.inner.chain.upgrade() {
            chain.borrow_mut().running = false;
        }
        debug!("chain execution stopped");
    }

    /// Whether [`Runner::stop`] has been called
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Whether the chain ran its last step to completion
    pub fn is_finished(&self) -> bool {
        self.inner.finished.get()
    }

    /// Whether the execution is still live (neither stopped nor finished)
    pub fn is_running(&self) -> bool {
        !self.is_stopped() && !self.is_finished()
    }

    pub(crate) fn set_active(&self, id: TaskId) {
        self.inner.active.set(Some(id));
    }

    pub(crate) fn clear_active(&self) {
        self.inner.active.set(None);
    }

    pub(crate) fn mark_finished(&self) {
        self.inner.finished.set(true);
        self.inner.active.set(None);
    }
}
