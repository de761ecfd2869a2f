// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cooperative scheduling substrate.
//!
//! Single-threaded: the host calls [`Scheduler::tick`] once per scheduling
//! turn and every suspended executor is resumed once with that tick's
//! deltas. There are no threads and no locks; handles are cheap `Rc`
//! clones.

use crate::clock::Tick;
use crate::curve::CurveEvaluator;
use crate::executor::{Status, StepExec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a suspended task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Create a new random task ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

struct Task {
    exec: StepExec,
    done: Option<Box<dyn FnOnce()>>,
}

struct SchedulerInner {
    tasks: IndexMap<TaskId, Task>,
    curves: Rc<dyn CurveEvaluator>,
    /// Task currently inside `resume`, if any
    current: Option<TaskId>,
    /// Set when the current task is cancelled from within its own slice;
    /// the slice finishes, the task is not resumed again.
    current_cancelled: bool,
}

/// Runs suspended step executors, one resume per tick.
///
/// Cancelling a task that is parked drops it immediately; cancelling the
/// task that is currently executing lets the running slice finish and then
/// drops it, so a handler that stops its own runner still completes the
/// current emission.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    /// Create a scheduler with the curve evaluator `Animate` steps sample
    pub fn new(curves: Rc<dyn CurveEvaluator>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tasks: IndexMap::new(),
                curves,
                current: None,
                current_cancelled: false,
            })),
        }
    }

    /// Resume every suspended task once with this tick's deltas.
    ///
    /// Tasks spawned by completion continuations during the call are first
    /// resumed on the next tick.
    pub fn tick(&self, tick: Tick) {
        let ids: Vec<TaskId> = self.inner.borrow().tasks.keys().copied().collect();
        for id in ids {
            self.run_slice(id, tick);
        }
    }

    /// Number of currently suspended tasks
    pub fn task_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Whether any task is still suspended
    pub fn has_work(&self) -> bool {
        !self.inner.borrow().tasks.is_empty()
    }

    /// Park an executor; it does not run until [`Scheduler::launch`]
    pub(crate) fn spawn(&self, exec: StepExec, done: Box<dyn FnOnce()>) -> TaskId {
        let id = TaskId::new();
        self.inner.borrow_mut().tasks.insert(
            id,
            Task {
                exec,
                done: Some(done),
            },
        );
        id
    }

    /// Run the first slice of a spawned task synchronously.
    ///
    /// Mirrors coroutine start semantics: executors emit their initial
    /// values (or complete outright) before the spawner regains control.
    pub(crate) fn launch(&self, id: TaskId) {
        self.run_slice(id, Tick::ZERO);
    }

    /// Drop a task so it is never resumed again
    pub(crate) fn cancel(&self, id: TaskId) {
        let mut inner = self.inner.borrow_mut();
        if inner.tasks.shift_remove(&id).is_some() {
            return;
        }
        if inner.current == Some(id) {
            inner.current_cancelled = true;
        }
    }

    fn run_slice(&self, id: TaskId, tick: Tick) {
        // Check the task out of the table so user callbacks invoked from the
        // executor can reach the scheduler without re-entrant borrows.
        let (mut task, curves) = {
            let mut inner = self.inner.borrow_mut();
            let Some(task) = inner.tasks.shift_remove(&id) else {
                return;
            };
            inner.current = Some(id);
            inner.current_cancelled = false;
            (task, inner.curves.clone())
        };

        let status = task.exec.resume(tick, curves.as_ref());

        let cancelled = {
            let mut inner = self.inner.borrow_mut();
            inner.current = None;
            std::mem::take(&mut inner.current_cancelled)
        };

        match status {
            Status::Pending => {
                if !cancelled {
                    self.inner.borrow_mut().tasks.insert(id, task);
                }
            }
            Status::Done => {
                // The completing slice already ran; its continuation decides
                // whether the chain advances (it re-checks the stop flag).
                if let Some(done) = task.done.take() {
                    done();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Span, TimeKind};
    use crate::curve::IdentityCurves;
    use crate::executor::WaitExec;
    use std::cell::Cell;

    fn scheduler() -> Scheduler {
        Scheduler::new(Rc::new(IdentityCurves))
    }

    fn wait_exec(seconds: f32) -> StepExec {
        StepExec::Wait(WaitExec::new(Span::Seconds(seconds), TimeKind::Scaled))
    }

    #[test]
    fn test_task_completes_after_span() {
        let sched = scheduler();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let id = sched.spawn(wait_exec(1.0), Box::new(move || flag.set(true)));
        sched.launch(id);

        sched.tick(Tick::uniform(0.5));
        assert!(!fired.get());
        assert_eq!(sched.task_count(), 1);

        sched.tick(Tick::uniform(0.5));
        assert!(fired.get());
        assert!(!sched.has_work());
    }

    #[test]
    fn test_cancel_parked_task_drops_it() {
        let sched = scheduler();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let id = sched.spawn(wait_exec(1.0), Box::new(move || flag.set(true)));
        sched.launch(id);

        sched.cancel(id);
        assert!(!sched.has_work());

        sched.tick(Tick::uniform(2.0));
        assert!(!fired.get());
    }

    #[test]
    fn test_cancel_is_noop_for_unknown_id() {
        let sched = scheduler();
        sched.cancel(TaskId::new());
        assert!(!sched.has_work());
    }
}
