// SPDX-License-Identifier: MIT OR Apache-2.0
//! The chain state machine.
//!
//! `run_from` dispatches one step and suspends; the step's completion
//! continuation runs the per-step callback, re-checks the stop flag, and
//! advances to the next index. When the index runs past the last step the
//! chain finisher fires and the builder is released for restart.

use crate::builder::{Builder, ChainInner};
use crate::clock::{Span, TimeKind};
use crate::context::Context;
use crate::executor::{
    AnimateConstantExec, AnimateExec, RunAllExec, RunRepeatedExec, StepExec, WaitExec,
};
use crate::runner::Runner;
use crate::scheduler::Scheduler;
use crate::step::{ContextAction, StepKind};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, trace, warn};

/// One-shot continuation handed to a `sub_animation` step.
///
/// The chain stays suspended until `resume` is called. Consuming `self`
/// makes double-resume unrepresentable; dropping it without resuming stalls
/// the chain forever, which is the caller's documented responsibility.
pub struct Resume {
    go: Box<dyn FnOnce()>,
}

impl Resume {
    /// Advance the suspended chain
    pub fn resume(self) {
        (self.go)();
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resume")
    }
}

/// Dispatch the step at `index`, or finish the chain when past the end.
pub(crate) fn run_from(
    scheduler: &Scheduler,
    chain: &Rc<RefCell<ChainInner>>,
    runner: &Runner,
    ctx: &Context,
    index: usize,
) {
    let total = chain.borrow().steps.len();
    if index >= total {
        debug!(steps = total, "chain complete");
        // Finished before the finisher runs, so a stop() from inside the
        // finisher is the documented no-op.
        runner.mark_finished();
        let finisher = chain.borrow().finisher.clone();
        if let Some(finisher) = finisher {
            (finisher.borrow_mut())(ctx);
        }
        chain.borrow_mut().running = false;
        return;
    }

    let (step, kind) = {
        let inner = chain.borrow();
        (inner.steps[index].clone(), inner.kind)
    };
    trace!(index, step = step.kind.name(), "dispatching step");
    let next = continuation(scheduler, chain, runner, ctx, index, step.on_finished);

    match step.kind {
        StepKind::Wait(span) => {
            spawn(scheduler, runner, StepExec::Wait(WaitExec::new(span, kind)), next);
        }
        StepKind::Animate {
            curves,
            speed,
            invert,
            handler,
        } => {
            let exec = AnimateExec::new(curves, speed, invert, handler, ctx.clone(), kind);
            spawn(scheduler, runner, StepExec::Animate(exec), next);
        }
        StepKind::AnimateConstant { duration, handler } => {
            let exec = AnimateConstantExec::new(duration, handler, ctx.clone(), kind);
            spawn(scheduler, runner, StepExec::AnimateConstant(exec), next);
        }
        StepKind::RunAll { spacing, actions } => {
            let exec = RunAllExec::new(spacing, actions, ctx.clone(), kind);
            spawn(scheduler, runner, StepExec::RunAll(exec), next);
        }
        StepKind::RunRepeated {
            spacing,
            repeat,
            inverted,
            action,
        } => {
            let exec = RunRepeatedExec::new(spacing, repeat, inverted, action, ctx.clone(), kind);
            spawn(scheduler, runner, StepExec::RunRepeated(exec), next);
        }
        StepKind::Parallel { build } => {
            // Fire-and-forget: the sub-chain shares the context but no
            // runner is retained, and the parent advances without waiting.
            let nested = (build.borrow_mut())(Builder::new(scheduler, kind));
            if nested.is_running() {
                warn!(index, "parallel sub-chain is already running; skipping");
            } else if let Err(err) = nested.start_with(ctx.clone()) {
                // A build closure returning an unstartable chain is a
                // programming error; the parent still advances so one bad
                // sub-chain cannot stall the whole sequence.
                error!(index, %err, "parallel sub-chain failed to start");
            }
            next();
        }
        StepKind::SubAnimation { run } => {
            (run.borrow_mut())(Resume { go: next }, ctx.clone());
        }
        StepKind::Immediately => next(),
    }
}

/// Suspend on a bare span and run `done` when it elapses. Used for the
/// pre-roll delay of a delayed start.
pub(crate) fn suspend_then(
    scheduler: &Scheduler,
    runner: &Runner,
    span: Span,
    kind: TimeKind,
    done: impl FnOnce() + 'static,
) {
    spawn(
        scheduler,
        runner,
        StepExec::Wait(WaitExec::new(span, kind)),
        Box::new(done),
    );
}

fn spawn(scheduler: &Scheduler, runner: &Runner, exec: StepExec, done: Box<dyn FnOnce()>) {
    let id = scheduler.spawn(exec, done);
    // Registered before launch so a synchronous completion can clear it.
    runner.set_active(id);
    scheduler.launch(id);
}

fn continuation(
    scheduler: &Scheduler,
    chain: &Rc<RefCell<ChainInner>>,
    runner: &Runner,
    ctx: &Context,
    index: usize,
    on_finished: Option<ContextAction>,
) -> Box<dyn FnOnce()> {
    let scheduler = scheduler.clone();
    let chain = chain.clone();
    let runner = runner.clone();
    let ctx = ctx.clone();
    Box::new(move || {
        runner.clear_active();
        if let Some(cb) = &on_finished {
            (cb.borrow_mut())(&ctx);
        }
        // Cancellation is observed here, at the step boundary: the step's
        // own callback has run, the chain goes no further.
        if runner.is_stopped() {
            trace!(index, "chain halted at step boundary");
            return;
        }
        run_from(&scheduler, &chain, &runner, &ctx, index + 1);
    })
}
