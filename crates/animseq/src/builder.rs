// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fluent chain construction.
//!
//! A [`Builder`] accumulates steps in order; `start` hands the finished
//! chain to the sequencer. The builder stays usable afterwards: once an
//! execution completes or is stopped, the same chain can be started again.

use crate::clock::{Span, TimeKind};
use crate::context::Context;
use crate::curve::CurveId;
use crate::runner::Runner;
use crate::scheduler::Scheduler;
use crate::sequencer::{self, Resume};
use crate::step::{context_action, ContextAction, Step, StepKind};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Why a chain could not be started.
///
/// Both cases are programming errors on the caller's side, surfaced
/// synchronously rather than deferred to a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// The chain has no steps
    #[error("chain has no steps")]
    Empty,
    /// A previous execution of this chain is still running
    #[error("chain is already running")]
    AlreadyRunning,
}

pub(crate) struct ChainInner {
    pub kind: TimeKind,
    pub steps: Vec<Step>,
    pub finisher: Option<ContextAction>,
    pub running: bool,
}

/// Accumulates an ordered sequence of steps and starts executions of them.
pub struct Builder {
    scheduler: Scheduler,
    inner: Rc<RefCell<ChainInner>>,
}

impl Builder {
    /// Create an empty chain on the given scheduler and clock kind
    pub fn new(scheduler: &Scheduler, kind: TimeKind) -> Self {
        Self {
            scheduler: scheduler.clone(),
            inner: Rc::new(RefCell::new(ChainInner {
                kind,
                steps: Vec::new(),
                finisher: None,
                running: false,
            })),
        }
    }

    fn push(self, kind: StepKind) -> Self {
        self.inner.borrow_mut().steps.push(Step {
            kind,
            on_finished: None,
        });
        self
    }

    /// Suspend for a span (seconds on the chain's clock, or whole ticks)
    pub fn wait(self, span: Span) -> Self {
        self.push(StepKind::Wait(span))
    }

    /// Suspend until the chain's clock has advanced `seconds`
    pub fn wait_seconds(self, seconds: f32) -> Self {
        self.wait(Span::Seconds(seconds))
    }

    /// Suspend for exactly `frames` scheduler ticks
    pub fn wait_frames(self, frames: u32) -> Self {
        self.wait(Span::Frames(frames))
    }

    /// Drive `handler` with one curve sampled over `speed` seconds of the
    /// chain's clock
    pub fn animate(
        self,
        curve: CurveId,
        speed: f32,
        mut handler: impl FnMut(f32, &Context) + 'static,
    ) -> Self {
        self.animate_curves(vec![curve], speed, false, move |values, ctx| {
            handler(values[0], ctx);
        })
    }

    /// Drive `handler` with every curve sampled at the shared progress,
    /// optionally running the progress from 1 down to 0
    pub fn animate_curves(
        self,
        curves: Vec<CurveId>,
        speed: f32,
        invert: bool,
        handler: impl FnMut(&[f32], &Context) + 'static,
    ) -> Self {
        self.push(StepKind::Animate {
            curves,
            speed,
            invert,
            handler: Rc::new(RefCell::new(handler)),
        })
    }

    /// Drive `handler` with the raw normalized progress over `duration`
    /// seconds, no curve sampling
    pub fn animate_constant(
        self,
        duration: f32,
        handler: impl FnMut(f32, &Context) + 'static,
    ) -> Self {
        self.push(StepKind::AnimateConstant {
            duration,
            handler: Rc::new(RefCell::new(handler)),
        })
    }

    /// Invoke each action in order, one spacing suspension after every
    /// invocation including the last
    pub fn run_all(
        self,
        spacing: Span,
        actions: impl IntoIterator<Item = Box<dyn FnMut(&Context)>>,
    ) -> Self {
        let actions: Vec<ContextAction> = actions
            .into_iter()
            .map(|action| Rc::new(RefCell::new(action)) as ContextAction)
            .collect();
        self.push(StepKind::RunAll { spacing, actions })
    }

    /// Invoke `action` with indices `0..repeat` (reversed when `inverted`),
    /// one spacing suspension after every invocation
    pub fn run_repeated(
        self,
        spacing: Span,
        repeat: u32,
        inverted: bool,
        action: impl FnMut(u32, &Context) + 'static,
    ) -> Self {
        self.push(StepKind::RunRepeated {
            spacing,
            repeat,
            inverted,
            action: Rc::new(RefCell::new(action)),
        })
    }

    /// Build and start a nested chain sharing this execution's context,
    /// then advance immediately; parent and sub-chain run concurrently.
    ///
    /// A `build` closure that returns an empty (or already running) chain
    /// is a programming error: it is logged at error level and the parent
    /// advances without starting anything.
    pub fn parallel(self, build: impl FnMut(Builder) -> Builder + 'static) -> Self {
        self.push(StepKind::Parallel {
            build: Rc::new(RefCell::new(build)),
        })
    }

    /// Hand control to the caller; the chain advances only when the given
    /// [`Resume`] is consumed. A resume that is never called stalls the
    /// chain forever.
    pub fn sub_animation(self, run: impl FnMut(Resume, Context) + 'static) -> Self {
        self.push(StepKind::SubAnimation {
            run: Rc::new(RefCell::new(run)),
        })
    }

    /// Run `on_finished` synchronously and advance without yielding a tick
    pub fn immediately(self, on_finished: impl FnMut(&Context) + 'static) -> Self {
        self.inner.borrow_mut().steps.push(Step {
            kind: StepKind::Immediately,
            on_finished: Some(context_action(on_finished)),
        });
        self
    }

    /// Attach `on_finished` to the most recently appended step, replacing
    /// any previous one. Ignored (with a warning) on an empty chain.
    pub fn then(self, on_finished: impl FnMut(&Context) + 'static) -> Self {
        match self.inner.borrow_mut().steps.last_mut() {
            Some(step) => step.on_finished = Some(context_action(on_finished)),
            None => warn!("then() called before any step was appended"),
        }
        self
    }

    /// Set the chain-level finisher, replacing any previous one. It receives
    /// the context after the last step's own `on_finished`.
    pub fn with_finisher(self, on_finished: impl FnMut(&Context) + 'static) -> Self {
        self.inner.borrow_mut().finisher = Some(context_action(on_finished));
        self
    }

    /// Whether an execution of this chain is currently running
    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    /// Number of appended steps
    pub fn len(&self) -> usize {
        self.inner.borrow().steps.len()
    }

    /// Whether no steps have been appended
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().steps.is_empty()
    }

    /// Start executing the chain with a fresh context
    pub fn start(&self) -> Result<Runner, StartError> {
        self.start_with(Context::new())
    }

    /// Start after a pre-roll delay of `seconds` on the scaled clock.
    ///
    /// If the runner is stopped during the delay the chain never begins.
    pub fn start_delayed(&self, seconds: f32) -> Result<Runner, StartError> {
        self.start_delayed_inner(seconds, None)
    }

    /// Like [`Builder::start_delayed`], with a callback fired once after the
    /// delay, before the first step
    pub fn start_delayed_with(
        &self,
        seconds: f32,
        on_delay: impl FnMut(&Context) + 'static,
    ) -> Result<Runner, StartError> {
        self.start_delayed_inner(seconds, Some(context_action(on_delay)))
    }

    /// Start with an externally supplied context (sub-chains share their
    /// parent's this way)
    pub(crate) fn start_with(&self, ctx: Context) -> Result<Runner, StartError> {
        let runner = self.begin()?;
        sequencer::run_from(&self.scheduler, &self.inner, &runner, &ctx, 0);
        Ok(runner)
    }

    fn start_delayed_inner(
        &self,
        seconds: f32,
        on_delay: Option<ContextAction>,
    ) -> Result<Runner, StartError> {
        let runner = self.begin()?;
        let ctx = Context::new();
        // The pre-roll always runs on the scaled clock, whatever clock the
        // chain itself uses.
        sequencer::suspend_then(
            &self.scheduler,
            &runner,
            Span::Seconds(seconds),
            TimeKind::Scaled,
            {
                let scheduler = self.scheduler.clone();
                let chain = self.inner.clone();
                let runner = runner.clone();
                let ctx = ctx.clone();
                move || {
                    runner.clear_active();
                    if let Some(cb) = &on_delay {
                        (cb.borrow_mut())(&ctx);
                    }
                    if runner.is_stopped() {
                        return;
                    }
                    sequencer::run_from(&scheduler, &chain, &runner, &ctx, 0);
                }
            },
        );
        Ok(runner)
    }

    fn begin(&self) -> Result<Runner, StartError> {
        {
            let inner = self.inner.borrow();
            if inner.steps.is_empty() {
                return Err(StartError::Empty);
            }
            if inner.running {
                return Err(StartError::AlreadyRunning);
            }
        }
        self.inner.borrow_mut().running = true;
        debug!(steps = self.len(), "starting chain");
        Ok(Runner::new(self.scheduler.clone(), &self.inner))
    }
}
