// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-step executors.
//!
//! Each executor is a small state machine resumed once per scheduler tick.
//! The first resume happens synchronously when the task is launched, with a
//! zero delta; executors use it to emit their initial values or to complete
//! outright when they have no work (zero frames, zero repeats, no actions).

use crate::clock::{Span, Tick, TimeKind};
use crate::context::Context;
use crate::curve::{CurveEvaluator, CurveId};
use crate::step::{ContextAction, IndexedAction, ProgressHandler, ValuesHandler};

/// Result of resuming an executor for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    /// Still suspended; resume again next tick
    Pending,
    /// Step work complete; run the completion continuation
    Done,
}

/// Countdown over a [`Span`] on a chain's clock kind.
pub(crate) enum WaitState {
    Seconds { kind: TimeKind, remaining: f32 },
    Frames { remaining: u32 },
}

impl WaitState {
    pub(crate) fn new(span: Span, kind: TimeKind) -> Self {
        match span {
            Span::Seconds(seconds) => WaitState::Seconds {
                kind,
                remaining: seconds,
            },
            Span::Frames(frames) => WaitState::Frames { remaining: frames },
        }
    }

    /// Advance by one tick; true when the span has fully elapsed
    pub(crate) fn advance(&mut self, tick: Tick) -> bool {
        match self {
            WaitState::Seconds { kind, remaining } => {
                *remaining -= tick.delta(*kind);
                *remaining <= 0.0
            }
            WaitState::Frames { remaining } => {
                if *remaining == 0 {
                    return true;
                }
                *remaining -= 1;
                *remaining == 0
            }
        }
    }

    /// A zero-frame span elapses without consuming any tick
    fn instant(&self) -> bool {
        matches!(self, WaitState::Frames { remaining: 0 })
    }
}

/// Executor state for one dispatched step
pub(crate) enum StepExec {
    Wait(WaitExec),
    Animate(AnimateExec),
    AnimateConstant(AnimateConstantExec),
    RunAll(RunAllExec),
    RunRepeated(RunRepeatedExec),
}

impl StepExec {
    pub(crate) fn resume(&mut self, tick: Tick, curves: &dyn CurveEvaluator) -> Status {
        match self {
            StepExec::Wait(exec) => exec.resume(tick),
            StepExec::Animate(exec) => exec.resume(tick, curves),
            StepExec::AnimateConstant(exec) => exec.resume(tick),
            StepExec::RunAll(exec) => exec.resume(tick),
            StepExec::RunRepeated(exec) => exec.resume(tick),
        }
    }
}

/// `Wait`: suspend for a span, nothing else.
pub(crate) struct WaitExec {
    state: WaitState,
    started: bool,
}

impl WaitExec {
    pub(crate) fn new(span: Span, kind: TimeKind) -> Self {
        Self {
            state: WaitState::new(span, kind),
            started: false,
        }
    }

    fn resume(&mut self, tick: Tick) -> Status {
        if !self.started {
            self.started = true;
            // Zero-frame waits have nothing to suspend on.
            if self.state.instant() {
                return Status::Done;
            }
            return Status::Pending;
        }
        if self.state.advance(tick) {
            Status::Done
        } else {
            Status::Pending
        }
    }
}

/// `Animate`: accumulate elapsed time toward `speed`, sampling every curve
/// at the (optionally inverted) progress each tick. The terminal emission
/// always samples the curves at exactly 1.0, whatever the tick rounding did.
pub(crate) struct AnimateExec {
    curves: Vec<CurveId>,
    speed: f32,
    invert: bool,
    handler: ValuesHandler,
    ctx: Context,
    kind: TimeKind,
    elapsed: f32,
    started: bool,
}

impl AnimateExec {
    pub(crate) fn new(
        curves: Vec<CurveId>,
        speed: f32,
        invert: bool,
        handler: ValuesHandler,
        ctx: Context,
        kind: TimeKind,
    ) -> Self {
        Self {
            curves,
            speed,
            invert,
            handler,
            ctx,
            kind,
            elapsed: 0.0,
            started: false,
        }
    }

    fn resume(&mut self, tick: Tick, curves: &dyn CurveEvaluator) -> Status {
        if self.started {
            self.elapsed += tick.delta(self.kind);
        } else {
            self.started = true;
        }

        if self.elapsed < self.speed {
            let progress = self.elapsed / self.speed;
            let t = if self.invert { 1.0 - progress } else { progress };
            let values: Vec<f32> = self.curves.iter().map(|c| curves.evaluate(*c, t)).collect();
            (self.handler.borrow_mut())(&values, &self.ctx);
            Status::Pending
        } else {
            let values: Vec<f32> = self
                .curves
                .iter()
                .map(|c| curves.evaluate(*c, 1.0))
                .collect();
            (self.handler.borrow_mut())(&values, &self.ctx);
            Status::Done
        }
    }
}

/// `AnimateConstant`: like `Animate` but emits the raw normalized progress,
/// no curve sampling.
pub(crate) struct AnimateConstantExec {
    duration: f32,
    handler: ProgressHandler,
    ctx: Context,
    kind: TimeKind,
    elapsed: f32,
    started: bool,
}

impl AnimateConstantExec {
    pub(crate) fn new(duration: f32, handler: ProgressHandler, ctx: Context, kind: TimeKind) -> Self {
        Self {
            duration,
            handler,
            ctx,
            kind,
            elapsed: 0.0,
            started: false,
        }
    }

    fn resume(&mut self, tick: Tick) -> Status {
        if self.started {
            self.elapsed += tick.delta(self.kind);
        } else {
            self.started = true;
        }

        if self.elapsed < self.duration {
            let progress = self.elapsed / self.duration;
            (self.handler.borrow_mut())(progress, &self.ctx);
            Status::Pending
        } else {
            (self.handler.borrow_mut())(1.0, &self.ctx);
            Status::Done
        }
    }
}

/// `RunAll`: invoke each action strictly left-to-right, one spacing
/// suspension after every invocation including the last.
pub(crate) struct RunAllExec {
    spacing: Span,
    actions: Vec<ContextAction>,
    ctx: Context,
    kind: TimeKind,
    next: usize,
    wait: WaitState,
    started: bool,
}

impl RunAllExec {
    pub(crate) fn new(spacing: Span, actions: Vec<ContextAction>, ctx: Context, kind: TimeKind) -> Self {
        let wait = WaitState::new(spacing, kind);
        Self {
            spacing,
            actions,
            ctx,
            kind,
            next: 0,
            wait,
            started: false,
        }
    }

    fn resume(&mut self, tick: Tick) -> Status {
        if !self.started {
            self.started = true;
            return self.fire();
        }
        if self.wait.advance(tick) {
            self.fire()
        } else {
            Status::Pending
        }
    }

    /// Invoke the next action(s); zero-frame spacing collapses into one slice
    fn fire(&mut self) -> Status {
        loop {
            if self.next >= self.actions.len() {
                return Status::Done;
            }
            let action = self.actions[self.next].clone();
            (action.borrow_mut())(&self.ctx);
            self.next += 1;
            self.wait = WaitState::new(self.spacing, self.kind);
            if !self.wait.instant() {
                return Status::Pending;
            }
        }
    }
}

/// `RunRepeated`: invoke one action with indices `0..repeat`, or reversed
/// when inverted, one spacing suspension after every invocation.
pub(crate) struct RunRepeatedExec {
    spacing: Span,
    repeat: u32,
    inverted: bool,
    action: IndexedAction,
    ctx: Context,
    kind: TimeKind,
    emitted: u32,
    wait: WaitState,
    started: bool,
}

impl RunRepeatedExec {
    pub(crate) fn new(
        spacing: Span,
        repeat: u32,
        inverted: bool,
        action: IndexedAction,
        ctx: Context,
        kind: TimeKind,
    ) -> Self {
        let wait = WaitState::new(spacing, kind);
        Self {
            spacing,
            repeat,
            inverted,
            action,
            ctx,
            kind,
            emitted: 0,
            wait,
            started: false,
        }
    }

    fn resume(&mut self, tick: Tick) -> Status {
        if !self.started {
            self.started = true;
            return self.fire();
        }
        if self.wait.advance(tick) {
            self.fire()
        } else {
            Status::Pending
        }
    }

    fn fire(&mut self) -> Status {
        loop {
            if self.emitted >= self.repeat {
                return Status::Done;
            }
            let index = if self.inverted {
                self.repeat - 1 - self.emitted
            } else {
                self.emitted
            };
            (self.action.borrow_mut())(index, &self.ctx);
            self.emitted += 1;
            self.wait = WaitState::new(self.spacing, self.kind);
            if !self.wait.instant() {
                return Status::Pending;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::IdentityCurves;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tick(dt: f32) -> Tick {
        Tick::uniform(dt)
    }

    #[test]
    fn test_wait_seconds_counts_down_on_selected_clock() {
        let mut exec = WaitExec::new(Span::Seconds(0.5), TimeKind::Unscaled);
        assert_eq!(exec.resume(Tick::ZERO), Status::Pending);
        // Scaled clock frozen; unscaled keeps moving.
        assert_eq!(exec.resume(Tick::new(0.0, 0.3)), Status::Pending);
        assert_eq!(exec.resume(Tick::new(0.0, 0.3)), Status::Done);
    }

    #[test]
    fn test_wait_frames_takes_exact_tick_count() {
        let mut exec = WaitExec::new(Span::Frames(3), TimeKind::Scaled);
        assert_eq!(exec.resume(Tick::ZERO), Status::Pending);
        assert_eq!(exec.resume(tick(1.0)), Status::Pending);
        assert_eq!(exec.resume(tick(1.0)), Status::Pending);
        assert_eq!(exec.resume(tick(1.0)), Status::Done);
    }

    #[test]
    fn test_wait_zero_frames_completes_at_launch() {
        let mut exec = WaitExec::new(Span::Frames(0), TimeKind::Scaled);
        assert_eq!(exec.resume(Tick::ZERO), Status::Done);
    }

    #[test]
    fn test_animate_ends_with_terminal_sample() {
        let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handler: crate::step::ValuesHandler =
            Rc::new(RefCell::new(move |values: &[f32], _ctx: &Context| {
                sink.borrow_mut().push(values[0]);
            }));
        let mut exec = AnimateExec::new(
            vec![CurveId::new()],
            1.0,
            false,
            handler,
            Context::new(),
            TimeKind::Scaled,
        );

        let mut status = exec.resume(Tick::ZERO, &IdentityCurves);
        // 0.4s ticks overshoot the 1.0s speed; terminal emission must still
        // land exactly on 1.0.
        while status == Status::Pending {
            status = exec.resume(tick(0.4), &IdentityCurves);
        }
        let seen = seen.borrow();
        assert_eq!(seen.first(), Some(&0.0));
        assert_eq!(seen.last(), Some(&1.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_animate_inverted_runs_backwards_then_terminal() {
        let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handler: crate::step::ValuesHandler =
            Rc::new(RefCell::new(move |values: &[f32], _ctx: &Context| {
                sink.borrow_mut().push(values[0]);
            }));
        let mut exec = AnimateExec::new(
            vec![CurveId::new()],
            1.0,
            true,
            handler,
            Context::new(),
            TimeKind::Scaled,
        );

        let mut status = exec.resume(Tick::ZERO, &IdentityCurves);
        while status == Status::Pending {
            status = exec.resume(tick(0.25), &IdentityCurves);
        }
        let seen = seen.borrow();
        assert_eq!(seen.first(), Some(&1.0));
        // Loop samples descend; the forced terminal sample is taken at 1.0.
        assert_eq!(seen.last(), Some(&1.0));
        assert!(seen[..seen.len() - 1].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_animate_zero_speed_emits_only_terminal() {
        let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handler: crate::step::ValuesHandler =
            Rc::new(RefCell::new(move |values: &[f32], _ctx: &Context| {
                sink.borrow_mut().push(values[0]);
            }));
        let mut exec = AnimateExec::new(
            vec![CurveId::new()],
            0.0,
            false,
            handler,
            Context::new(),
            TimeKind::Scaled,
        );
        assert_eq!(exec.resume(Tick::ZERO, &IdentityCurves), Status::Done);
        assert_eq!(*seen.borrow(), vec![1.0]);
    }

    #[test]
    fn test_animate_constant_emits_raw_progress_then_terminal() {
        let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handler: crate::step::ProgressHandler =
            Rc::new(RefCell::new(move |progress: f32, _ctx: &Context| {
                sink.borrow_mut().push(progress);
            }));
        let mut exec =
            AnimateConstantExec::new(1.0, handler, Context::new(), TimeKind::Scaled);

        let mut status = exec.resume(Tick::ZERO);
        // 0.4s ticks overshoot the 1.0s duration; the raw progress stream
        // must still end exactly at 1.0.
        while status == Status::Pending {
            status = exec.resume(tick(0.4));
        }
        let seen = seen.borrow();
        assert_eq!(*seen, vec![0.0, 0.4, 0.8, 1.0]);
    }

    #[test]
    fn test_animate_constant_zero_duration_emits_only_terminal() {
        let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handler: crate::step::ProgressHandler =
            Rc::new(RefCell::new(move |progress: f32, _ctx: &Context| {
                sink.borrow_mut().push(progress);
            }));
        let mut exec =
            AnimateConstantExec::new(0.0, handler, Context::new(), TimeKind::Scaled);
        assert_eq!(exec.resume(Tick::ZERO), Status::Done);
        assert_eq!(*seen.borrow(), vec![1.0]);
    }

    #[test]
    fn test_run_repeated_inverted_indices() {
        let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let action: IndexedAction = Rc::new(RefCell::new(move |i: u32, _ctx: &Context| {
            sink.borrow_mut().push(i);
        }));
        let mut exec = RunRepeatedExec::new(
            Span::Frames(1),
            3,
            true,
            action,
            Context::new(),
            TimeKind::Scaled,
        );

        let mut status = exec.resume(Tick::ZERO);
        while status == Status::Pending {
            status = exec.resume(tick(1.0));
        }
        assert_eq!(*seen.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_run_repeated_zero_count_completes_at_launch() {
        let action: IndexedAction = Rc::new(RefCell::new(|_: u32, _: &Context| {
            panic!("action must not run");
        }));
        let mut exec = RunRepeatedExec::new(
            Span::Seconds(1.0),
            0,
            false,
            action,
            Context::new(),
            TimeKind::Scaled,
        );
        assert_eq!(exec.resume(Tick::ZERO), Status::Done);
    }
}
