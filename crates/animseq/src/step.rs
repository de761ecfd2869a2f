// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed set of step variants a chain is built from.

use crate::builder::Builder;
use crate::clock::Span;
use crate::context::Context;
use crate::curve::CurveId;
use crate::sequencer::Resume;
use std::cell::RefCell;
use std::rc::Rc;

// Callbacks are shared mutable closures so a finished chain can be started
// again without rebuilding its steps.
pub(crate) type ValuesHandler = Rc<RefCell<dyn FnMut(&[f32], &Context)>>;
pub(crate) type ProgressHandler = Rc<RefCell<dyn FnMut(f32, &Context)>>;
pub(crate) type ContextAction = Rc<RefCell<dyn FnMut(&Context)>>;
pub(crate) type IndexedAction = Rc<RefCell<dyn FnMut(u32, &Context)>>;
pub(crate) type BuildFn = Rc<RefCell<dyn FnMut(Builder) -> Builder>>;
pub(crate) type SubRunFn = Rc<RefCell<dyn FnMut(Resume, Context)>>;

pub(crate) fn context_action(f: impl FnMut(&Context) + 'static) -> ContextAction {
    Rc::new(RefCell::new(f))
}

/// One unit of chain work plus its optional completion callback.
#[derive(Clone)]
pub(crate) struct Step {
    pub kind: StepKind,
    pub on_finished: Option<ContextAction>,
}

/// The step variants. The sequencer matches over this exhaustively; adding
/// a variant is a compile error until every dispatch site handles it.
#[derive(Clone)]
pub(crate) enum StepKind {
    Wait(Span),
    Animate {
        curves: Vec<CurveId>,
        speed: f32,
        invert: bool,
        handler: ValuesHandler,
    },
    AnimateConstant {
        duration: f32,
        handler: ProgressHandler,
    },
    RunAll {
        spacing: Span,
        actions: Vec<ContextAction>,
    },
    RunRepeated {
        spacing: Span,
        repeat: u32,
        inverted: bool,
        action: IndexedAction,
    },
    Parallel {
        build: BuildFn,
    },
    SubAnimation {
        run: SubRunFn,
    },
    Immediately,
}

impl StepKind {
    /// Variant name for log lines
    pub(crate) fn name(&self) -> &'static str {
        match self {
            StepKind::Wait(Span::Seconds(_)) => "wait-seconds",
            StepKind::Wait(Span::Frames(_)) => "wait-frames",
            StepKind::Animate { .. } => "animate",
            StepKind::AnimateConstant { .. } => "animate-constant",
            StepKind::RunAll { .. } => "run-all",
            StepKind::RunRepeated { .. } => "run-repeated",
            StepKind::Parallel { .. } => "parallel",
            StepKind::SubAnimation { .. } => "sub-animation",
            StepKind::Immediately => "immediately",
        }
    }
}
