// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step-chain animation sequencing.
//!
//! This crate provides declarative, cooperatively scheduled step chains:
//! - Timed waits (seconds on a scaled/unscaled clock, or whole ticks)
//! - Curve-driven and constant-progress animation steps
//! - Repeated and batched actions with configurable spacing
//! - Parallel sub-chains and externally driven sub-steps
//! - Cancellation via per-execution runner handles
//!
//! ## Architecture
//!
//! The engine is built on:
//! - A closed step variant set accumulated by a fluent [`Builder`]
//! - A sequencer state machine advancing one step per completion
//! - A single-threaded [`Scheduler`] the host ticks once per frame
//! - A shared [`Context`] key-value map threaded through every step
//!
//! Clock deltas and curve sampling come from the host: the driver feeds
//! [`Tick`] values into [`Scheduler::tick`] and injects a
//! [`CurveEvaluator`] at construction.
//!
//! ```
//! use animseq::{Builder, IdentityCurves, Scheduler, Tick, TimeKind};
//! use std::rc::Rc;
//!
//! let scheduler = Scheduler::new(Rc::new(IdentityCurves));
//! let chain = Builder::new(&scheduler, TimeKind::Scaled)
//!     .wait_seconds(0.5)
//!     .then(|ctx| ctx.set("waited", true))
//!     .with_finisher(|_| println!("done"));
//! let runner = chain.start()?;
//!
//! while scheduler.has_work() {
//!     scheduler.tick(Tick::uniform(1.0 / 60.0));
//! }
//! assert!(runner.is_finished());
//! # Ok::<(), animseq::StartError>(())
//! ```

pub mod builder;
pub mod clock;
pub mod context;
pub mod curve;
mod executor;
pub mod runner;
pub mod scheduler;
pub mod sequencer;
mod step;

pub use builder::{Builder, StartError};
pub use clock::{Span, Tick, TimeKind};
pub use context::{Context, Value};
pub use curve::{CurveEvaluator, CurveId, IdentityCurves};
pub use runner::Runner;
pub use scheduler::{Scheduler, TaskId};
pub use sequencer::Resume;
