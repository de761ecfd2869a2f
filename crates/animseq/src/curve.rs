// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve evaluation contract.
//!
//! The engine never does curve math itself. `Animate` steps carry opaque
//! [`CurveId`] tokens and the scheduler's injected [`CurveEvaluator`] turns
//! `(curve, progress)` into a sampled value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to a curve owned by the host's curve evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveId(pub Uuid);

impl CurveId {
    /// Create a new random curve ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CurveId {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples a curve at a normalized progress value.
///
/// Implementations must be pure functions of `(curve, t)` for `t` in
/// `[0, 1]`. A curve the evaluator does not know is the host's bug to
/// surface; the engine passes ids through untouched.
pub trait CurveEvaluator {
    /// Sample `curve` at progress `t` in `[0, 1]`
    fn evaluate(&self, curve: CurveId, t: f32) -> f32;
}

/// Evaluator that returns the progress value unchanged for every curve.
///
/// Useful for chains that carry no `Animate` steps and for deterministic
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCurves;

impl CurveEvaluator for IdentityCurves {
    fn evaluate(&self, _curve: CurveId, t: f32) -> f32 {
        t
    }
}
