// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves and the curve bank the engine samples from.

use animseq::{CurveEvaluator, CurveId};
use indexmap::IndexMap;
use tracing::warn;

/// Easing function shapes
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    /// Identity: progress in, progress out
    #[default]
    Linear,
    /// Cubic ease-in
    EaseIn,
    /// Cubic ease-out
    EaseOut,
    /// Cubic ease-in-out
    EaseInOut,
    /// Fixed value regardless of progress
    Constant(f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Constant(v) => *v,
        }
    }
}

/// Registry mapping opaque curve ids to easing functions.
///
/// Built once at startup, then handed to the scheduler as its
/// [`CurveEvaluator`].
#[derive(Debug, Default)]
pub struct CurveBank {
    curves: IndexMap<CurveId, Easing>,
}

impl CurveBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an easing function, returning its id
    pub fn register(&mut self, easing: Easing) -> CurveId {
        let id = CurveId::new();
        self.curves.insert(id, easing);
        id
    }

    /// Number of registered curves
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether no curves are registered
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl CurveEvaluator for CurveBank {
    fn evaluate(&self, curve: CurveId, t: f32) -> f32 {
        match self.curves.get(&curve) {
            Some(easing) => easing.apply(t),
            None => {
                warn!(?curve, "unknown curve id, passing progress through");
                t
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert!(easing.apply(0.0).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert_eq!(Easing::Constant(0.25).apply(0.9), 0.25);
    }

    #[test]
    fn test_bank_evaluates_registered_curve() {
        let mut bank = CurveBank::new();
        let id = bank.register(Easing::EaseIn);
        assert_eq!(bank.evaluate(id, 0.5), 0.125);
    }

    #[test]
    fn test_unknown_curve_passes_through() {
        let bank = CurveBank::new();
        assert_eq!(bank.evaluate(CurveId::new(), 0.7), 0.7);
    }
}
