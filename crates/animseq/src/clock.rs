// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time vocabulary for chains: clock kinds, per-tick deltas, wait spans.

use serde::{Deserialize, Serialize};

/// Which clock a chain runs on.
///
/// The scaled clock is subject to the host's global time-scale factor
/// (slow motion, pause); the unscaled clock is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeKind {
    /// Time-scale factor applies
    #[default]
    Scaled,
    /// Wall-clock time, ignores the time-scale factor
    Unscaled,
}

/// Elapsed time for one scheduler tick, in both clock flavors.
///
/// The driver constructs one `Tick` per scheduling turn. Deltas are clamped
/// to be non-negative; the clock contract forbids time running backwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    scaled: f32,
    unscaled: f32,
}

impl Tick {
    /// A tick during which no time passed
    pub const ZERO: Tick = Tick {
        scaled: 0.0,
        unscaled: 0.0,
    };

    /// Create a tick from scaled and unscaled elapsed seconds
    pub fn new(scaled: f32, unscaled: f32) -> Self {
        Self {
            scaled: scaled.max(0.0),
            unscaled: unscaled.max(0.0),
        }
    }

    /// Create a tick where both clocks advanced by the same amount
    /// (time-scale factor of 1)
    pub fn uniform(delta: f32) -> Self {
        Self::new(delta, delta)
    }

    /// Elapsed seconds for the given clock kind
    pub fn delta(&self, kind: TimeKind) -> f32 {
        match kind {
            TimeKind::Scaled => self.scaled,
            TimeKind::Unscaled => self.unscaled,
        }
    }
}

/// A suspension length: wall-clock seconds or whole scheduler ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Span {
    /// Suspend until the chain's clock has advanced at least this many seconds
    Seconds(f32),
    /// Suspend for exactly this many scheduler ticks
    Frames(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_selects_kind() {
        let tick = Tick::new(0.5, 1.0);
        assert_eq!(tick.delta(TimeKind::Scaled), 0.5);
        assert_eq!(tick.delta(TimeKind::Unscaled), 1.0);
    }

    #[test]
    fn test_tick_clamps_negative_deltas() {
        let tick = Tick::new(-0.1, -2.0);
        assert_eq!(tick.delta(TimeKind::Scaled), 0.0);
        assert_eq!(tick.delta(TimeKind::Unscaled), 0.0);
    }
}
