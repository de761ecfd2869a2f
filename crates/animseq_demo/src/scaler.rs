// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scale behavior: pulses an object between two sizes.

use crate::curves::{CurveBank, Easing};
use crate::Target;
use animseq::{Builder, Context, CurveId};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Pulses a [`Target`]'s scale from `from` up to `to` and back, eased.
pub struct Scaler {
    curve: CurveId,
    speed: f32,
    from: f32,
    to: f32,
}

impl Scaler {
    /// Create a scaler, registering its easing curve in the bank
    pub fn new(bank: &mut CurveBank, speed: f32, from: f32, to: f32) -> Self {
        Self {
            curve: bank.register(Easing::EaseInOut),
            speed,
            from,
            to,
        }
    }

    /// Append the scale pulse to an existing chain.
    ///
    /// Runs as two animate steps: eased up, then the same curve with
    /// inverted progress back down.
    pub fn attach(&self, chain: Builder, target: Rc<RefCell<Target>>) -> Builder {
        let (from, to) = (self.from, self.to);
        let up = target.clone();
        let down = target;
        let apply = move |target: &Rc<RefCell<Target>>, v: f32| {
            target.borrow_mut().scale = from + (to - from) * v;
        };
        let apply_down = apply.clone();
        chain
            .animate_curves(vec![self.curve], self.speed, false, move |values, _| {
                apply(&up, values[0]);
            })
            .animate_curves(vec![self.curve], self.speed, true, move |values, _| {
                apply_down(&down, values[0]);
            })
            .then(|ctx: &Context| {
                ctx.set("scale-pulsed", true);
                info!("scale pulse finished");
            })
    }
}
