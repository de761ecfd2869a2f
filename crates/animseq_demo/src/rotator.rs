// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rotation behavior: eases an object to a target heading.

use crate::curves::{CurveBank, Easing};
use crate::Target;
use animseq::{Builder, CurveId, Scheduler, TimeKind};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Rotates a [`Target`] from its current heading to `target_deg` over
/// `speed` seconds, eased.
pub struct Rotator {
    curve: CurveId,
    speed: f32,
    target_deg: f32,
}

impl Rotator {
    /// Create a rotator, registering its easing curve in the bank
    pub fn new(bank: &mut CurveBank, speed: f32, target_deg: f32) -> Self {
        Self {
            curve: bank.register(Easing::EaseInOut),
            speed,
            target_deg,
        }
    }

    /// Build the rotation chain for `target`
    pub fn sequence(&self, scheduler: &Scheduler, target: Rc<RefCell<Target>>) -> Builder {
        let start_deg = target.borrow().rotation_deg;
        let sweep = self.target_deg - start_deg;
        let goal = self.target_deg;
        Builder::new(scheduler, TimeKind::Scaled)
            .animate(self.curve, self.speed, move |v, _| {
                target.borrow_mut().rotation_deg = start_deg + sweep * v;
            })
            .then(move |ctx| {
                ctx.set("rotated-to", goal);
                info!(degrees = goal, "rotation settled");
            })
    }
}
