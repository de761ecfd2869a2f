// SPDX-License-Identifier: MIT OR Apache-2.0
//! animseq showcase.
//!
//! Drives the sequencing engine with a fixed-tick loop: a pre-roll wait, an
//! inverted countdown, a parallel scale pulse, and an eased rotation run as
//! an externally driven sub-step. The tick rate, time-scale factor, and
//! simulation cap are CLI flags.

mod curves;
mod rotator;
mod scaler;

use animseq::{Builder, Scheduler, Span, Tick, TimeKind};
use clap::Parser;
use curves::CurveBank;
use rotator::Rotator;
use scaler::Scaler;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// Transform state the demo behaviors mutate
#[derive(Debug, Clone, Copy)]
pub struct Target {
    /// Heading in degrees
    pub rotation_deg: f32,
    /// Uniform scale factor
    pub scale: f32,
}

#[derive(Parser, Debug)]
#[command(name = "animseq_demo", about = "Showcase driver for the animseq engine")]
struct Args {
    /// Fixed tick rate of the driver loop
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Factor applied to the scaled clock (1.0 = real time, 0.0 = paused)
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,

    /// Hard cap on simulated unscaled seconds
    #[arg(long, default_value_t = 12.0)]
    max_seconds: f32,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,animseq=debug".into()),
        )
        .init();

    let mut bank = CurveBank::new();
    let rotator = Rotator::new(&mut bank, 2.0, 180.0);
    let scaler = Scaler::new(&mut bank, 1.0, 1.0, 2.0);
    info!(curves = bank.len(), "curve bank ready");

    let scheduler = Scheduler::new(Rc::new(bank));
    let target = Rc::new(RefCell::new(Target {
        rotation_deg: 0.0,
        scale: 1.0,
    }));

    let chain = showcase_chain(&scheduler, rotator, scaler, target.clone());
    let runner = match chain.start() {
        Ok(runner) => runner,
        Err(err) => {
            error!(%err, "could not start showcase chain");
            return;
        }
    };

    let dt = 1.0 / args.fps as f32;
    let mut ticks = 0u32;
    while scheduler.has_work() && (ticks as f32) * dt < args.max_seconds {
        scheduler.tick(Tick::new(dt * args.time_scale, dt));
        ticks += 1;
        if ticks % args.fps == 0 {
            let t = target.borrow();
            debug!(
                second = ticks / args.fps,
                rotation_deg = t.rotation_deg,
                scale = t.scale,
                "tick"
            );
        }
    }

    if runner.is_running() {
        warn!("simulation cap reached before the chain finished");
        runner.stop();
    }
    let t = target.borrow();
    info!(
        ticks,
        rotation_deg = t.rotation_deg,
        scale = t.scale,
        "simulation ended"
    );
}

/// Pre-roll, countdown, parallel scale pulse, then the rotation as an
/// externally driven sub-step.
fn showcase_chain(
    scheduler: &Scheduler,
    rotator: Rotator,
    scaler: Scaler,
    target: Rc<RefCell<Target>>,
) -> Builder {
    let scale_target = target.clone();
    let rotation_scheduler = scheduler.clone();

    Builder::new(scheduler, TimeKind::Scaled)
        .wait_seconds(0.25)
        .then(|_| info!("pre-roll over"))
        .run_repeated(Span::Seconds(0.2), 3, true, |i, _| {
            info!(countdown = i + 1, "starting soon");
        })
        .parallel(move |sub| scaler.attach(sub, scale_target.clone()))
        .sub_animation(move |resume, _ctx| {
            // The rotation runs as its own chain; its finisher resumes the
            // parent.
            let resume = Rc::new(RefCell::new(Some(resume)));
            let rotation = rotator
                .sequence(&rotation_scheduler, target.clone())
                .with_finisher(move |_| {
                    if let Some(resume) = resume.borrow_mut().take() {
                        resume.resume();
                    }
                });
            if let Err(err) = rotation.start() {
                warn!(%err, "rotation chain failed to start");
            }
        })
        .with_finisher(|ctx| {
            info!(
                rotated = ctx.contains("rotated-to"),
                pulsed = ctx.contains("scale-pulsed"),
                "showcase complete"
            );
        })
}
