// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The work scheduler.  It owns the viewport, turns it into batches of
//! work, and throws everything away and starts again whenever the
//! viewport changes.
//!
//! A change is applied in four steps: queued work is drained, unread
//! results are drained, the generation token is advanced, and a fresh
//! plan is made.  Draining keeps the queues from filling up with
//! useless work; the token is what actually keeps stale results off
//! the screen, because a worker may still be halfway through an old
//! batch when the drain happens.  The sink checks every batch's token
//! against the live one before painting it.

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, Select, Sender, TrySendError};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Config, RedrawMode};
use crate::control::{Control, ViewportCommand};
use crate::planes::{Pixel, Viewport};
use crate::signal::{Generation, Progress, Shutdown};
use crate::work::{generate_work, PixelOrder, ResultBatch, WorkBatch, WorkPlan};

/// The scheduler's ends of the pipeline's channels.
#[derive(Debug)]
pub struct SchedulerPorts {
    /// Where batches go.
    pub work: Sender<WorkBatch>,
    /// The same queue, for draining work nobody has claimed yet.
    pub unclaimed: Receiver<WorkBatch>,
    /// The result queue, for draining results nobody has read yet.
    pub unread: Receiver<ResultBatch>,
    /// Viewport commands and recycled pixels.
    pub control: Receiver<Control>,
}

// What woke the scheduler up.
#[derive(Debug)]
enum Wake {
    Message(Control),
    Sent,
    Idle,
    Closed,
}

/// Owns the viewport and the current generation's plan.
#[derive(Debug)]
pub struct Scheduler {
    viewport: Viewport,
    dirty: bool,
    plan: WorkPlan,
    // Pixels already painted for the current generation (recycle mode).
    settled: Vec<Pixel>,
    batch_size: usize,
    order: PixelOrder,
    redraw: RedrawMode,
    idle_tick: Duration,
    rng: StdRng,
    generation: Generation,
    progress: Arc<Progress>,
}

impl Scheduler {
    /// A scheduler for the configured starting viewport.  It starts
    /// dirty, so the first pass of `run` schedules generation one.
    pub fn new(config: &Config, generation: Generation, progress: Arc<Progress>) -> Scheduler {
        let viewport = config.viewport();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // In recycle mode the one permutation made here is reused for
        // the life of the scheduler.
        let settled = match config.redraw {
            RedrawMode::Recycle => config.order.arrange(viewport.screen, &mut rng),
            RedrawMode::Reshuffle => Vec::new(),
        };
        Scheduler {
            viewport,
            dirty: true,
            plan: WorkPlan::empty(viewport, config.batch_size),
            settled,
            batch_size: config.batch_size,
            order: config.order,
            redraw: config.redraw,
            idle_tick: config.recv_timeout,
            rng,
            generation,
            progress,
        }
    }

    /// The viewport as it stands, including changes not yet scheduled.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// True if the viewport has changed since the last regeneration.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The plan currently being handed out.
    pub fn plan(&self) -> &WorkPlan {
        &self.plan
    }

    /// Center on the point under `pixel`.
    pub fn recenter(&mut self, pixel: Pixel) {
        let before = self.viewport.bounds;
        self.viewport.recenter(&pixel);
        if self.viewport.bounds == before {
            return;
        }
        self.dirty = true;
        let center = self.viewport.bounds.center();
        info!("Centered to: ({:.2e},{:.2e})", center.re, -center.im);
    }

    /// Zoom about the current center.  Refused factors leave the
    /// viewport, and the current generation, alone.
    pub fn rescale(&mut self, factor: f64) {
        if !self.viewport.rescale(factor) {
            warn!("Ignoring zoom factor {}: it would collapse the view", factor);
            return;
        }
        self.dirty = true;
        let b = &self.viewport.bounds;
        info!(
            "Zoomed to: (({:.2e},{:.2e}),({:.2e},{:.2e}))",
            b.x_min, b.x_max, b.y_min, b.y_max
        );
    }

    /// Center, then zoom.
    pub fn center_and_zoom(&mut self, pixel: Pixel, factor: f64) {
        self.recenter(pixel);
        self.rescale(factor);
    }

    /// Multiply the iteration cap, never going below two.  A cap that
    /// is already at its floor stays put and nothing is redrawn.
    pub fn set_depth_scale(&mut self, multiplier: f64) {
        let before = self.viewport.max_depth;
        self.viewport.set_depth_scale(multiplier);
        if self.viewport.max_depth == before {
            return;
        }
        self.dirty = true;
        info!("Depth changed to: {}", self.viewport.max_depth);
    }

    /// Apply one viewport command.
    pub fn apply(&mut self, command: ViewportCommand) {
        match command {
            ViewportCommand::CenterAndZoom { pixel, factor } => self.center_and_zoom(pixel, factor),
            ViewportCommand::Recenter(pixel) => self.recenter(pixel),
            ViewportCommand::Rescale(factor) => self.rescale(factor),
            ViewportCommand::ScaleDepth(multiplier) => self.set_depth_scale(multiplier),
        }
    }

    /// Take back pixels the sink is done with.  Pixels painted for the
    /// current generation are finished until the next change; the rest
    /// need computing again.
    pub fn recycle(&mut self, generation: u64, pixels: Vec<Pixel>) {
        if generation == self.plan.generation() {
            self.settled.extend(pixels);
        } else {
            self.plan.requeue_back(pixels);
        }
    }

    /// Throw away everything queued for the old viewport and plan a new
    /// generation.  Returns the new generation's token.
    pub fn invalidate_and_regenerate(&mut self, ports: &SchedulerPorts) -> u64 {
        let mut reclaimed: Vec<Pixel> = Vec::new();
        let mut dropped_batches = 0;
        for batch in ports.unclaimed.try_iter() {
            dropped_batches += 1;
            reclaimed.extend(batch.into_pixels());
        }
        for batch in ports.unread.try_iter() {
            dropped_batches += 1;
            reclaimed.extend(batch.into_pixels());
        }

        let token = self.generation.advance(self.viewport);

        let order: Vec<Pixel> = match self.redraw {
            RedrawMode::Reshuffle => self.order.arrange(self.viewport.screen, &mut self.rng),
            RedrawMode::Recycle => {
                let stale = std::mem::replace(
                    &mut self.plan,
                    WorkPlan::empty(self.viewport, self.batch_size),
                );
                let mut pixels: Vec<Pixel> = stale.into_pending().into_iter().collect();
                pixels.append(&mut reclaimed);
                pixels.append(&mut self.settled);
                pixels
            }
        };
        debug!(
            "generation {}: {} pixels planned, {} stale batches dropped",
            token,
            order.len(),
            dropped_batches
        );
        self.plan = generate_work(order, self.viewport, self.batch_size, token);
        self.dirty = false;
        token
    }

    /// Push batches onto the work queue until it is full or the plan is
    /// empty.  Returns false if the workers are gone.
    fn feed(&mut self, work: &Sender<WorkBatch>) -> bool {
        while let Some(batch) = self.plan.next() {
            match work.try_send(batch) {
                Ok(()) => {}
                Err(TrySendError::Full(batch)) => {
                    self.plan.requeue_front(batch);
                    return true;
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
        true
    }

    // Block until the next batch goes out or a control message comes
    // in, whichever is first.  A batch that was not sent goes back to
    // the front of the plan.
    fn wait(&mut self, ports: &SchedulerPorts) -> Wake {
        let batch = match self.plan.next() {
            Some(batch) => batch,
            None => {
                return match ports.control.recv_timeout(self.idle_tick) {
                    Ok(message) => Wake::Message(message),
                    Err(RecvTimeoutError::Timeout) => Wake::Idle,
                    Err(RecvTimeoutError::Disconnected) => Wake::Closed,
                };
            }
        };

        let mut select = Select::new();
        let send = select.send(&ports.work);
        select.recv(&ports.control);
        let operation = match select.select_timeout(self.idle_tick) {
            Ok(operation) => operation,
            Err(_) => {
                self.plan.requeue_front(batch);
                return Wake::Idle;
            }
        };
        if operation.index() == send {
            match operation.send(&ports.work, batch) {
                Ok(()) => Wake::Sent,
                Err(_) => Wake::Closed,
            }
        } else {
            self.plan.requeue_front(batch);
            match operation.recv(&ports.control) {
                Ok(message) => Wake::Message(message),
                Err(_) => Wake::Closed,
            }
        }
    }

    // Returns the number of viewport commands in the message.
    fn receive(&mut self, message: Control) -> u64 {
        match message {
            Control::Command(command) => {
                self.apply(command);
                1
            }
            Control::Recycle { generation, pixels } => {
                self.recycle(generation, pixels);
                0
            }
        }
    }

    /// The scheduler loop.  Runs until `shutdown` is raised or every
    /// other end of its channels has gone.
    pub fn run(mut self, ports: SchedulerPorts, shutdown: &Shutdown) {
        let mut applied = 0;
        while !shutdown.is_signaled() {
            if self.dirty {
                self.invalidate_and_regenerate(&ports);
            }
            if applied > 0 {
                self.progress.applied(applied);
                applied = 0;
            }
            if !self.feed(&ports.work) {
                break;
            }

            match self.wait(&ports) {
                Wake::Message(message) => {
                    applied += self.receive(message);
                    // Take the whole burst before regenerating once.
                    while let Ok(message) = ports.control.try_recv() {
                        applied += self.receive(message);
                    }
                }
                Wake::Sent | Wake::Idle => {}
                Wake::Closed => break,
            }
        }
        debug!("scheduler done at generation {}", self.generation.current());
    }
}
