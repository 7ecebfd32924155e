// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wires the scheduler, the worker pool and the sink together and runs
//! them for as long as the caller needs.
//!
//! ```text
//!            control               work (bounded)            results
//! Controller -------> Scheduler ------------------> Workers ---------> Sink -> Surface
//!                        ^                                               |
//!                        +------------- recycled pixels -----------------+
//! ```
//!
//! Every thread is spawned inside a `crossbeam` scope, so none of them
//! can outlive [`render`].  Leaving the caller's closure, by return or
//! by panic, raises the shutdown flag and the scope joins everything.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, unbounded};

use crate::config::{Config, RedrawMode};
use crate::control::Controller;
use crate::error::RenderError;
use crate::input::InputEvent;
use crate::planes::Viewport;
use crate::pool::WorkerPool;
use crate::scheduler::{Scheduler, SchedulerPorts};
use crate::signal::{Generation, Progress, Shutdown};
use crate::sink::{ResultSink, SinkStats};
use crate::surface::Surface;

// Slice of a frame wait spent draining before checking again.
const DRAIN_SLICE: Duration = Duration::from_millis(10);

/// The caller's handle on a running pipeline.  Input goes in through
/// it and results come out of it onto a surface.
#[derive(Debug)]
pub struct Session {
    controller: Controller,
    sink: ResultSink,
    generation: Generation,
    progress: Arc<Progress>,
}

impl Session {
    /// The controller, for sending viewport commands directly.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// React to one input event.
    pub fn handle(&self, event: &InputEvent) {
        self.controller.handle(event);
    }

    /// Paint whatever results arrive in the next `budget`.  Returns the
    /// number of batches taken off the queue.
    pub fn drain<S: Surface + ?Sized>(&mut self, surface: &mut S, budget: Duration) -> usize {
        self.sink.drain(surface, budget)
    }

    /// True once every command sent has been scheduled and every pixel
    /// of the resulting generation has been painted.
    pub fn frame_complete(&self) -> bool {
        self.progress.is_settled() && self.sink.frame_complete()
    }

    /// Drain until the frame is complete or `timeout` runs out.  The
    /// surface is presented once either way.  Returns true if the frame
    /// completed.
    pub fn wait_for_frame<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        let complete = loop {
            if self.frame_complete() {
                break true;
            }
            let now = Instant::now();
            if now >= deadline {
                break false;
            }
            self.sink.drain(surface, DRAIN_SLICE.min(deadline - now));
        };
        surface.present();
        if !complete {
            warn!(
                "generation {} incomplete after {:?}",
                self.generation.current(),
                timeout
            );
        }
        complete
    }

    /// The live generation's token.
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// A handle on the live generation that outlasts this borrow.
    pub fn live_generation(&self) -> Generation {
        self.generation.clone()
    }

    /// The viewport the live generation was scheduled from.
    pub fn viewport(&self) -> Viewport {
        self.generation.snapshot().viewport
    }

    /// What the sink has done so far.
    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }
}

/// Start the pipeline for `config`, hand a [`Session`] on it to `body`,
/// and shut everything down when `body` returns.  Returns what `body`
/// returned.
///
/// A panic on a worker or the scheduler comes back as
/// [`RenderError::ThreadPanicked`].  A panic in `body` itself stops and
/// joins every thread and then carries on out of `render`.
pub fn render<F, T>(config: &Config, body: F) -> Result<T, RenderError>
where
    F: FnOnce(&mut Session) -> T,
{
    config.validate()?;
    let pool = WorkerPool::new(config.workers, config.recv_timeout);
    render_with(config, pool, body)
}

fn render_with<F, T>(config: &Config, pool: WorkerPool, body: F) -> Result<T, RenderError>
where
    F: FnOnce(&mut Session) -> T,
{
    let generation = Generation::new(config.viewport());
    let progress = Arc::new(Progress::default());
    let shutdown = Shutdown::new();

    let (work_tx, work_rx) = bounded(config.queue_capacity);
    let (results_tx, results_rx) = unbounded();
    let (control_tx, control_rx) = unbounded();

    let scheduler = Scheduler::new(config, generation.clone(), progress.clone());
    let ports = SchedulerPorts {
        work: work_tx,
        unclaimed: work_rx.clone(),
        unread: results_rx.clone(),
        control: control_rx,
    };
    let recycle = match config.redraw {
        RedrawMode::Recycle => Some(control_tx.clone()),
        RedrawMode::Reshuffle => None,
    };
    let mut session = Session {
        controller: Controller::new(control_tx, progress.clone(), config.zoom_in_factor),
        sink: ResultSink::new(results_rx, recycle, generation.clone(), config.screen.len()),
        generation,
        progress,
    };

    debug!(
        "starting {} workers on a {}x{} screen",
        pool.size(),
        config.screen.0,
        config.screen.1
    );

    let outcome = crossbeam::scope(|scope| -> Result<T, RenderError> {
        let _guard = shutdown.guard();
        pool.spawn(scope, &work_rx, &results_tx, &shutdown)
            .map_err(RenderError::Spawn)?;
        let stop = shutdown.clone();
        scope
            .builder()
            .name("scheduler".to_string())
            .spawn(move |_| scheduler.run(ports, &stop))
            .map_err(RenderError::Spawn)?;
        Ok(body(&mut session))
    });

    debug!("pipeline stopped: {:?}", session.stats());
    match outcome {
        Ok(result) => result,
        Err(_) => Err(RenderError::ThreadPanicked),
    }
}
