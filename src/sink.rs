// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The result sink.  It empties the result queue onto a surface,
//! dropping anything computed for a generation that is no longer the
//! live one.
//!
//! Each batch is checked and painted while holding a pin on the
//! generation, so the scheduler cannot start a new generation between
//! the check and the last pixel of the batch.

use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};

use crate::control::Control;
use crate::signal::Generation;
use crate::surface::Surface;
use crate::work::ResultBatch;

/// Running totals kept by the sink.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SinkStats {
    /// Pixels painted.
    pub painted: usize,
    /// Pixels dropped because their generation had passed.
    pub discarded: usize,
    /// Batches received.
    pub batches: usize,
    /// Pixels painted while the live generation was not the one they
    /// were computed for.  Nonzero means the generation pin is broken.
    pub stale: usize,
}

/// Drains the result queue onto a surface.
#[derive(Debug)]
pub struct ResultSink {
    results: Receiver<ResultBatch>,
    recycle: Option<Sender<Control>>,
    generation: Generation,
    total: usize,
    frame: u64,
    painted_in_frame: usize,
    stats: SinkStats,
}

impl ResultSink {
    /// A sink for a screen of `total` pixels.  If `recycle` is given,
    /// every pixel the sink finishes with is sent back down it.
    pub fn new(
        results: Receiver<ResultBatch>,
        recycle: Option<Sender<Control>>,
        generation: Generation,
        total: usize,
    ) -> Self {
        ResultSink {
            results,
            recycle,
            generation,
            total,
            frame: 0,
            painted_in_frame: 0,
            stats: SinkStats::default(),
        }
    }

    /// Totals so far.
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// True once every pixel has been painted for the live generation.
    pub fn frame_complete(&self) -> bool {
        self.frame == self.generation.current() && self.painted_in_frame >= self.total
    }

    /// Paint or drop one batch.  Returns true if it was painted.
    pub fn accept<S: Surface + ?Sized>(&mut self, batch: ResultBatch, surface: &mut S) -> bool {
        self.stats.batches += 1;
        let fresh = {
            let pinned = self.generation.pin();
            let fresh = batch.generation == pinned.token;
            if fresh {
                if self.frame != pinned.token {
                    self.frame = pinned.token;
                    self.painted_in_frame = 0;
                }
                for item in &batch.items {
                    let [r, g, b] = item.color.to_rgb8();
                    surface.set_pixel(item.pixel, r, g, b);
                    if self.generation.current() != batch.generation {
                        self.stats.stale += 1;
                    }
                }
            }
            fresh
        };
        if fresh {
            self.painted_in_frame += batch.items.len();
            self.stats.painted += batch.items.len();
        } else {
            self.stats.discarded += batch.items.len();
        }

        if let Some(recycle) = &self.recycle {
            let generation = batch.generation;
            let pixels = batch.into_pixels().collect();
            if recycle.send(Control::Recycle { generation, pixels }).is_err() {
                debug!("scheduler gone, dropping recycled pixels of {}", generation);
            }
        }
        fresh
    }

    /// Take results for up to `budget`, painting as they arrive.
    /// Returns the number of batches taken.
    pub fn drain<S: Surface + ?Sized>(&mut self, surface: &mut S, budget: Duration) -> usize {
        let deadline = Instant::now() + budget;
        let mut taken = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(batch) => {
                    self.accept(batch, surface);
                    taken += 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        taken
    }
}
