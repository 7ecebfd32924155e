// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The worker pool: a fixed number of threads that turn work batches
//! into result batches.  Workers know nothing about the viewport; all
//! they see are the numbers frozen into each work item.

use std::io;
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use crossbeam::thread::Scope;
use num::Complex;

use crate::color::Color;
use crate::depth::escape_depth;
use crate::signal::Shutdown;
use crate::work::{ResultBatch, ResultItem, WorkBatch};

/// Compute a whole batch.  The result keeps the batch's generation.
pub fn compute(batch: WorkBatch) -> ResultBatch {
    let items = batch
        .items
        .iter()
        .map(|item| {
            let depth = escape_depth(Complex::new(item.x, item.y), item.max_depth);
            ResultItem {
                pixel: item.pixel,
                color: Color::from_depth(depth, item.max_depth),
            }
        })
        .collect();
    ResultBatch {
        generation: batch.generation,
        items,
    }
}

/// What a worker does to each batch.
pub type ComputeFn = fn(WorkBatch) -> ResultBatch;

/// One worker's loop and the channels it runs between.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    work: Receiver<WorkBatch>,
    results: Sender<ResultBatch>,
    shutdown: Shutdown,
    recv_timeout: Duration,
    compute: ComputeFn,
}

impl Worker {
    /// A worker taking batches from `work` and putting results on
    /// `results`.
    pub fn new(
        id: usize,
        work: Receiver<WorkBatch>,
        results: Sender<ResultBatch>,
        shutdown: Shutdown,
        recv_timeout: Duration,
    ) -> Self {
        Worker {
            id,
            work,
            results,
            shutdown,
            recv_timeout,
            compute,
        }
    }

    /// Use `compute` on each batch instead of the escape-time engine.
    pub fn with_compute(mut self, compute: ComputeFn) -> Self {
        self.compute = compute;
        self
    }

    /// Runs until shutdown is raised, the work queue is closed, or the
    /// result queue has no reader left.  None of these is an error.
    pub fn run(self) {
        let mut batches = 0usize;
        while !self.shutdown.is_signaled() {
            match self.work.recv_timeout(self.recv_timeout) {
                Ok(batch) => {
                    if self.results.send((self.compute)(batch)).is_err() {
                        debug!("worker {}: result queue closed", self.id);
                        break;
                    }
                    batches += 1;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("worker {} done after {} batches", self.id, batches);
    }
}

/// A fixed-size set of workers.
#[derive(Copy, Clone, Debug)]
pub struct WorkerPool {
    size: usize,
    recv_timeout: Duration,
    compute: ComputeFn,
}

impl WorkerPool {
    /// A pool of `size` workers, each blocking at most `recv_timeout`
    /// on the work queue before checking for shutdown.
    pub fn new(size: usize, recv_timeout: Duration) -> Self {
        WorkerPool {
            size,
            recv_timeout,
            compute,
        }
    }

    /// Run `compute` on every batch instead of the escape-time engine.
    pub fn with_compute(mut self, compute: ComputeFn) -> Self {
        self.compute = compute;
        self
    }

    /// How many workers the pool runs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Start every worker inside `scope`.  The scope joins them.
    pub fn spawn<'env>(
        &self,
        scope: &Scope<'env>,
        work: &Receiver<WorkBatch>,
        results: &Sender<ResultBatch>,
        shutdown: &Shutdown,
    ) -> io::Result<()> {
        for id in 0..self.size {
            let worker = Worker::new(
                id,
                work.clone(),
                results.clone(),
                shutdown.clone(),
                self.recv_timeout,
            )
            .with_compute(self.compute);
            scope
                .builder()
                .name(format!("worker-{}", id))
                .spawn(move |_| worker.run())?;
        }
        Ok(())
    }
}
