// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render configuration.

use std::time::Duration;

use crate::error::RenderError;
use crate::planes::{Bounds, IntegralPlane, Viewport, MIN_DEPTH};
use crate::work::PixelOrder;

/// What the scheduler does with pixels when the viewport changes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RedrawMode {
    /// Plan every pixel again in a freshly shuffled order.
    Reshuffle,
    /// Keep one permutation for the whole session and send every pixel
    /// back to the scheduler after it is painted, so the same pixel
    /// identities circulate forever.
    Recycle,
}

/// Everything needed to start a render.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Screen size in pixels.
    pub screen: IntegralPlane,
    /// The region of the complex plane shown at start.
    pub bounds: Bounds,
    /// Initial iteration cap.
    pub max_depth: usize,
    /// Number of worker threads.
    pub workers: usize,
    /// Pixels per batch.
    pub batch_size: usize,
    /// Zoom factor for a primary click.  Secondary clicks use its
    /// reciprocal.
    pub zoom_in_factor: f64,
    /// Capacity of the work queue, in batches.
    pub queue_capacity: usize,
    /// Longest any pipeline thread blocks before checking for shutdown.
    pub recv_timeout: Duration,
    /// What happens to pixels on a viewport change.
    pub redraw: RedrawMode,
    /// The order pixels are visited in.
    pub order: PixelOrder,
    /// Seed for the shuffles.  Drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            screen: IntegralPlane(1000, 1000),
            bounds: Bounds {
                x_min: -1.5,
                x_max: 1.5,
                y_min: -1.5,
                y_max: 1.5,
            },
            max_depth: 128,
            workers: num_cpus::get(),
            batch_size: 20,
            zoom_in_factor: 0.2,
            queue_capacity: 500,
            recv_timeout: Duration::from_millis(100),
            redraw: RedrawMode::Reshuffle,
            order: PixelOrder::Random,
            seed: None,
        }
    }
}

impl Config {
    /// The starting viewport.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.screen, self.bounds, self.max_depth)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |what: String| Err(RenderError::InvalidConfig(what));
        if self.screen.is_empty() {
            return invalid(format!(
                "screen {}x{} has no pixels",
                self.screen.0, self.screen.1
            ));
        }
        if !self.bounds.is_valid() {
            return invalid(format!("bounds {:?} are empty or not finite", self.bounds));
        }
        if self.max_depth < MIN_DEPTH {
            return invalid(format!("iteration cap must be at least {}", MIN_DEPTH));
        }
        if self.workers == 0 {
            return invalid("at least one worker is needed".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch size must be at least one".to_string());
        }
        if !(self.zoom_in_factor > 0.0 && self.zoom_in_factor < 0.5) {
            return invalid(format!(
                "zoom factor {} must lie strictly between 0 and 0.5",
                self.zoom_in_factor
            ));
        }
        if self.queue_capacity == 0 {
            return invalid("work queue capacity must be at least one".to_string());
        }
        if self.recv_timeout == Duration::from_millis(0) {
            return invalid("receive timeout must be positive".to_string());
        }
        Ok(())
    }
}
