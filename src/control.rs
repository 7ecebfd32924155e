// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Messages to the scheduler, and the controller that sends them.
//!
//! The scheduler thread owns the viewport outright.  Everyone else
//! changes it by sending a [`ViewportCommand`] down the control
//! channel; the arrival of a message is also what wakes the scheduler
//! to regenerate, so nothing has to poll the viewport for changes.

use std::sync::Arc;

use crossbeam::channel::Sender;

use crate::input::{Button, InputEvent, Key};
use crate::planes::Pixel;
use crate::signal::Progress;

/// A change to the viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ViewportCommand {
    /// Center on the pixel, then zoom by the factor.
    CenterAndZoom {
        /// The pixel to center on.
        pixel: Pixel,
        /// Zoom factor; see `planes::edge_inset`.
        factor: f64,
    },
    /// Center on the pixel.
    Recenter(Pixel),
    /// Zoom about the current center.
    Rescale(f64),
    /// Multiply the iteration cap.
    ScaleDepth(f64),
}

/// Everything the scheduler can be told.
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    /// Change the viewport.
    Command(ViewportCommand),
    /// Pixels the sink has finished with, and the generation they were
    /// computed for.  Only sent in the recycling redraw mode.
    Recycle {
        /// Generation of the batch the pixels came from.
        generation: u64,
        /// The pixel identities.
        pixels: Vec<Pixel>,
    },
}

/// Turns input into viewport commands for the scheduler.
#[derive(Clone, Debug)]
pub struct Controller {
    control: Sender<Control>,
    progress: Arc<Progress>,
    zoom_in_factor: f64,
}

impl Controller {
    /// Commands go down `control`; `progress` counts them.
    pub fn new(control: Sender<Control>, progress: Arc<Progress>, zoom_in_factor: f64) -> Self {
        Controller {
            control,
            progress,
            zoom_in_factor,
        }
    }

    /// The command an input event stands for.  Primary clicks zoom in,
    /// secondary clicks zoom back out by the reciprocal, and the depth
    /// keys halve or double the iteration cap.
    pub fn command_for(&self, event: &InputEvent) -> ViewportCommand {
        match *event {
            InputEvent::Click {
                pixel,
                button: Button::Primary,
            } => ViewportCommand::CenterAndZoom {
                pixel,
                factor: self.zoom_in_factor,
            },
            InputEvent::Click {
                pixel,
                button: Button::Secondary,
            } => ViewportCommand::CenterAndZoom {
                pixel,
                factor: 1.0 / self.zoom_in_factor,
            },
            InputEvent::Key(Key::DepthDown) => ViewportCommand::ScaleDepth(0.5),
            InputEvent::Key(Key::DepthUp) => ViewportCommand::ScaleDepth(2.0),
        }
    }

    /// Handle one input event.
    pub fn handle(&self, event: &InputEvent) {
        self.submit(self.command_for(event));
    }

    /// Center on `pixel`, then zoom by `factor`.
    pub fn center_and_zoom(&self, pixel: Pixel, factor: f64) {
        self.submit(ViewportCommand::CenterAndZoom { pixel, factor });
    }

    /// Center on `pixel`.
    pub fn recenter(&self, pixel: Pixel) {
        self.submit(ViewportCommand::Recenter(pixel));
    }

    /// Zoom by `factor` about the current center.
    pub fn rescale(&self, factor: f64) {
        self.submit(ViewportCommand::Rescale(factor));
    }

    /// Multiply the iteration cap by `multiplier`.
    pub fn set_depth_scale(&self, multiplier: f64) {
        self.submit(ViewportCommand::ScaleDepth(multiplier));
    }

    /// Send a command.  If the scheduler has already gone the command
    /// is dropped; that only happens during shutdown.
    pub fn submit(&self, command: ViewportCommand) {
        match self.control.send(Control::Command(command)) {
            Ok(()) => self.progress.sent(),
            Err(_) => debug!("scheduler gone, dropping {:?}", command),
        }
    }
}
