#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which iterating `z = z² + c` from zero never runs off to
//! infinity.  Points outside the set are colored by how many
//! iterations it took them to escape, their "depth."
//!
//! This crate renders it progressively and interactively.  The screen
//! is cut into small batches of pixels in random order and handed to a
//! pool of worker threads, so the whole image sharpens at once instead
//! of filling in from the top.  Whenever the viewport changes, by a
//! zoom, a pan or a change of iteration cap, all work still queued for
//! the old viewport is thrown away and a new generation of work is
//! started; a generation token on every batch keeps late results for
//! the old viewport off the screen.
//!
//! [`render`] starts the pipeline and hands a [`Session`] to the
//! caller, who feeds it input and drains results onto a [`Surface`].

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;
extern crate rand;

pub mod color;
pub mod config;
pub mod control;
pub mod depth;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod planes;
pub mod pool;
pub mod scheduler;
pub mod signal;
pub mod sink;
pub mod surface;
pub mod work;

pub use crate::color::Color;
pub use crate::config::{Config, RedrawMode};
pub use crate::control::{Controller, ViewportCommand};
pub use crate::depth::escape_depth;
pub use crate::error::RenderError;
pub use crate::input::{Button, InputEvent, Key};
pub use crate::pipeline::{render, Session};
pub use crate::planes::{Bounds, IntegralPlane, Pixel, Viewport};
pub use crate::sink::SinkStats;
pub use crate::surface::{ImageSurface, Surface};
pub use crate::work::{generate_work, PixelOrder, WorkBatch, WorkPlan};
