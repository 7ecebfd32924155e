// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Display surfaces.  The pipeline only ever sets single pixels and
//! asks for the result to be shown; anything that can do those two
//! things can be rendered to.

use std::fs::File;
use std::io;
use std::path::Path;

use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;

use crate::planes::{IntegralPlane, Pixel};

/// Something pixels can be painted on.
pub trait Surface {
    /// Paint one pixel.  Channels are `round(255 * c)` of the color.
    fn set_pixel(&mut self, pixel: Pixel, r: u8, g: u8, b: u8);

    /// Show what has been painted so far.  The pipeline never calls
    /// this; the caller decides how often frames are shown.
    fn present(&mut self) {}
}

/// An in-memory RGB raster, eight bits per channel.
#[derive(Clone, Debug)]
pub struct ImageSurface {
    plane: IntegralPlane,
    pixels: Vec<u8>,
    presented: usize,
}

impl ImageSurface {
    /// A black raster the size of `plane`.
    pub fn new(plane: IntegralPlane) -> Self {
        ImageSurface {
            plane,
            pixels: vec![0 as u8; plane.len() * 3],
            presented: 0,
        }
    }

    /// The raster's size.
    pub fn plane(&self) -> IntegralPlane {
        self.plane
    }

    /// The color at `pixel`, if it is on the raster.
    pub fn get(&self, pixel: Pixel) -> Option<[u8; 3]> {
        if !self.plane.contains(&pixel) {
            return None;
        }
        let offset = self.offset(pixel);
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ])
    }

    /// The raw bytes, row by row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// How many times `present` has been called.
    pub fn frames_presented(&self) -> usize {
        self.presented
    }

    /// Write the raster as a binary PPM.
    pub fn write_pnm<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let output = File::create(path)?;
        let mut encoder =
            PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
        encoder.encode(
            &self.pixels[..],
            self.plane.0 as u32,
            self.plane.1 as u32,
            ColorType::RGB(8),
        )?;
        Ok(())
    }

    fn offset(&self, pixel: Pixel) -> usize {
        (pixel.1 * self.plane.0 + pixel.0) * 3
    }
}

impl Surface for ImageSurface {
    fn set_pixel(&mut self, pixel: Pixel, r: u8, g: u8, b: u8) {
        if !self.plane.contains(&pixel) {
            return;
        }
        let offset = self.offset(pixel);
        self.pixels[offset..offset + 3].copy_from_slice(&[r, g, b]);
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}
