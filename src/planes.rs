// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport, which describes a relationship between a
//! rectangle on the integral plane (the screen, with an origin at
//! 0,0) and a rectangle on the complex plane, together with the
//! iteration cap used to render it.  All pan, zoom and depth changes
//! go through the Viewport.
use itertools::iproduct;
use num::Complex;

/// The smallest iteration cap we allow.  Anything less and every
/// point escapes immediately.
pub const MIN_DEPTH: usize = 2;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

impl IntegralPlane {
    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.0 * self.1
    }

    /// Describes that the integral plane has no area.
    pub fn is_empty(&self) -> bool {
        self.0 == 0 || self.1 == 0
    }

    /// True if the pixel lies on this plane.
    pub fn contains(&self, pixel: &Pixel) -> bool {
        pixel.0 < self.0 && pixel.1 < self.1
    }

    /// Every pixel of the plane in scanline order: left to right, then
    /// top to bottom.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(0..self.1, 0..self.0).map(|(top, left)| Pixel(left, top))
    }
}

/// Describes the x, y of a point on the integral plane.  Identity
/// only; a pixel never changes once made.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel(pub usize, pub usize);

/// The region of the complex plane, treating the real part as the
/// x-component and the imaginary part as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Real part of the left edge.
    pub x_min: f64,
    /// Real part of the right edge.
    pub x_max: f64,
    /// Imaginary part of the edge mapped to row zero.
    pub y_min: f64,
    /// Imaginary part of the edge mapped to the last row.
    pub y_max: f64,
}

impl Bounds {
    /// Builds bounds out of the left-lower and right-upper corners of
    /// the region.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Bounds {
        Bounds {
            x_min: leftlower.re,
            x_max: rightupper.re,
            y_min: leftlower.im,
            y_max: rightupper.im,
        }
    }

    /// Span of the real axis.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Span of the imaginary axis.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// The middle of the region.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            (self.x_max + self.x_min) / 2.0,
            (self.y_max + self.y_min) / 2.0,
        )
    }

    /// Finite bounds with a positive span on both axes.
    pub fn is_valid(&self) -> bool {
        self.x_min.is_finite()
            && self.x_max.is_finite()
            && self.y_min.is_finite()
            && self.y_max.is_finite()
            && self.x_max > self.x_min
            && self.y_max > self.y_min
    }
}

/// Maps a zoom factor to the amount each edge moves, as a fraction of
/// the span.  Factors below one are applied as they are (positive
/// shrinks, negative grows).  A factor above one is the reciprocal
/// zoom-out and is turned into the exact inverse of zooming in by
/// `1 / factor`.  Factors in `[0.5, 1]` would collapse or flip the
/// region and have no inset.
pub fn edge_inset(factor: f64) -> Option<f64> {
    if !factor.is_finite() {
        return None;
    }
    if factor > 1.0 {
        let inverse = factor.recip();
        return Some(-inverse / (1.0 - 2.0 * inverse));
    }
    if factor >= 0.5 {
        return None;
    }
    Some(factor)
}

/// The screen, the part of the complex plane shown on it, and the
/// iteration cap.  Copying a Viewport is how a snapshot is taken.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Size of the raster.
    pub screen: IntegralPlane,
    /// Region of the complex plane mapped onto the raster.
    pub bounds: Bounds,
    /// Iteration cap, never below [`MIN_DEPTH`].
    pub max_depth: usize,
}

impl Viewport {
    /// Constructor.  The depth is clamped to [`MIN_DEPTH`]; the bounds
    /// are taken as given (see `Config::validate`).
    pub fn new(screen: IntegralPlane, bounds: Bounds, max_depth: usize) -> Viewport {
        Viewport {
            screen,
            bounds,
            max_depth: max_depth.max(MIN_DEPTH),
        }
    }

    /// Given a pixel on the integral plane, map it to the point on the
    /// complex plane it samples.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            (pixel.0 as f64) / (self.screen.0 as f64) * self.bounds.width() + self.bounds.x_min,
            (pixel.1 as f64) / (self.screen.1 as f64) * self.bounds.height() + self.bounds.y_min,
        )
    }

    /// Moves the region so that the point under `pixel` becomes its
    /// center.  The span is preserved.
    pub fn recenter(&mut self, pixel: &Pixel) {
        let center = self.pixel_to_point(pixel);
        let half_width = self.bounds.width() / 2.0;
        let half_height = self.bounds.height() / 2.0;
        self.bounds = Bounds {
            x_min: center.re - half_width,
            x_max: center.re + half_width,
            y_min: center.im - half_height,
            y_max: center.im + half_height,
        };
    }

    /// Pulls every edge in by `factor` times the span (see
    /// [`edge_inset`] for how factors above one zoom out).  Returns
    /// false and leaves the region alone when the factor is refused.
    pub fn rescale(&mut self, factor: f64) -> bool {
        let inset = match edge_inset(factor) {
            Some(inset) => inset,
            None => return false,
        };
        let width = self.bounds.width();
        let height = self.bounds.height();
        self.bounds.x_min += inset * width;
        self.bounds.x_max -= inset * width;
        self.bounds.y_min += inset * height;
        self.bounds.y_max -= inset * height;
        true
    }

    /// Recenter on the pixel, then rescale.
    pub fn center_and_zoom(&mut self, pixel: &Pixel, factor: f64) -> bool {
        self.recenter(pixel);
        self.rescale(factor)
    }

    /// Multiplies the iteration cap, rounding to the nearest integer and
    /// never going below [`MIN_DEPTH`].
    pub fn set_depth_scale(&mut self, multiplier: f64) {
        let scaled = (self.max_depth as f64 * multiplier).round();
        self.max_depth = if scaled.is_finite() && scaled >= MIN_DEPTH as f64 {
            scaled as usize
        } else {
            MIN_DEPTH
        };
    }
}
