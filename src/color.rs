// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps escape depths to colors.
//!
//! The depth is scaled logarithmically onto the hue wheel: linear
//! scaling spends almost the whole palette on the few points right
//! next to the set.  The ramp stops at 5/6 of the wheel (violet) so
//! that the deepest points do not wrap back around to the red of the
//! shallowest ones.

use num::clamp;

/// The fraction of the hue wheel the ramp covers.
pub const HUE_SPAN: f64 = 5.0 / 6.0;

/// An RGB color, each channel in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Color {
    /// The color for a point that took `depth` of `max_depth`
    /// iterations to escape.  Only the ratio of the two matters.
    pub fn from_depth(depth: usize, max_depth: usize) -> Color {
        let ratio = depth as f64 / max_depth as f64;
        let hue = (ratio * 9.0 + 1.0).log10() * HUE_SPAN;
        Color::from_hsv(hue, 1.0, 1.0)
    }

    /// Standard HSV to RGB conversion.  The hue wraps at one.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Color {
        if s == 0.0 {
            return Color { r: v, g: v, b: v };
        }
        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match (sector as i64).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Color { r, g, b }
    }

    /// Quantizes to eight bits per channel: `round(255 * channel)`.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

#[inline]
fn quantize(channel: f64) -> u8 {
    clamp((channel * 255.0).round(), 0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_unit_range(c: &Color) -> bool {
        [c.r, c.g, c.b].iter().all(|v| *v >= 0.0 && *v <= 1.0)
    }

    #[test]
    fn shallowest_is_red_and_deepest_is_violet() {
        assert_eq!(Color::from_depth(0, 128).to_rgb8(), [255, 0, 0]);
        assert_eq!(Color::from_depth(128, 128).to_rgb8(), [255, 0, 255]);
    }

    #[test]
    fn zero_depth_is_well_defined() {
        let c = Color::from_depth(0, 2);
        assert!(!c.r.is_nan() && !c.g.is_nan() && !c.b.is_nan());
    }

    #[test]
    fn only_the_ratio_matters() {
        for max_depth in &[2usize, 3, 7, 64, 128, 1000] {
            for depth in 0..=*max_depth {
                let base = Color::from_depth(depth, *max_depth);
                for k in &[2usize, 3, 10] {
                    assert_eq!(base, Color::from_depth(depth * k, max_depth * k));
                }
            }
        }
    }

    #[test]
    fn channels_stay_in_range() {
        for depth in 0..=300 {
            assert!(in_unit_range(&Color::from_depth(depth, 300)));
        }
    }

    #[test]
    fn hue_never_wraps_back_to_red() {
        // Past depth zero the red channel must fall off before violet.
        let near_top = Color::from_depth(299, 300);
        assert_eq!(near_top.g, 0.0);
        assert!(near_top.b > 0.99);
    }

    #[test]
    fn hsv_sectors() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0).to_rgb8(), [255, 0, 0]);
        assert_eq!(Color::from_hsv(1.0 / 3.0, 1.0, 1.0).to_rgb8(), [0, 255, 0]);
        assert_eq!(Color::from_hsv(2.0 / 3.0, 1.0, 1.0).to_rgb8(), [0, 0, 255]);
        assert_eq!(Color::from_hsv(0.5, 0.0, 0.25).to_rgb8(), [64, 64, 64]);
        assert_eq!(Color::from_hsv(1.0, 1.0, 1.0).to_rgb8(), [255, 0, 0]);
    }

    #[test]
    fn quantization_rounds() {
        let c = Color {
            r: 0.5,
            g: 1.0 / 255.0 * 0.49,
            b: 2.0,
        };
        assert_eq!(c.to_rgb8(), [128, 0, 255]);
    }
}
