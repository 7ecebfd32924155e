// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration.  This is where nearly all of the CPU
//! time of a render goes.

use num::Complex;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// True if the point lies inside the main cardioid or the period-2
/// bulb.  Points there never escape, so there is no need to iterate
/// them.  A false return says nothing; the point may still be in the
/// set.
#[inline]
pub fn in_main_bulbs(point: Complex<f64>) -> bool {
    let y = point.im * point.im;
    let q = y + (point.re - D4) * (point.re - D4);
    q * (q + point.re - D4) <= y * D4 || (point.re + 1.0) * (point.re + 1.0) + y <= D16
}

/// Iterates `z = z * z + c` from zero and returns the iteration at
/// which `|z|` first exceeds 2, or `max_depth` if it never does.  The
/// result is always in `0..=max_depth`.
#[inline]
pub fn escape_depth(c: Complex<f64>, max_depth: usize) -> usize {
    if in_main_bulbs(c) {
        return max_depth;
    }
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for i in 0..max_depth {
        z = z * z + c;
        if z.norm_sqr() > 4.0 {
            return i;
        }
    }
    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    // Plain iteration with no shortcuts, to check the bulb test against.
    fn iterate(c: Complex<f64>, max_depth: usize) -> usize {
        let mut z = Complex::new(0.0, 0.0);
        for i in 0..max_depth {
            z = z * z + c;
            if z.norm_sqr() > 4.0 {
                return i;
            }
        }
        max_depth
    }

    #[test]
    fn points_outside_radius_two_escape_at_once() {
        for i in 0..64 {
            let angle = (i as f64) * std::f64::consts::PI / 32.0;
            for radius in &[2.0001, 2.5, 10.0, 1e6] {
                let c = Complex::from_polar(radius, &angle);
                for max_depth in &[1, 2, 64, 1000] {
                    let depth = escape_depth(c, *max_depth);
                    assert!(depth < *max_depth, "{} escaped at {}", c, depth);
                    assert_eq!(depth, 0);
                }
            }
        }
    }

    #[test]
    fn origin_never_escapes() {
        for max_depth in &[0, 1, 2, 3, 128, 10_000] {
            assert_eq!(escape_depth(Complex::new(0.0, 0.0), *max_depth), *max_depth);
        }
    }

    #[test]
    fn known_depths() {
        // 1 -> 2 -> 5: exceeds on the third iteration.
        assert_eq!(escape_depth(Complex::new(1.0, 0.0), 100), 2);
        // -2 sits on the boundary and stays at |z| == 2 forever.
        assert_eq!(escape_depth(Complex::new(-2.0, 0.0), 100), 100);
        // Centre of the period-2 bulb.
        assert_eq!(escape_depth(Complex::new(-1.0, 0.0), 50), 50);
        assert_eq!(escape_depth(Complex::new(0.5, 0.5), 100), 4);
    }

    #[test]
    fn the_bulb_test_agrees_with_plain_iteration() {
        let steps = 120;
        for row in 0..steps {
            for column in 0..steps {
                let c = Complex::new(
                    -2.0 + 2.5 * (column as f64) / (steps as f64),
                    -1.25 + 2.5 * (row as f64) / (steps as f64),
                );
                if in_main_bulbs(c) {
                    assert_eq!(iterate(c, 500), 500, "{} is not inside", c);
                }
                assert_eq!(escape_depth(c, 60), iterate(c, 60), "{}", c);
            }
        }
    }

    #[test]
    fn result_is_bounded_by_the_cap() {
        for max_depth in 0..8 {
            for c in &[
                Complex::new(0.3, 0.6),
                Complex::new(-0.75, 0.1),
                Complex::new(0.26, 0.0),
            ] {
                assert!(escape_depth(*c, max_depth) <= max_depth);
            }
        }
    }
}
