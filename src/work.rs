// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The values that travel through the pipeline, and the plan that cuts
//! a pixel order into batches of them.
//!
//! A [`WorkItem`] carries copies of everything a worker needs: once it
//! is made, nothing that happens to the viewport can reach it.  That is
//! what lets the scheduler throw a whole generation away and start a
//! new one without touching anything a worker holds.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::Color;
use crate::planes::{IntegralPlane, Pixel, Viewport};

/// One pixel to compute, frozen against the viewport it was made from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorkItem {
    /// Where the result goes.
    pub pixel: Pixel,
    /// Real part of the point to iterate.
    pub x: f64,
    /// Imaginary part of the point to iterate.
    pub y: f64,
    /// Iteration cap at generation time.
    pub max_depth: usize,
}

impl WorkItem {
    /// Freeze `pixel` against `viewport`.
    pub fn new(pixel: Pixel, viewport: &Viewport) -> WorkItem {
        let point = viewport.pixel_to_point(&pixel);
        WorkItem {
            pixel,
            x: point.re,
            y: point.im,
            max_depth: viewport.max_depth,
        }
    }
}

/// A group of work items dispatched together, tagged with the
/// generation it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkBatch {
    /// Generation token at the time the batch was made.
    pub generation: u64,
    /// The items, in plan order.
    pub items: Vec<WorkItem>,
}

impl WorkBatch {
    /// The pixel identities in this batch, dropping the frozen numbers.
    pub fn into_pixels(self) -> impl DoubleEndedIterator<Item = Pixel> {
        self.items.into_iter().map(|item| item.pixel)
    }
}

/// One computed pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResultItem {
    /// The pixel that was computed.
    pub pixel: Pixel,
    /// Its color.
    pub color: Color,
}

/// The results of one work batch, carrying the batch's generation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultBatch {
    /// Generation token of the work this was computed from.
    pub generation: u64,
    /// One result per work item.
    pub items: Vec<ResultItem>,
}

impl ResultBatch {
    /// The pixel identities in this batch.
    pub fn into_pixels(self) -> impl Iterator<Item = Pixel> {
        self.items.into_iter().map(|item| item.pixel)
    }
}

/// The order in which a generation visits the screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PixelOrder {
    /// A fresh random permutation.  Every region of the image sharpens
    /// at once instead of the frame filling in from the top.
    Random,
    /// Left to right, top to bottom.
    Scanline,
}

impl PixelOrder {
    /// Every pixel of `screen` exactly once, in this order.
    pub fn arrange<R: Rng + ?Sized>(self, screen: IntegralPlane, rng: &mut R) -> Vec<Pixel> {
        let mut pixels: Vec<Pixel> = screen.pixels().collect();
        if self == PixelOrder::Random {
            pixels.shuffle(rng);
        }
        pixels
    }
}

/// A generation's outstanding work: the pixels still to be sent, the
/// viewport snapshot they will be computed against, and the batch
/// size.  Iterating the plan yields its batches.
#[derive(Debug)]
pub struct WorkPlan {
    generation: u64,
    snapshot: Viewport,
    batch_size: usize,
    pending: VecDeque<Pixel>,
}

/// Cut `order` into batches of `batch_size` against a snapshot of
/// `viewport`.  The last batch may be short.
pub fn generate_work<I>(order: I, viewport: Viewport, batch_size: usize, generation: u64) -> WorkPlan
where
    I: IntoIterator<Item = Pixel>,
{
    WorkPlan {
        generation,
        snapshot: viewport,
        batch_size: batch_size.max(1),
        pending: order.into_iter().collect(),
    }
}

impl WorkPlan {
    /// A plan with nothing in it.
    pub fn empty(viewport: Viewport, batch_size: usize) -> WorkPlan {
        generate_work(Vec::new(), viewport, batch_size, 0)
    }

    /// The generation this plan's batches are tagged with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The frozen viewport.
    pub fn snapshot(&self) -> &Viewport {
        &self.snapshot
    }

    /// Pixels not yet handed out.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Nothing left to hand out.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Put a batch that could not be sent back at the front, in its
    /// original order.  It will be rebuilt from the same snapshot.
    pub fn requeue_front(&mut self, batch: WorkBatch) {
        for pixel in batch.into_pixels().rev() {
            self.pending.push_front(pixel);
        }
    }

    /// Add pixels to the end of the plan.
    pub fn requeue_back<I: IntoIterator<Item = Pixel>>(&mut self, pixels: I) {
        self.pending.extend(pixels);
    }

    /// Give up the plan, returning the pixels it had not handed out.
    pub fn into_pending(self) -> VecDeque<Pixel> {
        self.pending
    }
}

impl Iterator for WorkPlan {
    type Item = WorkBatch;

    fn next(&mut self) -> Option<WorkBatch> {
        if self.pending.is_empty() {
            return None;
        }
        let take = self.batch_size.min(self.pending.len());
        let snapshot = self.snapshot;
        let items = self
            .pending
            .drain(..take)
            .map(|pixel| WorkItem::new(pixel, &snapshot))
            .collect();
        Some(WorkBatch {
            generation: self.generation,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::Bounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn viewport(width: usize, height: usize) -> Viewport {
        Viewport::new(
            IntegralPlane(width, height),
            Bounds {
                x_min: -2.0,
                x_max: 2.0,
                y_min: -2.0,
                y_max: 2.0,
            },
            64,
        )
    }

    fn assert_permutation(width: usize, height: usize, batch_size: usize) {
        let vp = viewport(width, height);
        let mut rng = StdRng::seed_from_u64(7);
        let order = PixelOrder::Random.arrange(vp.screen, &mut rng);
        let batches: Vec<WorkBatch> = generate_work(order, vp, batch_size, 3).collect();

        let mut seen = HashSet::new();
        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.generation, 3);
            assert!(!batch.items.is_empty());
            if i + 1 < batches.len() {
                assert_eq!(batch.items.len(), batch_size);
            } else {
                assert!(batch.items.len() <= batch_size);
            }
            for item in &batch.items {
                assert!(vp.screen.contains(&item.pixel));
                assert!(seen.insert(item.pixel), "{:?} scheduled twice", item.pixel);
            }
        }
        assert_eq!(seen.len(), width * height);
    }

    #[test]
    fn plan_is_a_permutation_of_the_grid() {
        for &(width, height) in &[(1, 1), (1, 9), (9, 1), (7, 7), (16, 16), (33, 5)] {
            for &batch_size in &[1, 3, 16, 20, 1000] {
                assert_permutation(width, height, batch_size);
            }
        }
    }

    #[test]
    fn scanline_order_is_row_major() {
        let mut rng = StdRng::seed_from_u64(1);
        let order = PixelOrder::Scanline.arrange(IntegralPlane(2, 2), &mut rng);
        assert_eq!(order, vec![Pixel(0, 0), Pixel(1, 0), Pixel(0, 1), Pixel(1, 1)]);
    }

    #[test]
    fn seeded_shuffles_repeat() {
        let screen = IntegralPlane(20, 20);
        let a = PixelOrder::Random.arrange(screen, &mut StdRng::seed_from_u64(42));
        let b = PixelOrder::Random.arrange(screen, &mut StdRng::seed_from_u64(42));
        let scanline = PixelOrder::Scanline.arrange(screen, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_ne!(a, scanline);
    }

    #[test]
    fn items_are_frozen_against_the_snapshot() {
        let mut vp = viewport(4, 4);
        let mut plan = generate_work(vec![Pixel(2, 2), Pixel(0, 0)], vp, 1, 1);
        vp.rescale(0.25);
        vp.set_depth_scale(2.0);

        let first = plan.next().unwrap();
        assert_eq!(first.items[0].x, 0.0);
        assert_eq!(first.items[0].y, 0.0);
        assert_eq!(first.items[0].max_depth, 64);
        let second = plan.next().unwrap();
        assert_eq!(second.items[0].x, -2.0);
        assert_eq!(plan.snapshot().max_depth, 64);
        assert!(plan.next().is_none());
    }

    #[test]
    fn requeued_batches_come_back_in_order() {
        let vp = viewport(3, 1);
        let mut plan = generate_work(vp.screen.pixels(), vp, 2, 5);
        let batch = plan.next().unwrap();
        let expected = batch.clone();
        plan.requeue_front(batch);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.next().unwrap(), expected);

        plan.requeue_back(vec![Pixel(0, 0)]);
        let rest: Vec<Pixel> = plan.into_pending().into_iter().collect();
        assert_eq!(rest, vec![Pixel(2, 0), Pixel(0, 0)]);
    }

    #[test]
    fn empty_plan_yields_nothing() {
        let mut plan = WorkPlan::empty(viewport(3, 3), 4);
        assert!(plan.is_empty());
        assert_eq!(plan.generation(), 0);
        assert!(plan.next().is_none());
    }
}
