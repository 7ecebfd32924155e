// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The small pieces of shared state that cross thread boundaries: the
//! shutdown flag, the generation token, and the command counters.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crate::planes::Viewport;

/// Process-wide stop flag.  Set once, never cleared.  Threads notice it
/// the next time a blocking receive times out.
#[derive(Clone, Debug, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        Shutdown::default()
    }

    /// Raise the flag.
    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Has the flag been raised?
    pub fn is_signaled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// A guard that raises the flag when it goes out of scope, however
    /// that happens.
    pub fn guard(&self) -> ShutdownGuard {
        ShutdownGuard(self.clone())
    }
}

/// Raises the shutdown flag on drop.
#[derive(Debug)]
pub struct ShutdownGuard(Shutdown);

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.0.signal();
    }
}

/// One published generation: its token and the viewport snapshot all
/// of its work was generated from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Monotonically increasing; zero means nothing has been scheduled.
    pub token: u64,
    /// The viewport as it was when the generation began.
    pub viewport: Viewport,
}

/// The live generation.  The scheduler advances it; the sink pins it
/// while painting so the token cannot move under a batch that is half
/// drawn.
#[derive(Clone, Debug)]
pub struct Generation {
    frame: Arc<RwLock<Frame>>,
    // Mirror of frame.token, written only while the write lock is held.
    token: Arc<AtomicU64>,
}

/// A read pin on the current generation.
pub type Pinned<'a> = RwLockReadGuard<'a, Frame>;

impl Generation {
    /// Generation zero for the starting viewport.
    pub fn new(viewport: Viewport) -> Self {
        Generation {
            frame: Arc::new(RwLock::new(Frame { token: 0, viewport })),
            token: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a new generation for `viewport` and return its token.
    /// Blocks until no batch is being painted.
    pub fn advance(&self, viewport: Viewport) -> u64 {
        let mut frame = self.frame.write().unwrap_or_else(PoisonError::into_inner);
        frame.token += 1;
        frame.viewport = viewport;
        self.token.store(frame.token, Ordering::Release);
        frame.token
    }

    /// Hold the current generation still until the pin is dropped.
    pub fn pin(&self) -> Pinned<'_> {
        self.frame.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current token, without locking.
    pub fn current(&self) -> u64 {
        self.token.load(Ordering::Acquire)
    }

    /// A copy of the current frame.
    pub fn snapshot(&self) -> Frame {
        *self.pin()
    }
}

/// Counts viewport commands sent by the controller and applied by the
/// scheduler, so a caller can wait until everything it asked for has
/// been scheduled.
#[derive(Debug, Default)]
pub struct Progress {
    sent: AtomicU64,
    applied: AtomicU64,
}

impl Progress {
    /// Record a command handed to the scheduler.
    pub fn sent(&self) {
        self.sent.fetch_add(1, Ordering::AcqRel);
    }

    /// Record `count` commands applied, with their regeneration done.
    pub fn applied(&self, count: u64) {
        self.applied.fetch_add(count, Ordering::AcqRel);
    }

    /// True once every command sent so far has been applied.
    pub fn is_settled(&self) -> bool {
        self.applied.load(Ordering::Acquire) >= self.sent.load(Ordering::Acquire)
    }
}
