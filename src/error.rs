// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things that can go wrong outside the inner loops.

use std::io;

/// Why a render could not be started, finished, or saved.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// A configuration value is out of range.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),

    /// The operating system would not give us a thread.
    #[fail(display = "could not start a pipeline thread: {}", _0)]
    Spawn(#[cause] io::Error),

    /// A pipeline thread panicked.
    #[fail(display = "a pipeline thread panicked")]
    ThreadPanicked,

    /// Writing the image failed.
    #[fail(display = "could not write image: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        RenderError::Io(err)
    }
}
