// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Input events, as delivered by whatever owns the window, plus a text
//! form of them for scripting a headless render.

use std::fmt;
use std::str::FromStr;

use crate::planes::Pixel;

/// Mouse buttons we react to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    /// Usually the left button: zoom in.
    Primary,
    /// Usually the right button: zoom out.
    Secondary,
}

/// Keys we react to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Halve the iteration cap.
    DepthDown,
    /// Double the iteration cap.
    DepthUp,
}

/// One discrete input event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A click at a pixel.
    Click {
        /// Where the pointer was.
        pixel: Pixel,
        /// Which button.
        button: Button,
    },
    /// A key press.
    Key(Key),
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// Why an event string was rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseEventError(String);

impl fmt::Display for ParseEventError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "could not parse event '{}' (expected in:X,Y, out:X,Y, depth-up or depth-down)",
            self.0
        )
    }
}

impl std::error::Error for ParseEventError {}

impl FromStr for InputEvent {
    type Err = ParseEventError;

    /// `in:X,Y` and `out:X,Y` are primary and secondary clicks;
    /// `depth-up` and `depth-down` are the depth keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let click = |button, at: &str| {
            parse_pair::<usize>(at, ',').map(|(x, y)| InputEvent::Click {
                pixel: Pixel(x, y),
                button,
            })
        };
        let event = match s.trim() {
            "depth-up" => Some(InputEvent::Key(Key::DepthUp)),
            "depth-down" => Some(InputEvent::Key(Key::DepthDown)),
            other if other.starts_with("in:") => click(Button::Primary, &other[3..]),
            other if other.starts_with("out:") => click(Button::Secondary, &other[4..]),
            _ => None,
        };
        event.ok_or_else(|| ParseEventError(s.to_string()))
    }
}
