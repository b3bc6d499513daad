// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A directed pair of distinct tracks.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arrow would begin and end on track {0}")]
pub struct DegenerateArrow(pub usize);

/// An arrow from track `begin` to track `end`, with `begin != end`.
///
/// An arrow is *up* when `end < begin` and *down* otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arrow {
    begin: usize,
    end: usize,
}

impl Arrow {
    pub fn new(begin: usize, end: usize) -> Result<Self, DegenerateArrow> {
        if begin == end {
            Err(DegenerateArrow(begin))
        } else {
            Ok(Self { begin, end })
        }
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn length(&self) -> usize {
        self.begin.abs_diff(self.end)
    }

    pub fn is_up(&self) -> bool {
        self.end < self.begin
    }

    pub fn is_down(&self) -> bool {
        self.begin < self.end
    }

    pub fn reversed(&self) -> Arrow {
        Arrow {
            begin: self.end,
            end: self.begin,
        }
    }

    /// The arrow with both endpoints renamed by `f`, which must be injective.
    pub fn map(&self, mut f: impl FnMut(usize) -> usize) -> Arrow {
        let (begin, end) = (f(self.begin), f(self.end));
        debug_assert_ne!(begin, end, "track map is not injective");
        Arrow { begin, end }
    }

    pub fn tracks(&self) -> (usize, usize) {
        (self.begin, self.end)
    }

    /// The arrow produced when `self` slides past `other` and they share an
    /// endpoint head to tail, if any.
    pub fn composite(&self, other: &Arrow) -> Option<Arrow> {
        if self.end == other.begin && self.begin != other.end {
            Some(Arrow {
                begin: self.begin,
                end: other.end,
            })
        } else if other.end == self.begin && other.begin != self.end {
            Some(Arrow {
                begin: other.begin,
                end: self.end,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.begin, self.end)
    }
}
