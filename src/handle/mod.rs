// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Arrow diagrams on a zero handle with two one-handles.
//!
//! # Layout
//!
//! A [`OneHandle`] reads, from its pre end to its post end:
//!
//! ```text
//! pre | first box | mid | second box | post
//! ```
//!
//! The three [`PermutationBox`]es carry strands between the boxes; each
//! [`ArrowBox`] holds an ordered list of arrows between two of its strands.
//! The [`ZeroHandle`] joins the ends of a void and a full one-handle through
//! a fixed boundary [`Pairing`](crate::algebra::Pairing).
//!
//! # Ownership
//!
//! Arrows live in one [`ArrowArena`] owned by the zero handle. Boxes hold
//! [`ArrowId`]s only, so moving an arrow between boxes moves its id; no
//! arrow is ever copied. Operations that rewrite boxes borrow the arena and
//! the event sink together as a [`Workspace`].

pub mod arena;
pub mod arrow;
pub mod arrow_box;
pub mod one_handle;
pub mod permutation_box;
pub mod zero_handle;

use crate::automaton::Edge;
use crate::events::{Event, EventSink};
pub use arena::{ArrowArena, ArrowId};
pub use arrow::{Arrow, DegenerateArrow};
pub use arrow_box::ArrowBox;
pub use one_handle::OneHandle;
pub use permutation_box::PermutationBox;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
pub use zero_handle::{RunOptions, ZeroHandle};

/// Depth reported when no arrow can reach the boundary.
pub const INFINITE_DEPTH: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum HandleKind {
    Void,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BoxSide {
    First,
    Second,
}

/// An end of a one-handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum End {
    Pre,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxLocation {
    pub handle: HandleKind,
    pub side: BoxSide,
}

impl BoxLocation {
    pub fn new(handle: HandleKind, side: BoxSide) -> Self {
        Self { handle, side }
    }
}

/// The mutable state shared by every box rewrite.
pub struct Workspace<'a> {
    pub arena: &'a mut ArrowArena,
    pub events: &'a mut dyn EventSink,
    /// Verify post-conditions after each lemma.
    pub check_invariants: bool,
}

impl<'a> Workspace<'a> {
    pub fn new(arena: &'a mut ArrowArena, events: &'a mut dyn EventSink, check_invariants: bool) -> Self {
        Self {
            arena,
            events,
            check_invariants,
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.emit(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("pairing over {actual} points does not fit a boundary of {expected} points")]
    PairingSize { expected: usize, actual: usize },

    #[error("arrow {arrow} leaves the {tracks} tracks of the {handle} handle")]
    ArrowOutOfRange {
        handle: HandleKind,
        arrow: Arrow,
        tracks: usize,
    },

    #[error("arrow {arrow} splits across edges {first:?} and {second:?} of the zero handle")]
    SplitPassage { arrow: ArrowId, first: Edge, second: Edge },

    #[error("arrow {arrow} would come back through edge {edge:?}")]
    ReturningPassage { arrow: ArrowId, edge: Edge },

    #[error("depth did not increase: {before} then {after}")]
    DepthDidNotIncrease { before: u32, after: u32 },

    #[error("arrows of finite depth remain after {rounds} rounds")]
    RoundLimit { rounds: usize },

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Arrow(#[from] DegenerateArrow),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(HandleKind::Void.to_string(), "void");
        assert_eq!(BoxSide::Second.to_string(), "second");
        assert_eq!(End::Pre.to_string(), "pre");
    }

    #[test]
    fn test_error_messages() {
        let err = HandleError::DepthDidNotIncrease { before: 3, after: 2 };
        assert_eq!(err.to_string(), "depth did not increase: 3 then 2");
        let err: HandleError = DegenerateArrow(4).into();
        assert_eq!(err.to_string(), "arrow would begin and end on track 4");
    }
}
