// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Arrow diagrams on a two-handle decomposition.
//!
//! A matrix `M` over the dual ring `F2[U]/(U²)` with `M·M = U·I` describes,
//! after congruence reduction, a zero handle: a disc whose boundary points
//! are joined in pairs, with two one-handles (void and full) attached. Each
//! one-handle carries train tracks and two boxes of arrows, each arrow an
//! elementary transvection between two tracks. This crate reduces the matrix
//! to that picture and then removes every arrow by the sliding, crossing
//! and passage moves, reporting each move as an event.
//!
//! # Architecture
//!
//! ## Algebra
//!
//! [`algebra`] holds the ring, matrices over it, permutations and boundary
//! pairings. Everything else is built from these values.
//!
//! ## Reduction
//!
//! [`reduction::lemma23`] turns a validated matrix into a pairing, track
//! counts and the two initial arrow lists.
//!
//! ## Zero handle
//!
//! [`handle`] holds the mutable diagram: an arena of arrows, boxes that
//! keep them sorted ([`handle::ArrowBox::lemma29`]), one-handles that move
//! down arrows into their second box ([`handle::OneHandle::lemma30`]) and
//! the zero handle loop ([`handle::ZeroHandle::proposition28`]).
//!
//! ## Automaton
//!
//! [`automaton`] follows strands around the boundary. A strand is a
//! deterministic walk over `(edge, track)` states; binary lifting makes
//! each depth query logarithmic in the number of states.
//!
//! ## Events
//!
//! Every mutation is announced to an [`events::EventSink`], so a renderer
//! can replay the reduction without access to the diagram.
//!
//! # Entry points
//!
//! [`Session`] parses a matrix file ([`io`]), reduces it and runs the loop.
//! The `train-tracks` binary wraps a session for the command line.

pub mod algebra;
pub mod automaton;
pub mod context;
pub mod events;
pub mod handle;
pub mod io;
pub mod reduction;

pub use algebra::{Dual, DualMatrix, Pairing};
pub use context::{RunSummary, Session, SessionError, SessionOptions};
pub use events::{Event, EventSink, Recorder};
pub use handle::{HandleError, ZeroHandle, INFINITE_DEPTH};
pub use reduction::{lemma23, Reduction, ReductionError};
