// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Mutation notifications.
//!
//! Every change to a zero handle is announced, in order, as an [`Event`]
//! sent to an [`EventSink`]. Events are fire-and-forget: nothing flows back
//! from a sink into the algorithm. Arrows are named by [`ArrowId`] because
//! their positions shift after every event.
//!
//! # Sinks
//!
//! - [`Discard`] drops everything.
//! - [`Recorder`] counts events per [`EventKind`], can keep a log, and can
//!   forward to another sink (a renderer, say).

pub mod statistics;

use crate::algebra::Permutation;
use crate::handle::{Arrow, ArrowId, BoxLocation, BoxSide, HandleKind};
pub use statistics::{EventKind, Statistics};
use tracing::trace;

/// One arrow crossing the zero handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub arrow: ArrowId,
    /// Boundary tracks where the arrow entered the zero handle.
    pub entry: (usize, usize),
    /// Boundary tracks, relative to the landing edge, where it left.
    pub exit: (usize, usize),
    pub destination: BoxLocation,
    /// The arrow as relabelled in its destination box.
    pub now: Arrow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A new zero handle, listed in full for a renderer to lay out.
    DrawZeroHandle {
        pairing: Vec<usize>,
        void_tracks: usize,
        full_tracks: usize,
        void_arrows: Vec<(ArrowId, Arrow)>,
        full_arrows: Vec<(ArrowId, Arrow)>,
    },
    DeleteZeroHandle,
    /// The tracks of a box were relabelled; arrows moved with their tracks.
    PermuteArrowBox {
        handle: HandleKind,
        side: BoxSide,
        permutation: Permutation,
    },
    MoveArrowInBox {
        handle: HandleKind,
        side: BoxSide,
        arrow: ArrowId,
        from: usize,
        to: usize,
    },
    /// `moving` slid past `passed`, leaving `created` behind.
    GenerateArrowAfterCrossing {
        handle: HandleKind,
        side: BoxSide,
        moving: ArrowId,
        passed: ArrowId,
        created: ArrowId,
        arrow: Arrow,
        in_lemma29: bool,
    },
    /// Two identical neighbours cancelled.
    MergeArrows {
        handle: HandleKind,
        side: BoxSide,
        first: ArrowId,
        second: ArrowId,
    },
    RemoveArrow {
        handle: HandleKind,
        side: BoxSide,
        arrow: ArrowId,
    },
    /// An arrow left the first box for the front of the second. `crossing`
    /// names the reflected arrow left at the back of the first box when the
    /// move required a crossing.
    MoveArrowToOtherBox {
        handle: HandleKind,
        arrow: ArrowId,
        now: Arrow,
        crossing: Option<ArrowId>,
    },
    MoveArrowsToFirstBox {
        handle: HandleKind,
        count: usize,
    },
    /// `removed` and its reverse `kept` met; the strands crossed instead.
    GenerateCrossing {
        handle: HandleKind,
        removed: ArrowId,
        kept: ArrowId,
        transposition: (usize, usize),
    },
    MoveArrowsThroughZeroHandle {
        handle: HandleKind,
        side: BoxSide,
        moves: Vec<Passage>,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: Event) {}
}

#[derive(Default)]
pub struct Recorder {
    statistics: Statistics,
    log: Option<Vec<Event>>,
    forward: Option<Box<dyn EventSink>>,
}

impl Recorder {
    pub fn new(keep_log: bool) -> Self {
        Self {
            statistics: Statistics::new(),
            log: keep_log.then(Vec::new),
            forward: None,
        }
    }

    pub fn forward_to(mut self, sink: Box<dyn EventSink>) -> Self {
        self.forward = Some(sink);
        self
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// The recorded events, empty unless logging was requested.
    pub fn events(&self) -> &[Event] {
        self.log.as_deref().unwrap_or(&[])
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.log.as_mut().map(std::mem::take).unwrap_or_default()
    }
}

impl EventSink for Recorder {
    fn emit(&mut self, event: Event) {
        trace!(?event, "event");
        self.statistics.record(&event);
        match (&mut self.log, &mut self.forward) {
            (Some(log), Some(forward)) => {
                log.push(event.clone());
                forward.emit(event);
            }
            (Some(log), None) => log.push(event),
            (None, Some(forward)) => forward.emit(event),
            (None, None) => {}
        }
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("statistics", &self.statistics)
            .field("logged", &self.log.as_ref().map(Vec::len))
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}
