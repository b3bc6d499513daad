// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The four edges of the zero handle boundary.
//!
//! With `f` full tracks and `v` void tracks, boundary points are numbered
//! edge by edge:
//!
//! | edge        | points          |
//! |-------------|-----------------|
//! | `FullPre`   | `[0, f)`        |
//! | `VoidPost`  | `[f, f+v)`      |
//! | `FullPost`  | `[f+v, 2f+v)`   |
//! | `VoidPre`   | `[2f+v, 2f+2v)` |
//!
//! Each edge faces the edge two steps round, which is the other end of the
//! same one-handle.

use crate::handle::{End, HandleKind};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCountMacro, EnumIter)]
#[repr(u8)]
pub enum Edge {
    FullPre = 0,
    VoidPost = 1,
    FullPost = 2,
    VoidPre = 3,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::FullPre, Edge::VoidPost, Edge::FullPost, Edge::VoidPre];

    pub fn of(handle: HandleKind, end: End) -> Edge {
        match (handle, end) {
            (HandleKind::Full, End::Pre) => Edge::FullPre,
            (HandleKind::Void, End::Post) => Edge::VoidPost,
            (HandleKind::Full, End::Post) => Edge::FullPost,
            (HandleKind::Void, End::Pre) => Edge::VoidPre,
        }
    }

    pub fn handle(self) -> HandleKind {
        match self {
            Edge::FullPre | Edge::FullPost => HandleKind::Full,
            Edge::VoidPre | Edge::VoidPost => HandleKind::Void,
        }
    }

    pub fn end(self) -> End {
        match self {
            Edge::FullPre | Edge::VoidPre => End::Pre,
            Edge::FullPost | Edge::VoidPost => End::Post,
        }
    }

    /// The other end of the same one-handle.
    pub fn opposite(self) -> Edge {
        Edge::ALL[(self as usize + 2) % 4]
    }

    /// Quarter turns from `origin` round to `self`.
    pub fn turns_from(self, origin: Edge) -> usize {
        (self as usize + 4 - origin as usize) % 4
    }
}

/// Track counts of the two handles, and the point layout they imply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub void_tracks: usize,
    pub full_tracks: usize,
}

impl Boundary {
    pub fn new(void_tracks: usize, full_tracks: usize) -> Self {
        Self {
            void_tracks,
            full_tracks,
        }
    }

    pub fn point_count(&self) -> usize {
        2 * (self.void_tracks + self.full_tracks)
    }

    pub fn tracks(&self, handle: HandleKind) -> usize {
        match handle {
            HandleKind::Void => self.void_tracks,
            HandleKind::Full => self.full_tracks,
        }
    }

    pub fn edge_len(&self, edge: Edge) -> usize {
        self.tracks(edge.handle())
    }

    /// The first point of `edge`.
    pub fn start(&self, edge: Edge) -> usize {
        let (f, v) = (self.full_tracks, self.void_tracks);
        match edge {
            Edge::FullPre => 0,
            Edge::VoidPost => f,
            Edge::FullPost => f + v,
            Edge::VoidPre => 2 * f + v,
        }
    }

    /// The edge holding `point`, and the offset of the point along it.
    pub fn locate(&self, point: usize) -> (Edge, usize) {
        assert!(point < self.point_count(), "boundary point {} out of range", point);
        let edge = Edge::ALL
            .iter()
            .rev()
            .copied()
            .find(|&edge| point >= self.start(edge))
            .unwrap_or(Edge::FullPre);
        (edge, point - self.start(edge))
    }
}

/// A one-handle's strand maps, from the pre end to the post end (`right`)
/// and back (`left`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleMaps {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

impl HandleMaps {
    pub fn identity(tracks: usize) -> Self {
        Self {
            left: (0..tracks).collect(),
            right: (0..tracks).collect(),
        }
    }
}
