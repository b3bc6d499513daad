// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Strand-pair automaton of a zero handle.
//!
//! A state is an ordered pair of boundary points on one edge. Following both
//! points through the boundary pairing either brings them together onto one
//! edge, and then through its one-handle to the opposite edge (the next
//! state), or splits them onto two edges. A split is absorbed into sentinel
//! `0` when the first strand's edge comes first, counting round from the
//! starting edge, and into sentinel `1` otherwise.
//!
//! # Architecture
//!
//! The one-step table is squared repeatedly ([`DoublingTable`]) so each query
//! costs one lookup per doubling level:
//!
//! - which way a pair of strands eventually splits (clockwise or not);
//! - after how many passes they split, signed by direction: the *depth*.
//!
//! The table is a pure function of the pairing and the two handles' strand
//! maps. It has no incremental update; the owner rebuilds it whenever a
//! handle permutation changes.

pub mod boundary;
pub mod markov;

use crate::algebra::Pairing;
use crate::handle::{End, HandleKind};
pub use boundary::{Boundary, Edge, HandleMaps};
pub use markov::{DoublingTable, Transition};
use tracing::debug;

const CLOCKWISE: usize = 0;
const ANTICLOCKWISE: usize = 1;
const SENTINELS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Geometry {
    boundary: Boundary,
    void: HandleMaps,
    full: HandleMaps,
}

impl Geometry {
    fn maps(&self, handle: HandleKind) -> &HandleMaps {
        match handle {
            HandleKind::Void => &self.void,
            HandleKind::Full => &self.full,
        }
    }

    fn state_count(&self) -> usize {
        let (v, f) = (self.boundary.void_tracks, self.boundary.full_tracks);
        SENTINELS + 2 * (v * v + f * f)
    }

    /// The state of boundary offsets `(a, b)` on `edge`.
    fn state_at(&self, edge: Edge, a: usize, b: usize) -> usize {
        let (v, f) = (self.boundary.void_tracks, self.boundary.full_tracks);
        let offset = match edge {
            Edge::FullPre => 0,
            Edge::VoidPost => f * f,
            Edge::FullPost => f * f + v * v,
            Edge::VoidPre => 2 * f * f + v * v,
        };
        SENTINELS + a * self.boundary.edge_len(edge) + b + offset
    }

    /// Follows the strand at `offset` on `edge` through its one-handle.
    fn through(&self, edge: Edge, offset: usize) -> usize {
        let maps = self.maps(edge.handle());
        match edge.end() {
            End::Pre => maps.right[offset],
            End::Post => maps.left[offset],
        }
    }

    fn one_step(&self, pairing: &Pairing) -> Transition {
        let mut next = vec![CLOCKWISE; self.state_count()];
        next[ANTICLOCKWISE] = ANTICLOCKWISE;
        for edge in [Edge::FullPost, Edge::VoidPost, Edge::FullPre, Edge::VoidPre] {
            let start = self.boundary.start(edge);
            let len = self.boundary.edge_len(edge);
            let exits: Vec<(Edge, usize)> = (0..len)
                .map(|a| self.boundary.locate(pairing.partner(start + a)))
                .collect();
            for (a, &(edge_a, out_a)) in exits.iter().enumerate() {
                for (b, &(edge_b, out_b)) in exits.iter().enumerate() {
                    next[self.state_at(edge, a, b)] = if edge_a == edge_b {
                        self.state_at(
                            edge_a.opposite(),
                            self.through(edge_a, out_a),
                            self.through(edge_a, out_b),
                        )
                    } else if edge_a.turns_from(edge) < edge_b.turns_from(edge) {
                        CLOCKWISE
                    } else {
                        ANTICLOCKWISE
                    };
                }
            }
        }
        Transition::new(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    geometry: Geometry,
    table: DoublingTable,
}

impl Automaton {
    /// # Panics
    ///
    /// Panics if the pairing or the maps do not fit the boundary.
    pub fn build(pairing: &Pairing, boundary: Boundary, void: HandleMaps, full: HandleMaps) -> Self {
        assert_eq!(pairing.size(), boundary.point_count(), "pairing does not fit the boundary");
        assert_eq!(void.left.len(), boundary.void_tracks, "void maps do not fit the boundary");
        assert_eq!(full.left.len(), boundary.full_tracks, "full maps do not fit the boundary");
        let geometry = Geometry {
            boundary,
            void,
            full,
        };
        let states = geometry.state_count();
        let table = DoublingTable::new(geometry.one_step(pairing), states - 1);
        debug!(states, levels = table.level_count(), "automaton rebuilt");
        Self { geometry, table }
    }

    pub fn boundary(&self) -> Boundary {
        self.geometry.boundary
    }

    pub fn table(&self) -> &DoublingTable {
        &self.table
    }

    /// The state of a pair of tracks read at the post side of `handle`,
    /// looked at from its `end`.
    pub fn state(&self, handle: HandleKind, end: End, (i, j): (usize, usize)) -> usize {
        let edge = Edge::of(handle, end);
        match end {
            End::Pre => {
                let left = &self.geometry.maps(handle).left;
                self.geometry.state_at(edge, left[i], left[j])
            }
            End::Post => self.geometry.state_at(edge, i, j),
        }
    }

    pub fn ends_clockwise(&self, handle: HandleKind, end: End, tracks: (usize, usize)) -> bool {
        self.table.max_value(self.state(handle, end, tracks)) == CLOCKWISE
    }

    pub fn ends_anticlockwise(&self, handle: HandleKind, end: End, tracks: (usize, usize)) -> bool {
        self.table.max_value(self.state(handle, end, tracks)) == ANTICLOCKWISE
    }

    /// Signed number of passes before the two strands split: positive when
    /// they split clockwise, zero when they never do.
    pub fn depth(&self, handle: HandleKind, end: End, tracks: (usize, usize)) -> i64 {
        let (steps, clockwise) = self.table.weight(self.state(handle, end, tracks));
        if clockwise {
            steps as i64
        } else {
            -(steps as i64)
        }
    }
}
