// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Congruence reduction of a matrix over the dual ring.
//!
//! [`lemma23`] takes a matrix `M` of size `2n` with `M·M = U·I` whose
//! constant part is strictly upper triangular on the blocks cut at `k`, `n`
//! and `n + k`. It repeatedly picks a live pair `(i, j)` with a constant
//! entry and clears the rest of row `i` and column `j` by elementary
//! congruences, then retires both indices. Each congruence by a constant
//! between two indices of the same block records an arrow; the pattern of
//! pivots left in the reduced matrix gives the boundary pairing.
//!
//! | block        | handle | arrow from `(from, to)`      | cursor   |
//! |--------------|--------|------------------------------|----------|
//! | `[0, k)`     | full   | `(from, to)`                 | advances |
//! | `[k, n)`     | void   | `(n-1-from, n-1-to)`         | stays    |
//! | `[n, n+k)`   | full   | `(n+k-1-from, n+k-1-to)`     | stays    |
//! | `[n+k, 2n)`  | void   | `(from-n-k, to-n-k)`         | advances |

use crate::algebra::{Dual, DualMatrix, Pairing};
use crate::handle::{Arrow, DegenerateArrow};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputDefect {
    #[error("split {k} does not fit a matrix of size {size}")]
    BadSplit { k: usize, size: usize },

    #[error("matrix size {0} is odd")]
    OddSize(usize),

    #[error("matrix does not square to U times the identity")]
    NotUIdentity,

    #[error("constant entry at ({row}, {column}) is not strictly upper triangular on the blocks")]
    NotTriangular { row: usize, column: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReductionError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputDefect),

    #[error("no eliminable pair among {} live indices", .live.len())]
    NoEliminablePair { live: Vec<usize> },

    #[error(transparent)]
    Arrow(#[from] DegenerateArrow),
}

/// The result of [`lemma23`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub pairing: Pairing,
    pub void_tracks: usize,
    pub full_tracks: usize,
    pub void_arrows: Vec<Arrow>,
    pub full_arrows: Vec<Arrow>,
    /// The matrix after every congruence.
    pub matrix: DualMatrix,
}

/// Checks the preconditions in order, reporting the first failure.
pub fn check_input(matrix: &DualMatrix, k: usize) -> Result<(), InputDefect> {
    let size = matrix.size();
    let n = size / 2;
    if k > n {
        return Err(InputDefect::BadSplit { k, size });
    }
    if size % 2 != 0 {
        return Err(InputDefect::OddSize(size));
    }
    if !(matrix * matrix).is_u_identity() {
        return Err(InputDefect::NotUIdentity);
    }
    for row in 0..size {
        let bound = if row < k {
            k
        } else if row < n {
            n
        } else if row < n + k {
            n + k
        } else {
            size
        };
        if let Some(column) = (0..bound).find(|&column| matrix[(row, column)].has_constant()) {
            return Err(InputDefect::NotTriangular { row, column });
        }
    }
    Ok(())
}

pub fn lemma23(matrix: DualMatrix, k: usize) -> Result<Reduction, ReductionError> {
    check_input(&matrix, k)?;
    let size = matrix.size();
    let n = size / 2;
    let mut reducer = Reducer {
        matrix,
        live: (0..size).collect(),
        n,
        k,
        void_arrows: Vec::new(),
        full_arrows: Vec::new(),
        void_cursor: 0,
        full_cursor: 0,
    };
    while !reducer.live.is_empty() {
        let (i, j) = reducer
            .find_pair()
            .ok_or_else(|| ReductionError::NoEliminablePair {
                live: reducer.live.clone(),
            })?;
        reducer.eliminate(i, j)?;
    }
    debug!(
        void = reducer.void_arrows.len(),
        full = reducer.full_arrows.len(),
        "matrix reduced"
    );
    Ok(Reduction {
        pairing: Pairing::from_matrix(&reducer.matrix, k),
        void_tracks: n - k,
        full_tracks: k,
        void_arrows: reducer.void_arrows,
        full_arrows: reducer.full_arrows,
        matrix: reducer.matrix,
    })
}

struct Reducer {
    matrix: DualMatrix,
    /// Indices not yet retired, in increasing order.
    live: Vec<usize>,
    n: usize,
    k: usize,
    void_arrows: Vec<Arrow>,
    full_arrows: Vec<Arrow>,
    void_cursor: usize,
    full_cursor: usize,
}

impl Reducer {
    /// The first live pair with a constant entry, diagonal by diagonal.
    fn find_pair(&self) -> Option<(usize, usize)> {
        let live = &self.live;
        (1..live.len()).find_map(|offset| {
            live.iter()
                .zip(&live[offset..])
                .map(|(&i, &j)| (i, j))
                .find(|&(i, j)| self.matrix[(i, j)].has_constant())
        })
    }

    fn eliminate(&mut self, i: usize, j: usize) -> Result<(), ReductionError> {
        let live = self.live.clone();
        let i_at = live.iter().position(|&x| x == i).unwrap_or(live.len());
        let j_at = live.iter().position(|&x| x == j).unwrap_or(live.len());

        for &c in &live[j_at + 1..] {
            if self.matrix[(i, c)].has_constant() {
                self.conjugate(j, c, Dual::ONE);
                self.record(j, c)?;
            }
        }
        for &c in &live {
            if self.matrix[(i, c)].has_u() {
                self.conjugate(j, c, Dual::U);
            }
        }
        for &r in &live[..i_at] {
            if self.matrix[(r, j)].has_constant() {
                self.conjugate(r, i, Dual::ONE);
                self.record(r, i)?;
            }
        }
        for &r in &live {
            if self.matrix[(r, j)].has_u() {
                self.conjugate(r, i, Dual::U);
            }
        }

        self.live.retain(|&x| x != i && x != j);
        Ok(())
    }

    /// `col b += factor·col a`, then `row a += factor·row b`, over live indices.
    fn conjugate(&mut self, a: usize, b: usize, factor: Dual) {
        debug!("{}({}, {})", if factor == Dual::U { "U" } else { "1" }, a, b);
        for &x in &self.live {
            let add = self.matrix[(x, a)] * factor;
            self.matrix[(x, b)] += add;
        }
        for &x in &self.live {
            let add = self.matrix[(b, x)] * factor;
            self.matrix[(a, x)] += add;
        }
    }

    fn record(&mut self, from: usize, to: usize) -> Result<(), DegenerateArrow> {
        let (n, k) = (self.n, self.k);
        let within = |lo: usize, hi: usize| (lo..hi).contains(&from) && (lo..hi).contains(&to);
        if within(0, k) {
            self.full_arrows.insert(self.full_cursor, Arrow::new(from, to)?);
            self.full_cursor += 1;
        } else if within(k, n) {
            self.void_arrows.insert(self.void_cursor, Arrow::new(n - 1 - from, n - 1 - to)?);
        } else if within(n, n + k) {
            self.full_arrows
                .insert(self.full_cursor, Arrow::new(n + k - 1 - from, n + k - 1 - to)?);
        } else if within(n + k, 2 * n) {
            self.void_arrows.insert(self.void_cursor, Arrow::new(from - n - k, to - n - k)?);
            self.void_cursor += 1;
        }
        Ok(())
    }
}
