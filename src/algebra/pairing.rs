// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The boundary pairing: an involution on the `2n` boundary points.

use super::{DualMatrix, Permutation};

/// Maps a matrix index onto a boundary position.
///
/// The first `k` indices stay put, the next `n - k` are reflected, the
/// following `k` are reflected in their own block and the rest stay put.
pub fn matrix_to_boundary_index(n: usize, k: usize, i: usize) -> usize {
    if i < k {
        i
    } else if i < n {
        k + n - i - 1
    } else if i < n + k {
        n + n + k - i - 1
    } else {
        i
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    per: Permutation,
}

impl Pairing {
    /// Every point paired with itself.
    pub fn identity(size: usize) -> Self {
        Self {
            per: Permutation::identity(size),
        }
    }

    /// Reads the pairing from the constant `1` entries above the diagonal.
    ///
    /// Each such entry `(i, j)` swaps the images of the boundary positions
    /// of `i` and `j`. On a fully reduced matrix every index appears in
    /// exactly one such entry, so the result is a fixed-point free involution.
    pub fn from_matrix(matrix: &DualMatrix, k: usize) -> Self {
        let size = matrix.size();
        let n = size / 2;
        assert!(k <= n, "split {} beyond half of {}", k, size);
        let mut per = Permutation::identity(size);
        for j in 1..size {
            for i in 0..j {
                if matrix[(i, j)].has_constant() {
                    per.swap((
                        matrix_to_boundary_index(n, k, i),
                        matrix_to_boundary_index(n, k, j),
                    ));
                }
            }
        }
        Self { per }
    }

    /// Wraps a permutation; `None` unless it is an involution.
    pub fn from_permutation(per: Permutation) -> Option<Self> {
        let pairing = Self { per };
        pairing.is_involution().then_some(pairing)
    }

    pub fn size(&self) -> usize {
        self.per.size()
    }

    pub fn partner(&self, point: usize) -> usize {
        self.per[point]
    }

    /// Exchanges the points `a` and `b`, each taking over the other's partner.
    pub fn swap_points(&mut self, (a, b): (usize, usize)) {
        self.per.swap((a, b));
        let (x, y) = (self.per[a], self.per[b]);
        self.per.swap((x, y));
    }

    pub fn is_involution(&self) -> bool {
        (0..self.size()).all(|i| self.per[self.per[i]] == i)
    }

    pub fn is_fixed_point_free(&self) -> bool {
        (0..self.size()).all(|i| self.per[i] != i)
    }

    pub fn as_slice(&self) -> &[usize] {
        self.per.as_slice()
    }
}
