// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A strand permutation sitting between two arrow boxes.

use crate::algebra::BiPermutation;

/// The `post` direction maps a track on the box's left to the track it
/// reaches on the right; `pre` maps back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationBox {
    permutation: BiPermutation,
}

impl PermutationBox {
    pub fn new(track_count: usize) -> Self {
        Self {
            permutation: BiPermutation::identity(track_count),
        }
    }

    pub fn from_bi_permutation(permutation: BiPermutation) -> Self {
        Self { permutation }
    }

    pub fn track_count(&self) -> usize {
        self.permutation.size()
    }

    pub fn pre(&self, track: usize) -> usize {
        self.permutation.pre(track)
    }

    pub fn post(&self, track: usize) -> usize {
        self.permutation.post(track)
    }

    /// Composes `other` after (`after == true`) or before the current strands.
    pub fn permute(&mut self, other: &BiPermutation, after: bool) {
        assert_eq!(other.size(), self.track_count(), "permutation box size mismatch");
        self.permutation = if after {
            &self.permutation + other
        } else {
            other + &self.permutation
        };
    }

    /// Applies one transposition after or before the current strands.
    pub fn transpose(&mut self, pair: (usize, usize), after: bool) {
        if after {
            self.permutation.post_add(pair);
        } else {
            self.permutation.pre_add(pair);
        }
    }

    pub fn bi_permutation(&self) -> &BiPermutation {
        &self.permutation
    }
}
