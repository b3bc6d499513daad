// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Permutations of `{0..n-1}` and forward/inverse pairs of them.
//!
//! Composition reads right to left, as function composition:
//! `(p * q)[i] == p[q[i]]`. A [`BiPermutation`] keeps a permutation and
//! its inverse in step, so both directions of a lookup are O(1) and a
//! single transposition can be applied on either side in O(1).

use std::fmt;
use std::ops::{Add, Index, Mul};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("value {value} at position {position} is out of range for size {size}")]
    OutOfRange {
        position: usize,
        value: usize,
        size: usize,
    },
    #[error("value {value} appears more than once")]
    Repeated { value: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    map: Vec<usize>,
}

impl Permutation {
    pub fn identity(size: usize) -> Self {
        Self {
            map: (0..size).collect(),
        }
    }

    /// Validates that `map` is a bijection before wrapping it.
    pub fn from_vec(map: Vec<usize>) -> Result<Self, PermutationError> {
        let size = map.len();
        let mut seen = vec![false; size];
        for (position, &value) in map.iter().enumerate() {
            if value >= size {
                return Err(PermutationError::OutOfRange {
                    position,
                    value,
                    size,
                });
            }
            if seen[value] {
                return Err(PermutationError::Repeated { value });
            }
            seen[value] = true;
        }
        Ok(Self { map })
    }

    /// The identity reordered so that `less` holds between earlier and later
    /// entries wherever it is decided.
    ///
    /// `less` need not be a total order: pairs it leaves incomparable keep
    /// their relative order. This is a plain insertion sort, so the result
    /// is deterministic for any comparator.
    pub fn sorted_identity(size: usize, mut less: impl FnMut(usize, usize) -> bool) -> Self {
        let mut map: Vec<usize> = Vec::with_capacity(size);
        for value in 0..size {
            let mut position = map.len();
            while position > 0 && less(value, map[position - 1]) {
                position -= 1;
            }
            map.insert(position, value);
        }
        Self { map }
    }

    pub fn size(&self) -> usize {
        self.map.len()
    }

    pub fn apply(&self, value: usize) -> usize {
        self[value]
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, &v)| i == v)
    }

    pub fn inverse(&self) -> Self {
        let mut map = vec![0; self.map.len()];
        for (i, &v) in self.map.iter().enumerate() {
            map[v] = i;
        }
        Self { map }
    }

    /// Replaces `self` with `other * self`.
    pub fn pre_mult(&mut self, other: &Permutation) -> &mut Self {
        assert_eq!(self.size(), other.size(), "permutation sizes differ");
        for entry in self.map.iter_mut() {
            *entry = other[*entry];
        }
        self
    }

    /// Swaps the images of `a` and `b`; this is `self * (a b)`.
    pub fn swap(&mut self, (a, b): (usize, usize)) -> &mut Self {
        assert!(a < self.size() && b < self.size(), "transposition ({}, {}) out of range", a, b);
        self.map.swap(a, b);
        self
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.map
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, value: usize) -> &usize {
        &self.map[value]
    }
}

impl Mul for &Permutation {
    type Output = Permutation;

    fn mul(self, other: &Permutation) -> Permutation {
        assert_eq!(self.size(), other.size(), "permutation sizes differ");
        Permutation {
            map: other.map.iter().map(|&i| self.map[i]).collect(),
        }
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.map)
    }
}

/// A permutation together with its inverse.
///
/// `post(v)` maps forward and `pre(v)` maps back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiPermutation {
    per: Permutation,
    inv: Permutation,
}

impl BiPermutation {
    pub fn identity(size: usize) -> Self {
        Self {
            per: Permutation::identity(size),
            inv: Permutation::identity(size),
        }
    }

    pub fn new(per: Permutation) -> Self {
        let inv = per.inverse();
        Self { per, inv }
    }

    /// The pair whose forward direction is `per⁻¹`.
    pub fn from_inverse(per: Permutation) -> Self {
        let inv = per.inverse();
        Self { per: inv, inv: per }
    }

    pub fn size(&self) -> usize {
        self.per.size()
    }

    pub fn post(&self, value: usize) -> usize {
        self.per[value]
    }

    pub fn pre(&self, value: usize) -> usize {
        self.inv[value]
    }

    /// Applies the transposition before the existing permutation.
    pub fn pre_add(&mut self, (a, b): (usize, usize)) {
        self.per.swap((a, b));
        let (x, y) = (self.per[a], self.per[b]);
        self.inv.swap((x, y));
    }

    /// Applies the transposition after the existing permutation.
    pub fn post_add(&mut self, (a, b): (usize, usize)) {
        let (x, y) = (self.inv[a], self.inv[b]);
        self.per.swap((x, y));
        self.inv.swap((a, b));
    }

    pub fn inverse(&mut self) {
        std::mem::swap(&mut self.per, &mut self.inv);
    }

    pub fn permutation(&self) -> &Permutation {
        &self.per
    }

    pub fn inverse_permutation(&self) -> &Permutation {
        &self.inv
    }

    pub fn is_identity(&self) -> bool {
        self.per.is_identity()
    }
}

impl Add for &BiPermutation {
    type Output = BiPermutation;

    /// `a + b` applies `a` first, then `b`.
    fn add(self, other: &BiPermutation) -> BiPermutation {
        BiPermutation {
            per: &other.per * &self.per,
            inv: &self.inv * &other.inv,
        }
    }
}
