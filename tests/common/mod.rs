// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use proptest::prelude::*;
use train_tracks::algebra::{Dual, DualMatrix, Pairing, Permutation};
use train_tracks::automaton::{Automaton, Boundary, HandleMaps};
use train_tracks::handle::{Arrow, ArrowArena, OneHandle, PermutationBox};

/// A square matrix over GF(2), as rows of bits.
pub type Bits = Vec<Vec<bool>>;

pub fn arrow(begin: usize, end: usize) -> Arrow {
    Arrow::new(begin, end).unwrap()
}

pub fn pairing(map: Vec<usize>) -> Pairing {
    Pairing::from_permutation(Permutation::from_vec(map).unwrap()).unwrap()
}

/// No void tracks, and full pre point `p` pairs with full post point
/// `p + tracks`: strands never split.
pub fn straight(tracks: usize) -> Automaton {
    let map: Vec<usize> = (0..2 * tracks).map(|p| (p + tracks) % (2 * tracks)).collect();
    Automaton::build(
        &pairing(map),
        Boundary::new(0, tracks),
        HandleMaps::identity(0),
        HandleMaps::identity(tracks),
    )
}

pub fn identity_bits(n: usize) -> Bits {
    (0..n).map(|i| (0..n).map(|j| i == j).collect()).collect()
}

pub fn multiply(a: &Bits, b: &Bits) -> Bits {
    let n = a.len();
    (0..n)
        .map(|i| (0..n).map(|j| (0..n).fold(false, |acc, k| acc ^ (a[i][k] & b[k][j]))).collect())
        .collect()
}

/// Gauss-Jordan elimination; `None` if `a` is singular.
pub fn inverse(a: &Bits) -> Option<Bits> {
    let n = a.len();
    let mut m = a.clone();
    let mut inv = identity_bits(n);
    for col in 0..n {
        let pivot = (col..n).find(|&r| m[r][col])?;
        m.swap(col, pivot);
        inv.swap(col, pivot);
        for r in 0..n {
            if r != col && m[r][col] {
                for c in 0..n {
                    let (x, y) = (m[col][c], inv[col][c]);
                    m[r][c] ^= x;
                    inv[r][c] ^= y;
                }
            }
        }
    }
    Some(inv)
}

/// `[[0, C], [U·C⁻¹, 0]]`, which squares to `U·I` and is block upper
/// triangular for every split.
pub fn block_matrix(c: &Bits) -> DualMatrix {
    let n = c.len();
    let inv = inverse(c).expect("block matrix needs an invertible C");
    DualMatrix::from_fn(2 * n, |i, j| {
        if i < n && j >= n && c[i][j - n] {
            Dual::ONE
        } else if i >= n && j < n && inv[i - n][j] {
            Dual::U
        } else {
            Dual::ZERO
        }
    })
}

/// Invertible `n × n` matrices, as lower times upper unitriangular.
pub fn invertible(n: usize) -> impl Strategy<Value = Bits> {
    (
        prop::collection::vec(any::<bool>(), n * n),
        prop::collection::vec(any::<bool>(), n * n),
    )
        .prop_map(move |(below, above)| {
            let lower: Bits = (0..n)
                .map(|i| (0..n).map(|j| i == j || (j < i && below[i * n + j])).collect())
                .collect();
            let upper: Bits = (0..n)
                .map(|i| (0..n).map(|j| i == j || (j > i && above[i * n + j])).collect())
                .collect();
            multiply(&lower, &upper)
        })
}

fn through_box(v: &[bool], permutation: &PermutationBox) -> Vec<bool> {
    let mut out = vec![false; v.len()];
    for (x, &bit) in v.iter().enumerate() {
        out[permutation.post(x)] = bit;
    }
    out
}

fn through_arrows(v: &mut [bool], arrows: impl Iterator<Item = Arrow>) {
    for arrow in arrows {
        let (b, e) = arrow.tracks();
        let bit = v[b];
        v[e] ^= bit;
    }
}

/// Images of the unit row vectors under a sequence of arrows.
pub fn arrows_word(tracks: usize, arrows: impl Iterator<Item = Arrow> + Clone) -> Bits {
    (0..tracks)
        .map(|x| {
            let mut v = vec![false; tracks];
            v[x] = true;
            through_arrows(&mut v, arrows.clone());
            v
        })
        .collect()
}

/// Images of the unit row vectors under `Pre · W0 · Mid · W1 · Post`.
pub fn handle_word(handle: &OneHandle, arena: &ArrowArena) -> Bits {
    let n = handle.track_count();
    (0..n)
        .map(|x| {
            let mut v = vec![false; n];
            v[x] = true;
            let mut v = through_box(&v, handle.pre());
            through_arrows(&mut v, handle.first().arrows(arena));
            let mut v = through_box(&v, handle.mid());
            through_arrows(&mut v, handle.second().arrows(arena));
            through_box(&v, handle.post())
        })
        .collect()
}

/// A fixed-point free involution on `2 * half` points.
pub fn fixed_point_free(half: usize) -> impl Strategy<Value = Pairing> {
    Just((0..2 * half).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(|points| {
            let mut map = vec![0; points.len()];
            for pair in points.chunks(2) {
                map[pair[0]] = pair[1];
                map[pair[1]] = pair[0];
            }
            pairing(map)
        })
}

pub fn shuffled(size: usize) -> impl Strategy<Value = Permutation> {
    Just((0..size).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(|map| Permutation::from_vec(map).unwrap())
}
