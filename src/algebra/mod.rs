// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Algebraic building blocks: the ring `F2[U]/(U²)`, square matrices over
//! it, permutations and the boundary pairing.

pub mod dual;
pub mod matrix;
pub mod pairing;
pub mod permutation;

pub use dual::Dual;
pub use matrix::DualMatrix;
pub use pairing::{matrix_to_boundary_index, Pairing};
pub use permutation::{BiPermutation, Permutation, PermutationError};
