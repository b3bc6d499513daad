// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integration tests for matrix reduction, from text to zero handle.

mod common;

use common::{block_matrix, identity_bits, invertible};
use proptest::prelude::*;
use train_tracks::io::{parse_matrix, to_text, MatrixInput};
use train_tracks::reduction::{check_input, lemma23, InputDefect};
use train_tracks::{ReductionError, ZeroHandle};

#[test]
fn test_identity_block_has_no_arrows() {
    let reduction = lemma23(block_matrix(&identity_bits(2)), 0).unwrap();
    assert!(reduction.void_arrows.is_empty());
    assert!(reduction.full_arrows.is_empty());
    assert_eq!(reduction.pairing.as_slice(), &[3, 2, 1, 0]);
}

#[test]
fn test_text_round_trip_reduces_alike() {
    let c = vec![vec![true, true, false], vec![false, true, true], vec![false, false, true]];
    let input = MatrixInput {
        k: 1,
        matrix: block_matrix(&c),
    };
    let reparsed = parse_matrix(&to_text(&input)).unwrap();
    assert_eq!(reparsed, input);
    assert_eq!(
        lemma23(reparsed.matrix, reparsed.k).unwrap(),
        lemma23(input.matrix, input.k).unwrap()
    );
}

#[test]
fn test_defects_are_reported_before_reduction() {
    let matrix = block_matrix(&identity_bits(2));
    assert_eq!(check_input(&matrix, 3), Err(InputDefect::BadSplit { k: 3, size: 4 }));
    assert_eq!(
        lemma23(matrix, 3).unwrap_err(),
        ReductionError::InvalidInput(InputDefect::BadSplit { k: 3, size: 4 })
    );
}

fn block_instances() -> impl Strategy<Value = (Vec<Vec<bool>>, usize)> {
    (1usize..=4).prop_flat_map(|n| (invertible(n), 0..=n))
}

proptest! {
    /// Every valid block matrix reduces to a pairing with arrows in range.
    #[test]
    fn prop_block_matrices_reduce((c, k) in block_instances()) {
        let n = c.len();
        let matrix = block_matrix(&c);
        prop_assert_eq!(check_input(&matrix, k), Ok(()));

        let reduction = lemma23(matrix, k).unwrap();
        prop_assert_eq!(reduction.full_tracks, k);
        prop_assert_eq!(reduction.void_tracks, n - k);
        prop_assert_eq!(reduction.pairing.size(), 2 * n);
        prop_assert!(reduction.pairing.is_involution());
        prop_assert!(reduction.pairing.is_fixed_point_free());
        for arrow in &reduction.void_arrows {
            prop_assert!(arrow.begin() < n - k && arrow.end() < n - k);
        }
        for arrow in &reduction.full_arrows {
            prop_assert!(arrow.begin() < k && arrow.end() < k);
        }

        let zero = ZeroHandle::from_reduction(&reduction).unwrap();
        prop_assert_eq!(
            zero.arrow_count(),
            reduction.void_arrows.len() + reduction.full_arrows.len()
        );
    }
}
