// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integration tests for the box and handle rewrites.
//!
//! Reading a handle as a product of transvections and permutations over
//! GF(2), sorting a box and putting a handle in canonical form must leave
//! that product unchanged.

mod common;

use common::{arrow, arrows_word, handle_word, straight};
use proptest::prelude::*;
use train_tracks::events::{EventKind, Recorder};
use train_tracks::handle::{
    Arrow, ArrowArena, ArrowBox, BoxLocation, BoxSide, HandleKind, OneHandle, Workspace,
};

fn up_arrows() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..=5).prop_flat_map(|n| {
        let up = (1..n).prop_flat_map(|b| (Just(b), 0..b));
        (Just(n), prop::collection::vec(up, 0..8))
    })
}

fn any_arrows() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..=4).prop_flat_map(|n| {
        let pair = (0..n, 1..n).prop_map(move |(b, shift)| (b, (b + shift) % n));
        (Just(n), prop::collection::vec(pair, 0..6))
    })
}

fn box_of(arena: &mut ArrowArena, tracks: usize, arrows: &[(usize, usize)]) -> ArrowBox {
    let mut result = ArrowBox::new(BoxLocation::new(HandleKind::Void, BoxSide::First), tracks);
    for &(b, e) in arrows {
        result.push_back(arena.allocate(arrow(b, e)));
    }
    result
}

#[test]
fn test_lemma29_reports_generation_and_merge() {
    let mut arena = ArrowArena::new();
    let mut recorder = Recorder::new(true);
    // (3, 1) slides past (1, 0) leaving (3, 0), which cancels the last arrow.
    let mut arrow_box = box_of(&mut arena, 4, &[(3, 1), (1, 0), (3, 0)]);
    let before = arrows_word(4, arrow_box.arrows(&arena).collect::<Vec<_>>().into_iter());
    let checkpoint = arrow_box.len();
    let mut end = checkpoint;
    arrow_box
        .lemma29(&mut Workspace::new(&mut arena, &mut recorder, true), 0, &mut end, checkpoint)
        .unwrap();
    let after: Vec<Arrow> = arrow_box.arrows(&arena).collect();
    assert_eq!(after, vec![arrow(1, 0), arrow(3, 1)]);
    assert_eq!(arrows_word(4, after.into_iter()), before);
    assert_eq!(recorder.statistics().get(EventKind::GenerateArrowAfterCrossing), 1);
    assert_eq!(recorder.statistics().get(EventKind::MergeArrows), 1);
    assert_eq!(recorder.statistics().get(EventKind::MoveArrowInBox), 1);
    assert_eq!(arena.live_count(), 2);
}

proptest! {
    /// Sorting one box orders it by length, drops duplicates and keeps its
    /// product.
    #[test]
    fn prop_lemma29_sorts_and_conserves((n, arrows) in up_arrows()) {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(false);
        let mut arrow_box = box_of(&mut arena, n, &arrows);
        let before: Vec<Arrow> = arrow_box.arrows(&arena).collect();

        let checkpoint = arrow_box.len();
        let mut end = checkpoint;
        let result = arrow_box.lemma29(&mut Workspace::new(&mut arena, &mut recorder, true), 0, &mut end, checkpoint);
        prop_assert!(result.is_ok(), "{:?}", result);
        prop_assert_eq!(end, arrow_box.len());

        let after: Vec<Arrow> = arrow_box.arrows(&arena).collect();
        prop_assert_eq!(arrows_word(n, after.iter().copied()), arrows_word(n, before.iter().copied()));
        prop_assert!(after.iter().all(Arrow::is_up));
        prop_assert!(after.windows(2).all(|w| w[0].length() <= w[1].length()));
        for (i, a) in after.iter().enumerate() {
            prop_assert!(!after[i + 1..].contains(a), "duplicate {}", a);
        }
        prop_assert_eq!(arena.live_count(), after.len());
    }

    /// Canonical form keeps the handle's product, leaves only up arrows in
    /// the first box and sends only down arrows to the second.
    #[test]
    fn prop_lemma30_conserves_word((n, arrows) in any_arrows()) {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(false);
        let mut handle = OneHandle::new(HandleKind::Full, n);
        for &(b, e) in &arrows {
            let id = arena.allocate(arrow(b, e));
            handle.arrow_box_mut(BoxSide::First).push_back(id);
        }
        let before = handle_word(&handle, &arena);

        let moved = handle
            .lemma30(&mut Workspace::new(&mut arena, &mut recorder, true), &straight(n))
            .unwrap();

        prop_assert_eq!(handle_word(&handle, &arena), before);
        prop_assert!(handle.first().arrows(&arena).all(|a| a.is_up()));
        prop_assert_eq!(handle.second().len(), moved);
        prop_assert!(handle.second().arrows(&arena).all(|a| a.is_down()));
        prop_assert_eq!(arena.live_count(), handle.arrow_count());
    }

    /// Moving the second box back through `mid` keeps the product.
    #[test]
    fn prop_transfer_to_first_conserves_word((n, arrows) in any_arrows()) {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(false);
        let mut handle = OneHandle::new(HandleKind::Full, n);
        for &(b, e) in &arrows {
            let id = arena.allocate(arrow(b, e));
            handle.arrow_box_mut(BoxSide::First).push_back(id);
        }
        handle
            .lemma30(&mut Workspace::new(&mut arena, &mut recorder, false), &straight(n))
            .unwrap();
        let before = handle_word(&handle, &arena);

        handle.transfer_to_first(&mut Workspace::new(&mut arena, &mut recorder, false));

        prop_assert!(handle.second().is_empty());
        prop_assert_eq!(handle_word(&handle, &arena), before);
    }
}
