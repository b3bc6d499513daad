// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A one-handle: `pre | first | mid | second | post`.
//!
//! Track numbers inside each arrow box are local to that box; the
//! permutation boxes carry them across. Reading the handle as a GF(2)
//! product, `Pre · W0 · Mid · W1 · Post`, every operation here except
//! [`OneHandle::remove_depth`] leaves the product unchanged.
//!
//! # Canonical form
//!
//! [`OneHandle::lemma30`] pushes every down arrow of the first box either
//! into a crossing (a transposition absorbed into `mid`) or through `mid`
//! into the second box. Afterwards the first box holds only up arrows and
//! everything it sent to the second box is down.

use super::{
    Arrow, ArrowArena, ArrowBox, ArrowId, BoxLocation, BoxSide, End, HandleError, HandleKind,
    PermutationBox, Workspace, INFINITE_DEPTH,
};
use crate::algebra::{BiPermutation, Permutation};
use crate::automaton::{Automaton, HandleMaps};
use crate::events::Event;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHandle {
    kind: HandleKind,
    track_count: usize,
    pre: PermutationBox,
    first: ArrowBox,
    mid: PermutationBox,
    second: ArrowBox,
    post: PermutationBox,
}

impl OneHandle {
    pub fn new(kind: HandleKind, track_count: usize) -> Self {
        Self {
            kind,
            track_count,
            pre: PermutationBox::new(track_count),
            first: ArrowBox::new(BoxLocation::new(kind, BoxSide::First), track_count),
            mid: PermutationBox::new(track_count),
            second: ArrowBox::new(BoxLocation::new(kind, BoxSide::Second), track_count),
            post: PermutationBox::new(track_count),
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn track_count(&self) -> usize {
        self.track_count
    }

    pub fn pre(&self) -> &PermutationBox {
        &self.pre
    }

    pub fn mid(&self) -> &PermutationBox {
        &self.mid
    }

    pub fn post(&self) -> &PermutationBox {
        &self.post
    }

    pub fn first(&self) -> &ArrowBox {
        &self.first
    }

    pub fn second(&self) -> &ArrowBox {
        &self.second
    }

    pub fn arrow_box(&self, side: BoxSide) -> &ArrowBox {
        match side {
            BoxSide::First => &self.first,
            BoxSide::Second => &self.second,
        }
    }

    pub fn arrow_box_mut(&mut self, side: BoxSide) -> &mut ArrowBox {
        match side {
            BoxSide::First => &mut self.first,
            BoxSide::Second => &mut self.second,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    pub fn arrow_count(&self) -> usize {
        self.first.len() + self.second.len()
    }

    /// Strand maps across the whole handle, as the automaton reads them.
    pub fn maps(&self) -> HandleMaps {
        let n = self.track_count;
        HandleMaps {
            left: (0..n)
                .map(|v| self.pre.pre(self.mid.pre(self.post.pre(v))))
                .collect(),
            right: (0..n)
                .map(|v| self.post.post(self.mid.post(self.pre.post(v))))
                .collect(),
        }
    }

    /// Renames the tracks of one box by `p`, adjusting its neighbouring
    /// permutation boxes so every strand still ends where it did.
    pub fn permute_box(&mut self, ws: &mut Workspace, side: BoxSide, p: BiPermutation) {
        let mut inverse = p.clone();
        inverse.inverse();
        self.arrow_box(side).relabel_from(ws.arena, 0, |x| p.post(x));
        match side {
            BoxSide::First => {
                self.pre.permute(&p, true);
                self.mid.permute(&inverse, false);
            }
            BoxSide::Second => {
                self.post.permute(&inverse, false);
                self.mid.permute(&p, true);
            }
        }
        ws.emit(Event::PermuteArrowBox {
            handle: self.kind,
            side,
            permutation: p.permutation().clone(),
        });
    }

    /// Orders the strands of the first box anticlockwise and those of the
    /// second box clockwise, as seen from the zero handle.
    pub fn sort_strands(&mut self, ws: &mut Workspace, automaton: &Automaton) {
        let n = self.track_count;
        let kind = self.kind;
        let order = Permutation::sorted_identity(n, |a, b| {
            let through = |x| self.post.post(self.mid.post(x));
            automaton.ends_anticlockwise(kind, End::Pre, (through(a), through(b)))
        });
        if !order.is_identity() {
            self.permute_box(ws, BoxSide::First, BiPermutation::from_inverse(order));
        }
        let order = Permutation::sorted_identity(n, |a, b| {
            automaton.ends_clockwise(kind, End::Post, (self.post.post(a), self.post.post(b)))
        });
        if !order.is_identity() {
            self.permute_box(ws, BoxSide::Second, BiPermutation::from_inverse(order));
        }
    }

    /// Makes every arrow of the first box up, moving the rest to the front
    /// of the second box. Returns how many arrows were moved.
    pub fn lemma30(&mut self, ws: &mut Workspace, automaton: &Automaton) -> Result<usize, HandleError> {
        self.sort_strands(ws, automaton);
        let mut transferred = 0;
        let mut bound = self.first.len();
        while let Some(c) = self.last_down(ws.arena, bound) {
            bound = self.resolve(ws, c, &mut transferred)?;
        }
        let checkpoint = self.first.len();
        let mut len = checkpoint;
        self.first.lemma29(ws, 0, &mut len, checkpoint)?;
        if ws.check_invariants {
            self.check_lemma30(ws.arena, transferred)?;
        }
        Ok(transferred)
    }

    fn last_down(&self, arena: &ArrowArena, bound: usize) -> Option<usize> {
        (0..bound.min(self.first.len()))
            .rev()
            .find(|&pos| arena[self.first.get(pos)].is_down())
    }

    /// Deals with the down arrow at `c`, the last one in the first box, and
    /// returns the bound below which down arrows may remain.
    fn resolve(&mut self, ws: &mut Workspace, mut c: usize, transferred: &mut usize) -> Result<usize, HandleError> {
        let candidate = self.first.get(c);
        let (i, j) = ws.arena[candidate].tracks();
        let checkpoint = self.first.len();
        let mut len = checkpoint;
        self.first.lemma29(ws, c + 1, &mut len, checkpoint)?;
        let mut it = c + 1;
        while it < self.first.len() {
            let passed = self.first.get(it);
            let (a, b) = ws.arena[passed].tracks();
            if (a, b) == (j, i) {
                self.cross(ws, c, it, (i, j));
                return Ok(c);
            }
            let generated = if i == b {
                Some(Arrow::new(a, j)?)
            } else if j == a {
                Some(Arrow::new(i, b)?)
            } else {
                None
            };
            match generated {
                Some(arrow) => {
                    let created = ws.arena.allocate(arrow);
                    self.first.insert(it + 1, created);
                    self.first.remove(c);
                    self.first.insert(it + 1, candidate);
                    c = it + 1;
                    trace!(%arrow, "generated while resolving");
                    ws.emit(Event::GenerateArrowAfterCrossing {
                        handle: self.kind,
                        side: BoxSide::First,
                        moving: candidate,
                        passed,
                        created,
                        arrow,
                        in_lemma29: false,
                    });
                    if arrow.is_down() {
                        return Ok(it + 2);
                    }
                    it += 2;
                }
                None => it += 1,
            }
        }
        self.transfer(ws, c, (i, j), transferred)?;
        Ok(c)
    }

    /// The arrow `(i, j)` at `c` meets `(j, i)` at `it`: the strands cross.
    fn cross(&mut self, ws: &mut Workspace, c: usize, it: usize, (i, j): (usize, usize)) {
        let removed = self.first.remove(c);
        ws.arena.free(removed);
        let kept = self.first.get(it - 1);
        let swap = |x: usize| {
            if x == i {
                j
            } else if x == j {
                i
            } else {
                x
            }
        };
        self.first.relabel_from(ws.arena, it, swap);
        self.mid.transpose((i, j), false);
        trace!(i, j, "crossing");
        ws.emit(Event::GenerateCrossing {
            handle: self.kind,
            removed,
            kept,
            transposition: (i, j),
        });
    }

    /// Moves `(i, j)` from the end of the first box through `mid` to the
    /// front of the second box.
    fn transfer(
        &mut self,
        ws: &mut Workspace,
        c: usize,
        (i, j): (usize, usize),
        transferred: &mut usize,
    ) -> Result<(), HandleError> {
        let candidate = self.first.remove(c);
        let (ti, tj) = (self.mid.post(i), self.mid.post(j));
        let crossing = if ti < tj {
            ws.arena[candidate] = Arrow::new(ti, tj)?;
            None
        } else {
            let reflected = ws.arena.allocate(Arrow::new(j, i)?);
            self.first.push_back(reflected);
            self.mid.transpose((i, j), false);
            ws.arena[candidate] = Arrow::new(tj, ti)?;
            Some(reflected)
        };
        self.second.push_front(candidate);
        let now = ws.arena[candidate];
        trace!(%now, "to second box");
        ws.emit(Event::MoveArrowToOtherBox {
            handle: self.kind,
            arrow: candidate,
            now,
            crossing,
        });
        *transferred += 1;
        self.second.lemma29(ws, 0, transferred, 1)
    }

    fn check_lemma30(&self, arena: &ArrowArena, transferred: usize) -> Result<(), HandleError> {
        if let Some(down) = self.first.arrows(arena).find(|a| a.is_down()) {
            return Err(HandleError::Invariant(format!(
                "{} first box keeps down arrow {}",
                self.kind, down
            )));
        }
        if let Some(up) = self.second.arrows(arena).take(transferred).find(|a| a.is_up()) {
            return Err(HandleError::Invariant(format!(
                "{} second box received up arrow {}",
                self.kind, up
            )));
        }
        Ok(())
    }

    /// Moves the whole second box, through `mid`, to the back of the first.
    pub fn transfer_to_first(&mut self, ws: &mut Workspace) {
        let moved = self.second.take();
        if moved.is_empty() {
            return;
        }
        for &id in &moved {
            ws.arena[id] = ws.arena[id].map(|x| self.mid.pre(x));
            self.first.push_back(id);
        }
        ws.emit(Event::MoveArrowsToFirstBox {
            handle: self.kind,
            count: moved.len(),
        });
    }

    /// Signed depth of an arrow of this handle, looking toward its pre end
    /// (`to`) or away from it.
    pub fn arrow_depth(&self, arena: &ArrowArena, automaton: &Automaton, side: BoxSide, id: ArrowId, to: bool) -> i64 {
        let (b, e) = arena[id].tracks();
        let (tracks, end) = match side {
            BoxSide::First => {
                let through = |x| self.post.post(self.mid.post(x));
                ((through(b), through(e)), if to { End::Pre } else { End::Post })
            }
            BoxSide::Second => (
                (self.post.post(b), self.post.post(e)),
                if to { End::Post } else { End::Pre },
            ),
        };
        automaton.depth(self.kind, end, tracks)
    }

    /// The smallest non-zero depth, in either direction, of any arrow.
    pub fn minimal_depth(&self, arena: &ArrowArena, automaton: &Automaton) -> u32 {
        let mut best = INFINITE_DEPTH;
        for side in [BoxSide::First, BoxSide::Second] {
            for &id in self.arrow_box(side).ids() {
                let to = self.arrow_depth(arena, automaton, side, id, true);
                let from = self.arrow_depth(arena, automaton, side, id, false);
                if (to == 0) != (from == 0) {
                    warn!(handle = %self.kind, arrow = %arena[id], to, from, "arrow reaches the boundary one way only");
                }
                if to == 0 {
                    continue;
                }
                for depth in [to, from] {
                    if depth != 0 {
                        best = best.min(u32::try_from(depth.unsigned_abs()).unwrap_or(INFINITE_DEPTH));
                    }
                }
            }
        }
        best
    }

    /// Every arrow must have a finite depth both ways or neither.
    pub fn check_depths(&self, arena: &ArrowArena, automaton: &Automaton) -> Result<(), HandleError> {
        for side in [BoxSide::First, BoxSide::Second] {
            for &id in self.arrow_box(side).ids() {
                let to = self.arrow_depth(arena, automaton, side, id, true);
                let from = self.arrow_depth(arena, automaton, side, id, false);
                if (to == 0) != (from == 0) {
                    return Err(HandleError::Invariant(format!(
                        "{} {} box arrow {} has depth {} to and {} from the boundary",
                        self.kind, side, arena[id], to, from
                    )));
                }
            }
        }
        Ok(())
    }

    /// Removes every arrow whose depth is exactly `m`.
    ///
    /// No arrow of finite depth may lie below `m`, nor at `-m`. With
    /// invariant checks on such an arrow is an error; otherwise it is
    /// reported and kept.
    pub fn remove_depth(&mut self, ws: &mut Workspace, automaton: &Automaton, m: u32, to: bool) -> Result<(), HandleError> {
        let m = i64::from(m);
        for side in [BoxSide::First, BoxSide::Second] {
            let mut pos = 0;
            while pos < self.arrow_box(side).len() {
                let id = self.arrow_box(side).get(pos);
                let depth = self.arrow_depth(ws.arena, automaton, side, id, to);
                if depth == 0 {
                    pos += 1;
                    continue;
                }
                if depth.abs() < m || depth == -m {
                    if ws.check_invariants {
                        return Err(HandleError::Invariant(format!(
                            "{} {} box arrow {} has depth {} below {}",
                            self.kind, side, ws.arena[id], depth, m
                        )));
                    }
                    warn!(handle = %self.kind, %side, arrow = %ws.arena[id], depth, m, "arrow below the minimal depth");
                }
                if depth == m {
                    self.arrow_box_mut(side).remove(pos);
                    ws.arena.free(id);
                    ws.emit(Event::RemoveArrow {
                        handle: self.kind,
                        side,
                        arrow: id,
                    });
                } else {
                    pos += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Pairing;
    use crate::automaton::Boundary;
    use crate::events::{EventKind, Recorder};

    fn arrow(begin: usize, end: usize) -> Arrow {
        Arrow::new(begin, end).unwrap()
    }

    fn handle_with(arena: &mut ArrowArena, tracks: usize, first: &[(usize, usize)]) -> OneHandle {
        let mut handle = OneHandle::new(HandleKind::Full, tracks);
        for &(b, e) in first {
            handle.first.push_back(arena.allocate(arrow(b, e)));
        }
        handle
    }

    fn contents(arena: &ArrowArena, arrow_box: &ArrowBox) -> Vec<(usize, usize)> {
        arrow_box.arrows(arena).map(|a| a.tracks()).collect()
    }

    /// No void tracks: full pre point `p` pairs with full post point
    /// `p + tracks`, so every strand runs straight through and no pair of
    /// strands ever splits.
    fn straight(tracks: usize) -> Automaton {
        let map: Vec<usize> = (0..2 * tracks).map(|p| (p + tracks) % (2 * tracks)).collect();
        Automaton::build(
            &Pairing::from_permutation(Permutation::from_vec(map).unwrap()).unwrap(),
            Boundary::new(0, tracks),
            HandleMaps::identity(0),
            HandleMaps::identity(tracks),
        )
    }

    #[test]
    fn test_up_arrows_stay() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 3, &[(2, 0), (1, 0)]);
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        let moved = handle.lemma30(&mut ws, &straight(3)).unwrap();
        assert_eq!(moved, 0);
        assert_eq!(contents(&arena, handle.first()), vec![(1, 0), (2, 0)]);
        assert!(handle.second().is_empty());
    }

    #[test]
    fn test_down_arrow_moves_to_second_box() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 3, &[(2, 0), (0, 1)]);
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        let moved = handle.lemma30(&mut ws, &straight(3)).unwrap();
        assert_eq!(moved, 1);
        assert_eq!(contents(&arena, handle.first()), vec![(2, 0)]);
        assert_eq!(contents(&arena, handle.second()), vec![(0, 1)]);
        assert_eq!(recorder.statistics().get(EventKind::MoveArrowToOtherBox), 1);
    }

    #[test]
    fn test_reverse_pair_crosses() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 2, &[(0, 1), (1, 0)]);
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        let moved = handle.lemma30(&mut ws, &straight(2)).unwrap();
        assert_eq!(moved, 0);
        assert_eq!(contents(&arena, handle.first()), vec![(1, 0)]);
        assert_eq!(handle.mid().post(0), 1);
        assert_eq!(recorder.statistics().get(EventKind::GenerateCrossing), 1);
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn test_down_arrow_through_crossed_mid_reflects() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 2, &[(0, 1)]);
        handle.mid.transpose((0, 1), false);
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        let moved = handle.lemma30(&mut ws, &straight(2)).unwrap();
        assert_eq!(moved, 1);
        assert_eq!(contents(&arena, handle.first()), vec![(1, 0)]);
        assert_eq!(contents(&arena, handle.second()), vec![(0, 1)]);
        assert!(handle.mid().bi_permutation().is_identity());
    }

    #[test]
    fn test_transfer_to_first_goes_back_through_mid() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 3, &[]);
        handle.mid.transpose((1, 2), false);
        let id = arena.allocate(arrow(0, 1));
        handle.second.push_back(id);
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        handle.transfer_to_first(&mut ws);
        assert_eq!(arena[id], arrow(0, 2));
        assert_eq!(handle.first().ids(), &[id]);
        assert!(handle.second().is_empty());
        assert_eq!(recorder.statistics().get(EventKind::MoveArrowsToFirstBox), 1);
    }

    #[test]
    fn test_permute_box_keeps_strand_maps() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 3, &[(0, 2)]);
        handle.mid.transpose((0, 1), false);
        let before = handle.maps();
        let p = BiPermutation::new(Permutation::from_vec(vec![2, 0, 1]).unwrap());
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        handle.permute_box(&mut ws, BoxSide::First, p.clone());
        handle.permute_box(&mut ws, BoxSide::Second, p);
        assert_eq!(handle.maps(), before);
        assert_eq!(contents(&arena, handle.first()), vec![(2, 1)]);
        assert_eq!(recorder.statistics().get(EventKind::PermuteArrowBox), 2);
    }

    #[test]
    fn test_straight_strands_have_no_depth() {
        let mut arena = ArrowArena::new();
        let handle = handle_with(&mut arena, 3, &[(0, 2)]);
        assert_eq!(handle.minimal_depth(&arena, &straight(3)), INFINITE_DEPTH);
    }

    /// f = 2, v = 2 with 0-2, 1-6, 3-4, 5-7: full strands 0 and 1 split
    /// after one pass either way.
    fn split() -> Automaton {
        Automaton::build(
            &Pairing::from_permutation(Permutation::from_vec(vec![2, 6, 0, 4, 3, 7, 1, 5]).unwrap()).unwrap(),
            Boundary::new(2, 2),
            HandleMaps::identity(2),
            HandleMaps::identity(2),
        )
    }

    #[test]
    fn test_remove_depth_takes_matching_arrows() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 2, &[(0, 1)]);
        let automaton = split();
        assert_eq!(handle.minimal_depth(&arena, &automaton), 1);
        assert_eq!(handle.check_depths(&arena, &automaton), Ok(()));
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        handle.remove_depth(&mut ws, &automaton, 1, true).unwrap();
        assert!(handle.first().is_empty());
        assert_eq!(arena.live_count(), 0);
        assert_eq!(recorder.statistics().get(EventKind::RemoveArrow), 1);
    }

    #[test]
    fn test_arrow_below_removed_depth_is_an_error() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 2, &[(0, 1)]);
        let automaton = split();
        let mut ws = Workspace::new(&mut arena, &mut recorder, true);
        let result = handle.remove_depth(&mut ws, &automaton, 2, true);
        assert!(matches!(result, Err(HandleError::Invariant(_))), "{:?}", result);
        assert_eq!(handle.first().len(), 1);
    }

    #[test]
    fn test_arrow_below_removed_depth_is_kept_unchecked() {
        let mut arena = ArrowArena::new();
        let mut recorder = Recorder::new(true);
        let mut handle = handle_with(&mut arena, 2, &[(0, 1)]);
        let mut ws = Workspace::new(&mut arena, &mut recorder, false);
        assert_eq!(handle.remove_depth(&mut ws, &split(), 2, true), Ok(()));
        assert_eq!(handle.first().len(), 1);
        assert_eq!(recorder.statistics().get(EventKind::RemoveArrow), 0);
    }
}
