// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Two one-handles joined through the boundary pairing, and the reduction
//! loop that empties them.

use super::{
    Arrow, ArrowArena, ArrowId, BoxLocation, BoxSide, End, HandleError, HandleKind, OneHandle,
    Workspace, INFINITE_DEPTH,
};
use crate::algebra::Pairing;
use crate::automaton::{Automaton, Boundary, Edge};
use crate::events::{Event, EventSink, Passage};
use crate::reduction::Reduction;
use tracing::{debug, info};

/// Tuning for [`ZeroHandle::proposition28`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub check_invariants: bool,
    /// Give up with [`HandleError::RoundLimit`] after this many rounds.
    pub max_rounds: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            check_invariants: cfg!(debug_assertions),
            max_rounds: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZeroHandle {
    boundary: Boundary,
    pairing: Pairing,
    void: OneHandle,
    full: OneHandle,
    arena: ArrowArena,
    automaton: Automaton,
}

impl ZeroHandle {
    /// Places the arrows in the first box of each handle, in order.
    pub fn new(
        pairing: Pairing,
        void_tracks: usize,
        full_tracks: usize,
        void_arrows: &[Arrow],
        full_arrows: &[Arrow],
    ) -> Result<Self, HandleError> {
        let boundary = Boundary::new(void_tracks, full_tracks);
        if pairing.size() != boundary.point_count() {
            return Err(HandleError::PairingSize {
                expected: boundary.point_count(),
                actual: pairing.size(),
            });
        }
        let mut arena = ArrowArena::new();
        let mut void = OneHandle::new(HandleKind::Void, void_tracks);
        let mut full = OneHandle::new(HandleKind::Full, full_tracks);
        for (handle, arrows) in [(&mut void, void_arrows), (&mut full, full_arrows)] {
            for &arrow in arrows {
                let tracks = handle.track_count();
                if arrow.begin() >= tracks || arrow.end() >= tracks {
                    return Err(HandleError::ArrowOutOfRange {
                        handle: handle.kind(),
                        arrow,
                        tracks,
                    });
                }
                handle.arrow_box_mut(BoxSide::First).push_back(arena.allocate(arrow));
            }
        }
        let automaton = Automaton::build(&pairing, boundary, void.maps(), full.maps());
        Ok(Self {
            boundary,
            pairing,
            void,
            full,
            arena,
            automaton,
        })
    }

    pub fn from_reduction(reduction: &Reduction) -> Result<Self, HandleError> {
        Self::new(
            reduction.pairing.clone(),
            reduction.void_tracks,
            reduction.full_tracks,
            &reduction.void_arrows,
            &reduction.full_arrows,
        )
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    pub fn handle(&self, kind: HandleKind) -> &OneHandle {
        match kind {
            HandleKind::Void => &self.void,
            HandleKind::Full => &self.full,
        }
    }

    fn handle_mut(&mut self, kind: HandleKind) -> &mut OneHandle {
        match kind {
            HandleKind::Void => &mut self.void,
            HandleKind::Full => &mut self.full,
        }
    }

    pub fn arena(&self) -> &ArrowArena {
        &self.arena
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn is_empty(&self) -> bool {
        self.void.is_empty() && self.full.is_empty()
    }

    pub fn arrow_count(&self) -> usize {
        self.void.arrow_count() + self.full.arrow_count()
    }

    /// The arrows of one box, in order.
    pub fn arrows(&self, location: BoxLocation) -> Vec<(ArrowId, Arrow)> {
        self.handle(location.handle)
            .arrow_box(location.side)
            .ids()
            .iter()
            .map(|&id| (id, self.arena[id]))
            .collect()
    }

    /// The whole diagram, for a renderer starting from scratch.
    pub fn draw_event(&self) -> Event {
        let listing = |kind: HandleKind| -> Vec<(ArrowId, Arrow)> {
            [BoxSide::First, BoxSide::Second]
                .into_iter()
                .flat_map(|side| self.arrows(BoxLocation::new(kind, side)))
                .collect()
        };
        Event::DrawZeroHandle {
            pairing: self.pairing.as_slice().to_vec(),
            void_tracks: self.boundary.void_tracks,
            full_tracks: self.boundary.full_tracks,
            void_arrows: listing(HandleKind::Void),
            full_arrows: listing(HandleKind::Full),
        }
    }

    pub fn rebuild_automaton(&mut self) {
        self.automaton = Automaton::build(&self.pairing, self.boundary, self.void.maps(), self.full.maps());
    }

    /// The smallest non-zero depth of any arrow, or [`INFINITE_DEPTH`].
    pub fn depth(&self) -> u32 {
        self.void
            .minimal_depth(&self.arena, &self.automaton)
            .min(self.full.minimal_depth(&self.arena, &self.automaton))
    }

    pub fn check_depths(&self) -> Result<(), HandleError> {
        self.void.check_depths(&self.arena, &self.automaton)?;
        self.full.check_depths(&self.arena, &self.automaton)
    }

    pub fn transfer_to_first(&mut self, kind: HandleKind, events: &mut dyn EventSink, check: bool) {
        let handle = match kind {
            HandleKind::Void => &mut self.void,
            HandleKind::Full => &mut self.full,
        };
        handle.transfer_to_first(&mut Workspace::new(&mut self.arena, events, check));
    }

    pub fn lemma30(&mut self, kind: HandleKind, events: &mut dyn EventSink, check: bool) -> Result<usize, HandleError> {
        let handle = match kind {
            HandleKind::Void => &mut self.void,
            HandleKind::Full => &mut self.full,
        };
        handle.lemma30(&mut Workspace::new(&mut self.arena, events, check), &self.automaton)
    }

    pub fn remove_depth(
        &mut self,
        kind: HandleKind,
        m: u32,
        to: bool,
        events: &mut dyn EventSink,
        check: bool,
    ) -> Result<(), HandleError> {
        let handle = match kind {
            HandleKind::Void => &mut self.void,
            HandleKind::Full => &mut self.full,
        };
        handle.remove_depth(&mut Workspace::new(&mut self.arena, events, check), &self.automaton, m, to)
    }

    /// Moves every arrow of one box across the zero handle into the box
    /// its strands lead to.
    ///
    /// A first box is emptied from the front, a second box from the back,
    /// so the arrow nearest the boundary always crosses first.
    pub fn empty_through(&mut self, kind: HandleKind, side: BoxSide, events: &mut dyn EventSink) -> Result<(), HandleError> {
        let mut moves = Vec::new();
        let result = self.pass_all(kind, side, &mut moves);
        if !moves.is_empty() {
            events.emit(Event::MoveArrowsThroughZeroHandle {
                handle: kind,
                side,
                moves,
            });
        }
        result
    }

    fn pass_all(&mut self, kind: HandleKind, side: BoxSide, moves: &mut Vec<Passage>) -> Result<(), HandleError> {
        let source = Edge::of(
            kind,
            match side {
                BoxSide::First => End::Pre,
                BoxSide::Second => End::Post,
            },
        );
        loop {
            let arrow_box = self.handle_mut(kind).arrow_box_mut(side);
            let popped = match side {
                BoxSide::First => arrow_box.pop_front(),
                BoxSide::Second => arrow_box.pop_back(),
            };
            let Some(id) = popped else {
                return Ok(());
            };
            match self.pass(kind, side, source, id) {
                Ok(passage) => moves.push(passage),
                Err(err) => {
                    let arrow_box = self.handle_mut(kind).arrow_box_mut(side);
                    match side {
                        BoxSide::First => arrow_box.push_front(id),
                        BoxSide::Second => arrow_box.push_back(id),
                    }
                    return Err(err);
                }
            }
        }
    }

    fn pass(&mut self, kind: HandleKind, side: BoxSide, source: Edge, id: ArrowId) -> Result<Passage, HandleError> {
        let handle = self.handle(kind);
        let to_boundary = |x| match side {
            BoxSide::First => handle.pre().pre(x),
            BoxSide::Second => handle.post().post(x),
        };
        let (b, e) = self.arena[id].tracks();
        let entry = (to_boundary(b), to_boundary(e));
        let start = self.boundary.start(source);
        let (edge_b, exit_b) = self.boundary.locate(self.pairing.partner(start + entry.0));
        let (edge_e, exit_e) = self.boundary.locate(self.pairing.partner(start + entry.1));
        if edge_b != edge_e {
            return Err(HandleError::SplitPassage {
                arrow: id,
                first: edge_b,
                second: edge_e,
            });
        }
        if edge_b == source {
            return Err(HandleError::ReturningPassage { arrow: id, edge: source });
        }
        let destination = BoxLocation::new(
            edge_b.handle(),
            match edge_b.end() {
                End::Pre => BoxSide::First,
                End::Post => BoxSide::Second,
            },
        );
        let target = self.handle(destination.handle);
        let from_boundary = |x| match destination.side {
            BoxSide::First => target.pre().post(x),
            BoxSide::Second => target.post().pre(x),
        };
        let now = Arrow::new(from_boundary(exit_b), from_boundary(exit_e))?;
        self.arena[id] = now;
        let arrow_box = self.handle_mut(destination.handle).arrow_box_mut(destination.side);
        match destination.side {
            BoxSide::First => arrow_box.push_front(id),
            BoxSide::Second => arrow_box.push_back(id),
        }
        Ok(Passage {
            arrow: id,
            entry,
            exit: (exit_b, exit_e),
            destination,
            now,
        })
    }

    /// Removes arrows in rounds of strictly increasing depth until none of
    /// finite depth remain. Returns the number of rounds.
    ///
    /// The automaton is rebuilt after every step that can change a handle's
    /// permutations, so depth is never read from a stale table.
    pub fn proposition28(&mut self, events: &mut dyn EventSink, options: &RunOptions) -> Result<usize, HandleError> {
        const BOTH: [HandleKind; 2] = [HandleKind::Void, HandleKind::Full];
        let check = options.check_invariants;
        if check {
            self.check_depths()?;
        }
        let mut depth = self.depth();
        log_depth(depth);
        let mut rounds = 0;
        while depth != INFINITE_DEPTH {
            if options.max_rounds.is_some_and(|max| rounds >= max) {
                return Err(HandleError::RoundLimit { rounds });
            }
            rounds += 1;
            debug!(round = rounds, depth, arrows = self.arrow_count(), "proposition28 round");

            for kind in BOTH {
                self.transfer_to_first(kind, events, check);
                self.lemma30(kind, events, check)?;
                self.rebuild_automaton();
            }
            for kind in BOTH {
                self.remove_depth(kind, depth, true, events, check)?;
            }
            for kind in BOTH {
                self.lemma30(kind, events, check)?;
                self.rebuild_automaton();
                self.remove_depth(kind, depth, true, events, check)?;
                self.empty_through(kind, BoxSide::First, events)?;
                self.rebuild_automaton();
            }
            for kind in BOTH {
                self.transfer_to_first(kind, events, check);
                self.lemma30(kind, events, check)?;
                self.rebuild_automaton();
                self.remove_depth(kind, depth, true, events, check)?;
                self.empty_through(kind, BoxSide::Second, events)?;
                self.rebuild_automaton();
            }
            for kind in BOTH {
                self.remove_depth(kind, depth, false, events, check)?;
            }

            if check {
                self.check_depths()?;
            }
            let next = self.depth();
            if next <= depth {
                return Err(HandleError::DepthDidNotIncrease {
                    before: depth,
                    after: next,
                });
            }
            depth = next;
            log_depth(depth);
        }
        Ok(rounds)
    }
}

fn log_depth(depth: u32) {
    if depth == INFINITE_DEPTH {
        info!("Depth: Infinity");
    } else {
        info!("Depth: {}", depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Permutation;
    use crate::events::{Discard, EventKind, Recorder};

    fn arrow(begin: usize, end: usize) -> Arrow {
        Arrow::new(begin, end).unwrap()
    }

    fn pairing(map: Vec<usize>) -> Pairing {
        Pairing::from_permutation(Permutation::from_vec(map).unwrap()).unwrap()
    }

    // f = 2, v = 2 with 0-2, 1-6, 3-4, 5-7, and one full arrow (0, 1).
    fn designed() -> ZeroHandle {
        ZeroHandle::new(pairing(vec![2, 6, 0, 4, 3, 7, 1, 5]), 2, 2, &[], &[arrow(0, 1)]).unwrap()
    }

    #[test]
    fn test_rejects_misfit_pairing() {
        let err = ZeroHandle::new(pairing(vec![1, 0]), 2, 2, &[], &[]).unwrap_err();
        assert_eq!(err, HandleError::PairingSize { expected: 8, actual: 2 });
    }

    #[test]
    fn test_rejects_arrow_out_of_range() {
        let err = ZeroHandle::new(pairing(vec![2, 6, 0, 4, 3, 7, 1, 5]), 2, 2, &[arrow(0, 2)], &[]).unwrap_err();
        assert!(matches!(err, HandleError::ArrowOutOfRange { handle: HandleKind::Void, .. }));
    }

    #[test]
    fn test_draw_event_lists_everything() {
        let zero = designed();
        match zero.draw_event() {
            Event::DrawZeroHandle {
                pairing,
                void_tracks,
                full_tracks,
                void_arrows,
                full_arrows,
            } => {
                assert_eq!(pairing, vec![2, 6, 0, 4, 3, 7, 1, 5]);
                assert_eq!((void_tracks, full_tracks), (2, 2));
                assert!(void_arrows.is_empty());
                assert_eq!(full_arrows.len(), 1);
                assert_eq!(full_arrows[0].1, arrow(0, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_designed_depth() {
        let zero = designed();
        let id = zero.handle(HandleKind::Full).first().get(0);
        let full = zero.handle(HandleKind::Full);
        assert_eq!(full.arrow_depth(zero.arena(), zero.automaton(), BoxSide::First, id, true), 1);
        assert_eq!(full.arrow_depth(zero.arena(), zero.automaton(), BoxSide::First, id, false), -1);
        assert_eq!(zero.depth(), 1);
    }

    #[test]
    fn test_designed_empties_in_one_round() {
        let mut zero = designed();
        let mut recorder = Recorder::new(true);
        let rounds = zero.proposition28(&mut recorder, &RunOptions::default()).unwrap();
        assert_eq!(rounds, 1);
        assert!(zero.is_empty());
        assert_eq!(zero.depth(), INFINITE_DEPTH);
        assert_eq!(recorder.statistics().get(EventKind::RemoveArrow), 1);
        assert_eq!(zero.arena().live_count(), 0);
    }

    #[test]
    fn test_round_limit() {
        let mut zero = designed();
        let options = RunOptions {
            check_invariants: true,
            max_rounds: Some(0),
        };
        let err = zero.proposition28(&mut Discard, &options).unwrap_err();
        assert_eq!(err, HandleError::RoundLimit { rounds: 0 });
    }

    #[test]
    fn test_empty_zero_handle_needs_no_rounds() {
        let mut zero = ZeroHandle::new(pairing(vec![1, 0]), 1, 0, &[], &[]).unwrap();
        assert_eq!(zero.proposition28(&mut Discard, &RunOptions::default()), Ok(0));
    }

    #[test]
    fn test_passage_to_the_other_handle() {
        // Full pre points 0 and 1 pair with void post points 2 and 3.
        let mut zero = ZeroHandle::new(pairing(vec![2, 3, 0, 1, 6, 7, 4, 5]), 2, 2, &[], &[arrow(1, 0)]).unwrap();
        let mut recorder = Recorder::new(true);
        zero.empty_through(HandleKind::Full, BoxSide::First, &mut recorder).unwrap();
        let arrows = zero.arrows(BoxLocation::new(HandleKind::Void, BoxSide::Second));
        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].1, arrow(1, 0));
        assert!(zero.handle(HandleKind::Full).is_empty());
        match &recorder.events()[0] {
            Event::MoveArrowsThroughZeroHandle { moves, .. } => {
                assert_eq!(moves[0].entry, (1, 0));
                assert_eq!(moves[0].destination, BoxLocation::new(HandleKind::Void, BoxSide::Second));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_split_passage_keeps_arrow() {
        let mut zero = designed();
        let err = zero
            .empty_through(HandleKind::Full, BoxSide::First, &mut Discard)
            .unwrap_err();
        assert!(matches!(err, HandleError::SplitPassage { .. }));
        assert_eq!(zero.handle(HandleKind::Full).first().len(), 1);
    }
}
