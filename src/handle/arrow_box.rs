// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! An ordered box of arrows and its canonical ordering.
//!
//! Reading a box left to right gives a product of transvections over GF(2),
//! arrow `(b, e)` standing for `I + e_{b,e}`. The rewrites here change the
//! order of a box without changing that product:
//!
//! - two arrows that share no endpoint head to tail commute;
//! - when `A` passes `B` and they do share one, the composite arrow `C`
//!   (see [`Arrow::composite`]) is left behind, since `A·B = B·C·A` and `C`
//!   commutes with `A`;
//! - two identical neighbours cancel.

use super::{Arrow, ArrowArena, ArrowId, BoxLocation, HandleError, Workspace};
use crate::events::Event;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowBox {
    location: BoxLocation,
    track_count: usize,
    arrows: Vec<ArrowId>,
}

impl ArrowBox {
    pub fn new(location: BoxLocation, track_count: usize) -> Self {
        Self {
            location,
            track_count,
            arrows: Vec::new(),
        }
    }

    pub fn location(&self) -> BoxLocation {
        self.location
    }

    pub fn track_count(&self) -> usize {
        self.track_count
    }

    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    pub fn ids(&self) -> &[ArrowId] {
        &self.arrows
    }

    pub fn get(&self, pos: usize) -> ArrowId {
        self.arrows[pos]
    }

    /// The arrows of the box, in order.
    pub fn arrows<'a>(&'a self, arena: &'a ArrowArena) -> impl Iterator<Item = Arrow> + 'a {
        self.arrows.iter().map(move |&id| arena[id])
    }

    pub fn push_front(&mut self, id: ArrowId) {
        self.arrows.insert(0, id);
    }

    pub fn push_back(&mut self, id: ArrowId) {
        self.arrows.push(id);
    }

    pub fn pop_front(&mut self) -> Option<ArrowId> {
        if self.arrows.is_empty() {
            None
        } else {
            Some(self.arrows.remove(0))
        }
    }

    pub fn pop_back(&mut self) -> Option<ArrowId> {
        self.arrows.pop()
    }

    pub fn insert(&mut self, pos: usize, id: ArrowId) {
        self.arrows.insert(pos, id);
    }

    pub fn remove(&mut self, pos: usize) -> ArrowId {
        self.arrows.remove(pos)
    }

    /// Empties the box, returning its ids in order.
    pub fn take(&mut self) -> Vec<ArrowId> {
        std::mem::take(&mut self.arrows)
    }

    /// Renames the tracks of the arrows at `from..`.
    pub fn relabel_from(&self, arena: &mut ArrowArena, from: usize, f: impl Fn(usize) -> usize) {
        for &id in &self.arrows[from..] {
            arena[id] = arena[id].map(&f);
        }
    }

    /// Orders `begin..*end` by non-decreasing length and cancels duplicates.
    ///
    /// The range must hold arrows of one orientation, and `checkpoint..*end`
    /// must already be in order. `*end` follows the range as arrows are
    /// generated or cancelled.
    pub fn lemma29(
        &mut self,
        ws: &mut Workspace,
        begin: usize,
        end: &mut usize,
        checkpoint: usize,
    ) -> Result<(), HandleError> {
        debug_assert!(begin <= checkpoint && checkpoint <= *end && *end <= self.len());
        self.place_all(ws, begin, end, checkpoint);
        self.remove_same_arrows(ws, begin, end);
        if ws.check_invariants {
            self.check_sorted(ws.arena, begin, *end)?;
        }
        Ok(())
    }

    /// Moves arrows out of `begin..checkpoint`, longest first, each to its
    /// place in the ordered tail.
    fn place_all(&mut self, ws: &mut Workspace, begin: usize, end: &mut usize, checkpoint: usize) {
        let n = self.track_count;
        let mut k = 0;
        let mut strict = false;
        let mut check = checkpoint;
        while k < n {
            let target = n - k;
            let mut best: Option<(usize, usize)> = None;
            for pos in (begin..check).rev() {
                let len = ws.arena[self.arrows[pos]].length();
                let fits = if strict { len == target } else { len <= target };
                if fits && best.map_or(true, |(_, longest)| len > longest) {
                    best = Some((pos, len));
                    if len == target {
                        break;
                    }
                }
            }
            match best {
                Some((pos, len)) => {
                    k = n - len;
                    self.slide(ws, pos, end);
                    if pos != begin {
                        check = pos;
                        strict = true;
                    } else {
                        check = *end;
                        k += 1;
                        strict = false;
                    }
                }
                None if strict => {
                    check = *end;
                    k += 1;
                    strict = false;
                }
                None => break,
            }
        }
    }

    /// Slides the arrow at `pos` forward past every strictly shorter arrow.
    fn slide(&mut self, ws: &mut Workspace, pos: usize, end: &mut usize) {
        let moving = self.arrows.remove(pos);
        *end -= 1;
        let arrow = ws.arena[moving];
        let mut q = pos;
        while q < *end {
            let passed = self.arrows[q];
            let other = ws.arena[passed];
            if other.length() >= arrow.length() {
                break;
            }
            if let Some(composite) = arrow.composite(&other) {
                self.generate_after(ws, moving, q, composite, end);
            }
            q += 1;
        }
        if q < *end && ws.arena[self.arrows[q]] == arrow {
            let twin = self.arrows.remove(q);
            *end -= 1;
            self.merge(ws, moving, twin);
        } else {
            self.arrows.insert(q, moving);
            *end += 1;
            if q != pos {
                trace!(%arrow, from = pos, to = q, "slide");
                ws.emit(Event::MoveArrowInBox {
                    handle: self.location.handle,
                    side: self.location.side,
                    arrow: moving,
                    from: pos,
                    to: q,
                });
            }
        }
    }

    /// Inserts `arrow`, left behind by `moving` passing position `q`, just
    /// after `q`, then slides it into place.
    fn generate_after(&mut self, ws: &mut Workspace, moving: ArrowId, q: usize, arrow: Arrow, end: &mut usize) {
        let passed = self.arrows[q];
        let created = ws.arena.allocate(arrow);
        self.arrows.insert(q + 1, created);
        *end += 1;
        trace!(%arrow, "generated");
        ws.emit(Event::GenerateArrowAfterCrossing {
            handle: self.location.handle,
            side: self.location.side,
            moving,
            passed,
            created,
            arrow,
            in_lemma29: true,
        });
        self.slide(ws, q + 1, end);
    }

    fn merge(&mut self, ws: &mut Workspace, first: ArrowId, second: ArrowId) {
        trace!(arrow = %ws.arena[first], "merge");
        ws.emit(Event::MergeArrows {
            handle: self.location.handle,
            side: self.location.side,
            first,
            second,
        });
        ws.arena.free(first);
        ws.arena.free(second);
    }

    /// Cancels identical arrows left apart within runs of equal length.
    fn remove_same_arrows(&mut self, ws: &mut Workspace, begin: usize, end: &mut usize) {
        let mut start = begin;
        while start < *end {
            let len = ws.arena[self.arrows[start]].length();
            let stop = (start..*end)
                .find(|&p| ws.arena[self.arrows[p]].length() != len)
                .unwrap_or(*end);
            match self.nearest_twins(ws.arena, start, stop) {
                Some((a, b)) => self.cancel_pair(ws, a, b, end),
                None => start = stop,
            }
        }
    }

    fn nearest_twins(&self, arena: &ArrowArena, start: usize, stop: usize) -> Option<(usize, usize)> {
        for b in start + 1..stop {
            for a in (start..b).rev() {
                if arena[self.arrows[a]] == arena[self.arrows[b]] {
                    return Some((a, b));
                }
            }
        }
        None
    }

    /// Walks the arrow at `a` up to its twin at `b`, then cancels both.
    fn cancel_pair(&mut self, ws: &mut Workspace, a: usize, b: usize, end: &mut usize) {
        let twin = self.arrows[b];
        let moving = self.arrows.remove(a);
        *end -= 1;
        let arrow = ws.arena[moving];
        let mut q = a;
        while self.arrows[q] != twin {
            let other = ws.arena[self.arrows[q]];
            if let Some(composite) = arrow.composite(&other) {
                self.generate_after(ws, moving, q, composite, end);
            }
            q += 1;
        }
        self.arrows.remove(q);
        *end -= 1;
        self.merge(ws, moving, twin);
    }

    fn check_sorted(&self, arena: &ArrowArena, begin: usize, end: usize) -> Result<(), HandleError> {
        let range = &self.arrows[begin..end];
        for pair in range.windows(2) {
            let (x, y) = (arena[pair[0]], arena[pair[1]]);
            if x.is_up() != y.is_up() {
                return Err(HandleError::Invariant(format!(
                    "{} {}: mixed orientation {} {}",
                    self.location.handle, self.location.side, x, y
                )));
            }
            if x.length() > y.length() {
                return Err(HandleError::Invariant(format!(
                    "{} {}: {} before shorter {}",
                    self.location.handle, self.location.side, x, y
                )));
            }
        }
        for (i, &x) in range.iter().enumerate() {
            if range[i + 1..].iter().any(|&y| arena[x] == arena[y]) {
                return Err(HandleError::Invariant(format!(
                    "{} {}: duplicate {}",
                    self.location.handle, self.location.side, arena[x]
                )));
            }
        }
        Ok(())
    }
}
