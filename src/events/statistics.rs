// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-kind event counters.

use super::Event;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

#[derive(Debug, Display, EnumCountMacro, EnumIter, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    DrawZeroHandle,
    DeleteZeroHandle,
    PermuteArrowBox,
    MoveArrowInBox,
    GenerateArrowAfterCrossing,
    MergeArrows,
    RemoveArrow,
    MoveArrowToOtherBox,
    MoveArrowsToFirstBox,
    GenerateCrossing,
    MoveArrowsThroughZeroHandle,
}

impl From<&Event> for EventKind {
    fn from(event: &Event) -> Self {
        match event {
            Event::DrawZeroHandle { .. } => EventKind::DrawZeroHandle,
            Event::DeleteZeroHandle => EventKind::DeleteZeroHandle,
            Event::PermuteArrowBox { .. } => EventKind::PermuteArrowBox,
            Event::MoveArrowInBox { .. } => EventKind::MoveArrowInBox,
            Event::GenerateArrowAfterCrossing { .. } => EventKind::GenerateArrowAfterCrossing,
            Event::MergeArrows { .. } => EventKind::MergeArrows,
            Event::RemoveArrow { .. } => EventKind::RemoveArrow,
            Event::MoveArrowToOtherBox { .. } => EventKind::MoveArrowToOtherBox,
            Event::MoveArrowsToFirstBox { .. } => EventKind::MoveArrowsToFirstBox,
            Event::GenerateCrossing { .. } => EventKind::GenerateCrossing,
            Event::MoveArrowsThroughZeroHandle { .. } => EventKind::MoveArrowsThroughZeroHandle,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; EventKind::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    pub fn record(&mut self, event: &Event) {
        self.stats[EventKind::from(event) as usize] += 1;
    }

    pub fn get(&self, kind: EventKind) -> u64 {
        self.stats[kind as usize]
    }

    pub fn total(&self) -> u64 {
        self.stats.iter().sum()
    }

    /// Non-zero counters, in declaration order.
    pub fn non_zero(&self) -> impl Iterator<Item = (EventKind, u64)> + '_ {
        EventKind::iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|&(_, count)| count > 0)
    }
}
