// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Slot storage giving every arrow a stable identity.
//!
//! Boxes hold [`ArrowId`]s, never arrows, so an arrow keeps its identity
//! while it slides within a box, moves to the other box or passes through
//! the zero handle. Freed slots are reused; the generation counter makes a
//! stale id distinguishable from the arrow that later reuses its slot.
//!
//! # Determinism
//!
//! Free-list reuse is LIFO, so the same sequence of allocations and frees
//! always yields the same ids.

use super::Arrow;
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrowId {
    index: u32,
    generation: u32,
}

impl ArrowId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ArrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    arrow: Option<Arrow>,
    next_free: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrowArena {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    live: usize,
}

impl ArrowArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, arrow: Arrow) -> ArrowId {
        self.live += 1;
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.arrow.is_none(), "free slot holds an arrow");
            self.free_head = slot.next_free.take();
            slot.arrow = Some(arrow);
            ArrowId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                arrow: Some(arrow),
                next_free: None,
            });
            ArrowId {
                index,
                generation: 0,
            }
        }
    }

    /// Frees the slot of `id`, returning the arrow it held.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn free(&mut self, id: ArrowId) -> Arrow {
        let head = self.free_head;
        let slot = self.live_slot_mut(id);
        let arrow = slot.arrow.take().expect("live slot holds an arrow");
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = head;
        self.free_head = Some(id.index);
        self.live -= 1;
        arrow
    }

    pub fn get(&self, id: ArrowId) -> Option<&Arrow> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.arrow.as_ref())
    }

    pub fn contains(&self, id: ArrowId) -> bool {
        self.get(id).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Live arrows in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrowId, &Arrow)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.arrow.as_ref().map(|arrow| {
                (
                    ArrowId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    arrow,
                )
            })
        })
    }

    fn live_slot_mut(&mut self, id: ArrowId) -> &mut Slot {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.generation == id.generation && slot.arrow.is_some() => slot,
            _ => panic!("stale arrow id {}", id),
        }
    }
}

impl Index<ArrowId> for ArrowArena {
    type Output = Arrow;

    fn index(&self, id: ArrowId) -> &Arrow {
        match self.get(id) {
            Some(arrow) => arrow,
            None => panic!("stale arrow id {}", id),
        }
    }
}

impl IndexMut<ArrowId> for ArrowArena {
    fn index_mut(&mut self, id: ArrowId) -> &mut Arrow {
        match self.live_slot_mut(id).arrow.as_mut() {
            Some(arrow) => arrow,
            None => unreachable!(),
        }
    }
}
