// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Deterministic transition tables and their powers of two.

/// A deterministic one-step transition: state `s` goes to `self[s]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    next: Vec<usize>,
}

impl Transition {
    pub fn identity(size: usize) -> Self {
        Self {
            next: (0..size).collect(),
        }
    }

    /// # Panics
    ///
    /// Panics if some target is not a state.
    pub fn new(next: Vec<usize>) -> Self {
        let size = next.len();
        if let Some(bad) = next.iter().position(|&target| target >= size) {
            panic!("state {} steps to {} outside {} states", bad, next[bad], size);
        }
        Self { next }
    }

    pub fn size(&self) -> usize {
        self.next.len()
    }

    pub fn step(&self, state: usize) -> usize {
        self.next[state]
    }

    /// `self` followed by `other`.
    pub fn then(&self, other: &Transition) -> Transition {
        assert_eq!(self.size(), other.size(), "transition sizes differ");
        Transition {
            next: self.next.iter().map(|&s| other.next[s]).collect(),
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.next
    }
}

fn msb(value: usize) -> u32 {
    debug_assert!(value > 0);
    usize::BITS - 1 - value.leading_zeros()
}

/// `T, T², T⁴, …`, enough levels that the last one covers `max_power` steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoublingTable {
    levels: Vec<Transition>,
}

impl DoublingTable {
    pub fn levels_for(max_power: usize) -> usize {
        assert!(max_power > 0, "a doubling table covers at least one step");
        if max_power == 1 {
            1
        } else {
            msb(max_power - 1) as usize + 2
        }
    }

    pub fn new(base: Transition, max_power: usize) -> Self {
        let count = Self::levels_for(max_power);
        let mut levels = Vec::with_capacity(count);
        levels.push(base);
        for i in 1..count {
            let squared = levels[i - 1].then(&levels[i - 1]);
            levels.push(squared);
        }
        Self { levels }
    }

    pub fn size(&self) -> usize {
        self.levels[0].size()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The step count of the last level.
    pub fn max_power(&self) -> usize {
        1 << (self.levels.len() - 1)
    }

    /// The state reached from `state` after `power` steps.
    pub fn value_power(&self, mut state: usize, power: usize) -> usize {
        self.check_power(power);
        let mut rest = power;
        let mut level = 0;
        while rest != 0 {
            if rest & 1 == 1 {
                state = self.levels[level].step(state);
            }
            level += 1;
            rest >>= 1;
        }
        state
    }

    /// The `power`-step transition as a table.
    pub fn power(&self, power: usize) -> Transition {
        self.check_power(power);
        let mut result = Transition::identity(self.size());
        let mut rest = power;
        let mut level = 0;
        while rest != 0 {
            if rest & 1 == 1 {
                result = result.then(&self.levels[level]);
            }
            level += 1;
            rest >>= 1;
        }
        result
    }

    /// Where `state` is after the longest tabulated run.
    pub fn max_value(&self, state: usize) -> usize {
        self.levels[self.levels.len() - 1].step(state)
    }

    /// Steps from `state` to an absorbing sentinel (`0` or `1`), and whether
    /// that sentinel is `0`.
    ///
    /// A state that never reaches a sentinel has weight `(0, false)`.
    pub fn weight(&self, state: usize) -> (usize, bool) {
        let last = self.max_value(state);
        if last >= 2 {
            return (0, false);
        }
        let mut state = state;
        let mut power = 0;
        for level in (0..self.levels.len() - 1).rev() {
            let next = self.levels[level].step(state);
            if next >= 2 {
                state = next;
                power += 1 << level;
            }
        }
        (power + 1, last == 0)
    }

    fn check_power(&self, power: usize) {
        assert!(
            power >> self.levels.len() == 0,
            "power {} exceeds a table of {} levels",
            power,
            self.levels.len()
        );
    }
}
