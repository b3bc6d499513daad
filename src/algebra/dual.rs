// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The four element ring F2[U]/(U²).
//!
//! Elements are stored as two bits, `(U << 1) | constant`. Addition is XOR of
//! the encodings. Multiplication is the integer product of the encodings
//! masked to two bits, which is exactly the dual number rule `U·U = 0`:
//! `(a + bU)(c + dU) = ac + (ad + bc)U`.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign};

/// An element of `{0, 1, U, 1+U}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dual(u8);

impl Dual {
    pub const ZERO: Dual = Dual(0);
    pub const ONE: Dual = Dual(1);
    pub const U: Dual = Dual(2);
    pub const ONE_PLUS_U: Dual = Dual(3);

    /// All four elements, in encoding order.
    pub const ALL: [Dual; 4] = [Dual::ZERO, Dual::ONE, Dual::U, Dual::ONE_PLUS_U];

    pub const fn new(u: bool, constant: bool) -> Self {
        Dual(((u as u8) << 1) | constant as u8)
    }

    /// The coefficient of `U`.
    pub const fn has_u(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// The constant coefficient.
    pub const fn has_constant(self) -> bool {
        self.0 & 0b01 != 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Dual {
    type Output = Dual;

    fn add(self, other: Dual) -> Dual {
        Dual(self.0 ^ other.0)
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, other: Dual) {
        self.0 ^= other.0;
    }
}

impl Mul for Dual {
    type Output = Dual;

    fn mul(self, other: Dual) -> Dual {
        Dual((self.0 * other.0) & 0b11)
    }
}

impl MulAssign for Dual {
    fn mul_assign(&mut self, other: Dual) {
        *self = *self * other;
    }
}

impl fmt::Display for Dual {
    /// Renders as `u*U+c`, the form accepted by the matrix reader.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}*U+{}",
            self.has_u() as u8,
            self.has_constant() as u8
        )
    }
}
