// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Square matrices over [`Dual`].

use super::Dual;
use std::fmt;
use std::ops::{Index, IndexMut, Mul};

/// A dense, row-major square matrix of ring elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualMatrix {
    size: usize,
    data: Vec<Dual>,
}

impl DualMatrix {
    /// The zero matrix.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![Dual::ZERO; size * size],
        }
    }

    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> Dual) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                data.push(f(i, j));
            }
        }
        Self { size, data }
    }

    /// Builds a matrix from its rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not form a square.
    pub fn from_rows(rows: &[Vec<Dual>]) -> Self {
        let size = rows.len();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), size, "row {} of a {}x{} matrix", i, size, size);
        }
        Self::from_fn(size, |i, j| rows[i][j])
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// True when this is `U` times the identity: `U` on the diagonal, `0` elsewhere.
    pub fn is_u_identity(&self) -> bool {
        (0..self.size).all(|i| {
            (0..self.size).all(|j| {
                let expected = if i == j { Dual::U } else { Dual::ZERO };
                self[(i, j)] == expected
            })
        })
    }

    pub fn row(&self, i: usize) -> &[Dual] {
        &self.data[i * self.size..(i + 1) * self.size]
    }
}

impl Index<(usize, usize)> for DualMatrix {
    type Output = Dual;

    fn index(&self, (i, j): (usize, usize)) -> &Dual {
        assert!(i < self.size && j < self.size, "({}, {}) outside {}x{}", i, j, self.size, self.size);
        &self.data[i * self.size + j]
    }
}

impl IndexMut<(usize, usize)> for DualMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Dual {
        assert!(i < self.size && j < self.size, "({}, {}) outside {}x{}", i, j, self.size, self.size);
        &mut self.data[i * self.size + j]
    }
}

impl Mul for &DualMatrix {
    type Output = DualMatrix;

    fn mul(self, other: &DualMatrix) -> DualMatrix {
        assert_eq!(self.size, other.size, "multiplying matrices of different sizes");
        DualMatrix::from_fn(self.size, |i, j| {
            (0..self.size).fold(Dual::ZERO, |acc, k| acc + self[(i, k)] * other[(k, j)])
        })
    }
}

impl fmt::Display for DualMatrix {
    /// One bracketed row per line: `[0*U+1, 1*U+0]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size {
            write!(f, "[")?;
            for (j, entry) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", entry)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
