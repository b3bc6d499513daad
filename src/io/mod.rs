// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Reading and writing matrices over the dual ring.
//!
//! # Format
//!
//! ```text
//! matrix        label; "matrix" or "entries", spaces ignored
//! 1             split k
//! 4             size
//! 0*U+0 0,0 00 01
//! ...
//! ```
//!
//! A `matrix` body lists `size` rows of `size` elements. An `entries` body
//! lists `i j value` triples up to the end of input; unlisted entries are
//! zero. An element is `u*U+c`, `u,c` (spaces allowed around the comma) or
//! `uc`, with `u` and `c` each `0` or `1`.

use crate::algebra::{Dual, DualMatrix};
use thiserror::Error;

/// Largest accepted split or size.
pub const MAX_DIMENSION: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: missing header")]
    MissingHeader { line: usize },

    #[error("line {line}: unknown layout {label:?}, expected \"matrix\" or \"entries\"")]
    UnknownLayout { line: usize, label: String },

    #[error("line {line}: expected a number, found {found:?}")]
    BadNumber { line: usize, found: String },

    #[error("line {line}: {value} exceeds {}", MAX_DIMENSION)]
    TooLarge { line: usize, value: usize },

    #[error("line {line}: bad ring element {found:?}")]
    BadToken { line: usize, found: String },

    #[error("line {line}: index {index} out of range for size {size}")]
    IndexOutOfRange { line: usize, index: usize, size: usize },

    #[error("line {line}: input ends before {expected}")]
    Truncated { line: usize, expected: &'static str },
}

/// A parsed matrix file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixInput {
    pub k: usize,
    pub matrix: DualMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Dense,
    Entries,
}

pub fn parse_matrix(text: &str) -> Result<MatrixInput, ParseError> {
    let (label, rest) = match text.split_once('\n') {
        Some((label, rest)) => (label, rest),
        None => (text, ""),
    };
    let label: String = label.chars().filter(|&c| c != ' ' && c != '\r').collect();
    let layout = match label.as_str() {
        "" => return Err(ParseError::MissingHeader { line: 1 }),
        "matrix" => Layout::Dense,
        "entries" => Layout::Entries,
        _ => return Err(ParseError::UnknownLayout { line: 1, label }),
    };
    let mut scanner = Scanner::new(rest, 2);
    let k = scanner.dimension("the split")?;
    let size = scanner.dimension("the size")?;
    let mut matrix = DualMatrix::new(size);
    match layout {
        Layout::Dense => {
            for i in 0..size {
                for j in 0..size {
                    matrix[(i, j)] = scanner.element("a row element")?;
                }
            }
        }
        Layout::Entries => {
            while !scanner.at_end() {
                let i = scanner.index(size)?;
                let j = scanner.index(size)?;
                matrix[(i, j)] = scanner.element("an entry value")?;
            }
        }
    }
    Ok(MatrixInput { k, matrix })
}

/// Writes `input` in the dense layout, readable by [`parse_matrix`].
pub fn to_text(input: &MatrixInput) -> String {
    let size = input.matrix.size();
    let mut out = format!("matrix\n{}\n{}\n", input.k, size);
    for i in 0..size {
        let row: Vec<String> = input.matrix.row(i).iter().map(Dual::to_string).collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

/// Rows as `[u*U+c, u*U+c, ...]`.
pub fn print_matrix(matrix: &DualMatrix) -> String {
    matrix.to_string()
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.bump();
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.peek().is_none()
    }

    /// The rest of the current word, for error messages.
    fn word(&self) -> String {
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(rest.len());
        String::from_utf8_lossy(&rest[..len]).into_owned()
    }

    fn number(&mut self, expected: &'static str) -> Result<usize, ParseError> {
        if self.at_end() {
            return Err(ParseError::Truncated { line: self.line, expected });
        }
        let line = self.line;
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
        }
        let digits = &self.bytes[start..self.pos];
        let followed_by_word = self.peek().is_some_and(|b| !b.is_ascii_whitespace());
        if digits.is_empty() || followed_by_word {
            self.pos = start;
            return Err(ParseError::BadNumber { line, found: self.word() });
        }
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ParseError::BadNumber {
                line,
                found: String::from_utf8_lossy(digits).into_owned(),
            })
    }

    fn dimension(&mut self, expected: &'static str) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let line = self.line;
        let value = self.number(expected)?;
        if value > MAX_DIMENSION {
            return Err(ParseError::TooLarge { line, value });
        }
        Ok(value)
    }

    fn index(&mut self, size: usize) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let line = self.line;
        let index = self.number("an entry index")?;
        if index >= size {
            return Err(ParseError::IndexOutOfRange { line, index, size });
        }
        Ok(index)
    }

    fn bit(&mut self) -> Option<bool> {
        match self.peek() {
            Some(b'0') => {
                self.bump();
                Some(false)
            }
            Some(b'1') => {
                self.bump();
                Some(true)
            }
            _ => None,
        }
    }

    fn element(&mut self, expected: &'static str) -> Result<Dual, ParseError> {
        if self.at_end() {
            return Err(ParseError::Truncated { line: self.line, expected });
        }
        let line = self.line;
        let start = self.pos;
        let bad = |scanner: &mut Self| {
            scanner.pos = start;
            ParseError::BadToken {
                line,
                found: scanner.word(),
            }
        };
        let Some(u) = self.bit() else {
            return Err(bad(self));
        };
        match self.peek() {
            Some(b'*') => {
                self.bump();
                if self.bump() != Some(b'U') || self.bump() != Some(b'+') {
                    return Err(bad(self));
                }
            }
            Some(b' ') | Some(b'\t') | Some(b',') => {
                self.skip_blanks();
                if self.bump() != Some(b',') {
                    return Err(bad(self));
                }
                self.skip_blanks();
            }
            _ => {}
        }
        let Some(c) = self.bit() else {
            return Err(bad(self));
        };
        Ok(Dual::new(u, c))
    }
}
