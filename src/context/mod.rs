// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Session context: one loaded problem and everything observed about it.
//!
//! A [`Session`] ties the pipeline together. It parses a matrix file,
//! reduces the matrix with [`lemma23`], builds the [`ZeroHandle`] the
//! reduction describes, and runs [`ZeroHandle::proposition28`] on it. Every
//! mutation is sent to the session's [`Recorder`], which counts events and
//! can keep a log or forward them to a renderer.
//!
//! # Lifecycle
//!
//! - **Load**: [`Session::load_str`] or [`Session::load_matrix`]. A
//!   successful load replaces the current handle, announcing
//!   [`Event::DeleteZeroHandle`] for the old one before drawing the new one.
//!   A failed load leaves the session untouched.
//! - **Run**: [`Session::run`] reduces the loaded handle. It may be called
//!   again; a handle already at infinite depth runs zero rounds.
//!
//! # Memory Model
//!
//! The session owns the only copy of the zero handle. Arrows live in the
//! handle's arena and are named by id in events, so a log stays meaningful
//! after the arrows themselves are freed.

use crate::algebra::DualMatrix;
use crate::events::{Event, EventSink, Recorder, Statistics};
use crate::handle::{HandleError, RunOptions, ZeroHandle};
use crate::io::{parse_matrix, MatrixInput, ParseError};
use crate::reduction::{lemma23, Reduction, ReductionError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("reduction failed: {0}")]
    Reduction(#[from] ReductionError),

    #[error("zero handle error: {0}")]
    Handle(#[from] HandleError),

    #[error("no matrix loaded")]
    NothingLoaded,
}

/// Settings fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Keep every event in memory, not just the counts.
    pub record_events: bool,
    /// Verify box order and handle post-conditions after each step.
    pub check_invariants: bool,
    pub max_rounds: Option<usize>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self {
            record_events: false,
            check_invariants: cfg!(debug_assertions),
            max_rounds: None,
        }
    }

    pub fn record_events(mut self, record: bool) -> Self {
        self.record_events = record;
        self
    }

    pub fn check_invariants(mut self, check: bool) -> Self {
        self.check_invariants = check;
        self
    }

    pub fn max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            check_invariants: self.check_invariants,
            max_rounds: self.max_rounds,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// What a call to [`Session::run`] achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds: usize,
    /// Depth after the run; [`crate::handle::INFINITE_DEPTH`] on success.
    pub depth: u32,
    pub remaining_arrows: usize,
}

#[derive(Debug)]
pub struct Session {
    options: SessionOptions,
    recorder: Recorder,
    input: Option<MatrixInput>,
    reduction: Option<Reduction>,
    zero: Option<ZeroHandle>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            recorder: Recorder::new(options.record_events),
            input: None,
            reduction: None,
            zero: None,
        }
    }

    /// Like [`Session::new`], with every event also passed on to `sink`.
    pub fn with_sink(options: SessionOptions, sink: Box<dyn EventSink>) -> Self {
        Self {
            recorder: Recorder::new(options.record_events).forward_to(sink),
            ..Self::new(options)
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn load_str(&mut self, text: &str) -> Result<&ZeroHandle, SessionError> {
        let input = parse_matrix(text)?;
        self.load(input)
    }

    pub fn load_matrix(&mut self, matrix: DualMatrix, k: usize) -> Result<&ZeroHandle, SessionError> {
        self.load(MatrixInput { k, matrix })
    }

    fn load(&mut self, input: MatrixInput) -> Result<&ZeroHandle, SessionError> {
        let reduction = lemma23(input.matrix.clone(), input.k)?;
        let zero = ZeroHandle::from_reduction(&reduction)?;
        info!(
            size = input.matrix.size(),
            k = input.k,
            void_arrows = reduction.void_arrows.len(),
            full_arrows = reduction.full_arrows.len(),
            "loaded matrix"
        );
        if self.zero.is_some() {
            self.recorder.emit(Event::DeleteZeroHandle);
        }
        self.recorder.emit(zero.draw_event());
        self.input = Some(input);
        self.reduction = Some(reduction);
        Ok(self.zero.insert(zero))
    }

    pub fn run(&mut self) -> Result<RunSummary, SessionError> {
        let options = self.options.run_options();
        let zero = self.zero.as_mut().ok_or(SessionError::NothingLoaded)?;
        let rounds = zero.proposition28(&mut self.recorder, &options)?;
        let summary = RunSummary {
            rounds,
            depth: zero.depth(),
            remaining_arrows: zero.arrow_count(),
        };
        info!(rounds, remaining = summary.remaining_arrows, "reduction finished");
        Ok(summary)
    }

    pub fn input(&self) -> Option<&MatrixInput> {
        self.input.as_ref()
    }

    pub fn reduction(&self) -> Option<&Reduction> {
        self.reduction.as_ref()
    }

    pub fn zero_handle(&self) -> Option<&ZeroHandle> {
        self.zero.as_ref()
    }

    pub fn statistics(&self) -> &Statistics {
        self.recorder.statistics()
    }

    pub fn events(&self) -> &[Event] {
        self.recorder.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.recorder.take_events()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::handle::INFINITE_DEPTH;
    use crate::reduction::InputDefect;

    const SMALLEST: &str = "matrix\n0\n2\n00 01\n10 00\n";
    const ONE_VOID_ARROW: &str = "matrix\n0\n4\n00 00 01 01\n00 00 00 01\n10 10 00 00\n00 10 00 00\n";

    fn recording() -> Session {
        Session::new(SessionOptions::new().record_events(true).check_invariants(true))
    }

    #[test]
    fn test_run_before_load() {
        let mut session = Session::default();
        assert!(matches!(session.run(), Err(SessionError::NothingLoaded)));
    }

    #[test]
    fn test_load_draws_handle() {
        let mut session = recording();
        let zero = session.load_str(SMALLEST).unwrap();
        assert_eq!(zero.pairing().as_slice(), &[1, 0]);
        assert_eq!(session.events().len(), 1);
        assert!(matches!(session.events()[0], Event::DrawZeroHandle { .. }));
    }

    #[test]
    fn test_reload_deletes_previous_handle() {
        let mut session = recording();
        session.load_str(SMALLEST).unwrap();
        session.load_str(ONE_VOID_ARROW).unwrap();
        let kinds: Vec<_> = session.events().iter().map(EventKind::from).collect();
        assert_eq!(
            kinds,
            vec![EventKind::DrawZeroHandle, EventKind::DeleteZeroHandle, EventKind::DrawZeroHandle]
        );
        assert_eq!(session.input().map(|input| input.matrix.size()), Some(4));
    }

    #[test]
    fn test_failed_load_keeps_handle() {
        let mut session = recording();
        session.load_str(SMALLEST).unwrap();
        let err = session.load_str("matrix\n0\n2\n10 01\n01 10\n").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Reduction(ReductionError::InvalidInput(InputDefect::NotUIdentity))
        ));
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.zero_handle().map(|z| z.pairing().size()), Some(2));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let mut session = Session::default();
        assert!(matches!(session.load_str("nothing"), Err(SessionError::Parse(_))));
        assert!(session.zero_handle().is_none());
    }

    #[test]
    fn test_run_empty_handle() {
        let mut session = recording();
        session.load_str(SMALLEST).unwrap();
        let summary = session.run().unwrap();
        assert_eq!(
            summary,
            RunSummary {
                rounds: 0,
                depth: INFINITE_DEPTH,
                remaining_arrows: 0
            }
        );
    }

    #[test]
    fn test_take_events_drains_log() {
        let mut session = recording();
        session.load_str(SMALLEST).unwrap();
        assert_eq!(session.take_events().len(), 1);
        assert!(session.events().is_empty());
        assert_eq!(session.statistics().get(EventKind::DrawZeroHandle), 1);
    }
}
