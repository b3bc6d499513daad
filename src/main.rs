// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! `train-tracks`: reduce a matrix file and empty the resulting zero handle.
//!
//! ```text
//! train-tracks [-v...] [--print-matrix] [--events] [--max-rounds N] <PATH>
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use train_tracks::io::print_matrix;
use train_tracks::{Session, SessionOptions, INFINITE_DEPTH};

/// Remove every arrow from the zero handle a matrix describes.
#[derive(Parser)]
#[command(name = "train-tracks", version, about)]
struct Cli {
    /// Matrix file, in the `matrix` or `entries` layout.
    path: PathBuf,

    /// Print the input and reduced matrices.
    #[arg(long)]
    print_matrix: bool,

    /// Print every event as it was recorded.
    #[arg(long)]
    events: bool,

    /// Stop with an error after this many rounds.
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Repeat for more logging (info, debug, trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let text = std::fs::read_to_string(&cli.path)
        .with_context(|| format!("reading {}", cli.path.display()))?;

    let options = SessionOptions::new()
        .record_events(cli.events)
        .max_rounds(cli.max_rounds);
    let mut session = Session::new(options);
    session
        .load_str(&text)
        .with_context(|| format!("loading {}", cli.path.display()))?;

    if cli.print_matrix {
        if let Some(input) = session.input() {
            println!("Input (k = {}):", input.k);
            print!("{}", print_matrix(&input.matrix));
        }
        if let Some(reduction) = session.reduction() {
            println!("Reduced:");
            print!("{}", print_matrix(&reduction.matrix));
        }
    }
    if let Some(zero) = session.zero_handle() {
        println!("Pairing: {:?}", zero.pairing().as_slice());
        println!(
            "Tracks: {} void, {} full; {} arrows",
            zero.boundary().void_tracks,
            zero.boundary().full_tracks,
            zero.arrow_count()
        );
    }

    let summary = session.run().context("reducing the zero handle")?;

    if cli.events {
        for event in session.events() {
            println!("{:?}", event);
        }
    }
    println!("Rounds: {}", summary.rounds);
    if summary.depth == INFINITE_DEPTH {
        println!("Depth: Infinity");
    } else {
        println!("Depth: {}", summary.depth);
    }
    println!("Remaining arrows: {}", summary.remaining_arrows);
    for (kind, count) in session.statistics().non_zero() {
        println!("{:>28}: {}", kind.to_string(), count);
    }
    Ok(())
}
