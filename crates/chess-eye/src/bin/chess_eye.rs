//! Command line driver for the photo pipeline.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use chess_eye::{load_photo, BoardSession, CalibrationParams, GridCalibrator};

#[derive(Parser)]
#[command(
    name = "chess-eye",
    version,
    about = "Chess move recognition from photos of a physical board"
)]
struct Cli {
    /// Print debug logs to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calibrate the board grid from a photo of the empty board.
    Calibrate {
        /// Photo of the empty board.
        photo: PathBuf,
        /// Write the grid as JSON to this path instead of a summary.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Follow a game through a sequence of photos.
    Watch {
        /// Photo of the empty board.
        empty: PathBuf,
        /// Photo of the starting position.
        start: PathBuf,
        /// One photo per move, in order.
        #[arg(required = true)]
        moves: Vec<PathBuf>,
        /// Print move records as JSON lines instead of notation + FEN.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    chess_eye::core::init_with_level(level)?;

    match cli.command {
        Command::Calibrate { photo, out } => calibrate(&photo, out.as_deref()),
        Command::Watch {
            empty,
            start,
            moves,
            json,
        } => watch(&empty, &start, &moves, json),
    }
}

fn calibrate(path: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let photo = load_photo(path)?;
    let calibrator = GridCalibrator::new(CalibrationParams::default());
    let grid = calibrator
        .calibrate(&photo.view())
        .with_context(|| format!("calibration failed on {}", path.display()))?;

    match out {
        Some(out) => {
            let json = serde_json::to_string_pretty(&grid)?;
            std::fs::write(out, json)
                .with_context(|| format!("could not write {}", out.display()))?;
            println!("grid written to {}", out.display());
        }
        None => println!(
            "grid at rotation {:.1} deg, cells {:.1} x {:.1} px, a1 anchor ({:.1}, {:.1})",
            grid.rotation_deg,
            grid.cell_w.abs(),
            grid.cell_h.abs(),
            grid.anchor(0, 0).x,
            grid.anchor(0, 0).y,
        ),
    }
    Ok(())
}

fn watch(empty: &Path, start: &Path, moves: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let mut session = BoardSession::default();
    session
        .initialize(&load_photo(empty)?)
        .with_context(|| format!("calibration failed on {}", empty.display()))?;
    session
        .place_pieces(&load_photo(start)?)
        .with_context(|| format!("could not lock orientation from {}", start.display()))?;

    for path in moves {
        let record = session
            .observe_move(&load_photo(path)?)
            .with_context(|| format!("no move recognized in {}", path.display()))?;
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{}  {}", record.notation, session.fen());
        }
    }
    Ok(())
}
