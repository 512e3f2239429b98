//! Crossword Fill
//!
//! Fills a crossword grid from a word list. The grid is compiled into a
//! constraint model (one letter variable per open cell, one word variable per
//! slot) and solved with arc-consistency and backtracking search.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crossfill::errors::CrossfillError;
use crossfill::grid::{Grid, GridFormat};
use crossfill::segments::SegmentRegistry;
use crossfill::words::WordList;
use crossfill::{crossing, persistence, SolveOptions};

/// Fills crossword grids from a word list.
#[derive(Parser)]
#[command(name = "crossfill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Grid file and the markers it is written with.
#[derive(Args)]
struct GridArgs {
    /// Grid file, one row per line.
    grid: PathBuf,

    /// Marker for open cells.
    #[arg(long, default_value_t = '.')]
    open: char,

    /// Marker for blocked cells.
    #[arg(long, default_value_t = '#')]
    block: char,
}

impl GridArgs {
    fn load(&self) -> Result<Grid, CrossfillError> {
        let format = GridFormat {
            open: self.open,
            block: self.block,
        };
        Grid::load_from_path(&self.grid, format)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fill the grid and print the result.
    Solve {
        #[command(flatten)]
        grid: GridArgs,

        /// Word list file, one word per line.
        words: PathBuf,

        /// Maximum number of solutions to report (0 for all).
        #[arg(short = 'n', long, default_value_t = 1)]
        max_solutions: usize,

        /// Narrow crossing cells with the crossing resolver before solving.
        #[arg(long)]
        prefilter: bool,

        /// Also write the report to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the word slots of a grid.
    Segments {
        #[command(flatten)]
        grid: GridArgs,
    },
    /// Show the letters each crossing cell can take.
    Crossings {
        #[command(flatten)]
        grid: GridArgs,

        /// Word list file, one word per line.
        words: PathBuf,
    },
}

fn main() -> ExitCode {
    let debug_enabled = std::env::var("CROSSFILL_DEBUG").is_ok();
    crossfill::logging::init_logger(debug_enabled);

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Solve {
            grid,
            words,
            max_solutions,
            prefilter,
            output,
        } => run_solve(&grid, &words, max_solutions, prefilter, output),
        Command::Segments { grid } => run_segments(&grid),
        Command::Crossings { grid, words } => run_crossings(&grid, &words),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.display_detailed());
            ExitCode::FAILURE
        }
    }
}

/// Solves the puzzle and prints (and optionally saves) the report.
///
/// "No solution" is reported on stdout and is not a failure.
fn run_solve(
    grid_args: &GridArgs,
    words_path: &Path,
    max_solutions: usize,
    prefilter: bool,
    output: Option<PathBuf>,
) -> Result<(), CrossfillError> {
    let grid = grid_args.load()?;
    let words = WordList::load_from_path(words_path)?;
    log::info!(
        "solving {}x{} grid with {} words",
        grid.height(),
        grid.width(),
        words.len()
    );

    let options = SolveOptions {
        max_solutions: (max_solutions > 0).then_some(max_solutions),
        prefilter,
    };
    let outcome = crossfill::solve_puzzle(&grid, &words, &options)?;
    let report = persistence::format_report(&grid, &words, &outcome);
    print!("{report}");

    if let Some(path) = output {
        persistence::save(path, &report)?;
    }
    Ok(())
}

/// Prints every segment of the grid.
fn run_segments(grid_args: &GridArgs) -> Result<(), CrossfillError> {
    let grid = grid_args.load()?;
    let registry = SegmentRegistry::build(&grid.open_cells());
    print!("{}", persistence::format_segments(&registry));
    Ok(())
}

/// Prints the resolved letters of every crossing cell.
fn run_crossings(grid_args: &GridArgs, words_path: &Path) -> Result<(), CrossfillError> {
    let grid = grid_args.load()?;
    let words = WordList::load_from_path(words_path)?;
    let registry = SegmentRegistry::build(&grid.open_cells());

    let crossings = registry.crossings();
    println!("{} crossings:", crossings.len());
    for cell in crossings {
        let letters = crossing::crossing_letters(cell, &registry.segments_for(cell), &words)?;
        let letters: String = letters.into_iter().collect();
        let letters = if letters.is_empty() { "-".to_string() } else { letters };
        println!("  ({}, {})  {letters}", cell.0, cell.1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_solve_arguments() {
        let cli = Cli::try_parse_from([
            "crossfill", "solve", "grid.txt", "words.txt", "-n", "0", "--prefilter", "--block", "X",
        ])
        .unwrap();
        match cli.command {
            Command::Solve {
                grid,
                words,
                max_solutions,
                prefilter,
                output,
            } => {
                assert_eq!(grid.grid, PathBuf::from("grid.txt"));
                assert_eq!(grid.block, 'X');
                assert_eq!(grid.open, '.');
                assert_eq!(words, PathBuf::from("words.txt"));
                assert_eq!(max_solutions, 0);
                assert!(prefilter);
                assert!(output.is_none());
            }
            _ => panic!("expected the solve subcommand"),
        }
    }

    #[test]
    fn test_missing_word_list_is_rejected() {
        assert!(Cli::try_parse_from(["crossfill", "crossings", "grid.txt"]).is_err());
    }
}
