//! Text rendering of solve results and saving them to disk.
//!
//! Report layout:
//! - header line: `Found N solutions:` or `No solution was found.`
//! - per solution, after a blank line:
//!   - `Solution i:`
//!   - the grid with letters overlaid on open cells
//!   - a blank line, then one `word  slot` line per segment

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::CrossfillError;
use crate::grid::Grid;
use crate::model::Variable;
use crate::segments::SegmentRegistry;
use crate::words::WordList;
use crate::{Outcome, Solution};

/// Formats one solution: the filled grid, then the word chosen per segment.
pub fn format_solution(grid: &Grid, words: &WordList, solution: &Solution) -> String {
    let mut output = grid.overlay(|cell| solution.letter(cell));
    output.push('\n');

    let chosen: Vec<(&str, String)> = solution
        .words()
        .iter()
        .map(|(segment, index)| {
            let word = words.get(*index).map_or("?", |w| w.as_str());
            (word, Variable::SegmentVar(segment.clone()).to_string())
        })
        .collect();
    let width = chosen.iter().map(|(word, _)| word.chars().count()).max().unwrap_or(0);

    for (word, slot) in chosen {
        output.push_str(&format!("{word:<width$}  {slot}\n"));
    }
    output
}

/// Formats a whole solve outcome.
pub fn format_report(grid: &Grid, words: &WordList, outcome: &Outcome) -> String {
    match outcome {
        Outcome::NoSolution => "No solution was found.\n".to_string(),
        Outcome::Solved(solutions) => {
            let mut output = format!("Found {} solutions:\n", solutions.len());
            for (i, solution) in solutions.iter().enumerate() {
                output.push_str(&format!("\nSolution {}:\n", i + 1));
                output.push_str(&format_solution(grid, words, solution));
            }
            output
        }
    }
}

/// Lists every registered segment with its cells.
pub fn format_segments(registry: &SegmentRegistry) -> String {
    let mut output = format!("{} segments:\n", registry.len());
    for (i, segment) in registry.segments().iter().enumerate() {
        let cells: Vec<String> = segment
            .cells()
            .iter()
            .map(|(row, col)| format!("({row}, {col})"))
            .collect();
        output.push_str(&format!(
            "{:>3}  {}  [{}]\n",
            i + 1,
            Variable::SegmentVar(segment.clone()),
            cells.join(", ")
        ));
    }
    output
}

/// Writes a rendered report to `path`, replacing any existing file.
pub fn save(path: impl AsRef<Path>, report: &str) -> Result<(), CrossfillError> {
    let path = path.as_ref();
    let io_error = |source| CrossfillError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(report.as_bytes()).map_err(io_error)?;
    log::info!("wrote {}", path.display());
    Ok(())
}
