//! Grid representation and parsing for crossword puzzles.
//!
//! A grid is a rectangle of characters where each position is either a
//! block marker or an open marker. Open positions become [`Cell`]s, which are
//! addressed as `(row, column)`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::errors::{CrossfillError, GridError};

/// A grid position as `(row, column)`.
pub type Cell = (usize, usize);

/// Markers used to read and render a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFormat {
    /// Marker for a cell that holds a letter.
    pub open: char,
    /// Marker for a blocked cell.
    pub block: char,
}

impl Default for GridFormat {
    fn default() -> Self {
        Self {
            open: '.',
            block: '#',
        }
    }
}

/// A rectangular crossword grid.
///
/// `true` marks an open cell. The grid is read-only once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<bool>>,
    width: usize,
    format: GridFormat,
}

impl Grid {
    /// Parses a grid from text, one row per line.
    ///
    /// `\r\n` line endings are accepted and a trailing empty line is ignored.
    /// Every row must have the same width and contain only the two markers.
    pub fn parse(contents: &str, format: GridFormat) -> Result<Self, GridError> {
        let lines: Vec<&str> = contents
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        // a file ending in a newline produces one empty trailing line
        let lines = match lines.split_last() {
            Some((last, rest)) if last.is_empty() => rest,
            _ => &lines[..],
        };

        if lines.iter().all(|line| line.is_empty()) {
            return Err(GridError::Empty);
        }

        let width = lines[0].chars().count();
        let mut rows = Vec::with_capacity(lines.len());

        for (row, line) in lines.iter().enumerate() {
            let mut cells = Vec::with_capacity(width);
            for (col, marker) in line.chars().enumerate() {
                if marker == format.open {
                    cells.push(true);
                } else if marker == format.block {
                    cells.push(false);
                } else {
                    return Err(GridError::UnknownMarker { row, col, marker });
                }
            }
            if cells.len() != width {
                return Err(GridError::IrregularRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
            rows.push(cells);
        }

        Ok(Self {
            rows,
            width,
            format,
        })
    }

    /// Reads and parses a grid file.
    pub fn load_from_path(path: impl AsRef<Path>, format: GridFormat) -> Result<Self, CrossfillError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CrossfillError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents, format)?)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn format(&self) -> GridFormat {
        self.format
    }

    /// Returns `true` if the position is inside the grid and open.
    #[inline]
    pub fn is_open(&self, (row, col): Cell) -> bool {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Collects every open cell, ordered row-major.
    pub fn open_cells(&self) -> BTreeSet<Cell> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|&(_, &open)| open)
                    .map(move |(col, _)| (row, col))
            })
            .collect()
    }

    /// Renders the grid with `letter` consulted for every open cell.
    ///
    /// Open cells without a letter keep the open marker; blocked cells keep
    /// the block marker. Each row ends with a newline.
    pub fn overlay<F>(&self, mut letter: F) -> String
    where
        F: FnMut(Cell) -> Option<char>,
    {
        let mut output = String::with_capacity(self.height() * (self.width + 1));
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, &open) in cells.iter().enumerate() {
                let display_char = if open {
                    letter((row, col)).unwrap_or(self.format.open)
                } else {
                    self.format.block
                };
                output.push(display_char);
            }
            output.push('\n');
        }
        output
    }
}
