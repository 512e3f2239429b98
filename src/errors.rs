//! Error types for grid ingestion, crossing resolution and the constraint engine.
//!
//! Every variant carries a short stable code for lookup:
//!
//! - G001: `GridError::Empty`
//! - G002: `GridError::IrregularRow`
//! - G003: `GridError::UnknownMarker`
//! - R001: `ResolveError::NoSegments`
//! - R002: `ResolveError::CellNotInSegment`
//! - R003: `ResolveError::TooManySegments`
//! - S001: `EngineError::UnknownVariable`
//! - F001: `CrossfillError::Io`
//!
//! "No solution" is an [`crate::Outcome`], not an error.

use std::io;
use std::path::PathBuf;

use crate::grid::Cell;

/// Structural problems with a grid, raised before any segment is computed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    IrregularRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown marker {marker:?} at ({row}, {col})")]
    UnknownMarker { row: usize, col: usize, marker: char },
}

impl GridError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            GridError::Empty => "G001",
            GridError::IrregularRow { .. } => "G002",
            GridError::UnknownMarker { .. } => "G003",
        }
    }
}

/// Precondition failures of the crossing resolver.
///
/// These are kept apart from an empty result, which is a legitimate
/// "no letter fits" answer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("cell {cell:?} lies on no segment")]
    NoSegments { cell: Cell },

    #[error("cell {cell:?} is not a member of the segment starting at {start:?}")]
    CellNotInSegment { cell: Cell, start: Cell },

    #[error("cell {cell:?} lies on {count} segments; at most two are possible")]
    TooManySegments { cell: Cell, count: usize },
}

impl ResolveError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::NoSegments { .. } => "R001",
            ResolveError::CellNotInSegment { .. } => "R002",
            ResolveError::TooManySegments { .. } => "R003",
        }
    }
}

/// Misuse of a [`crate::ConstraintEngine`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("constraint refers to unknown variable {name}")]
    UnknownVariable { name: String },
}

impl EngineError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownVariable { .. } => "S001",
        }
    }
}

/// Unified error for the compile-and-solve pipeline and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CrossfillError {
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error("crossing resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("engine rejected the model: {0}")]
    Engine(#[from] EngineError),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CrossfillError {
    /// Returns the code of the underlying error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            CrossfillError::Grid(e) => e.code(),
            CrossfillError::Resolve(e) => e.code(),
            CrossfillError::Engine(e) => e.code(),
            CrossfillError::Io { .. } => "F001",
        }
    }

    /// Formats the error together with its code, for terminal output.
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format!("[{}] {self}", self.code())
    }
}
