//! Segment discovery.
//!
//! A segment is a maximal run of open cells along one axis, at least two
//! cells long. Each segment is one word slot of the puzzle. The finder works
//! from a single cell; the registry applies it to every open cell and keeps
//! each distinct segment once.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::grid::Cell;

/// Direction a segment runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// A run along a row (column index varies).
    Across,
    /// A run along a column (row index varies).
    Down,
}

/// An ordered run of adjacent open cells.
///
/// Identity is the cell sequence itself, so two segments discovered from
/// different starting cells compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    cells: Vec<Cell>,
}

impl Segment {
    /// Builds a segment from cells already sorted along their axis.
    ///
    /// Callers outside this module go through [`find_segments`] or
    /// [`SegmentRegistry`], which only ever produce maximal runs.
    pub(crate) fn from_sorted(cells: Vec<Cell>) -> Self {
        debug_assert!(cells.len() >= 2, "a segment spans at least two cells");
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    pub fn end(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    pub fn axis(&self) -> Axis {
        if self.cells[0].0 == self.cells[1].0 {
            Axis::Across
        } else {
            Axis::Down
        }
    }

    /// Position of `cell` within the segment.
    pub fn position(&self, cell: Cell) -> Option<usize> {
        self.cells.iter().position(|&member| member == cell)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.position(cell).is_some()
    }
}

/// Grows the run through `origin` on one axis.
///
/// `key` extracts the varying coordinate. Candidates are visited by distance
/// from the origin, so every admitted cell is adjacent to one admitted before
/// it and a single pass reaches the whole run.
fn grow_run<F>(origin: Cell, candidates: impl Iterator<Item = Cell>, key: F) -> Option<Segment>
where
    F: Fn(Cell) -> usize,
{
    let anchor = key(origin);
    let mut candidates: Vec<Cell> = candidates.collect();
    candidates.sort_by_key(|&cell| (anchor.abs_diff(key(cell)), key(cell)));

    let mut run = vec![origin];
    let mut reached: FxHashSet<usize> = FxHashSet::default();
    reached.insert(anchor);

    for cell in candidates {
        let position = key(cell);
        if reached.contains(&position) {
            continue;
        }
        let touches_run = reached.contains(&(position + 1))
            || position.checked_sub(1).is_some_and(|prev| reached.contains(&prev));
        if touches_run {
            reached.insert(position);
            run.push(cell);
        }
    }

    if run.len() < 2 {
        return None;
    }
    run.sort_by_key(|&cell| key(cell));
    Some(Segment::from_sorted(run))
}

/// Finds the zero, one or two segments that contain `cell`.
///
/// The across segment, if any, comes first. The result does not depend on
/// the iteration order of `open_cells`.
pub fn find_segments(cell: Cell, open_cells: &BTreeSet<Cell>) -> Vec<Segment> {
    let (row, col) = cell;
    let mut segments = Vec::with_capacity(2);

    let same_row = open_cells.iter().copied().filter(|&(r, _)| r == row);
    if let Some(across) = grow_run(cell, same_row, |(_, c)| c) {
        segments.push(across);
    }

    let same_col = open_cells.iter().copied().filter(|&(_, c)| c == col);
    if let Some(down) = grow_run(cell, same_col, |(r, _)| r) {
        segments.push(down);
    }

    segments
}

/// Every distinct segment of a grid, in first-seen order.
///
/// Cells are visited row-major, so the order is stable for a given grid.
#[derive(Debug, Clone, Default)]
pub struct SegmentRegistry {
    segments: Vec<Segment>,
    by_cell: FxHashMap<Cell, Vec<usize>>,
}

impl SegmentRegistry {
    /// Runs the finder on every open cell and keeps each segment once.
    pub fn build(open_cells: &BTreeSet<Cell>) -> Self {
        let mut registry = Self::default();
        let mut seen: FxHashMap<Segment, usize> = FxHashMap::default();

        for &cell in open_cells {
            for segment in find_segments(cell, open_cells) {
                let index = match seen.get(&segment) {
                    Some(&index) => index,
                    None => {
                        let index = registry.segments.len();
                        seen.insert(segment.clone(), index);
                        registry.segments.push(segment);
                        index
                    }
                };
                registry.by_cell.entry(cell).or_default().push(index);
            }
        }

        log::debug!(
            "registered {} segments over {} open cells",
            registry.segments.len(),
            open_cells.len()
        );
        registry
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments containing `cell`, across first.
    pub fn segments_for(&self, cell: Cell) -> Vec<&Segment> {
        self.by_cell
            .get(&cell)
            .map(|indices| indices.iter().map(|&i| &self.segments[i]).collect())
            .unwrap_or_default()
    }

    /// Cells lying on two segments, row-major.
    pub fn crossings(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .by_cell
            .iter()
            .filter(|(_, indices)| indices.len() == 2)
            .map(|(&cell, _)| cell)
            .collect();
        cells.sort_unstable();
        cells
    }
}
