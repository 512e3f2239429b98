//! Crossword Fill Library
//!
//! Compiles a crossword grid and a word list into a binary constraint model
//! and extracts filled grids from the engine's solutions.

pub mod crossing;
pub mod errors;
pub mod grid;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod segments;
pub mod solver;
pub mod words;

use std::collections::{BTreeMap, BTreeSet};

use errors::{CrossfillError, EngineError};
use grid::{Cell, Grid};
use model::{compile, Value, Variable};
use segments::{Segment, SegmentRegistry};
use solver::{Assignment, Network};
use words::WordList;

/// What the compiler needs from a constraint-satisfaction engine.
///
/// The engine owns its domains once variables are added; the compiler only
/// hands over a snapshot and reads back assignments.
pub trait ConstraintEngine {
    type Key;
    type Value;

    /// Adds a variable, or replaces the domain of an existing one.
    fn add_variable(&mut self, key: Self::Key, domain: BTreeSet<Self::Value>);

    /// Adds a binary constraint listing every allowed `(x, y)` value pair.
    fn add_constraint(
        &mut self,
        x: &Self::Key,
        y: &Self::Key,
        allowed: Vec<(Self::Value, Self::Value)>,
    ) -> Result<(), EngineError>;

    /// Tightens all domains to arc-consistency.
    ///
    /// Returns `false` if some domain became empty.
    fn maintain_arc_consistency(&mut self) -> bool;

    /// Returns up to `max_solutions` complete assignments; none means the
    /// problem has no solution.
    fn solve(&self, max_solutions: Option<usize>) -> Vec<Assignment<Self::Key, Self::Value>>;
}

/// Settings for [`solve_puzzle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOptions {
    /// Stop after this many solutions; `None` finds them all.
    pub max_solutions: Option<usize>,
    /// Narrow crossing cells with the crossing resolver before solving.
    pub prefilter: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_solutions: Some(1),
            prefilter: false,
        }
    }
}

/// A filled grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    letters: BTreeMap<Cell, char>,
    /// Chosen word index per segment, in registry order.
    words: Vec<(Segment, usize)>,
}

impl Solution {
    fn from_assignment(assignment: Assignment<Variable, Value>) -> Self {
        let mut letters = BTreeMap::new();
        let mut words = Vec::new();
        for (variable, value) in assignment {
            match (variable, value) {
                (Variable::CellVar(cell), Value::Letter(letter)) => {
                    letters.insert(cell, letter);
                }
                (Variable::SegmentVar(segment), Value::Word(index)) => {
                    words.push((segment, index));
                }
                (variable, value) => {
                    log::warn!("ignoring mismatched value {value:?} for {variable}");
                }
            }
        }
        Self { letters, words }
    }

    pub fn letter(&self, cell: Cell) -> Option<char> {
        self.letters.get(&cell).copied()
    }

    pub fn letters(&self) -> &BTreeMap<Cell, char> {
        &self.letters
    }

    pub fn words(&self) -> &[(Segment, usize)] {
        &self.words
    }
}

/// Result of a solve: either solutions or a definite "no solution".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved(Vec<Solution>),
    NoSolution,
}

/// Compiles the puzzle and solves it with the built-in [`Network`] engine.
pub fn solve_puzzle(
    grid: &Grid,
    words: &WordList,
    options: &SolveOptions,
) -> Result<Outcome, CrossfillError> {
    solve_with(Network::new(), grid, words, options)
}

/// Compiles the puzzle and solves it with any engine.
pub fn solve_with<E>(
    mut engine: E,
    grid: &Grid,
    words: &WordList,
    options: &SolveOptions,
) -> Result<Outcome, CrossfillError>
where
    E: ConstraintEngine<Key = Variable, Value = Value>,
{
    let open_cells = grid.open_cells();
    let registry = SegmentRegistry::build(&open_cells);
    let mut model = compile(&open_cells, registry.segments(), words);

    if options.prefilter {
        crossing::prefilter(&mut model, &registry, words)?;
    }

    model.install(&mut engine)?;

    if !engine.maintain_arc_consistency() {
        log::info!("propagation emptied a domain; no solution");
        return Ok(Outcome::NoSolution);
    }

    let solutions: Vec<Solution> = engine
        .solve(options.max_solutions)
        .into_iter()
        .map(Solution::from_assignment)
        .collect();

    log::info!("found {} solutions", solutions.len());
    if solutions.is_empty() {
        Ok(Outcome::NoSolution)
    } else {
        Ok(Outcome::Solved(solutions))
    }
}
