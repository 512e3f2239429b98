//! Compiles a grid's cells and segments into a constraint model.
//!
//! Every open cell becomes a letter variable and every segment a word
//! variable. Each (segment, member cell) pair gets one binary constraint
//! tying the chosen word to the letter at that cell's position.

use std::collections::BTreeSet;
use std::fmt;

use crate::errors::EngineError;
use crate::grid::Cell;
use crate::segments::{Axis, Segment};
use crate::words::{WordList, ALPHABET};
use crate::ConstraintEngine;

/// A model variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    /// One grid cell; takes a letter.
    CellVar(Cell),
    /// One word slot; takes a word index.
    SegmentVar(Segment),
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::CellVar((row, col)) => write!(f, "cell ({row}, {col})"),
            Variable::SegmentVar(segment) => {
                let (row, col) = segment.start();
                let axis = match segment.axis() {
                    Axis::Across => "across",
                    Axis::Down => "down",
                };
                write!(f, "{axis} ({row}, {col}) x{}", segment.len())
            }
        }
    }
}

/// A value in a variable's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Letter(char),
    /// Index into the word list.
    Word(usize),
}

/// Ties a segment's word to the letter of one of its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub segment: Segment,
    pub cell: Cell,
    /// Position of `cell` within `segment`.
    pub position: usize,
    /// `(word index, letter)` pairs the two variables may take together.
    pub allowed: BTreeSet<(usize, char)>,
}

/// Variables with their initial domains, plus the constraints between them.
///
/// Variables are ordered cells first (row-major), then segments in registry
/// order; constraints follow registry order, then position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    variables: Vec<(Variable, BTreeSet<Value>)>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn variables(&self) -> &[(Variable, BTreeSet<Value>)] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn domain(&self, variable: &Variable) -> Option<&BTreeSet<Value>> {
        self.variables
            .iter()
            .find(|(candidate, _)| candidate == variable)
            .map(|(_, domain)| domain)
    }

    pub fn num_cell_variables(&self) -> usize {
        self.variables
            .iter()
            .filter(|(v, _)| matches!(v, Variable::CellVar(_)))
            .count()
    }

    pub fn num_segment_variables(&self) -> usize {
        self.variables
            .iter()
            .filter(|(v, _)| matches!(v, Variable::SegmentVar(_)))
            .count()
    }

    /// Keeps only `letters` in the domain of `cell`.
    ///
    /// Returns `false` if the cell is not part of the model.
    pub fn restrict_cell(&mut self, cell: Cell, letters: &BTreeSet<char>) -> bool {
        let target = Variable::CellVar(cell);
        let Some((_, domain)) = self.variables.iter_mut().find(|(v, _)| *v == target) else {
            return false;
        };
        domain.retain(|value| matches!(value, Value::Letter(c) if letters.contains(c)));
        true
    }

    /// Loads every variable and constraint into `engine`.
    pub fn install<E>(&self, engine: &mut E) -> Result<(), EngineError>
    where
        E: ConstraintEngine<Key = Variable, Value = Value>,
    {
        for (variable, domain) in &self.variables {
            engine.add_variable(variable.clone(), domain.clone());
        }
        for constraint in &self.constraints {
            let pairs = constraint
                .allowed
                .iter()
                .map(|&(word, letter)| (Value::Word(word), Value::Letter(letter)))
                .collect();
            engine.add_constraint(
                &Variable::SegmentVar(constraint.segment.clone()),
                &Variable::CellVar(constraint.cell),
                pairs,
            )?;
        }
        Ok(())
    }
}

/// Builds the model for a set of open cells, their segments and a word list.
///
/// A segment with no word of its length gets an empty domain; detecting the
/// resulting infeasibility is left to the engine.
pub fn compile(open_cells: &BTreeSet<Cell>, segments: &[Segment], words: &WordList) -> Model {
    let alphabet: BTreeSet<Value> = ALPHABET.map(Value::Letter).collect();

    let mut variables: Vec<(Variable, BTreeSet<Value>)> =
        Vec::with_capacity(open_cells.len() + segments.len());
    for &cell in open_cells {
        variables.push((Variable::CellVar(cell), alphabet.clone()));
    }

    let mut constraints = Vec::new();
    for segment in segments {
        let candidates = words.indices_of_length(segment.len());
        if candidates.is_empty() {
            log::warn!(
                "no word of length {} for {}",
                segment.len(),
                Variable::SegmentVar(segment.clone())
            );
        }
        variables.push((
            Variable::SegmentVar(segment.clone()),
            candidates.iter().map(|&k| Value::Word(k)).collect(),
        ));

        for (position, &cell) in segment.cells().iter().enumerate() {
            let allowed = words
                .of_length(segment.len())
                .filter_map(|(index, word)| word.letter(position).map(|letter| (index, letter)))
                .collect();
            constraints.push(Constraint {
                segment: segment.clone(),
                cell,
                position,
                allowed,
            });
        }
    }

    log::debug!(
        "compiled {} variables and {} constraints",
        variables.len(),
        constraints.len()
    );
    Model {
        variables,
        constraints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridFormat};
    use crate::segments::SegmentRegistry;
    use crate::solver::Network;

    fn compile_rows(rows: &str, words: &[&str]) -> Model {
        let grid = Grid::parse(rows, GridFormat::default()).unwrap();
        let open_cells = grid.open_cells();
        let registry = SegmentRegistry::build(&open_cells);
        compile(&open_cells, registry.segments(), &WordList::new(words))
    }

    #[test]
    fn test_plus_shape_counts() {
        let model = compile_rows("##.##\n#...#\n##.##\n", &["cat", "dog", "bus"]);
        assert_eq!(model.num_segment_variables(), 2);
        assert_eq!(model.num_cell_variables(), 5);
        assert_eq!(model.constraints().len(), 6);

        for (variable, domain) in model.variables() {
            let expected = match variable {
                Variable::CellVar(_) => 26,
                Variable::SegmentVar(_) => 3,
            };
            assert_eq!(domain.len(), expected, "wrong domain size for {variable}");
        }
    }

    #[test]
    fn test_disconnected_grid_is_unconstrained() {
        let model = compile_rows(".#.\n#.#\n.#.\n", &["cat"]);
        assert_eq!(model.num_cell_variables(), 5);
        assert_eq!(model.num_segment_variables(), 0);
        assert!(model.constraints().is_empty());
        for (_, domain) in model.variables() {
            assert_eq!(domain.len(), 26);
        }
    }

    #[test]
    fn test_missing_length_gives_empty_domain() {
        let model = compile_rows("....\n", &["cat", "dog"]);
        let segment_domains: Vec<&BTreeSet<Value>> = model
            .variables()
            .iter()
            .filter(|(v, _)| matches!(v, Variable::SegmentVar(_)))
            .map(|(_, d)| d)
            .collect();
        assert_eq!(segment_domains.len(), 1);
        assert!(segment_domains[0].is_empty());
        assert!(model.constraints().iter().all(|c| c.allowed.is_empty()));
    }

    #[test]
    fn test_constraints_are_sound_and_complete() {
        let words = WordList::new(["tea", "eat", "ate", "to", "at", "tee"]);
        let grid = Grid::parse("...\n.#.\n...\n", GridFormat::default()).unwrap();
        let open_cells = grid.open_cells();
        let registry = SegmentRegistry::build(&open_cells);
        let model = compile(&open_cells, registry.segments(), &words);

        for constraint in model.constraints() {
            assert_eq!(constraint.segment.position(constraint.cell), Some(constraint.position));
            for &(index, letter) in &constraint.allowed {
                let word = words.get(index).unwrap();
                assert_eq!(word.letter(constraint.position), Some(letter));
            }
            for (index, word) in words.of_length(constraint.segment.len()) {
                let letter = word.letter(constraint.position).unwrap();
                assert!(
                    constraint.allowed.contains(&(index, letter)),
                    "missing pair ({index}, {letter})"
                );
            }
        }
    }

    #[test]
    fn test_constraint_order_follows_registry_then_position() {
        let model = compile_rows("##.##\n#...#\n##.##\n", &["cat"]);
        let order: Vec<Cell> = model.constraints().iter().map(|c| c.cell).collect();
        // down segment first (seen from (0, 2)), then across
        assert_eq!(order, vec![(0, 2), (1, 2), (2, 2), (1, 1), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let rows = "....#\n.#...\n...#.\n#....\n";
        let words = ["tame", "mate", "team", "meat", "at", "ta", "eat", "tea"];
        assert_eq!(compile_rows(rows, &words), compile_rows(rows, &words));
    }

    #[test]
    fn test_duplicate_words_stay_distinct() {
        let model = compile_rows("..\n", &["to", "to"]);
        let segment = Variable::SegmentVar(model.constraints()[0].segment.clone());
        assert_eq!(
            model.domain(&segment),
            Some(&BTreeSet::from([Value::Word(0), Value::Word(1)]))
        );
        assert_eq!(
            model.constraints()[0].allowed,
            BTreeSet::from([(0, 't'), (1, 't')])
        );
    }

    #[test]
    fn test_restrict_cell() {
        let mut model = compile_rows("..\n", &["to"]);
        assert!(model.restrict_cell((0, 0), &BTreeSet::from(['t', 'x'])));
        assert_eq!(
            model.domain(&Variable::CellVar((0, 0))),
            Some(&BTreeSet::from([Value::Letter('t'), Value::Letter('x')]))
        );
        assert!(!model.restrict_cell((5, 5), &BTreeSet::from(['t'])));
    }

    #[test]
    fn test_install_into_network() {
        let model = compile_rows("##.##\n#...#\n##.##\n", &["cat", "dog", "bus"]);
        let mut network: Network<Variable, Value> = Network::new();
        model.install(&mut network).unwrap();
        assert_eq!(network.num_variables(), 7);
        assert_eq!(network.num_constraints(), 6);

        assert!(network.maintain_arc_consistency());
        let centre = network.domain(&Variable::CellVar((1, 2))).unwrap();
        let letters: Vec<Value> = centre.iter().copied().collect();
        assert_eq!(
            letters,
            vec![Value::Letter('a'), Value::Letter('o'), Value::Letter('u')]
        );
    }

    #[test]
    fn test_variable_display() {
        let model = compile_rows("##.##\n#...#\n##.##\n", &["cat"]);
        let names: Vec<String> = model.variables().iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(names[0], "cell (0, 2)");
        assert_eq!(names[5], "down (0, 2) x3");
        assert_eq!(names[6], "across (1, 1) x3");
    }
}
