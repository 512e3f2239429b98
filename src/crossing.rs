//! Letter candidates for cells shared by an across and a down segment.
//!
//! The resolver looks at each segment through a cell independently and keeps
//! only the letters both can produce there. It is a pre-filter: the compiled
//! model already encodes the same information, and the engine's propagation
//! reaches at least the same pruning on its own.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::errors::ResolveError;
use crate::grid::Cell;
use crate::model::Model;
use crate::segments::{Segment, SegmentRegistry};
use crate::words::WordList;

/// `(letter, word index)` pairs one segment can place at `cell`.
fn achievable(
    cell: Cell,
    segment: &Segment,
    words: &WordList,
) -> Result<BTreeSet<(char, usize)>, ResolveError> {
    let position = segment
        .position(cell)
        .ok_or(ResolveError::CellNotInSegment {
            cell,
            start: segment.start(),
        })?;

    Ok(words
        .of_length(segment.len())
        .filter_map(|(index, word)| word.letter(position).map(|letter| (letter, index)))
        .collect())
}

/// Computes the `(letter, word index)` pairs realizable at `cell`.
///
/// With one segment the segment's pairs are returned as they are. With two,
/// only pairs whose letter both segments can produce survive, and the
/// filtered sets of both segments are merged. An empty result means no
/// letter fits; calling this for a cell on no segment is an error.
pub fn resolve_crossing<S>(
    cell: Cell,
    segments_for_cell: &[S],
    words: &WordList,
) -> Result<BTreeSet<(char, usize)>, ResolveError>
where
    S: Borrow<Segment>,
{
    let segments: Vec<&Segment> = segments_for_cell.iter().map(Borrow::borrow).collect();

    match segments.as_slice() {
        [] => Err(ResolveError::NoSegments { cell }),
        [only] => achievable(cell, only, words),
        [first, second] => {
            let first = achievable(cell, first, words)?;
            let second = achievable(cell, second, words)?;

            let first_letters: BTreeSet<char> = first.iter().map(|&(letter, _)| letter).collect();
            let second_letters: BTreeSet<char> = second.iter().map(|&(letter, _)| letter).collect();
            let shared: BTreeSet<char> = first_letters
                .intersection(&second_letters)
                .copied()
                .collect();

            Ok(first
                .into_iter()
                .chain(second)
                .filter(|(letter, _)| shared.contains(letter))
                .collect())
        }
        more => Err(ResolveError::TooManySegments {
            cell,
            count: more.len(),
        }),
    }
}

/// Letters only, for narrowing a cell domain.
pub fn crossing_letters<S>(
    cell: Cell,
    segments_for_cell: &[S],
    words: &WordList,
) -> Result<BTreeSet<char>, ResolveError>
where
    S: Borrow<Segment>,
{
    Ok(resolve_crossing(cell, segments_for_cell, words)?
        .into_iter()
        .map(|(letter, _)| letter)
        .collect())
}

/// Narrows the letter domain of every crossing cell in `model`.
///
/// Returns the number of crossing cells whose domain was restricted.
pub fn prefilter(
    model: &mut Model,
    registry: &SegmentRegistry,
    words: &WordList,
) -> Result<usize, ResolveError> {
    let mut restricted = 0;
    for cell in registry.crossings() {
        let letters = crossing_letters(cell, &registry.segments_for(cell), words)?;
        if letters.is_empty() {
            log::debug!("no shared letter at crossing {cell:?}");
        }
        if model.restrict_cell(cell, &letters) {
            restricted += 1;
        }
    }
    log::debug!("pre-filtered {restricted} crossing cells");
    Ok(restricted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridFormat};
    use crate::model::{compile, Value, Variable};
    use crate::segments::find_segments;

    /// An across slot of three with a down slot of two hanging from its middle.
    const HOOK: &str = "...\n#.#\n";

    fn hook() -> (BTreeSet<Cell>, WordList) {
        let grid = Grid::parse(HOOK, GridFormat::default()).unwrap();
        let words = WordList::new(["cat", "dog", "at", "to", "ox"]);
        (grid.open_cells(), words)
    }

    #[test]
    fn test_crossing_keeps_shared_letters_from_both_segments() {
        let (cells, words) = hook();
        let segments = find_segments((0, 1), &cells);
        assert_eq!(segments.len(), 2);

        let resolved = resolve_crossing((0, 1), &segments, &words).unwrap();
        assert_eq!(
            resolved,
            BTreeSet::from([('a', 0), ('a', 2), ('o', 1), ('o', 4)])
        );
    }

    #[test]
    fn test_single_segment_is_unfiltered() {
        let (cells, words) = hook();
        let segments = find_segments((0, 0), &cells);
        let resolved = resolve_crossing((0, 0), &segments, &words).unwrap();
        assert_eq!(resolved, BTreeSet::from([('c', 0), ('d', 1)]));
    }

    #[test]
    fn test_no_segments_is_a_precondition_failure() {
        let words = WordList::new(["cat"]);
        let err = resolve_crossing::<Segment>((4, 4), &[], &words).unwrap_err();
        assert_eq!(err, ResolveError::NoSegments { cell: (4, 4) });
    }

    #[test]
    fn test_no_shared_letter_is_empty_not_error() {
        let (cells, _) = hook();
        let words = WordList::new(["cat", "ox"]);
        let segments = find_segments((0, 1), &cells);
        let resolved = resolve_crossing((0, 1), &segments, &words).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_cell_outside_segment_is_rejected() {
        let (cells, words) = hook();
        let segments = find_segments((1, 1), &cells);
        let err = resolve_crossing((0, 0), &segments, &words).unwrap_err();
        assert_eq!(
            err,
            ResolveError::CellNotInSegment {
                cell: (0, 0),
                start: (0, 1)
            }
        );
    }

    #[test]
    fn test_three_segments_are_rejected() {
        let (cells, words) = hook();
        let mut segments = find_segments((0, 1), &cells);
        segments.push(segments[0].clone());
        let err = resolve_crossing((0, 1), &segments, &words).unwrap_err();
        assert_eq!(err.code(), "R003");
    }

    #[test]
    fn test_resolver_is_idempotent() {
        let (cells, words) = hook();
        let segments = find_segments((0, 1), &cells);
        let once = resolve_crossing((0, 1), &segments, &words).unwrap();
        let twice = resolve_crossing((0, 1), &segments, &words).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prefilter_narrows_crossings_only() {
        let (cells, words) = hook();
        let registry = SegmentRegistry::build(&cells);
        let mut model = compile(&cells, registry.segments(), &words);

        let restricted = prefilter(&mut model, &registry, &words).unwrap();
        assert_eq!(restricted, 1);

        assert_eq!(
            model.domain(&Variable::CellVar((0, 1))),
            Some(&BTreeSet::from([Value::Letter('a'), Value::Letter('o')]))
        );
        assert_eq!(model.domain(&Variable::CellVar((0, 0))).map(BTreeSet::len), Some(26));

        let again = model.clone();
        prefilter(&mut model, &registry, &words).unwrap();
        assert_eq!(model, again, "a second pass should change nothing");
    }
}
