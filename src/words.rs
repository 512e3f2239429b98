//! Candidate word list.
//!
//! Words are identified by their position in the list, so two equal entries
//! stay two distinct candidates. Every word is normalized to lowercase on
//! ingestion, matching the lowercase alphabet used for cell domains.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::errors::CrossfillError;

/// Letters a cell may hold.
pub const ALPHABET: std::ops::RangeInclusive<char> = 'a'..='z';

/// A single candidate word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    letters: Vec<char>,
}

impl Word {
    /// Builds a word, lowercasing it.
    pub fn new(text: &str) -> Self {
        let text = text.to_lowercase();
        let letters = text.chars().collect();
        Self { text, letters }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// The letter at `position`, if the word is long enough.
    #[inline]
    pub fn letter(&self, position: usize) -> Option<char> {
        self.letters.get(position).copied()
    }
}

/// An ordered list of candidate words with a length index.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
    by_length: FxHashMap<usize, Vec<usize>>,
}

impl WordList {
    /// Builds a list from in-memory words, skipping empty ones.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for raw in words {
            let word = Word::new(raw.as_ref());
            if word.is_empty() {
                continue;
            }
            list.by_length.entry(word.len()).or_default().push(list.words.len());
            list.words.push(word);
        }
        list
    }

    /// Parses one word per line.
    ///
    /// Surrounding whitespace is trimmed and blank lines are skipped; indices
    /// count only the kept words.
    pub fn parse(contents: &str) -> Self {
        Self::new(contents.lines().map(str::trim))
    }

    /// Reads and parses a word list file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CrossfillError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CrossfillError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&contents);
        log::debug!("loaded {} words from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }

    /// Indices of the words with exactly `length` characters, ascending.
    pub fn indices_of_length(&self, length: usize) -> &[usize] {
        self.by_length
            .get(&length)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Words of `length` characters with their indices, in list order.
    pub fn of_length(&self, length: usize) -> impl Iterator<Item = (usize, &Word)> {
        self.indices_of_length(length)
            .iter()
            .map(move |&index| (index, &self.words[index]))
    }
}
