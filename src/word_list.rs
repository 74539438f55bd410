use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::errors::GridError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the list's `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// Length in characters, which is what gets compared against slot lengths.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The vocabulary available to the filler. Entries are normalized to uppercase and deduplicated,
/// so two different ids always refer to two different strings.
#[derive(Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    /// Build a word list, keeping the first occurrence of each word. Entries are trimmed and
    /// uppercased; blank entries are dropped.
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let words = words
            .into_iter()
            .filter_map(|word| {
                let word = word.as_ref().trim().to_uppercase();
                if word.is_empty() || !seen.insert(word.clone()) {
                    None
                } else {
                    Some(Word::new(word))
                }
            })
            .collect();

        WordList { words }
    }

    /// Build a word list from newline-separated text.
    pub fn from_lines(text: &str) -> WordList {
        WordList::new(text.lines())
    }

    /// Load a newline-separated word list from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<WordList, GridError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| GridError::Io { path: path.to_path_buf(), source })?;
        Ok(WordList::from_lines(&text))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_ids(&self) -> std::ops::Range<WordId> {
        0..self.words.len()
    }

    /// Find the id of a word, if it's in the list. Lookup is case-insensitive.
    pub fn word_id(&self, word: &str) -> Option<WordId> {
        let word = word.trim().to_uppercase();
        self.words.iter().position(|w| w.string == word)
    }
}

#[cfg(test)]
mod tests {
    use crate::word_list::WordList;

    #[test]
    fn test_word_list_normalizes_and_dedupes() {
        let word_list = WordList::from_lines("exam\n  Quiz \n\nEXAM\nquiz\ntest\n");

        assert_eq!(word_list.len(), 3);
        assert_eq!(word_list.word(0).string, "EXAM");
        assert_eq!(word_list.word(1).string, "QUIZ");
        assert_eq!(word_list.word(2).string, "TEST");
        assert_eq!(word_list.word_id("Test"), Some(2));
        assert_eq!(word_list.word_id("nope"), None);
    }

    #[test]
    fn test_word_length_counts_chars() {
        let word_list = WordList::new(["café"]);

        assert_eq!(word_list.word(0).len(), 4);
        assert_eq!(word_list.word(0).glyphs[3], 'É');
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let result = WordList::from_file("/definitely/not/a/real/word/list.txt");

        assert!(result.is_err());
    }
}
