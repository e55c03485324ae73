use crate::options::{Exceptions, SYLLABLE_SEPARATOR};

use super::HYPHEN;

/// One usable exception: lowercase key, lowercase syllables joined by [`HYPHEN`].
#[derive(Debug, Clone)]
struct Entry {
    key: Vec<char>,
    syllables: Vec<char>,
}

/// A matched exception: where it sits in the word and which entry it is.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionMatch {
    start: usize,
    entry: usize,
}

/// Exception dictionary prepared for matching.
///
/// Matching is case-insensitive substring containment and the first entry in
/// dictionary order wins, even when a later key would match more of the word.
#[derive(Debug, Clone, Default)]
pub struct ExceptionTable {
    entries: Vec<Entry>,
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

impl ExceptionTable {
    pub fn new(exceptions: &Exceptions) -> Self {
        let entries = exceptions
            .iter()
            .filter(|(word, syllables)| {
                !word.is_empty() && !syllables.is_empty() && !word.contains(char::is_whitespace)
            })
            .map(|(word, syllables)| Entry {
                key: word.chars().map(lower).collect(),
                syllables: syllables
                    .chars()
                    .map(|c| if c == SYLLABLE_SEPARATOR { HYPHEN } else { lower(c) })
                    .collect(),
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, word: &str) -> Option<ExceptionMatch> {
        let lowered: Vec<char> = word.chars().map(lower).collect();

        self.entries.iter().enumerate().find_map(|(index, entry)| {
            if entry.key.len() > lowered.len() {
                return None;
            }
            lowered
                .windows(entry.key.len())
                .position(|window| window == entry.key.as_slice())
                .map(|start| ExceptionMatch { start, entry: index })
        })
    }

    /// Splices the exception's syllables into the matched span of `word`.
    ///
    /// Capitals and non-letters of the span are copied over the exception's
    /// lowercase letters; the rest of the word is kept verbatim. Boundaries are
    /// written as `separator`.
    pub fn format(&self, word: &str, found: ExceptionMatch, separator: &str) -> String {
        let entry = &self.entries[found.entry];
        let chars: Vec<char> = word.chars().collect();
        let end = (found.start + entry.key.len()).min(chars.len());

        let mut syllables = entry.syllables.clone();
        let mut j = 0;
        for &c in &chars[found.start..end] {
            if !c.is_lowercase() {
                if let Some(slot) = syllables.get_mut(j) {
                    *slot = c;
                }
            }

            j += 1;
            while syllables.get(j) == Some(&HYPHEN) {
                j += 1;
            }
        }

        let mut result: String = chars[..found.start].iter().collect();
        for c in syllables {
            if c == HYPHEN {
                result.push_str(separator);
            } else {
                result.push(c);
            }
        }
        result.extend(&chars[end..]);
        result
    }
}
