//! Per-language syllable boundary rules.
//!
//! A rule takes a word and the separator to insert between syllables and
//! returns the separated word. Characters the rule does not classify (capitals,
//! digits, punctuation) are copied through unchanged.

use std::collections::VecDeque;

pub type Rule = fn(&str, &str) -> String;

/// Language codes with a rule, in the form stored in task setups.
pub const LANGUAGES: &[&str] = &["Suomi"];

/// Looks up the rule for a language code. Accepts the legacy display names as
/// well as ISO codes, case-insensitively.
pub fn rule_for(language: &str) -> Option<Rule> {
    match language.trim().to_lowercase().as_str() {
        "suomi" | "finnish" | "fi" | "fin" | "fi-fi" | "fi_fi" => Some(finnish),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharKind {
    Vowel,
    Consonant,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Char(char),
    Boundary,
}

const FINNISH_VOWELS: &[char] = &['a', 'o', 'u', 'i', 'e', 'ä', 'ö', 'y'];
const FINNISH_CONSONANTS: &[char] = &[
    'b', 'c', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'm', 'n', 'p', 'q', 'r', 's', 't', 'v', 'w',
    'x', 'z',
];
const FINNISH_DIPHTHONGS: &[[char; 2]] = &[
    ['a', 'i'],
    ['e', 'i'],
    ['o', 'i'],
    ['u', 'i'],
    ['y', 'i'],
    ['ä', 'i'],
    ['ö', 'i'],
    ['a', 'u'],
    ['e', 'u'],
    ['i', 'u'],
    ['o', 'u'],
    ['e', 'y'],
    ['i', 'y'],
    ['ä', 'y'],
    ['ö', 'y'],
    ['i', 'e'],
    ['u', 'o'],
    ['y', 'ö'],
];

fn finnish_kind(c: char) -> CharKind {
    if FINNISH_VOWELS.contains(&c) {
        CharKind::Vowel
    } else if FINNISH_CONSONANTS.contains(&c) {
        CharKind::Consonant
    } else {
        CharKind::Other
    }
}

/// Finnish syllabification. Scans right to left, prepending to the output.
///
/// - two different adjacent vowels split unless they form a diphthong
/// - `i` before an already emitted `en` splits (`ti-en`)
/// - a third vowel in a row splits, treating the word as a compound
///   (`ma-ail-ma`; wrong for some words, kept as is)
/// - a consonant followed by a vowel starts a syllable, except that two
///   leading consonants stay together (`kreik-ka`)
pub fn finnish(word: &str, hyphen: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut result: VecDeque<Piece> = VecDeque::with_capacity(chars.len() * 2);

    let mut has_vowel = false;
    let mut vowels_in_row = 0;

    for i in (0..chars.len()).rev() {
        let c = chars[i];
        let kind = finnish_kind(c);
        let next_kind = if i > 0 {
            finnish_kind(chars[i - 1])
        } else {
            CharKind::Other
        };
        let mut separate = false;

        match kind {
            CharKind::Vowel => {
                has_vowel = true;
                vowels_in_row += 1;

                if let Some(&after) = chars.get(i + 1) {
                    let vowel_clash = after != c
                        && finnish_kind(after) == CharKind::Vowel
                        && !FINNISH_DIPHTHONGS.contains(&[c, after]);
                    let ien_ending = c == 'i'
                        && result.front() == Some(&Piece::Char('e'))
                        && result.get(1) == Some(&Piece::Char('n'));

                    if vowel_clash || ien_ending || vowels_in_row == 3 {
                        result.push_front(Piece::Boundary);
                        vowels_in_row = 0;
                    }
                }
            }
            CharKind::Consonant if has_vowel => {
                vowels_in_row = 0;
                separate = i > 0 && !(i == 1 && next_kind == CharKind::Consonant);
            }
            _ => {}
        }

        result.push_front(Piece::Char(c));

        if separate {
            if kind != CharKind::Other && next_kind != CharKind::Other {
                result.push_front(Piece::Boundary);
            }
            has_vowel = false;
        }
    }

    let mut out = String::with_capacity(word.len() + hyphen.len() * chars.len());
    for piece in result {
        match piece {
            Piece::Char(c) => out.push(c),
            Piece::Boundary => out.push_str(hyphen),
        }
    }
    out
}
