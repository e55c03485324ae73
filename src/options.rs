use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::threshold::Threshold;

/// Separates the word from its syllables in the exceptions text format.
pub const WORD_SYLLABLE_SEPARATOR: char = '=';
/// Separates syllables in exception values.
pub const SYLLABLE_SEPARATOR: char = ' ';

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#004080";
pub const DEFAULT_WARNING_PHRASE: &str = "Jatka lukemista!";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SyllabMode {
    /// Pre-reading preview: hyphens around the whole word.
    Hyphen,
    /// Syllables in alternating colors.
    Colors,
}

impl Default for SyllabMode {
    fn default() -> Self {
        SyllabMode::Colors
    }
}

/// Ordered `original word → syllabified word` dictionary. Lookup walks the
/// entries in insertion order, so order survives (de)serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exceptions {
    entries: Vec<(String, String)>,
}

impl Exceptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, silently dropping malformed ones (empty key or value,
    /// multi-word key). Keys are lowercased, so a later entry replaces an
    /// earlier one that differs only in case. Syllables in `syllables` may be
    /// separated by spaces or `-`; repeated separators collapse.
    pub fn insert(&mut self, word: &str, syllables: &str) -> bool {
        let word = word.trim().to_lowercase();
        if word.is_empty() || word.split_whitespace().count() > 1 {
            return false;
        }

        let syllables = syllables
            .split(|c: char| c == SYLLABLE_SEPARATOR || c == '-')
            .filter(|syllable| !syllable.is_empty())
            .collect::<Vec<_>>()
            .join(&SYLLABLE_SEPARATOR.to_string());
        if syllables.is_empty() {
            return false;
        }

        match self.entries.iter_mut().find(|(key, _)| *key == word) {
            Some(entry) => entry.1 = syllables,
            None => self.entries.push((word, syllables)),
        }
        true
    }

    /// Parses the editor format: one `word=syl la bles` per line.
    pub fn from_text(text: &str) -> Self {
        let mut result = Self::new();
        for line in text.lines() {
            let parts: Vec<&str> = line.trim().split(WORD_SYLLABLE_SEPARATOR).collect();
            if parts.len() != 2 {
                continue;
            }
            result.insert(parts[0], parts[1].trim());
        }
        result
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(word, syllables)| format!("{word}{WORD_SYLLABLE_SEPARATOR}{syllables}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Exceptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (word, syllables) in iter {
            result.insert(word.as_ref(), syllables.as_ref());
        }
        result
    }
}

impl Serialize for Exceptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, syllables) in &self.entries {
            map.serialize_entry(word, syllables)?;
        }
        map.end()
    }
}

struct ExceptionsVisitor;

impl<'de> Visitor<'de> for ExceptionsVisitor {
    type Value = Exceptions;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of words to their syllables")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = Exceptions::new();
        while let Some((word, syllables)) = access.next_entry::<String, String>()? {
            result.insert(&word, &syllables);
        }
        Ok(result)
    }

    fn visit_str<E: serde::de::Error>(self, text: &str) -> Result<Self::Value, E> {
        Ok(Exceptions::from_text(text))
    }
}

impl<'de> Deserialize<'de> for Exceptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ExceptionsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyllabOptions {
    pub language: String,
    pub mode: SyllabMode,
    pub exceptions: Exceptions,
    /// Revert to the plain word a few seconds after syllabifying it.
    pub temporary: bool,
    pub threshold: Threshold,
}

impl Default for SyllabOptions {
    fn default() -> Self {
        Self {
            language: String::new(),
            mode: SyllabMode::Colors,
            exceptions: Exceptions::new(),
            temporary: false,
            threshold: Threshold::new(3000.0, false, 1500.0, 3000.0, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechOptions {
    pub language: String,
    pub threshold: Threshold,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: String::new(),
            threshold: Threshold::new(4000.0, false, 3000.0, 4000.0, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightOptions {
    pub language: String,
    pub color: String,
    pub threshold: Threshold,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            language: String::new(),
            color: DEFAULT_HIGHLIGHT_COLOR.into(),
            threshold: Threshold::new(3000.0, false, 1500.0, 3000.0, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarningOptions {
    pub language: String,
    pub phrase: String,
    pub threshold: Threshold,
}

impl Default for WarningOptions {
    fn default() -> Self {
        Self {
            language: String::new(),
            phrase: String::new(),
            threshold: Threshold::fixed(5000.0),
        }
    }
}

impl WarningOptions {
    pub fn phrase_or_default(&self) -> &str {
        if self.phrase.trim().is_empty() {
            DEFAULT_WARNING_PHRASE
        } else {
            &self.phrase
        }
    }
}

/// Everything a reading session needs to build its inspectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackOptions {
    pub syllab: SyllabOptions,
    pub speech: SpeechOptions,
    pub highlight: HighlightOptions,
    pub warning: WarningOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabificationSetup {
    #[serde(flatten)]
    pub options: SyllabOptions,
    pub hyphen: char,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSetup {
    #[serde(flatten)]
    pub options: SpeechOptions,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSetup {
    #[serde(flatten)]
    pub options: HighlightOptions,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningSetup {
    #[serde(flatten)]
    pub options: WarningOptions,
    pub enabled: bool,
}

/// Live setup of a session, including thresholds after smart adaptation.
/// Saved next to the session results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedbacks {
    pub session_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub speech: SpeechSetup,
    pub syllabification: SyllabificationSetup,
    pub highlight: HighlightSetup,
    pub warning: WarningSetup,
}
