//! Dictionary Entry Model
//!
//! The structured record a [`Resolver`](crate::Resolver) produces for a word.
//! The cache stores these verbatim (as JSON) and the formatter renders them;
//! nothing in the core ever parses dictionary markup sources itself.

use serde::{Deserialize, Serialize};

/// The result of one lookup: entries in the order the resolver returned them
pub type LookupResult = Vec<DictEntry>;

/// A single dictionary entry for a headword
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    /// The headword as the dictionary spells it
    pub word: String,
    /// Phonetic transcription (may be empty)
    #[serde(default)]
    pub phonetic: String,
    /// How common the word is
    #[serde(default)]
    pub frequency: Frequency,
    /// Meanings in dictionary order
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    /// Related word groups (phrases, synonyms) in dictionary order
    #[serde(default)]
    pub word_groups: Vec<WordGroup>,
}

impl DictEntry {
    /// Create an entry with just a headword
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phonetic: String::new(),
            frequency: Frequency::Unknown,
            meanings: Vec::new(),
            word_groups: Vec::new(),
        }
    }

    /// Set the phonetic transcription
    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = phonetic.into();
        self
    }

    /// Set the frequency rating
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Append a meaning
    pub fn with_meaning(mut self, meaning: Meaning) -> Self {
        self.meanings.push(meaning);
        self
    }

    /// Append a related word group
    pub fn with_word_group(mut self, group: WordGroup) -> Self {
        self.word_groups.push(group);
        self
    }
}

/// Frequency rating of a headword
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Rated 1 (rare) to 5 (very common)
    Rated(u8),
    /// The dictionary gave no rating
    #[default]
    Unknown,
}

impl Frequency {
    /// Highest rating a dictionary can give
    pub const MAX: u8 = 5;

    /// Stars to display, clamped to the valid range
    #[must_use]
    pub fn stars(self) -> Option<u8> {
        match self {
            Self::Rated(n) => Some(n.clamp(1, Self::MAX)),
            Self::Unknown => None,
        }
    }
}

/// One meaning of a headword
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    /// Part-of-speech or usage tag, e.g. `n.` or `v.`
    pub category: String,
    /// Meaning text; may contain inline markup such as `<b>keyword</b>`
    pub text: String,
    /// Example sentences with their translations
    #[serde(default)]
    pub examples: Vec<Example>,
}

impl Meaning {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            examples: Vec::new(),
        }
    }

    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }
}

/// An example sentence and its translation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    /// Translation of `text` (empty when the dictionary has none)
    #[serde(default)]
    pub translation: String,
}

impl Example {
    pub fn new(text: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translation: translation.into(),
        }
    }
}

/// A related word or phrase with its meaning
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGroup {
    pub text: String,
    pub meaning: String,
}

impl WordGroup {
    pub fn new(text: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meaning: meaning.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frequency_stars_clamps_stored_values() {
        assert_eq!(Frequency::Rated(9).stars(), Some(5));
        assert_eq!(Frequency::Unknown.stars(), None);
    }

    #[test]
    fn test_minimal_record_uses_defaults() {
        let entry: DictEntry = serde_json::from_str(r#"{"word": "cat"}"#).unwrap();
        assert_eq!(entry, DictEntry::new("cat"));
    }

    #[test]
    fn test_frequency_wire_format() {
        let json = serde_json::to_string(&Frequency::Rated(3)).unwrap();
        assert_eq!(json, r#"{"rated":3}"#);
        let unknown: Frequency = serde_json::from_str(r#""unknown""#).unwrap();
        assert_eq!(unknown, Frequency::Unknown);
    }
}
