//! Free Dictionary Resolver
//!
//! Resolver backed by a JSON dictionary API in the style of
//! `dictionaryapi.dev`. The API already returns structured data, so there is
//! no markup scraping here, only a mapping onto [`DictEntry`].
//!
//! # API
//!
//! - `GET {base}/{word}` - array of entries, or HTTP 404 when unknown

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::traits::{LookupError, Resolver};
use crate::entry::{DictEntry, Example, Frequency, LookupResult, Meaning, WordGroup};

/// Free Dictionary API client
#[derive(Clone)]
pub struct FreeDictionaryResolver {
    /// Endpoint the word is appended to
    base_url: String,
    /// HTTP client
    http_client: reqwest::blocking::Client,
}

impl FreeDictionaryResolver {
    /// Public English endpoint
    pub const DEFAULT_BASE_URL: &'static str = "https://api.dictionaryapi.dev/api/v2/entries/en";

    /// Create a resolver for `base_url` with a request timeout
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, LookupError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("define/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            http_client,
        })
    }

    /// Build the request URL for `word`, escaping it as one path segment
    fn word_url(&self, word: &str) -> Result<reqwest::Url, LookupError> {
        let invalid = || LookupError::InvalidUrl {
            url: self.base_url.clone(),
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

impl Resolver for FreeDictionaryResolver {
    fn name(&self) -> &str {
        "FreeDictionary"
    }

    fn lookup(&self, word: &str) -> Result<LookupResult, LookupError> {
        let url = self.word_url(word)?;
        debug!(url = %url, "Requesting definitions");

        let response = self.http_client.get(url).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::not_found(word));
        }
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        parse_response(word, &body)
    }
}

#[derive(Deserialize)]
struct ApiEntry {
    word: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Deserialize)]
struct ApiDefinition {
    definition: String,
    #[serde(default)]
    example: Option<String>,
}

/// Map an API response body onto dictionary entries
pub(crate) fn parse_response(word: &str, body: &str) -> Result<LookupResult, LookupError> {
    let api_entries: Vec<ApiEntry> = serde_json::from_str(body)?;

    let entries: LookupResult = api_entries.into_iter().map(into_entry).collect();
    if entries.is_empty() {
        return Err(LookupError::not_found(word));
    }
    Ok(entries)
}

fn into_entry(api: ApiEntry) -> DictEntry {
    let phonetic = api
        .phonetic
        .filter(|p| !p.is_empty())
        .or_else(|| {
            api.phonetics
                .into_iter()
                .filter_map(|p| p.text)
                .find(|t| !t.is_empty())
        })
        .unwrap_or_default();

    let mut entry = DictEntry::new(api.word)
        .with_phonetic(phonetic)
        .with_frequency(Frequency::Unknown);

    for meaning in api.meanings {
        let category = abbreviate(&meaning.part_of_speech);
        for definition in meaning.definitions {
            let mut m = Meaning::new(category.clone(), definition.definition);
            if let Some(example) = definition.example.filter(|e| !e.is_empty()) {
                m = m.with_example(Example::new(example, ""));
            }
            entry = entry.with_meaning(m);
        }
        for synonym in meaning.synonyms {
            entry = entry.with_word_group(WordGroup::new(synonym, format!("synonym ({category})")));
        }
    }

    entry
}

/// Short category tag for a part of speech
fn abbreviate(part_of_speech: &str) -> String {
    match part_of_speech {
        "noun" => "n.",
        "verb" => "v.",
        "adjective" => "adj.",
        "adverb" => "adv.",
        "pronoun" => "pron.",
        "preposition" => "prep.",
        "conjunction" => "conj.",
        "interjection" => "int.",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HELLO: &str = r#"[{
        "word": "hello",
        "phonetics": [{"audio": ""}, {"text": "/həˈləʊ/", "audio": "x.mp3"}],
        "meanings": [
            {
                "partOfSpeech": "interjection",
                "definitions": [
                    {"definition": "A greeting.", "example": "Hello, everyone.", "synonyms": []}
                ],
                "synonyms": ["greeting"]
            },
            {
                "partOfSpeech": "noun",
                "definitions": [{"definition": "\"Hello!\" or an equivalent greeting."}]
            }
        ]
    }]"#;

    #[test]
    fn test_parse_maps_meanings_and_synonyms() {
        let entries = parse_response("hello", HELLO).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.word, "hello");
        assert_eq!(entry.phonetic, "/həˈləʊ/");
        assert_eq!(entry.frequency, Frequency::Unknown);
        assert_eq!(
            entry.meanings,
            vec![
                Meaning::new("int.", "A greeting.")
                    .with_example(Example::new("Hello, everyone.", "")),
                Meaning::new("n.", "\"Hello!\" or an equivalent greeting."),
            ]
        );
        assert_eq!(
            entry.word_groups,
            vec![WordGroup::new("greeting", "synonym (int.)")]
        );
    }

    #[test]
    fn test_top_level_phonetic_wins() {
        let body = r#"[{"word": "cat", "phonetic": "/kæt/", "phonetics": [{"text": "/kat/"}]}]"#;
        let entries = parse_response("cat", body).unwrap();
        assert_eq!(entries[0].phonetic, "/kæt/");
    }

    #[test]
    fn test_empty_array_is_not_found() {
        let err = parse_response("zzz", "[]").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_object_is_decode_error() {
        let body = r#"{"title": "No Definitions Found", "message": "Sorry pal"}"#;
        let err = parse_response("zzz", body).unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[test]
    fn test_word_url_escapes_segment() {
        let resolver = FreeDictionaryResolver::new("https://example.com/entries/en/", 5).unwrap();
        let url = resolver.word_url("ice cream").unwrap();
        assert_eq!(url.as_str(), "https://example.com/entries/en/ice%20cream");
    }

    #[test]
    fn test_invalid_base_url_is_reported() {
        let resolver = FreeDictionaryResolver::new("not a url", 5).unwrap();
        assert!(matches!(
            resolver.word_url("cat"),
            Err(LookupError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_unknown_part_of_speech_kept_verbatim() {
        assert_eq!(abbreviate("verb"), "v.");
        assert_eq!(abbreviate("article"), "article");
    }
}
