use std::collections::BTreeMap;

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::core::error::SrtError;
use crate::srt::parser::SrtEntry;

/// A source term and its preferred rendering per target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub term: String,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    pattern: Regex,
    translations: BTreeMap<String, String>,
}

/// Term replacements applied to translated subtitles.
///
/// Terms match literally and case-insensitively. Entries apply in the order
/// given, so an earlier replacement can be matched by a later term.
#[derive(Debug, Clone, Default)]
pub struct DataDictionary {
    entries: Vec<CompiledEntry>,
}

impl DataDictionary {
    /// Trims terms and translations and drops entries with a blank term.
    pub fn new(entries: Vec<DictionaryEntry>) -> Result<Self, SrtError> {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let term = entry.term.trim().to_string();
                if term.is_empty() {
                    return None;
                }

                let translations: BTreeMap<String, String> = entry
                    .translations
                    .into_iter()
                    .map(|(language, value)| (language.trim().to_string(), value.trim().to_string()))
                    .filter(|(_, value)| !value.is_empty())
                    .collect();
                Some((term, translations))
            })
            .map(|(term, translations)| -> Result<CompiledEntry, SrtError> {
                let pattern = RegexBuilder::new(&regex::escape(&term))
                    .case_insensitive(true)
                    .build()
                    .map_err(|error| SrtError::InvalidDictionary {
                        message: format!("term {term:?}: {error}"),
                    })?;
                Ok(CompiledEntry {
                    pattern,
                    translations,
                })
            })
            .collect::<Result<Vec<_>, SrtError>>()?;

        Ok(Self { entries })
    }

    /// Parses a JSON array of `{"term": ..., "translations": {"fr": ...}}`.
    pub fn from_json(raw: &str) -> Result<Self, SrtError> {
        let entries: Vec<DictionaryEntry> =
            serde_json::from_str(raw).map_err(|error| SrtError::InvalidDictionary {
                message: error.to_string(),
            })?;
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn apply_dictionary(text: &str, dictionary: &DataDictionary, language: &str) -> String {
    dictionary
        .entries
        .iter()
        .fold(text.to_string(), |current, entry| {
            match entry.translations.get(language) {
                Some(replacement) => entry
                    .pattern
                    .replace_all(&current, NoExpand(replacement))
                    .into_owned(),
                None => current,
            }
        })
}

/// Applies the dictionary to the text of every entry.
pub fn refine_entries(
    entries: &[SrtEntry],
    dictionary: &DataDictionary,
    language: &str,
) -> Vec<SrtEntry> {
    entries
        .iter()
        .map(|entry| SrtEntry {
            text: apply_dictionary(&entry.text, dictionary, language),
            ..entry.clone()
        })
        .collect()
}
