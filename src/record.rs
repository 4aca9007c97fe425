use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::language::Language;

/// Per-language cells of a word record.
///
/// Always holds all 22 languages; an empty string means "no accepted
/// translation". Missing keys in stored data are filled with "" on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Language, String>", into = "BTreeMap<Language, String>")]
pub struct Translations(BTreeMap<Language, String>);

impl Translations {
    pub fn empty() -> Self {
        Self(Language::ALL.iter().map(|lang| (*lang, String::new())).collect())
    }

    pub fn set(&mut self, language: Language, text: impl Into<String>) {
        self.0.insert(language, text.into());
    }

    pub fn get(&self, language: Language) -> &str {
        self.0.get(&language).map(String::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        self.0.iter().map(|(lang, text)| (*lang, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of languages with a non-empty cell
    pub fn filled_count(&self) -> usize {
        self.0.values().filter(|text| !text.trim().is_empty()).count()
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<BTreeMap<Language, String>> for Translations {
    fn from(mut cells: BTreeMap<Language, String>) -> Self {
        for lang in Language::ALL {
            cells.entry(lang).or_default();
        }
        Self(cells)
    }
}

impl From<Translations> for BTreeMap<Language, String> {
    fn from(translations: Translations) -> Self {
        translations.0
    }
}

/// One dictionary entry, keyed case-insensitively by its English headword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub english: String,
    pub category: String,
    pub translations: Translations,
    pub created_at: DateTime<Utc>,
}

impl WordRecord {
    pub fn new(english: &str, category: &str, translations: Translations) -> Self {
        Self {
            english: english.trim().to_string(),
            category: category.trim().to_string(),
            translations,
            created_at: Utc::now(),
        }
    }

    /// Uniqueness key of the headword
    pub fn key(&self) -> String {
        headword_key(&self.english)
    }
}

pub fn headword_key(headword: &str) -> String {
    headword.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_all_languages() {
        let translations = Translations::empty();
        assert_eq!(translations.len(), Language::COUNT);
        assert_eq!(translations.filled_count(), 0);
        assert_eq!(translations.get(Language::Dogri), "");
    }

    #[test]
    fn test_deserialize_fills_missing_languages() {
        let translations: Translations = serde_json::from_str(r#"{"hindi":"आम","tamil":"மாம்பழம்"}"#).unwrap();
        assert_eq!(translations.len(), Language::COUNT);
        assert_eq!(translations.get(Language::Hindi), "आम");
        assert_eq!(translations.get(Language::Bodo), "");
        assert_eq!(translations.filled_count(), 2);
    }

    #[test]
    fn test_deserialize_rejects_unknown_language() {
        assert!(serde_json::from_str::<Translations>(r#"{"klingon":"x"}"#).is_err());
    }

    #[test]
    fn test_record_key_ignores_case_and_padding() {
        let record = WordRecord::new("  Mango ", "fruits", Translations::empty());
        assert_eq!(record.english, "Mango");
        assert_eq!(record.key(), "mango");
    }
}
