use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::language::Language;
use super::{ProviderResult, TranslationProvider, UsageCounter};

pub const PROVIDER_ID: &str = "dictionary";

use Language::{Bengali, Gujarati, Hindi, Kannada, Malayalam, Marathi, Tamil, Telugu};

type Entry = (&'static str, &'static [(Language, &'static str)]);

const COMMON_WORDS: &[Entry] = &[
    ("potato", &[(Hindi, "आलू"), (Bengali, "আলু"), (Tamil, "உருளைக்கிழங்கு"), (Telugu, "బంగాళాదుంప"), (Malayalam, "ഉരുളക്കിഴങ്ങ്"), (Kannada, "ಆಲೂಗಡ್ಡೆ"), (Marathi, "बटाटा"), (Gujarati, "બટાકા")]),
    ("ladyfinger", &[(Hindi, "भिंडी"), (Bengali, "ঢেঁড়স"), (Tamil, "வெண்டைக்காய்"), (Telugu, "బెండకాయ"), (Malayalam, "വെണ്ടക്ക"), (Kannada, "ಬೆಂಡೆಕಾಯಿ"), (Marathi, "भेंडी"), (Gujarati, "ભીંડા")]),
    ("tomato", &[(Hindi, "टमाटर"), (Bengali, "টমেটো"), (Tamil, "தக்காளி"), (Telugu, "టమాటో"), (Malayalam, "തക്കാളി"), (Kannada, "ಟೊಮೇಟೊ"), (Marathi, "टोमॅटो"), (Gujarati, "ટામેટું")]),
    ("onion", &[(Hindi, "प्याज"), (Bengali, "পেঁয়াজ"), (Tamil, "வெங்காயம்"), (Telugu, "ఉల్లిపాయ"), (Malayalam, "ഉള്ളി"), (Kannada, "ಈರುಳ್ಳಿ"), (Marathi, "कांदा"), (Gujarati, "ડુંગળી")]),
    ("mango", &[(Hindi, "आम"), (Bengali, "আম"), (Tamil, "மாம்பழம்"), (Telugu, "మామిడి"), (Malayalam, "മാമ്പഴം"), (Kannada, "ಮಾವು"), (Marathi, "आंबा"), (Gujarati, "કેરી")]),
    ("banana", &[(Hindi, "केला"), (Bengali, "কলা"), (Tamil, "வாழைப்பழம்"), (Telugu, "అరటి"), (Malayalam, "വാഴപ്പഴം"), (Kannada, "ಬಾಳೆಹಣ್ಣು"), (Marathi, "केळी"), (Gujarati, "કેળું")]),
    ("apple", &[(Hindi, "सेब"), (Bengali, "আপেল"), (Tamil, "ஆப்பிள்"), (Telugu, "ఆపిల్"), (Malayalam, "ആപ്പിൾ"), (Kannada, "ಸೇಬು"), (Marathi, "सफरचंद"), (Gujarati, "સફરજન")]),
    ("water", &[(Hindi, "पानी"), (Bengali, "জল"), (Tamil, "தண்ணீர்"), (Telugu, "నీరు"), (Malayalam, "വെള്ളം"), (Kannada, "ನೀರು"), (Marathi, "पाणी"), (Gujarati, "પાણી")]),
    ("milk", &[(Hindi, "दूध"), (Bengali, "দুধ"), (Tamil, "பால்"), (Telugu, "పాలు"), (Malayalam, "പാൽ"), (Kannada, "ಹಾಲು"), (Marathi, "दूध"), (Gujarati, "દૂધ")]),
    ("rice", &[(Hindi, "चावल"), (Bengali, "চাল"), (Tamil, "அரிசி"), (Telugu, "బియ్యం"), (Malayalam, "അരി"), (Kannada, "ಅಕ್ಕಿ"), (Marathi, "तांदूळ"), (Gujarati, "ચોખા")]),
];

/// In-process table of common words; the last resort of the chain
pub struct StaticDictionaryProvider {
    entries: HashMap<&'static str, HashMap<Language, &'static str>>,
    languages: HashSet<Language>,
    usage: UsageCounter,
}

impl StaticDictionaryProvider {
    pub fn new() -> Self {
        let entries: HashMap<_, HashMap<_, _>> = COMMON_WORDS
            .iter()
            .map(|(word, translations)| (*word, translations.iter().copied().collect()))
            .collect();
        let languages = entries.values().flat_map(|row| row.keys().copied()).collect();

        Self {
            entries,
            languages,
            usage: UsageCounter::default(),
        }
    }

    pub fn headwords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl Default for StaticDictionaryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationProvider for StaticDictionaryProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    async fn attempt(&self, text: &str, language: Language) -> ProviderResult {
        let key = text.trim().to_lowercase();
        match self
            .entries
            .get(key.as_str())
            .and_then(|row| row.get(&language))
        {
            Some(translation) => {
                self.usage.record();
                ProviderResult::accepted(PROVIDER_ID, *translation)
            }
            None => ProviderResult::unavailable(PROVIDER_ID),
        }
    }

    fn usage_count(&self) -> u64 {
        self.usage.get()
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Outcome;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let dictionary = StaticDictionaryProvider::new();
        let result = dictionary.attempt("  Mango ", Language::Hindi).await;
        assert_eq!(result, ProviderResult::accepted(PROVIDER_ID, "आम"));
        assert_eq!(dictionary.usage_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_word_or_language_is_unavailable() {
        let dictionary = StaticDictionaryProvider::new();
        assert_eq!(dictionary.attempt("xyzzy123", Language::Hindi).await.outcome, Outcome::Unavailable);
        assert_eq!(dictionary.attempt("mango", Language::Santali).await.outcome, Outcome::Unavailable);
        assert_eq!(dictionary.usage_count(), 0);
    }

    #[test]
    fn test_supported_languages() {
        let dictionary = StaticDictionaryProvider::new();
        assert!(dictionary.supports(Language::Gujarati));
        assert!(!dictionary.supports(Language::Urdu));
        assert_eq!(dictionary.headwords().count(), 10);
    }
}
