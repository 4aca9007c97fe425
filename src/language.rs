use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShabdkoshError;

/// The 22 scheduled Indic languages, in display order.
///
/// Serialized as the lowercase English name, which doubles as the column
/// key of a stored word record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hindi,
    Bengali,
    Tamil,
    Telugu,
    Malayalam,
    Kannada,
    Marathi,
    Gujarati,
    Odia,
    Punjabi,
    Assamese,
    Urdu,
    Maithili,
    Sanskrit,
    Konkani,
    Nepali,
    Sindhi,
    Dogri,
    Manipuri,
    Bodo,
    Kashmiri,
    Santali,
}

impl Language {
    pub const COUNT: usize = 22;

    pub const ALL: [Language; Self::COUNT] = [
        Language::Hindi,
        Language::Bengali,
        Language::Tamil,
        Language::Telugu,
        Language::Malayalam,
        Language::Kannada,
        Language::Marathi,
        Language::Gujarati,
        Language::Odia,
        Language::Punjabi,
        Language::Assamese,
        Language::Urdu,
        Language::Maithili,
        Language::Sanskrit,
        Language::Konkani,
        Language::Nepali,
        Language::Sindhi,
        Language::Dogri,
        Language::Manipuri,
        Language::Bodo,
        Language::Kashmiri,
        Language::Santali,
    ];

    /// English name, as used in LLM prompts and the local service contract
    pub fn name(&self) -> &'static str {
        match self {
            Language::Hindi => "Hindi",
            Language::Bengali => "Bengali",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Malayalam => "Malayalam",
            Language::Kannada => "Kannada",
            Language::Marathi => "Marathi",
            Language::Gujarati => "Gujarati",
            Language::Odia => "Odia",
            Language::Punjabi => "Punjabi",
            Language::Assamese => "Assamese",
            Language::Urdu => "Urdu",
            Language::Maithili => "Maithili",
            Language::Sanskrit => "Sanskrit",
            Language::Konkani => "Konkani",
            Language::Nepali => "Nepali",
            Language::Sindhi => "Sindhi",
            Language::Dogri => "Dogri",
            Language::Manipuri => "Manipuri",
            Language::Bodo => "Bodo",
            Language::Kashmiri => "Kashmiri",
            Language::Santali => "Santali",
        }
    }

    /// Name of the language in its own script
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Hindi => "हिन्दी",
            Language::Bengali => "বাংলা",
            Language::Tamil => "தமிழ்",
            Language::Telugu => "తెలుగు",
            Language::Malayalam => "മലയാളം",
            Language::Kannada => "ಕನ್ನಡ",
            Language::Marathi => "मराठी",
            Language::Gujarati => "ગુજરાતી",
            Language::Odia => "ଓଡ଼ିଆ",
            Language::Punjabi => "ਪੰਜਾਬੀ",
            Language::Assamese => "অসমীয়া",
            Language::Urdu => "اردو",
            Language::Maithili => "मैथिली",
            Language::Sanskrit => "संस्कृतम्",
            Language::Konkani => "कोंकणी",
            Language::Nepali => "नेपाली",
            Language::Sindhi => "سنڌي",
            Language::Dogri => "डोगरी",
            Language::Manipuri => "মৈতৈলোন্",
            Language::Bodo => "बड़ो",
            Language::Kashmiri => "कॉशुर",
            Language::Santali => "ᱥᱟᱱᱛᱟᱲᱤ",
        }
    }

    /// ISO 639 code (two letters where one exists, otherwise three)
    pub fn iso_code(&self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::Bengali => "bn",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Malayalam => "ml",
            Language::Kannada => "kn",
            Language::Marathi => "mr",
            Language::Gujarati => "gu",
            Language::Odia => "or",
            Language::Punjabi => "pa",
            Language::Assamese => "as",
            Language::Urdu => "ur",
            Language::Maithili => "mai",
            Language::Sanskrit => "sa",
            Language::Konkani => "kok",
            Language::Nepali => "ne",
            Language::Sindhi => "sd",
            Language::Dogri => "doi",
            Language::Manipuri => "mni",
            Language::Bodo => "brx",
            Language::Kashmiri => "ks",
            Language::Santali => "sat",
        }
    }

    /// Region-qualified code, e.g. `hi-IN`
    pub fn indic_code(&self) -> String {
        format!("{}-IN", self.iso_code())
    }

    /// Store column key, e.g. `hindi`
    pub fn column_key(&self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = ShabdkoshError;

    /// Accepts the English name or ISO code, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.column_key() == needle || lang.iso_code() == needle)
            .ok_or_else(|| ShabdkoshError::UnknownLanguage(s.to_string()))
    }
}
