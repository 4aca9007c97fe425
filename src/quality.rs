//! Acceptance heuristics for provider output.
//!
//! The classifier only catches structural failures: empty output, an
//! untranslated echo of the input, or a known failure marker. It cannot tell
//! a wrong but well-formed translation from a right one.

use crate::config::QualityConfig;

#[derive(Debug, Clone)]
pub struct QualityClassifier {
    failure_markers: Vec<String>,
}

impl QualityClassifier {
    pub fn new(failure_markers: Vec<String>) -> Self {
        Self {
            failure_markers: failure_markers
                .into_iter()
                .map(|marker| marker.trim().to_lowercase())
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &QualityConfig) -> Self {
        Self::new(config.failure_markers.clone())
    }

    pub fn is_accepted(&self, source_text: &str, result_text: &str) -> bool {
        let result = result_text.trim();
        if result.is_empty() {
            return false;
        }

        let result_lower = result.to_lowercase();

        // Providers sometimes answer 200 with the input unchanged
        if result_lower == source_text.trim().to_lowercase() {
            return false;
        }

        !self
            .failure_markers
            .iter()
            .any(|marker| result_lower.starts_with(marker.as_str()))
    }
}

impl Default for QualityClassifier {
    fn default() -> Self {
        Self::new(vec![crate::chain::UNAVAILABLE_TEXT.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_echo_and_empty() {
        let classifier = QualityClassifier::default();
        assert!(!classifier.is_accepted("mango", "mango"));
        assert!(!classifier.is_accepted("mango", " MANGO "));
        assert!(!classifier.is_accepted("mango", ""));
        assert!(!classifier.is_accepted("mango", "   \n"));
    }

    #[test]
    fn test_accepts_real_translation() {
        let classifier = QualityClassifier::default();
        assert!(classifier.is_accepted("mango", "आम"));
        assert!(classifier.is_accepted("water", "நீர்"));
    }

    #[test]
    fn test_rejects_failure_markers() {
        let classifier = QualityClassifier::new(vec![
            "Translation unavailable".to_string(),
            "MYMEMORY WARNING".to_string(),
        ]);
        assert!(!classifier.is_accepted("mango", "Translation unavailable"));
        assert!(!classifier.is_accepted("mango", "translation unavailable for Bodo"));
        assert!(!classifier.is_accepted("mango", "MYMEMORY WARNING: YOU USED ALL AVAILABLE FREE TRANSLATIONS"));
        assert!(classifier.is_accepted("mango", "ആം unavailable"));
    }
}
