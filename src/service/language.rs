//! Script-range language detection and language directive resolution
//!
//! Hindi is the secondary supported language, recognized by the presence of
//! Devanagari code points. No language model is involved.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Language;

/// Region tag associated with the secondary language for retrieval boosting
pub const HINDI_REGION: &str = "south-asia";

/// Explicit user preference for the assistant's response language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LanguagePreference {
    /// Detect from the current user message
    #[default]
    Auto,
    ForcedEnglish,
    ForcedHindi,
}

/// Detect the language of a text by script range
pub fn detect_language(text: &str) -> Language {
    let has_devanagari = text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c));
    if has_devanagari {
        Language::Hindi
    } else {
        Language::English
    }
}

/// Resolve the effective response language.
///
/// Precedence: explicit preference > detection on the current message >
/// default (English).
pub fn resolve_directive(preference: LanguagePreference, current_message: &str) -> Language {
    match preference {
        LanguagePreference::ForcedEnglish => Language::English,
        LanguagePreference::ForcedHindi => Language::Hindi,
        LanguagePreference::Auto => detect_language(current_message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devanagari_detection() {
        assert_eq!(detect_language("बाढ़ से हुई क्षति"), Language::Hindi);
        assert_eq!(detect_language("flood damage report"), Language::English);
        assert_eq!(detect_language(""), Language::English);
    }

    #[test]
    fn test_mixed_text_detects_secondary() {
        assert_eq!(detect_language("flood क्षति report"), Language::Hindi);
    }

    #[test]
    fn test_directive_precedence() {
        // Explicit preference wins over detection
        assert_eq!(
            resolve_directive(LanguagePreference::ForcedEnglish, "क्षति"),
            Language::English
        );
        assert_eq!(
            resolve_directive(LanguagePreference::ForcedHindi, "hello"),
            Language::Hindi
        );
        // Auto falls back to detection, then English
        assert_eq!(
            resolve_directive(LanguagePreference::Auto, "क्षति"),
            Language::Hindi
        );
        assert_eq!(
            resolve_directive(LanguagePreference::Auto, "hello"),
            Language::English
        );
    }
}
