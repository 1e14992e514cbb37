//! Static option catalogs served by the listing endpoints

use crate::core::models::Language;

/// Supported target languages as (display name, code)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("Afrikaans", "af"),
    ("العربية", "ar"),
    ("বাংলা", "bn"),
    ("中文 (简体)", "zh"),
    ("中文 (繁體)", "zh-TW"),
    ("Dansk", "da"),
    ("Nederlands", "nl"),
    ("English", "en"),
    ("Français", "fr"),
    ("Deutsch", "de"),
    ("Ελληνικά", "el"),
    ("עברית", "he"),
    ("हिन्दी", "hi"),
    ("Bahasa Indonesia", "id"),
    ("Italiano", "it"),
    ("日本語", "ja"),
    ("한국어", "ko"),
    ("Norsk", "no"),
    ("Polski", "pl"),
    ("Português", "pt"),
    ("Русский", "ru"),
    ("Español", "es"),
    ("Svenska", "sv"),
    ("Türkçe", "tr"),
    ("Українська", "uk"),
    ("Tiếng Việt", "vi"),
];

pub const SPECIALITIES: &[&str] = &[
    "Saúde, Medicina e Psicologia",
    "Matemática",
    "Física",
    "Estatística",
    "Ciência da Computação",
    "Ciência de Dados e Aprendizado de Máquina",
    "Ciências Biológicas",
    "Ciências Sociais",
    "Direito",
    "Engenharia",
    "Administração e Economia",
    "Artes e Humanidades",
    "Comércio e Logística",
];

pub const STYLES: &[&str] = &["Formal", "Informal", "Técnico", "Conversacional", "Persuasivo"];

pub const COMPLEXITY_LEVELS: &[&str] = &["Básico", "Intermediário", "Avançado"];

pub const AVAILABLE_MODELS: &[&str] = &["gpt-3.5-turbo-0125", "gpt-4-turbo", "gpt-4o-mini", "gpt-4o"];

/// Resolve a language by its code (case-insensitive)
pub fn find_language(code: &str) -> Option<Language> {
    LANGUAGES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(name, code)| Language::new(*name, *code))
}

pub fn is_known_model(model: &str) -> bool {
    AVAILABLE_MODELS.contains(&model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_language() {
        let lang = find_language("zh-tw").unwrap();
        assert_eq!(lang.name, "中文 (繁體)");
        assert_eq!(lang.code, "zh-TW");

        assert!(find_language("xx").is_none());
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(LANGUAGES.len(), 26);
        assert_eq!(SPECIALITIES.len(), 13);
        assert_eq!(STYLES.len(), 5);
        assert_eq!(COMPLEXITY_LEVELS.len(), 3);
        assert!(is_known_model("gpt-4o"));
        assert!(!is_known_model("gpt-5"));
    }
}
