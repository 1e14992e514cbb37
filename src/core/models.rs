//! Core data models for simplification and translation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Readability scores keyed by metric name, in the order they were produced
pub type Metrics = IndexMap<String, f64>;

/// Default sampling temperature for the simplifier
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Default completion budget for the simplifier
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Target language of a translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Language {
    pub name: String,
    pub code: String,
}

impl Language {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Validated translate request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub target_language: Language,
    pub speciality: String,
    pub style: String,
    pub complexity_level: String,
    pub summarize: bool,
    pub model: String,
    pub focus_aspects: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_language: Language, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_language,
            speciality: String::new(),
            style: String::new(),
            complexity_level: String::new(),
            summarize: false,
            model: model.into(),
            focus_aspects: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_speciality(mut self, speciality: impl Into<String>) -> Self {
        self.speciality = speciality.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_complexity_level(mut self, level: impl Into<String>) -> Self {
        self.complexity_level = level.into();
        self
    }

    pub fn with_summarize(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }

    pub fn with_focus_aspects(mut self, aspects: Vec<String>) -> Self {
        self.focus_aspects = aspects;
        self
    }

    /// Options forwarded to the simplifier
    pub fn simplify_options(&self) -> SimplifyOptions<'_> {
        SimplifyOptions {
            speciality: &self.speciality,
            style: &self.style,
            complexity_level: &self.complexity_level,
            summarize: self.summarize,
            model: &self.model,
            focus_aspects: &self.focus_aspects,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Borrowed view of the simplification options of a request
#[derive(Debug, Clone, Copy)]
pub struct SimplifyOptions<'a> {
    pub speciality: &'a str,
    pub style: &'a str,
    pub complexity_level: &'a str,
    pub summarize: bool,
    pub model: &'a str,
    pub focus_aspects: &'a [String],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Result of the external translation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub translated_text: String,
    pub source_language_code: String,
}

/// Assembled result of the translate chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslationOutcome {
    pub translated_text: String,
    #[schema(value_type = Object)]
    pub metrics_original: Metrics,
    #[schema(value_type = Object)]
    pub metrics_simplified: Metrics,
    pub bleu_score: f64,
    pub source_language_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = TranslationRequest::new("Olá", Language::new("English", "en"), "gpt-4o");

        assert!(!request.summarize);
        assert!(request.focus_aspects.is_empty());
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_simplify_options_borrow_request() {
        let request = TranslationRequest::new("texto", Language::new("Español", "es"), "gpt-4o-mini")
            .with_speciality("Direito")
            .with_style("Formal")
            .with_complexity_level("Básico")
            .with_summarize(true)
            .with_focus_aspects(vec!["clareza".to_string()]);

        let options = request.simplify_options();
        assert_eq!(options.speciality, "Direito");
        assert_eq!(options.model, "gpt-4o-mini");
        assert!(options.summarize);
        assert_eq!(options.focus_aspects, ["clareza".to_string()]);
    }
}
