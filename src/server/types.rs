//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::catalog;
use crate::core::errors::{FieldErrors, Result, ServiceError};
use crate::core::models::{Metrics, TranslationRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::processors::export::ExportJob;
use crate::processors::format::ExportFormat;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguageItem {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionItem {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelItem {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub time: String,
}

/// Body of `POST /translate/`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TranslatePayload {
    pub text: Option<String>,
    /// Language code from `GET /languages/`
    pub target_language: Option<String>,
    pub speciality: Option<String>,
    pub style: Option<String>,
    pub complexity_level: Option<String>,
    pub summarize: Option<bool>,
    pub model: Option<String>,
    pub focus_aspects: Option<Vec<String>>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Body of `POST /export-document/`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExportPayload {
    pub text: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metrics_original: Option<Metrics>,
    #[schema(value_type = Option<Object>)]
    pub metrics_simplified: Option<Metrics>,
    /// One of `pdf`, `docx`, `txt`
    pub format: Option<String>,
}

fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    match value {
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            String::new()
        }
        Some(v) => v,
    }
}

impl TranslatePayload {
    /// Check every field and build the request, or report all field errors at once
    pub fn validate(self) -> Result<TranslationRequest> {
        let mut errors = FieldErrors::new();

        let text = required_text(&mut errors, "text", self.text);
        let code = required_text(&mut errors, "target_language", self.target_language);
        let speciality = required_text(&mut errors, "speciality", self.speciality);
        let style = required_text(&mut errors, "style", self.style);
        let complexity_level = required_text(&mut errors, "complexity_level", self.complexity_level);
        let model = required_text(&mut errors, "model", self.model);

        let target_language = catalog::find_language(&code);
        if target_language.is_none() && !code.is_empty() {
            errors.add("target_language", format!("\"{}\" is not a supported language.", code));
        }

        if !model.is_empty() && !catalog::is_known_model(&model) {
            errors.add("model", format!("\"{}\" is not a valid choice.", model));
        }

        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            errors.add("temperature", "Ensure this value is between 0 and 2.");
        }

        let max_tokens = self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            errors.add("max_tokens", "Ensure this value is greater than or equal to 1.");
        }

        let focus_aspects = self.focus_aspects.unwrap_or_default();
        if focus_aspects.iter().any(|a| a.trim().is_empty()) {
            errors.add("focus_aspects", BLANK);
        }

        // An unresolved language always leaves a message behind
        let target_language = match target_language {
            Some(language) if errors.is_empty() => language,
            _ => return Err(ServiceError::ValidationError(errors)),
        };

        let mut request = TranslationRequest::new(text, target_language, model)
            .with_speciality(speciality)
            .with_style(style)
            .with_complexity_level(complexity_level)
            .with_summarize(self.summarize.unwrap_or(false))
            .with_focus_aspects(focus_aspects);
        request.temperature = temperature;
        request.max_tokens = max_tokens;

        Ok(request)
    }
}

impl ExportPayload {
    pub fn validate(self) -> Result<ExportJob> {
        let mut errors = FieldErrors::new();

        let text = required_text(&mut errors, "text", self.text);
        let format = match self.format {
            None => {
                errors.add("format", REQUIRED);
                None
            }
            Some(tag) => match tag.parse::<ExportFormat>() {
                Ok(format) => Some(format),
                Err(_) => {
                    errors.add("format", format!("\"{}\" is not a valid choice.", tag));
                    None
                }
            },
        };

        let format = match format {
            Some(format) if errors.is_empty() => format,
            _ => return Err(ServiceError::ValidationError(errors)),
        };

        Ok(ExportJob::new(text, format).with_metrics(
            self.metrics_original.unwrap_or_default(),
            self.metrics_simplified.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> TranslatePayload {
        TranslatePayload {
            text: Some("Um texto".to_string()),
            target_language: Some("en".to_string()),
            speciality: Some("Direito".to_string()),
            style: Some("Formal".to_string()),
            complexity_level: Some("Básico".to_string()),
            model: Some("gpt-4o".to_string()),
            ..Default::default()
        }
    }

    fn field_errors(err: ServiceError) -> FieldErrors {
        match err {
            ServiceError::ValidationError(fields) => fields,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_translate_payload_defaults() {
        let request = full_payload().validate().unwrap();

        assert_eq!(request.target_language.name, "English");
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(!request.summarize);
        assert!(request.focus_aspects.is_empty());
    }

    #[test]
    fn test_translate_payload_reports_every_field() {
        let payload = TranslatePayload {
            text: Some("   ".to_string()),
            target_language: Some("xx".to_string()),
            temperature: Some(3.5),
            model: Some("gpt-2".to_string()),
            ..Default::default()
        };

        let fields = field_errors(payload.validate().unwrap_err());
        assert_eq!(fields.get("text").unwrap(), [BLANK]);
        assert_eq!(
            fields.get("target_language").unwrap(),
            ["\"xx\" is not a supported language."]
        );
        assert_eq!(fields.get("model").unwrap(), ["\"gpt-2\" is not a valid choice."]);
        assert_eq!(fields.get("style").unwrap(), [REQUIRED]);
        assert!(fields.get("temperature").is_some());
    }

    #[test]
    fn test_export_payload_rejects_unknown_format() {
        let payload = ExportPayload {
            text: Some("t".to_string()),
            format: Some("xml".to_string()),
            ..Default::default()
        };

        let fields = field_errors(payload.validate().unwrap_err());
        assert_eq!(fields.get("format").unwrap(), ["\"xml\" is not a valid choice."]);
    }

    #[test]
    fn test_export_payload_builds_job() {
        let mut metrics = Metrics::new();
        metrics.insert("smog_index".to_string(), 7.0);
        let payload = ExportPayload {
            text: Some("t".to_string()),
            metrics_original: Some(metrics),
            metrics_simplified: None,
            format: Some("DOCX".to_string()),
        };

        let job = payload.validate().unwrap();
        assert_eq!(job.format, ExportFormat::Docx);
        assert_eq!(job.metrics_original.len(), 1);
        assert!(job.metrics_simplified.is_empty());
    }
}
