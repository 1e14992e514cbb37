//! Translate chain: simplify, score, translate, evaluate

use tracing::{debug, info};

use crate::core::client::ServiceSet;
use crate::core::errors::{Result, Stage};
use crate::core::models::{TranslationOutcome, TranslationRequest};

/// Runs one translate request against the external services
#[derive(Clone)]
pub struct TranslationPipeline {
    services: ServiceSet,
}

impl TranslationPipeline {
    pub fn new(services: ServiceSet) -> Self {
        Self { services }
    }

    /// Execute the full chain; the first failing stage aborts with no partial result
    pub async fn run(&self, request: &TranslationRequest) -> Result<TranslationOutcome> {
        info!(
            "Translating {} chars to {} with {}",
            request.text.chars().count(),
            request.target_language,
            request.model
        );

        let simplified = self
            .services
            .simplifier
            .simplify(&request.text, request.simplify_options())
            .await
            .map_err(|e| e.at_stage(Stage::Simplify))?;
        debug!("Simplified text has {} chars", simplified.chars().count());

        let metrics_original = self
            .services
            .readability
            .score(&request.text)
            .await
            .map_err(|e| e.at_stage(Stage::Readability))?;
        let metrics_simplified = self
            .services
            .readability
            .score(&simplified)
            .await
            .map_err(|e| e.at_stage(Stage::Readability))?;

        let translation = self
            .services
            .translator
            .translate(&simplified, &request.target_language)
            .await
            .map_err(|e| e.at_stage(Stage::Translate))?;
        debug!("Detected source language: {}", translation.source_language_code);

        let bleu_score = self
            .services
            .bleu
            .score(
                &simplified,
                &translation.translated_text,
                &translation.source_language_code,
            )
            .await
            .map_err(|e| e.at_stage(Stage::Bleu))?;

        Ok(TranslationOutcome {
            translated_text: translation.translated_text,
            metrics_original,
            metrics_simplified,
            bleu_score,
            source_language_code: translation.source_language_code,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::core::errors::ServiceError;
    use crate::core::models::Language;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest::new(text, Language::new("English", "en"), "gpt-4o")
    }

    #[tokio::test]
    async fn test_pipeline_assembles_outcome() {
        let pipeline = TranslationPipeline::new(services());
        let outcome = pipeline.run(&request("texto muito longo")).await.unwrap();

        assert_eq!(outcome.translated_text, "[en] TEXTO MUITO LONGO");
        assert_eq!(outcome.source_language_code, "pt");
        assert_eq!(outcome.bleu_score, 0.42);
        assert_eq!(outcome.metrics_original["flesch_reading_ease"], 3.0);
        assert_eq!(outcome.metrics_simplified["flesch_reading_ease"], 3.0);
    }

    #[tokio::test]
    async fn test_pipeline_scores_simplified_text() {
        let scorer = Arc::new(WordCountScorer::default());
        let mut services = services();
        services.readability = scorer.clone();

        let pipeline = TranslationPipeline::new(services);
        let outcome = pipeline
            .run(&request("um dois três quatro").with_summarize(true))
            .await
            .unwrap();

        assert_eq!(outcome.metrics_original["flesch_reading_ease"], 4.0);
        assert_eq!(outcome.metrics_simplified["flesch_reading_ease"], 2.0);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pipeline_failure_names_stage() {
        let mut services = services();
        services.translator = Arc::new(FailingTranslator);

        let pipeline = TranslationPipeline::new(services);
        let err = pipeline.run(&request("texto")).await.unwrap_err();

        match err {
            ServiceError::UpstreamError { stage, .. } => assert_eq!(stage, Stage::Translate),
            other => panic!("unexpected error: {other}"),
        }
    }
}
