//! Interfaces of the external collaborators used by the translate chain

use async_trait::async_trait;

use crate::core::errors::Result;
use crate::core::models::{Language, Metrics, SimplifyOptions, Translation};

/// Rewrites text in simpler terms, optionally summarizing it
#[async_trait]
pub trait Simplifier: Send + Sync {
    async fn simplify(&self, text: &str, options: SimplifyOptions<'_>) -> Result<String>;
}

/// Translates text and reports the detected source language
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &Language) -> Result<Translation>;
}

/// Computes readability scores for a text
#[async_trait]
pub trait ReadabilityScorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<Metrics>;
}

/// Scores a candidate translation against its reference
#[async_trait]
pub trait BleuScorer: Send + Sync {
    async fn score(&self, reference: &str, candidate: &str, language: &str) -> Result<f64>;
}
