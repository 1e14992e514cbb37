//! HTTP clients for the external simplification, translation and scoring services

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::config::{AppConfig, EndpointConfig, OpenAiConfig};
use crate::core::errors::{Result, ServiceError};
use crate::core::models::{Language, Metrics, SimplifyOptions, Translation};
use crate::core::services::{BleuScorer, ReadabilityScorer, Simplifier, Translator};

/// Shared JSON-over-HTTP client
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    client: reqwest::Client,
}

impl HttpServiceClient {
    /// Create a client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ServiceError::NetworkError)?;

        Ok(Self { client })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(Duration::from_millis(config.timeout_ms))
    }

    /// POST `body` as JSON and decode the JSON reply
    async fn post_json<B, R>(&self, endpoint: &str, api_key: Option<&str>, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(body);

        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(ServiceError::NetworkError)?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServiceError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        debug!("POST {} -> {}", endpoint, status);

        response
            .json::<R>()
            .await
            .map_err(|e| ServiceError::InvalidResponseError {
                message: e.to_string(),
            })
    }
}

/// Simplifier backed by an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiSimplifier {
    http: HttpServiceClient,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiSimplifier {
    pub fn new(http: HttpServiceClient, config: OpenAiConfig) -> Self {
        Self { http, config }
    }
}

/// Instructions describing the tone and depth of the rewrite
pub fn build_system_prompt(options: &SimplifyOptions<'_>) -> String {
    let mut prompt = format!(
        "Você é um especialista em {} que reescreve textos técnicos de forma clara e acessível. \
         Use um estilo {} e um nível de complexidade {}.",
        options.speciality, options.style, options.complexity_level
    );

    if !options.focus_aspects.is_empty() {
        prompt.push_str(&format!(
            " Dê atenção especial aos seguintes aspectos: {}.",
            options.focus_aspects.join(", ")
        ));
    }

    prompt.push_str(" Responda apenas com o texto reescrito.");
    prompt
}

/// User turn carrying the text to rewrite
pub fn build_user_prompt(text: &str, summarize: bool) -> String {
    let instruction = if summarize {
        "Resuma e simplifique o texto a seguir:"
    } else {
        "Simplifique o texto a seguir, preservando todas as informações:"
    };
    format!("{}\n\n{}", instruction, text)
}

/// Extract the first choice of a chat completion reply
pub fn parse_completion(json: &serde_json::Value) -> Result<String> {
    json["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ServiceError::InvalidResponseError {
            message: "No completion in response".to_string(),
        })
}

#[async_trait]
impl Simplifier for OpenAiSimplifier {
    async fn simplify(&self, text: &str, options: SimplifyOptions<'_>) -> Result<String> {
        let body = ChatRequest {
            model: options.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: build_system_prompt(&options),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(text, options.summarize),
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let json: serde_json::Value = self
            .http
            .post_json(&self.config.endpoint, Some(&self.config.api_key), &body)
            .await?;

        parse_completion(&json)
    }
}

/// Translator backed by a JSON translation gateway
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    http: HttpServiceClient,
    config: EndpointConfig,
}

impl HttpTranslator {
    pub fn new(http: HttpServiceClient, config: EndpointConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    text: &'a str,
    target_language_code: &'a str,
    target_language_name: &'a str,
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target: &Language) -> Result<Translation> {
        let body = TranslateBody {
            text,
            target_language_code: &target.code,
            target_language_name: &target.name,
        };

        self.http
            .post_json(&self.config.endpoint, self.config.api_key.as_deref(), &body)
            .await
    }
}

/// Readability scorer backed by a JSON endpoint
#[derive(Debug, Clone)]
pub struct HttpReadabilityScorer {
    http: HttpServiceClient,
    config: EndpointConfig,
}

impl HttpReadabilityScorer {
    pub fn new(http: HttpServiceClient, config: EndpointConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ReadabilityScorer for HttpReadabilityScorer {
    async fn score(&self, text: &str) -> Result<Metrics> {
        let body = serde_json::json!({ "text": text });
        self.http
            .post_json(&self.config.endpoint, self.config.api_key.as_deref(), &body)
            .await
    }
}

/// BLEU scorer backed by a JSON endpoint
#[derive(Debug, Clone)]
pub struct HttpBleuScorer {
    http: HttpServiceClient,
    config: EndpointConfig,
}

impl HttpBleuScorer {
    pub fn new(http: HttpServiceClient, config: EndpointConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Debug, Serialize)]
struct BleuBody<'a> {
    reference: &'a str,
    candidate: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct BleuReply {
    bleu_score: f64,
}

#[async_trait]
impl BleuScorer for HttpBleuScorer {
    async fn score(&self, reference: &str, candidate: &str, language: &str) -> Result<f64> {
        let body = BleuBody {
            reference,
            candidate,
            language,
        };
        let reply: BleuReply = self
            .http
            .post_json(&self.config.endpoint, self.config.api_key.as_deref(), &body)
            .await?;
        Ok(reply.bleu_score)
    }
}

/// The four collaborators of the translate chain
#[derive(Clone)]
pub struct ServiceSet {
    pub simplifier: Arc<dyn Simplifier>,
    pub translator: Arc<dyn Translator>,
    pub readability: Arc<dyn ReadabilityScorer>,
    pub bleu: Arc<dyn BleuScorer>,
}

impl ServiceSet {
    /// Wire the HTTP implementations from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpServiceClient::from_config(config)?;

        Ok(Self {
            simplifier: Arc::new(OpenAiSimplifier::new(http.clone(), config.openai.clone())),
            translator: Arc::new(HttpTranslator::new(http.clone(), config.translate.clone())),
            readability: Arc::new(HttpReadabilityScorer::new(http.clone(), config.readability.clone())),
            bleu: Arc::new(HttpBleuScorer::new(http, config.bleu.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options<'a>(aspects: &'a [String]) -> SimplifyOptions<'a> {
        SimplifyOptions {
            speciality: "Direito",
            style: "Formal",
            complexity_level: "Básico",
            summarize: false,
            model: "gpt-4o",
            focus_aspects: aspects,
            temperature: 0.8,
            max_tokens: 1500,
        }
    }

    #[test]
    fn test_system_prompt_includes_options() {
        let aspects = vec!["terminologia".to_string(), "clareza".to_string()];
        let prompt = build_system_prompt(&options(&aspects));

        assert!(prompt.contains("especialista em Direito"));
        assert!(prompt.contains("estilo Formal"));
        assert!(prompt.contains("complexidade Básico"));
        assert!(prompt.contains("terminologia, clareza"));
    }

    #[test]
    fn test_system_prompt_without_focus() {
        let prompt = build_system_prompt(&options(&[]));
        assert!(!prompt.contains("aspectos"));
    }

    #[test]
    fn test_user_prompt_summarize_flag() {
        assert!(build_user_prompt("abc", true).starts_with("Resuma"));
        assert!(build_user_prompt("abc", false).ends_with("\n\nabc"));
    }

    #[test]
    fn test_parse_completion() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Texto simples.\n" } }]
        });
        assert_eq!(parse_completion(&json).unwrap(), "Texto simples.");

        let empty = serde_json::json!({ "choices": [] });
        assert!(matches!(
            parse_completion(&empty),
            Err(ServiceError::InvalidResponseError { .. })
        ));
    }

    #[test]
    fn test_service_set_from_config() {
        let config = AppConfig::default();
        assert!(ServiceSet::from_config(&config).is_ok());
    }
}
