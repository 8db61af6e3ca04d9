use crate::domain::ports::GenerativeModel;
use crate::utils::error::{ChainError, ModelError, Result};
use crate::utils::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_VISION_MODEL: &str = "gemini-pro-vision";
pub const DEFAULT_REASONING_MODEL: &str = "gemini-2.0-flash-thinking-exp";

/// Sampling parameters sent with each request, serialized to the service's
/// `generationConfig` field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

/// Model name plus its sampling parameters for one logical endpoint.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub generation: GenerationConfig,
}

impl ModelSettings {
    /// Vision endpoint defaults: low temperature for faithful extraction.
    pub fn vision_default() -> Self {
        Self {
            model: DEFAULT_VISION_MODEL.to_string(),
            generation: GenerationConfig {
                temperature: 0.4,
                top_p: 1.0,
                top_k: 32,
                max_output_tokens: 2048,
            },
        }
    }

    /// Reasoning endpoint defaults, tuned for analytical output.
    pub fn reasoning_default() -> Self {
        Self {
            model: DEFAULT_REASONING_MODEL.to_string(),
            generation: GenerationConfig {
                temperature: 0.7,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 1024,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub vision: ModelSettings,
    pub reasoning: ModelSettings,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            vision: ModelSettings::vision_default(),
            reasoning: ModelSettings::reasoning_default(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ChainError::MissingConfig {
                field: "api_key".to_string(),
            });
        }
        validation::validate_url("base_url", &self.base_url)
    }
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
];

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: &'a [SafetySetting],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// HTTP client for the Gemini `generateContent` API, covering both the
/// vision-capable and text-only reasoning endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChainError::Config {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        settings: &ModelSettings,
        parts: Vec<Part<'_>>,
    ) -> std::result::Result<String, ModelError> {
        let body = GenerateContentRequest {
            contents: [Content { parts }],
            generation_config: &settings.generation,
            safety_settings: &SAFETY_SETTINGS,
        };

        tracing::debug!("Calling model {} at {}", settings.model, self.config.base_url);

        let response = self
            .client
            .post(self.endpoint(&settings.model))
            .header("x-goog-api-key", self.config.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| ModelError::Malformed {
                details: format!("undecodable completion body: {}", e),
            })?;

        Ok(extract_text(parsed))
    }
}

fn classify_transport(error: reqwest::Error) -> ModelError {
    if error.is_timeout() {
        ModelError::Transport(format!("request timed out: {}", error))
    } else if error.is_connect() {
        ModelError::Transport(format!("connection failed: {}", error))
    } else if error.is_decode() {
        ModelError::Malformed {
            details: error.to_string(),
        }
    } else {
        ModelError::Transport(error.to_string())
    }
}

fn classify_status(status: u16, body: String) -> ModelError {
    match status {
        401 | 403 => ModelError::Auth { message: body },
        // The service reports an invalid key as a 400 with an explanatory body.
        400 if body.contains("API key") => ModelError::Auth { message: body },
        429 => ModelError::RateLimited { message: body },
        _ => ModelError::Api { status, body },
    }
}

fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_vision(
        &self,
        instruction: &str,
        mime_type: &str,
        data_base64: &str,
    ) -> std::result::Result<String, ModelError> {
        let parts = vec![
            Part::Text { text: instruction },
            Part::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: data_base64,
                },
            },
        ];
        self.generate(&self.config.vision, parts).await
    }

    async fn generate_reasoning(
        &self,
        prompt: &str,
    ) -> std::result::Result<String, ModelError> {
        self.generate(&self.config.reasoning, vec![Part::Text { text: prompt }])
            .await
    }
}
