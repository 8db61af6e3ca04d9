use crate::adapters::gemini::GeminiConfig;
use crate::core::chain::ChainOptions;
use crate::utils::error::{ChainError, Result};
use crate::utils::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Optional TOML file tuning the chain, layered on top of the defaults and
/// below explicit CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainFileConfig {
    pub models: Option<ModelsSection>,
    pub retry: Option<RetrySection>,
    pub limits: Option<LimitsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsSection {
    pub vision: Option<String>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsSection {
    pub max_pdf_size_mb: Option<usize>,
    pub min_response_chars: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

impl ChainFileConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ChainError::Config {
            message: format!("cannot read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ChainError::Config {
            message: format!("invalid chain config: {}", e),
        })
    }

    /// Fold file-level overrides into the model client configuration.
    pub fn apply_to_gemini(&self, config: &mut GeminiConfig) {
        if let Some(models) = &self.models {
            if let Some(vision) = &models.vision {
                config.vision.model = vision.clone();
            }
            if let Some(reasoning) = &models.reasoning {
                config.reasoning.model = reasoning.clone();
            }
        }
        if let Some(limits) = &self.limits {
            if let Some(secs) = limits.request_timeout_secs {
                config.timeout = Duration::from_secs(secs);
            }
        }
    }

    /// Fold file-level overrides into the chain options.
    pub fn apply_to_options(&self, options: &mut ChainOptions) {
        if let Some(retry) = &self.retry {
            let max_attempts = retry.max_attempts.unwrap_or(options.retry.max_attempts);
            let base_delay = retry
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(options.retry.base_delay);
            options.retry = RetryPolicy::new(max_attempts, base_delay);
        }
        if let Some(limits) = &self.limits {
            if let Some(mb) = limits.max_pdf_size_mb {
                options.max_pdf_bytes = mb * 1024 * 1024;
            }
            if let Some(chars) = limits.min_response_chars {
                options.min_response_chars = chars;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = ChainFileConfig::from_toml(
            r#"
[models]
vision = "gemini-pro-vision"
reasoning = "gemini-2.0-flash-thinking-exp"

[retry]
max_attempts = 5
base_delay_ms = 250

[limits]
max_pdf_size_mb = 10
min_response_chars = 4
request_timeout_secs = 60
"#,
        )
        .unwrap();

        let mut gemini = GeminiConfig::new("key");
        config.apply_to_gemini(&mut gemini);
        assert_eq!(gemini.vision.model, "gemini-pro-vision");
        assert_eq!(gemini.timeout, Duration::from_secs(60));

        let mut options = ChainOptions::default();
        config.apply_to_options(&mut options);
        assert_eq!(options.retry.max_attempts, 5);
        assert_eq!(options.retry.base_delay, Duration::from_millis(250));
        assert_eq!(options.max_pdf_bytes, 10 * 1024 * 1024);
        assert_eq!(options.min_response_chars, 4);
    }

    #[test]
    fn empty_config_changes_nothing() {
        let config = ChainFileConfig::from_toml("").unwrap();
        let mut options = ChainOptions::default();
        let defaults = ChainOptions::default();
        config.apply_to_options(&mut options);
        assert_eq!(options.retry, defaults.retry);
        assert_eq!(options.max_pdf_bytes, defaults.max_pdf_bytes);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(ChainFileConfig::from_toml("models = nope").is_err());
    }
}
