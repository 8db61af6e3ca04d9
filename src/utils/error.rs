use crate::domain::model::Stage;
use thiserror::Error;

/// Failures reported by the generative model port.
///
/// These map the external service's distinct failure conditions: rejected
/// credentials, throttling, unusable content, and plain transport trouble.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model service rejected credentials: {message}")]
    Auth { message: String },

    #[error("model service rate limit hit: {message}")]
    RateLimited { message: String },

    #[error("model returned empty or too-short content ({length} chars, minimum {minimum})")]
    EmptyResponse { length: usize, minimum: usize },

    #[error("model response could not be parsed: {details}")]
    Malformed { details: String },

    #[error("model service returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport failure reaching model service: {0}")]
    Transport(String),
}

impl ModelError {
    /// Only transient conditions qualify for retry; auth, empty and
    /// malformed responses will not improve by asking again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited { .. } | ModelError::Transport(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("validation error: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("stage {stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ModelError,
    },

    #[error("chat request failed: {source}")]
    Chat {
        #[source]
        source: ModelError,
    },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("persistence error: {message}")]
    Store { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Model,
    Config,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ChainError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChainError::Validation { .. } => ErrorCategory::Validation,
            ChainError::Stage { .. } | ChainError::Chat { .. } => ErrorCategory::Model,
            ChainError::Config { .. }
            | ChainError::MissingConfig { .. }
            | ChainError::InvalidConfigValue { .. } => ErrorCategory::Config,
            ChainError::Store { .. } | ChainError::Io(_) | ChainError::Csv(_) => {
                ErrorCategory::Storage
            }
            ChainError::Serialization(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChainError::Validation { .. } => ErrorSeverity::Low,
            ChainError::Stage { source, .. } | ChainError::Chat { source } => match source {
                ModelError::RateLimited { .. } | ModelError::Transport(_) => ErrorSeverity::Medium,
                ModelError::Auth { .. } => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
            ChainError::Config { .. }
            | ChainError::MissingConfig { .. }
            | ChainError::InvalidConfigValue { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// HTTP status an embedding handler should map this error to:
    /// 400 for validation, 401 for auth, 429 for rate limiting, 500 otherwise.
    pub fn http_status(&self) -> u16 {
        match self {
            ChainError::Validation { .. } => 400,
            ChainError::Stage { source, .. } | ChainError::Chat { source } => match source {
                ModelError::Auth { .. } => 401,
                ModelError::RateLimited { .. } => 429,
                _ => 500,
            },
            _ => 500,
        }
    }

    /// Stage the error originated in, when it is stage-tagged.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            ChainError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ChainError::Validation { .. } => {
                "Check the PDF file and location value before resubmitting"
            }
            ChainError::Stage { source, .. } | ChainError::Chat { source } => match source {
                ModelError::Auth { .. } => "Verify the GEMINI_API_KEY credential",
                ModelError::RateLimited { .. } => "Wait and retry, or lower the request rate",
                ModelError::Transport(_) => "Check network connectivity to the model endpoint",
                ModelError::EmptyResponse { .. } | ModelError::Malformed { .. } => {
                    "Retry the run; persistent failures may need a different model version"
                }
                ModelError::Api { .. } => "Inspect the model service response body for details",
            },
            ChainError::Config { .. }
            | ChainError::MissingConfig { .. }
            | ChainError::InvalidConfigValue { .. } => {
                "Fix the configuration value and run again"
            }
            ChainError::Store { .. } | ChainError::Io(_) | ChainError::Csv(_) => {
                "Check output directory permissions and free space"
            }
            ChainError::Serialization(_) => "Report this; the artifact shape was unexpected",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ChainError::Validation { field, reason } => {
                format!("Invalid input ({field}): {reason}")
            }
            ChainError::Stage { stage, source } => {
                format!("Calculation failed during {stage}: {source}")
            }
            ChainError::Chat { source } => format!("Chat assistant unavailable: {source}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_model_errors_are_retryable() {
        assert!(ModelError::Transport("reset".into()).is_retryable());
        assert!(ModelError::RateLimited {
            message: "slow down".into()
        }
        .is_retryable());
        assert!(!ModelError::Auth {
            message: "bad key".into()
        }
        .is_retryable());
        assert!(!ModelError::EmptyResponse {
            length: 0,
            minimum: 2
        }
        .is_retryable());
        assert!(!ModelError::Malformed {
            details: "not json".into()
        }
        .is_retryable());
    }

    #[test]
    fn http_status_mapping_matches_handler_contract() {
        let validation = ChainError::Validation {
            field: "location".into(),
            reason: "empty".into(),
        };
        assert_eq!(validation.http_status(), 400);

        let auth = ChainError::Stage {
            stage: Stage::ExtractStaticData,
            source: ModelError::Auth {
                message: "denied".into(),
            },
        };
        assert_eq!(auth.http_status(), 401);

        let throttled = ChainError::Stage {
            stage: Stage::CalculateResults,
            source: ModelError::RateLimited {
                message: "quota".into(),
            },
        };
        assert_eq!(throttled.http_status(), 429);

        let malformed = ChainError::Stage {
            stage: Stage::GenerateVisualization,
            source: ModelError::Malformed {
                details: "bad json".into(),
            },
        };
        assert_eq!(malformed.http_status(), 500);
    }

    #[test]
    fn stage_errors_expose_their_stage() {
        let err = ChainError::Stage {
            stage: Stage::GenerateAssumptions,
            source: ModelError::Transport("timeout".into()),
        };
        assert_eq!(err.failed_stage(), Some(Stage::GenerateAssumptions));

        let other = ChainError::Config {
            message: "bad".into(),
        };
        assert_eq!(other.failed_stage(), None);
    }
}
