pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::gemini::{GeminiClient, GeminiConfig, ModelSettings};
pub use adapters::store::LocalProjectStore;
pub use config::ChainFileConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use crate::core::{ChainOptions, ChatSession, ManualJChain};
pub use domain::model::{
    CalculationRequest, ChatMessage, PipelineResult, Stage, StoredProject, VisualizationData,
};
pub use domain::ports::{ChainObserver, GenerativeModel, NoopObserver, ProjectStore};
pub use utils::error::{ChainError, ModelError, Result};
pub use utils::retry::RetryPolicy;
