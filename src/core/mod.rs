pub mod chain;
pub mod chat;
pub mod prompts;

pub use crate::domain::model::{CalculationRequest, PipelineResult, Stage, VisualizationData};
pub use crate::utils::error::Result;
pub use chain::{ChainOptions, ManualJChain, TracingObserver};
pub use chat::ChatSession;
