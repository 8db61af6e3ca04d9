use crate::domain::model::{CalculationRequest, PipelineResult, Stage, StoredProject};
use crate::utils::error::{ModelError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Capability interface over the generative model service.
///
/// One implementation talks to the real Gemini endpoints; tests substitute
/// scripted fakes. The chain never constructs a client itself.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Submit an instruction plus an inline base64-encoded document to the
    /// vision-capable endpoint and return the text completion.
    async fn generate_vision(
        &self,
        instruction: &str,
        mime_type: &str,
        data_base64: &str,
    ) -> std::result::Result<String, ModelError>;

    /// Submit a text-only prompt to the reasoning endpoint and return the
    /// text completion.
    async fn generate_reasoning(&self, prompt: &str)
        -> std::result::Result<String, ModelError>;
}

/// Persistence boundary for completed runs.
///
/// The chain itself retains nothing after returning; the caller hands the
/// aggregate to a store, which owns its own versioning semantics.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(
        &self,
        request: &CalculationRequest,
        result: &PipelineResult,
    ) -> Result<StoredProject>;
}

/// Stage lifecycle hooks, injected into the chain instead of a singleton
/// logging service. All methods default to no-ops.
pub trait ChainObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_completed(&self, _stage: Stage, _elapsed: Duration) {}
    fn stage_failed(&self, _stage: Stage, _error: &ModelError) {}
}

pub struct NoopObserver;

impl ChainObserver for NoopObserver {}
