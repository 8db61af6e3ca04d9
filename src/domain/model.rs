use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The four stages of the Manual J calculation chain, in execution order.
///
/// A run moves strictly forward through `SEQUENCE`; no stage is skipped or
/// revisited. Errors raised by the chain carry the stage they originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    ExtractStaticData,
    GenerateAssumptions,
    CalculateResults,
    GenerateVisualization,
}

impl Stage {
    /// Execution order of the chain.
    pub const SEQUENCE: [Stage; 4] = [
        Stage::ExtractStaticData,
        Stage::GenerateAssumptions,
        Stage::CalculateResults,
        Stage::GenerateVisualization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ExtractStaticData => "extract_static_data",
            Stage::GenerateAssumptions => "generate_assumptions",
            Stage::CalculateResults => "calculate_results",
            Stage::GenerateVisualization => "generate_visualization",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable input to a single chain run.
#[derive(Debug, Clone)]
pub struct CalculationRequest {
    /// Raw bytes of the building plans PDF.
    pub pdf: Vec<u8>,
    /// Free-form location string; interpreted by the model, not parsed here.
    pub location: String,
}

impl CalculationRequest {
    pub fn new(pdf: Vec<u8>, location: impl Into<String>) -> Self {
        Self {
            pdf,
            location: location.into(),
        }
    }
}

/// Chart and CSV payloads produced by the visualization stage.
///
/// Field names follow the model's JSON response contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationData {
    /// Base64-encoded chart image.
    pub chart_data: String,
    /// CSV text for detailed analysis.
    pub csv_data: String,
}

/// Aggregate output of a successful chain run.
///
/// All five fields are non-empty on success; a failed run produces no
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub static_data: String,
    pub dynamic_assumptions: String,
    pub manual_j_results: String,
    pub chart_data: String,
    pub csv_data: String,
}

/// Handle to a persisted project, returned by a `ProjectStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProject {
    pub id: String,
    pub path: PathBuf,
    pub version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// One turn in a results-chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
