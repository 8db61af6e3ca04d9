use crate::core::prompts;
use crate::domain::model::{CalculationRequest, PipelineResult, Stage, VisualizationData};
use crate::domain::ports::{ChainObserver, GenerativeModel};
use crate::utils::error::{ChainError, ModelError, Result};
use crate::utils::retry::{run_with_retry, RetryPolicy};
use crate::utils::validation;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::time::{Duration, Instant};

const PDF_MIME_TYPE: &str = "application/pdf";

/// Tunable behavior of a chain run. Defaults match the hosted service:
/// 25MB upload cap, two-character minimum response, three attempts with
/// backoff for transient failures.
#[derive(Debug, Clone)]
pub struct ChainOptions {
    pub retry: RetryPolicy,
    /// Responses shorter than this (after trimming) count as empty.
    pub min_response_chars: usize,
    pub max_pdf_bytes: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            min_response_chars: 2,
            max_pdf_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Default observer; mirrors stage progress into the tracing log.
pub struct TracingObserver;

impl ChainObserver for TracingObserver {
    fn stage_started(&self, stage: Stage) {
        tracing::info!("▶️ Stage started: {}", stage);
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        tracing::info!("✅ Stage completed: {} ({:?})", stage, elapsed);
    }

    fn stage_failed(&self, stage: Stage, error: &ModelError) {
        tracing::error!("❌ Stage failed: {}: {}", stage, error);
    }
}

/// Orchestrates the four-stage Manual J calculation chain.
///
/// Stages run strictly in [`Stage::SEQUENCE`] order, each consuming the
/// previous stage's output. A failure at any stage aborts the run with a
/// stage-tagged error; no partial result is returned. The chain holds no
/// state across runs.
pub struct ManualJChain<M: GenerativeModel> {
    model: M,
    options: ChainOptions,
    observer: Box<dyn ChainObserver>,
}

impl<M: GenerativeModel> ManualJChain<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            options: ChainOptions::default(),
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_options(mut self, options: ChainOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn ChainObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Access the injected model client, e.g. to start a [`crate::ChatSession`]
    /// against the same service after a run.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the full chain over one request.
    pub async fn run(&self, request: &CalculationRequest) -> Result<PipelineResult> {
        validation::validate_request(request, self.options.max_pdf_bytes)?;

        // Transport encoding for the inline document part.
        let pdf_base64 = BASE64.encode(&request.pdf);

        // Step 1: extract static building data from the PDF.
        let stage = Stage::ExtractStaticData;
        let started = self.begin(stage);
        let static_data = self.finish(
            stage,
            started,
            self.model_call(stage, || {
                self.model
                    .generate_vision(prompts::EXTRACTION_INSTRUCTION, PDF_MIME_TYPE, &pdf_base64)
            })
            .await,
        )?;

        // Step 2: derive climate and construction assumptions.
        let stage = Stage::GenerateAssumptions;
        let started = self.begin(stage);
        let prompt = prompts::assumptions_prompt(&request.location, &static_data);
        let dynamic_assumptions = self.finish(
            stage,
            started,
            self.model_call(stage, || self.model.generate_reasoning(&prompt))
                .await,
        )?;

        // Step 3: compute the loads.
        let stage = Stage::CalculateResults;
        let started = self.begin(stage);
        let prompt = prompts::calculation_prompt(&static_data, &dynamic_assumptions);
        let manual_j_results = self.finish(
            stage,
            started,
            self.model_call(stage, || self.model.generate_reasoning(&prompt))
                .await,
        )?;

        // Step 4: chart and CSV payloads, parsed from the structured reply.
        let stage = Stage::GenerateVisualization;
        let started = self.begin(stage);
        let prompt = prompts::visualization_prompt(&manual_j_results);
        let raw = self
            .model_call(stage, || self.model.generate_reasoning(&prompt))
            .await;
        let visualization = self.finish(
            stage,
            started,
            raw.and_then(|text| parse_visualization(&text)),
        )?;

        Ok(PipelineResult {
            static_data,
            dynamic_assumptions,
            manual_j_results,
            chart_data: visualization.chart_data,
            csv_data: visualization.csv_data,
        })
    }

    fn begin(&self, stage: Stage) -> Instant {
        self.observer.stage_started(stage);
        Instant::now()
    }

    fn finish<T>(
        &self,
        stage: Stage,
        started: Instant,
        outcome: std::result::Result<T, ModelError>,
    ) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.observer.stage_completed(stage, started.elapsed());
                Ok(value)
            }
            Err(source) => {
                self.observer.stage_failed(stage, &source);
                Err(ChainError::Stage { stage, source })
            }
        }
    }

    async fn model_call<F, Fut>(
        &self,
        stage: Stage,
        call: F,
    ) -> std::result::Result<String, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<String, ModelError>>,
    {
        let text = run_with_retry(&self.options.retry, stage.as_str(), call).await?;
        let length = text.trim().len();
        if length < self.options.min_response_chars {
            return Err(ModelError::EmptyResponse {
                length,
                minimum: self.options.min_response_chars,
            });
        }
        Ok(text)
    }
}

/// Parse the visualization stage's structured reply.
///
/// Markdown code fences around the JSON are tolerated; anything else that
/// fails to parse, or parses with an empty field, is a malformed response.
fn parse_visualization(text: &str) -> std::result::Result<VisualizationData, ModelError> {
    let body = strip_code_fences(text);

    let data: VisualizationData =
        serde_json::from_str(body).map_err(|e| ModelError::Malformed {
            details: format!("expected JSON with chartData and csvData: {}", e),
        })?;

    if data.chart_data.trim().is_empty() {
        return Err(ModelError::Malformed {
            details: "chartData is empty".to_string(),
        });
    }
    if data.csv_data.trim().is_empty() {
        return Err(ModelError::Malformed {
            details: "csvData is empty".to_string(),
        });
    }

    // The CSV payload must at least tokenize; downstream consumers feed it
    // straight into spreadsheet export.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.csv_data.as_bytes());
    for record in reader.records() {
        record.map_err(|e| ModelError::Malformed {
            details: format!("csvData is not valid CSV: {}", e),
        })?;
    }

    Ok(data)
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence.
    let rest = rest
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_response() {
        let data = parse_visualization(r#"{"chartData":"X","csvData":"Y"}"#).unwrap();
        assert_eq!(data.chart_data, "X");
        assert_eq!(data.csv_data, "Y");
    }

    #[test]
    fn parses_fenced_json_response() {
        let fenced = "```json\n{\"chartData\":\"iVBORw0KGgo=\",\"csvData\":\"room,load\\nkitchen,1200\"}\n```";
        let data = parse_visualization(fenced).unwrap();
        assert_eq!(data.chart_data, "iVBORw0KGgo=");
        assert!(data.csv_data.starts_with("room,load"));
    }

    #[test]
    fn rejects_non_json_response() {
        let err = parse_visualization("here is your chart!").unwrap_err();
        assert!(matches!(err, ModelError::Malformed { .. }));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = parse_visualization(r#"{"chartData":"X"}"#).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { .. }));
    }

    #[test]
    fn rejects_empty_fields() {
        let err = parse_visualization(r#"{"chartData":"","csvData":"Y"}"#).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { .. }));
    }

    #[test]
    fn strips_fences_with_and_without_language_tags() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }
}
