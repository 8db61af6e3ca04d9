use crate::domain::model::{CalculationRequest, PipelineResult, StoredProject};
use crate::domain::ports::ProjectStore;
use crate::utils::error::{ChainError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ProjectMetadata<'a> {
    id: &'a str,
    location: &'a str,
    pdf_bytes: usize,
    created_at: DateTime<Utc>,
    version: u32,
}

/// Filesystem-backed project store.
///
/// Each run becomes a directory under the root holding the metadata, the
/// full result JSON, a normalized CSV export, and the decoded chart image.
/// Stands in for the hosted project/version backend.
pub struct LocalProjectStore {
    root: PathBuf,
}

impl LocalProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn next_project_id() -> String {
        format!("manualj-{}", Utc::now().format("%Y%m%d%H%M%S%3f"))
    }

    /// Re-emit the model's CSV through a parser so the stored file is
    /// normalized (consistent quoting, no ragged trailing whitespace).
    fn normalize_csv(csv_data: &str) -> Result<Vec<u8>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        for record in reader.records() {
            writer.write_record(&record?)?;
        }

        writer.into_inner().map_err(|e| ChainError::Store {
            message: format!("CSV buffer flush failed: {}", e),
        })
    }
}

#[async_trait]
impl ProjectStore for LocalProjectStore {
    async fn create_project(
        &self,
        request: &CalculationRequest,
        result: &PipelineResult,
    ) -> Result<StoredProject> {
        let id = Self::next_project_id();
        let dir = self.root.join(&id);
        tokio::fs::create_dir_all(&dir).await?;

        let metadata = ProjectMetadata {
            id: &id,
            location: &request.location,
            pdf_bytes: request.pdf.len(),
            created_at: Utc::now(),
            version: 1,
        };
        tokio::fs::write(
            dir.join("project.json"),
            serde_json::to_vec_pretty(&metadata)?,
        )
        .await?;

        tokio::fs::write(dir.join("result.json"), serde_json::to_vec_pretty(result)?).await?;

        tokio::fs::write(dir.join("results.csv"), Self::normalize_csv(&result.csv_data)?)
            .await?;

        // The chart arrives base64-encoded; fall back to the raw text when
        // the model sent something that does not decode.
        match BASE64.decode(result.chart_data.trim()) {
            Ok(png) => tokio::fs::write(dir.join("chart.png"), png).await?,
            Err(e) => {
                tracing::warn!("chart payload is not valid base64 ({}), storing as text", e);
                tokio::fs::write(dir.join("chart.txt"), result.chart_data.as_bytes()).await?;
            }
        }

        tracing::info!("💾 Project {} stored at {}", id, dir.display());

        Ok(StoredProject {
            id,
            path: dir,
            version: 1,
        })
    }
}
