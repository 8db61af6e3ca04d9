use crate::adapters::gemini::DEFAULT_BASE_URL;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "manualj")]
#[command(about = "Run Manual J heating/cooling load calculations over a building plan PDF")]
pub struct CliConfig {
    /// Path to the building plans PDF
    #[arg(long)]
    pub pdf: String,

    /// Location for climate considerations (zip code, city, ...)
    #[arg(long)]
    pub location: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub api_endpoint: String,

    /// Override the vision-capable model name
    #[arg(long)]
    pub vision_model: Option<String>,

    /// Override the reasoning model name
    #[arg(long)]
    pub reasoning_model: Option<String>,

    /// Optional TOML chain configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Directory where completed projects are stored
    #[arg(long, default_value = "./projects")]
    pub output_path: String,

    #[arg(long, default_value = "3")]
    pub retry_attempts: u32,

    #[arg(long, default_value = "25")]
    pub max_pdf_size_mb: usize,

    #[arg(long, default_value = "120")]
    pub request_timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory usage during the run")]
    pub monitor: bool,

    #[arg(long, help = "Open an interactive chat about the results after the run")]
    pub chat: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_string("location", &self.location)?;
        validation::validate_pdf_extension("pdf", &self.pdf)?;
        validation::validate_range("retry_attempts", self.retry_attempts, 1, 10)?;
        validation::validate_range("max_pdf_size_mb", self.max_pdf_size_mb, 1, 100)?;
        validation::validate_range("request_timeout_secs", self.request_timeout_secs, 1, 600)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "manualj",
            "--pdf",
            "plans.pdf",
            "--location",
            "94110",
            "--api-key",
            "test-key",
        ]
    }

    #[test]
    fn parses_minimal_invocation_with_defaults() {
        let config = CliConfig::parse_from(base_args());
        assert_eq!(config.pdf, "plans.pdf");
        assert_eq!(config.location, "94110");
        assert_eq!(config.api_endpoint, DEFAULT_BASE_URL);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.max_pdf_size_mb, 25);
        assert!(!config.chat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_pdf_input() {
        let mut args = base_args();
        args[2] = "plans.docx";
        let config = CliConfig::parse_from(args);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_retries() {
        let mut args = base_args();
        args.extend(["--retry-attempts", "0"]);
        let config = CliConfig::parse_from(args);
        assert!(config.validate().is_err());
    }
}
