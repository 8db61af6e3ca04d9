use clap::Parser;
use manualj_chain::config::ChainFileConfig;
use manualj_chain::utils::error::{ChainError, ErrorSeverity};
use manualj_chain::utils::monitor::SystemMonitor;
use manualj_chain::utils::validation::{self, Validate};
use manualj_chain::utils::logger;
use manualj_chain::{
    CalculationRequest, ChainOptions, ChatSession, CliConfig, GeminiClient, GeminiConfig,
    LocalProjectStore, ManualJChain, PipelineResult, ProjectStore, RetryPolicy,
};
use std::io::Write as _;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting Manual J calculation chain");
    if config.verbose {
        tracing::debug!("CLI config: pdf={}, location={}", config.pdf, config.location);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let mut gemini = GeminiConfig::new(config.api_key.clone());
    gemini.base_url = config.api_endpoint.clone();
    gemini.timeout = Duration::from_secs(config.request_timeout_secs);
    if let Some(model) = &config.vision_model {
        gemini.vision.model = model.clone();
    }
    if let Some(model) = &config.reasoning_model {
        gemini.reasoning.model = model.clone();
    }

    let mut options = ChainOptions::default();
    options.retry = RetryPolicy::new(config.retry_attempts, options.retry.base_delay);
    options.max_pdf_bytes = config.max_pdf_size_mb * 1024 * 1024;

    // File-level tuning, when given, wins over the flag defaults.
    if let Some(path) = &config.config {
        match ChainFileConfig::from_file(path) {
            Ok(file_config) => {
                file_config.apply_to_gemini(&mut gemini);
                file_config.apply_to_options(&mut options);
            }
            Err(e) => fail(&e),
        }
    }

    let pdf = match tokio::fs::read(&config.pdf).await {
        Ok(bytes) => bytes,
        Err(e) => fail(&ChainError::from(e)),
    };
    if !validation::looks_like_pdf(&pdf) {
        tracing::warn!("⚠️ {} does not carry a PDF signature", config.pdf);
    }

    let client = match GeminiClient::new(gemini) {
        Ok(client) => client,
        Err(e) => fail(&e),
    };
    let chain = ManualJChain::new(client.clone()).with_options(options);
    let store = LocalProjectStore::new(&config.output_path);

    let monitor = SystemMonitor::new(config.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }
    monitor.log_stats("Chain run started");

    let request = CalculationRequest::new(pdf, config.location.clone());
    let result = match chain.run(&request).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(
                "❌ Calculation chain failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            fail(&e);
        }
    };
    monitor.log_stats("Chain run completed");

    let stored = match store.create_project(&request, &result).await {
        Ok(stored) => stored,
        Err(e) => fail(&e),
    };

    tracing::info!("✅ Manual J calculation completed");
    println!("✅ Manual J calculation completed successfully!");
    println!("📁 Project {} saved to {}", stored.id, stored.path.display());
    monitor.log_final_stats();

    if config.chat {
        run_chat(&client, &result).await?;
    }

    Ok(())
}

fn fail(error: &ChainError) -> ! {
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 Suggestion: {}", error.recovery_suggestion());

    let exit_code = match error.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run_chat(model: &GeminiClient, result: &PipelineResult) -> anyhow::Result<()> {
    let mut session = ChatSession::new(model, result);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    println!("💬 Ask about the results (empty line or 'exit' to quit)");
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
        {
            break;
        }

        match session.send(line).await {
            Ok(reply) => println!("assistant> {}\n", reply),
            Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
        }
    }
    Ok(())
}
