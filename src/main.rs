use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use user_collector::config::LogFormat;
use user_collector::utils::{logger, validation::Validate};
use user_collector::{
    ApiClient, AppConfig, CliArgs, EtlEngine, FileReportWriter, LocalStorage, ScheduleGate,
    SystemClock, UserPipeline,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            return ExitCode::FAILURE;
        }
    };

    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(&config.logging.level, args.verbose),
        LogFormat::Json => logger::init_json_logger(&config.logging.level, args.verbose),
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return ExitCode::FAILURE;
    }

    tracing::info!("🚀 User collector starting");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Encoding: {}", config.file_encoding());

    if args.dry_run {
        display_config_summary(&config);
        return ExitCode::SUCCESS;
    }

    let outcome = tokio::select! {
        result = run(config) => result,
        _ = interrupted() => {
            tracing::warn!("⚠️ Execution interrupted by user");
            Err(user_collector::EtlError::Interrupted.into())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<user_collector::EtlError>() {
                Some(etl_error) => {
                    tracing::error!(
                        "❌ Run failed: {} (Category: {:?})",
                        etl_error,
                        etl_error.category()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", etl_error.recovery_suggestion());
                }
                None => tracing::error!("❌ Unexpected error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the run continues
/// without interrupt support.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Error setting up signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let gate = ScheduleGate::from_config(&config)?;
    let fetcher = ApiClient::new(config.api.clone()).context("building HTTP client")?;
    let storage = LocalStorage::new(config.output.directory.clone());
    let writer = FileReportWriter::new(storage, config.file_encoding());

    let pipeline = UserPipeline::new(fetcher, writer, SystemClock, &config);
    let engine = EtlEngine::new(pipeline, gate, SystemClock);

    let report = engine.run().await?;

    println!("✅ Collected {} users ({} valid)", report.records_written, report.valid_records);
    println!("📁 Table: {}", report.table_path);
    match &report.summary_path {
        Some(path) => println!("📁 Summary: {}", path),
        None => println!("⚠️ Summary not saved"),
    }
    Ok(())
}

fn display_config_summary(config: &AppConfig) {
    println!("📋 Configuration Summary:");
    println!("  Environment: {}", config.environment);
    println!(
        "  Schedule: {}{}",
        config.schedule.run_at,
        if config.schedule.bypass { " (bypass requested)" } else { "" }
    );
    println!("  Source: {}", config.api.users_url());
    println!("  Timeout: {}s", config.api.timeout_seconds);
    println!(
        "  Required fields: {}",
        config.processing.required_fields.join(", ")
    );
    println!(
        "  Records: min {}, max {}, keep id <= {}",
        config.processing.min_records,
        config.processing.max_records,
        config.processing.filter_threshold
    );
    println!("  Table: {}", config.table_path().display());
    println!("  Summary: {}", config.summary_path().display());
    println!("  Encoding: {}", config.file_encoding());
    println!();
    println!("🔍 Dry run: nothing fetched or written.");
}
