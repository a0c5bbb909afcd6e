use clap::Parser;
use position_groups::config::OutputFormat;
use position_groups::core::engine::select_rows;
use position_groups::core::EntrySource;
use position_groups::utils::error::ErrorSeverity;
use position_groups::utils::logger;
use position_groups::{
    report, CliConfig, CsvEntrySource, ForestLoader, LocalStorage, PredictionEngine,
    PredictorError, ReportExporter,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting position-groups CLI");
    tracing::debug!("CLI config: {:?}", config);

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config, &settings).await {
        tracing::error!("❌ Prediction failed: {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(
    config: &CliConfig,
    settings: &position_groups::config::Settings,
) -> Result<(), PredictorError> {
    let source = CsvEntrySource::new(LocalStorage::new("."), settings.data_path.clone())
        .with_delimiter(settings.delimiter);
    let mut records = source.load().await?;

    if let Some(race) = config.race.as_deref() {
        records = select_rows(&records, race, config.driver.as_deref())?;
    }

    let engine = PredictionEngine::new(ForestLoader, settings.model_path.clone());
    let reports = engine.run(&records)?;

    match settings.format {
        OutputFormat::Table => print!("{}", report::render_all(&reports)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    if let Some(export_path) = settings.export_path.as_deref() {
        let exporter = ReportExporter::new(LocalStorage::new("."), export_path);
        let written = exporter.export(&reports).await?;
        tracing::info!("📁 Results saved to: {}", written);
        println!("📁 Results saved to: {}", written);
    }

    tracing::info!(
        "✅ Predicted {} races, {} correct in total",
        reports.len(),
        reports.total_correct()
    );
    Ok(())
}
