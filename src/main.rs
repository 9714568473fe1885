use chrono::Utc;
use clap::Parser;
use clinic_report::core::ConfigProvider;
use clinic_report::utils::error::ErrorSeverity;
use clinic_report::utils::logger::{self, LogFormat};
use clinic_report::utils::validation::Validate;
use clinic_report::{
    AttendancePipeline, CliConfig, EtlEngine, EtlError, LocalStorage, PortalClient, ReportRunner,
    RunOutcome, TomlConfig, TracingProgress,
};
use std::sync::Arc;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()));
}

fn load_config(path: &str) -> Result<TomlConfig, EtlError> {
    let config = TomlConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // The logger depends on the config file, so config errors go straight to stderr.
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", cli.config, e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        config.log_format()
    };
    logger::init_cli_logger(cli.verbose, config.log_level(), format);

    tracing::info!("Starting clinic-report");
    tracing::debug!("CLI arguments: {:?}", cli);

    let request = match cli.report_request() {
        Ok(request) => request,
        Err(e) => fail(&e),
    };

    if cli.dry_run {
        let portal = PortalClient::from_config(&config).unwrap_or_else(|e| fail(&e));
        println!("Login: {}", portal.login_url().unwrap_or_else(|e| fail(&e)));
        let now = Utc::now().timestamp_millis();
        for day in request.days() {
            let url = portal
                .listing_url(day, &request.facility_id, now)
                .unwrap_or_else(|e| fail(&e));
            println!("{}: {}", day, url);
        }
        println!(
            "Report would be written under {} with prefix {}",
            config.output_path(),
            config.filename_prefix()
        );
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AttendancePipeline::new(storage, config).unwrap_or_else(|e| fail(&e));
    let runner = ReportRunner::new(EtlEngine::new(pipeline));

    let (tx, rx) = tokio::sync::oneshot::channel();
    let handle = runner
        .start(request, Arc::new(TracingProgress), move |outcome| {
            let _ = tx.send(outcome);
        })
        .unwrap_or_else(|e| fail(&e));

    let outcome = rx.await?;
    handle.await?;

    match outcome {
        RunOutcome::Succeeded(summary) => {
            tracing::info!("✅ Report run completed");
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("✅ {}", summary);
            }
        }
        RunOutcome::Failed { message, severity } => {
            eprintln!("❌ {}", message);
            std::process::exit(exit_code(severity));
        }
    }

    Ok(())
}
