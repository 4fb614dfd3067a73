use std::env;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use search_provisioner::{Dependencies, ProvisionerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match ProvisionerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dependencies = match Dependencies::new(&config) {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = dependencies.orchestrator.run(&dependencies.plan).await;
    println!("{}", report);

    // Per-resource failures are reported above and do not change the exit code.
    info!(
        started_at = %report.started_at.to_rfc3339(),
        finished_at = %report.finished_at.to_rfc3339(),
        "Provisioner finished"
    );
    ExitCode::SUCCESS
}

/// `RUST_LOG` filters (default `info`). `LOG_FORMAT=json` switches to JSON lines.
/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
