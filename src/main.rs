mod assertion;
mod case;
mod config;
mod http;
mod json_path;
#[cfg(test)]
mod mock_target;
mod run;
mod suite;

use crate::config::{Cli, Mode, RunnerConfig};
use crate::run::report;
use crate::run::service::Runner;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = RunnerConfig::from(&cli);
    let runner = match Runner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let summary = match cli.mode() {
        Mode::Full => runner.run_all().await,
        Mode::Smoke => runner.run_smoke().await,
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        report::print_summary(&summary);
    }

    if !summary.is_success() {
        std::process::exit(1);
    }
}
