//! tfscribe CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Provider not detected
//! - 4: Input error
//! - 5: Report error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scribe_iac::IacError;
use scribe_report::ReportError;

mod commands;
mod config;
mod error;
mod pipeline;

use commands::{Cli, Commands};
use error::CliError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const PROVIDER_NOT_DETECTED: u8 = 3;
    pub const INPUT_ERROR: u8 = 4;
    pub const REPORT_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "scribe_cli=debug,scribe_iac=debug,scribe_report=debug,info"
    } else if cli.quiet {
        "warn"
    } else {
        "scribe_cli=info,scribe_iac=info,scribe_report=info,warn"
    };

    // stdout carries command output only.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .try_init();

    let result = match cli.command {
        Commands::Document(args) => commands::document::execute(args).await,
        Commands::Classify(args) => commands::classify::execute(args).await,
        Commands::Diagram(args) => commands::diagram::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::DirectoryNotFound(_) => ExitCodes::INVALID_ARGS,
                CliError::ProviderNotDetected(_) => ExitCodes::PROVIDER_NOT_DETECTED,
            };
        }
        if let Some(err) = cause.downcast_ref::<IacError>() {
            return match err {
                IacError::DirectoryNotFound(_) => ExitCodes::INVALID_ARGS,
                _ => ExitCodes::INPUT_ERROR,
            };
        }
        if cause.downcast_ref::<ReportError>().is_some() {
            return ExitCodes::REPORT_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_categorize_error() {
        let provider: anyhow::Error = CliError::ProviderNotDetected(PathBuf::from("infra")).into();
        assert_eq!(categorize_error(&provider), ExitCodes::PROVIDER_NOT_DETECTED);

        let missing: anyhow::Error = CliError::DirectoryNotFound(PathBuf::from("infra")).into();
        assert_eq!(categorize_error(&missing), ExitCodes::INVALID_ARGS);

        let input = Err::<(), _>(IacError::InvalidInput("bad".to_string()))
            .context("Failed to load Terraform input")
            .unwrap_err();
        assert_eq!(categorize_error(&input), ExitCodes::INPUT_ERROR);

        let report = Err::<(), _>(ReportError::InvalidPath(PathBuf::from("/")))
            .context("Failed to write solution design document")
            .unwrap_err();
        assert_eq!(categorize_error(&report), ExitCodes::REPORT_ERROR);

        assert_eq!(categorize_error(&anyhow::anyhow!("boom")), ExitCodes::GENERAL_ERROR);
    }
}
