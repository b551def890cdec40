//! Errors raised by the command layer itself.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Could not determine a supported cloud provider (aws, azurerm, google) in {0}")]
    ProviderNotDetected(PathBuf),
}
