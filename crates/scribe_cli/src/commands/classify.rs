//! Classify command - Print the classified resource model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use scribe_iac::{ClassifiedModel, Concern, SummaryCounts};

use crate::config::ScribeConfig;
use crate::pipeline::{self, Analysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Directory containing the Terraform configuration
    #[arg(short, long)]
    directory: PathBuf,

    /// Provider to use instead of detecting it (aws, azurerm, google)
    #[arg(long)]
    provider: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Path to a tfscribe config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    provider_name: &'a str,
    summary: BTreeMap<&'static str, usize>,
    #[serde(flatten)]
    model: &'a ClassifiedModel,
}

pub async fn execute(args: ClassifyArgs) -> Result<()> {
    info!("Classifying {:?}", args.directory);

    let config = ScribeConfig::load(args.config.as_deref())?;
    let taxonomy = config.taxonomy()?;
    let analysis = pipeline::analyze(&args.directory, args.provider.as_deref(), &taxonomy)?;

    println!("{}", render(&analysis, args.format)?);
    Ok(())
}

/// Serialize the classified model with its summary counts.
fn render(analysis: &Analysis, format: OutputFormat) -> Result<String> {
    let counts = SummaryCounts::from_model(&analysis.model);
    let output = ClassifyOutput {
        provider_name: &analysis.provider_name,
        summary: Concern::all().iter().map(|c| (c.as_str(), counts.get(*c))).collect(),
        model: &analysis.model,
    };

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&output).context("Failed to serialize model")?,
        OutputFormat::Yaml => serde_yaml::to_string(&output).context("Failed to serialize model")?,
    };
    Ok(rendered)
}
