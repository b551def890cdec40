//! Document command - Generate the solution design document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use scribe_iac::SummaryCounts;
use scribe_report::{report_file_name, ReportGenerator, ReportInput};

use crate::config::ScribeConfig;
use crate::pipeline::{self, DiagramNames};

#[derive(Args)]
pub struct DocumentArgs {
    /// Directory containing the Terraform configuration
    #[arg(short, long)]
    directory: PathBuf,

    /// Output directory for the report and diagrams
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a tfscribe config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider to use instead of detecting it (aws, azurerm, google)
    #[arg(long)]
    provider: Option<String>,
}

pub async fn execute(args: DocumentArgs) -> Result<()> {
    info!("Documenting {:?}", args.directory);

    let config = ScribeConfig::load(args.config.as_deref())?;
    let taxonomy = config.taxonomy()?;
    let analysis = pipeline::analyze(&args.directory, args.provider.as_deref(), &taxonomy)?;

    let output_dir = config.output_dir(args.output);
    let names = DiagramNames {
        conceptual: config.conceptual_diagram.clone(),
        network: config.network_diagram.clone(),
    };
    let (conceptual, network) = pipeline::render_diagrams(&analysis, &output_dir, &names).await?;

    let report_path = output_dir.join(report_file_name(&analysis.provider_name));
    let counts = SummaryCounts::from_model(&analysis.model);
    let mut generator = ReportGenerator::new(ReportInput {
        model: analysis.model,
        counts,
        provider_name: analysis.provider_name,
        source_dir: analysis.source_dir,
        conceptual,
        network,
    });
    if let Some(title) = &config.report_title {
        generator = generator.with_title(title.clone());
    }

    generator
        .write_to(&report_path)
        .context("Failed to write solution design document")?;

    println!("✅ Solution design document: {}", report_path.display());
    Ok(())
}
