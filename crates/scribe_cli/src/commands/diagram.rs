//! Diagram command - Write the conceptual and networking diagrams.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::config::ScribeConfig;
use crate::pipeline::{self, DiagramNames};

#[derive(Args)]
pub struct DiagramArgs {
    /// Directory containing the Terraform configuration
    #[arg(short, long)]
    directory: PathBuf,

    /// Output directory for the DOT files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Provider to use instead of detecting it (aws, azurerm, google)
    #[arg(long)]
    provider: Option<String>,

    /// Path to a tfscribe config file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub async fn execute(args: DiagramArgs) -> Result<()> {
    info!("Generating diagrams for {:?}", args.directory);

    let config = ScribeConfig::load(args.config.as_deref())?;
    let taxonomy = config.taxonomy()?;
    let analysis = pipeline::analyze(&args.directory, args.provider.as_deref(), &taxonomy)?;

    let output_dir = config.output_dir(args.output);
    let names = DiagramNames {
        conceptual: config.conceptual_diagram.clone(),
        network: config.network_diagram.clone(),
    };
    let (conceptual, network) = pipeline::render_diagrams(&analysis, &output_dir, &names).await?;

    if !conceptual.rendered || !network.rendered {
        anyhow::bail!("Could not write diagrams to {}", output_dir.display());
    }

    println!("✅ Diagrams written to {}", output_dir.display());
    Ok(())
}
