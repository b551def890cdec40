//! Steps shared by the commands: provider detection, loading, classification
//! and diagram rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use scribe_iac::{
    build_conceptual, build_network, display_name, find_provider, load_directory, render_artifact, resolve_topology,
    ClassifiedModel, Classifier, CloudProvider, DiagramArtifact, DotRenderer, Taxonomy,
};

use crate::error::CliError;

/// A classified Terraform directory.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Taxonomy key, e.g. `azurerm`.
    pub provider: String,
    /// Human readable provider name, e.g. `Azure`.
    pub provider_name: String,
    pub source_dir: PathBuf,
    pub model: ClassifiedModel,
}

/// Provider key from an explicit flag, or detected from the directory.
pub fn resolve_provider(dir: &Path, flag: Option<&str>) -> Result<String> {
    if let Some(flag) = flag {
        let key = CloudProvider::from_str(flag)
            .map(|p| p.provider_name().to_string())
            .unwrap_or_else(|| flag.to_lowercase());
        info!("Using provider {} from command line", key);
        return Ok(key);
    }

    let provider = find_provider(dir).ok_or_else(|| CliError::ProviderNotDetected(dir.to_path_buf()))?;
    Ok(provider.provider_name().to_string())
}

/// Detect the provider, load the directory and classify its resources.
///
/// Progress lines go to stderr.
pub fn analyze(dir: &Path, provider: Option<&str>, taxonomy: &Taxonomy) -> Result<Analysis> {
    if !dir.is_dir() {
        return Err(CliError::DirectoryNotFound(dir.to_path_buf()).into());
    }

    let provider = resolve_provider(dir, provider)?;
    let provider_name = display_name(&provider);
    eprintln!("☁️  Provider: {}", provider_name);

    let input = load_directory(dir).context("Failed to load Terraform input")?;
    if input.resources.is_empty() {
        warn!("No resources found in {}", dir.display());
    }

    let model = Classifier::new(taxonomy).classify(input, &provider);
    eprintln!(
        "📦 Classified {} resources into {} categories ({} variables, {} modules)",
        model.total_resources(),
        model.non_empty().count(),
        model.variables.len(),
        model.modules.len()
    );

    Ok(Analysis {
        provider,
        provider_name,
        source_dir: dir.to_path_buf(),
        model,
    })
}

/// File stems of the two diagrams.
#[derive(Debug, Clone)]
pub struct DiagramNames {
    pub conceptual: String,
    pub network: String,
}

/// Build and render both diagrams on the blocking pool, concurrently.
pub async fn render_diagrams(
    analysis: &Analysis,
    output_dir: &Path,
    names: &DiagramNames,
) -> Result<(DiagramArtifact, DiagramArtifact)> {
    let model = Arc::new(analysis.model.clone());

    let conceptual = {
        let model = Arc::clone(&model);
        let provider = analysis.provider.clone();
        let renderer = DotRenderer::new(output_dir);
        let stem = names.conceptual.clone();
        tokio::task::spawn_blocking(move || {
            let diagram = build_conceptual(&model, &provider);
            render_artifact(&renderer, &diagram, &stem)
        })
    };

    let network = {
        let model = Arc::clone(&model);
        let provider = analysis.provider.clone();
        let renderer = DotRenderer::new(output_dir);
        let stem = names.network.clone();
        tokio::task::spawn_blocking(move || {
            let topology = resolve_topology(&model, &provider);
            let diagram = build_network(&model, &topology, &provider);
            render_artifact(&renderer, &diagram, &stem)
        })
    };

    let (conceptual, network) = tokio::join!(conceptual, network);
    let conceptual = conceptual.context("Conceptual diagram task failed")?;
    let network = network.context("Network diagram task failed")?;

    for artifact in [&conceptual, &network] {
        if artifact.rendered {
            println!("🖼️  Diagram: {}", artifact.path.display());
        } else {
            warn!("Diagram {} could not be written", artifact.path.display());
        }
    }
    Ok((conceptual, network))
}
