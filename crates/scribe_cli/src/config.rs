//! Optional YAML configuration for tfscribe runs.
//!
//! ```yaml
//! output_dir: docs/architecture
//! conceptual_diagram: conceptual
//! network_diagram: network
//! report_title: Payments Platform Design
//! taxonomy_overlay: taxonomy.yaml
//! ```
//!
//! Command-line flags take precedence over every value here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use scribe_iac::{Taxonomy, TaxonomyOverlay};

pub const DEFAULT_CONCEPTUAL_DIAGRAM: &str = "conceptual_diagram";
pub const DEFAULT_NETWORK_DIAGRAM: &str = "networking_diagram";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    /// Where diagrams and the report are written. Defaults to the current directory.
    pub output_dir: Option<PathBuf>,
    /// File stem of the conceptual diagram.
    pub conceptual_diagram: String,
    /// File stem of the networking diagram.
    pub network_diagram: String,
    pub report_title: Option<String>,
    /// Extra resource types per provider and category.
    pub taxonomy_overlay: Option<PathBuf>,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            conceptual_diagram: DEFAULT_CONCEPTUAL_DIAGRAM.to_string(),
            network_diagram: DEFAULT_NETWORK_DIAGRAM.to_string(),
            report_title: None,
            taxonomy_overlay: None,
        }
    }
}

impl ScribeConfig {
    /// Load a config file. Relative paths inside it resolve against its directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.output_dir = config.output_dir.map(|p| resolve(base, p));
            config.taxonomy_overlay = config.taxonomy_overlay.map(|p| resolve(base, p));
        }
        Ok(config)
    }

    /// The file's config when a path is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Output directory, with a command-line value taking precedence.
    pub fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The built-in taxonomy, extended with the configured overlay.
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        let taxonomy = Taxonomy::builtin();
        match &self.taxonomy_overlay {
            Some(path) => {
                let overlay = TaxonomyOverlay::from_file(path)
                    .with_context(|| format!("Failed to load taxonomy overlay {}", path.display()))?;
                Ok(taxonomy.with_overlay(overlay))
            }
            None => Ok(taxonomy),
        }
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ScribeConfig::load(None).unwrap();
        assert_eq!(config.conceptual_diagram, "conceptual_diagram");
        assert_eq!(config.network_diagram, "networking_diagram");
        assert_eq!(config.output_dir(None), PathBuf::from("."));
        assert_eq!(config.output_dir(Some(PathBuf::from("out"))), PathBuf::from("out"));
    }

    #[test]
    fn test_partial_file_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tfscribe.yaml");
        fs::write(&path, "output_dir: docs\nreport_title: Payments\n").unwrap();

        let config = ScribeConfig::from_file(&path).unwrap();
        assert_eq!(config.output_dir(None), dir.path().join("docs"));
        assert_eq!(config.report_title.as_deref(), Some("Payments"));
        assert_eq!(config.network_diagram, DEFAULT_NETWORK_DIAGRAM);
    }

    #[test]
    fn test_taxonomy_overlay_is_applied() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("overlay.yaml"),
            "providers:\n  aws:\n    - name: instances\n      types: [aws_spot_instance_request]\n",
        )
        .unwrap();
        let path = dir.path().join("tfscribe.yaml");
        fs::write(&path, "taxonomy_overlay: overlay.yaml\n").unwrap();

        let taxonomy = ScribeConfig::from_file(&path).unwrap().taxonomy().unwrap();
        let aws = taxonomy.for_provider("aws").unwrap();
        assert_eq!(aws.reverse_lookup().get("aws_spot_instance_request"), Some(&"instances"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(ScribeConfig::from_file(&dir.path().join("absent.yaml")).is_err());
    }
}
