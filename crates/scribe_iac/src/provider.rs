//! Cloud provider definitions.

use serde::{Deserialize, Serialize};

/// Cloud providers the taxonomy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
        }
    }

    /// Parse either the short name or the Terraform provider name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" => Some(CloudProvider::Aws),
            "azure" | "azurerm" => Some(CloudProvider::Azure),
            "gcp" | "google" => Some(CloudProvider::Gcp),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp]
    }

    /// Get the Terraform provider name, which is also the taxonomy key.
    pub fn provider_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azurerm",
            CloudProvider::Gcp => "google",
        }
    }

    /// Human readable name used in titles and reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
            CloudProvider::Gcp => "Google Cloud Platform",
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display name for an arbitrary provider key, falling back to upper case.
pub fn display_name(provider: &str) -> String {
    CloudProvider::from_str(provider)
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|| provider.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_terraform_names() {
        assert_eq!(CloudProvider::from_str("azurerm"), Some(CloudProvider::Azure));
        assert_eq!(CloudProvider::from_str("google"), Some(CloudProvider::Gcp));
        assert_eq!(CloudProvider::from_str("AWS"), Some(CloudProvider::Aws));
        assert_eq!(CloudProvider::from_str("ibm"), None);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name("google"), "Google Cloud Platform");
        assert_eq!(display_name("ibm"), "IBM");
    }
}
