//! Declared resource records as produced by the input loader.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{IacError, IacResult};

/// Attribute map of a declared resource.
///
/// Values are normally single-element lists, even for scalars. Accessors on
/// [`RawResource`] look through that wrapping without re-shaping the map.
pub type ConfigMap = serde_json::Map<String, Value>;

/// One declared infrastructure object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResource {
    /// Terraform resource type, e.g. `aws_subnet`.
    #[serde(rename = "type")]
    pub declared_type: String,
    /// Local name of the resource block.
    pub name: String,
    /// Declared attributes.
    #[serde(default)]
    pub config: ConfigMap,
}

/// A resource stored under its resolved category. Same shape as the raw record.
pub type ClassifiedResource = RawResource;

impl RawResource {
    pub fn new(declared_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declared_type: declared_type.into(),
            name: name.into(),
            config: ConfigMap::new(),
        }
    }

    /// Add an attribute, wrapped in a single-element list like the loader does.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), Value::Array(vec![value.into()]));
        self
    }

    /// Attribute value with the list wrapping removed.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.config.get(key).and_then(first_value)
    }

    /// Attribute value as a string, if it is one.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    /// Follow a path through nested blocks, e.g. `["network_interface", "subnetwork"]`.
    ///
    /// Every step looks through list wrapping by taking the first element.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (head, rest) = path.split_first()?;
        let mut current = self.attr(head)?;
        for key in rest {
            current = current.as_object()?.get(*key).and_then(first_value)?;
        }
        Some(current)
    }

    /// String value at `path`; `None` when missing or not a string.
    pub fn lookup_str(&self, path: &[&str]) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    /// Attribute rendered for display, `"N/A"` when absent.
    pub fn display_attr(&self, key: &str) -> String {
        match self.attr(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "N/A".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

fn first_value(mut value: &Value) -> Option<&Value> {
    while let Value::Array(items) = value {
        value = items.first()?;
    }
    Some(value)
}

/// A declared input variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub description: String,
    pub default: String,
}

/// A declared module call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub source: String,
}

/// Everything the loader extracted from one input directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedInput {
    #[serde(default)]
    pub resources: Vec<RawResource>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl ParsedInput {
    pub fn new(resources: Vec<RawResource>) -> Self {
        Self {
            resources,
            ..Default::default()
        }
    }

    /// Load a pre-parsed bundle from a JSON or YAML file.
    pub fn from_file(path: &Path) -> IacResult<Self> {
        debug!("Reading parsed input bundle from {:?}", path);
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            other => Err(IacError::InvalidInput(format!(
                "unsupported bundle extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }
}
