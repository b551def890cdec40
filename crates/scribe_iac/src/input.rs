//! Loading Terraform JSON configuration from a directory.
//!
//! Only the `*.tf.json` form of Terraform configuration is parsed. Plain
//! `.tf` files are still scanned for provider blocks when detecting the
//! provider.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{IacError, IacResult};
use crate::provider::CloudProvider;
use crate::resource::{ConfigMap, Module, ParsedInput, RawResource, Variable};

const NOT_AVAILABLE: &str = "N/A";

/// Files under `dir` in sorted path order.
fn sorted_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

fn is_tf_json(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.ends_with(".tf.json"))
}

fn is_tf(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "tf")
}

/// Detect the primary provider of a Terraform directory.
///
/// The first file, in sorted order, that declares a supported provider
/// decides. Unreadable files are skipped.
pub fn find_provider(dir: &Path) -> Option<CloudProvider> {
    for path in sorted_files(dir) {
        let found = if is_tf(&path) {
            fs::read_to_string(&path).ok().and_then(|c| provider_in_hcl(&c))
        } else if is_tf_json(&path) {
            fs::read_to_string(&path)
                .ok()
                .and_then(|c| serde_json::from_str::<Value>(&c).ok())
                .and_then(|doc| provider_in_json(&doc))
        } else {
            None
        };

        if let Some(provider) = found {
            info!("Detected provider {} in {:?}", provider, path);
            return Some(provider);
        }
    }
    None
}

fn provider_in_hcl(content: &str) -> Option<CloudProvider> {
    CloudProvider::all()
        .into_iter()
        .find(|p| content.contains(&format!("provider \"{}\"", p.provider_name())))
}

fn provider_in_json(doc: &Value) -> Option<CloudProvider> {
    let blocks = blocks(doc.get("provider")?);
    CloudProvider::all()
        .into_iter()
        .find(|p| blocks.iter().any(|block| block.contains_key(p.provider_name())))
}

/// Top-level block value as a list of objects, accepting both the object
/// form and the array-of-objects form.
fn blocks(value: &Value) -> Vec<&serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => vec![map],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// Body of a labelled block. Terraform JSON allows a list of bodies; the first is used.
fn body(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.first().and_then(Value::as_object),
        _ => None,
    }
}

/// Wrap top-level values in single-element lists. Lists stay as they are.
fn canonical_config(body: &serde_json::Map<String, Value>) -> ConfigMap {
    body.iter()
        .map(|(key, value)| {
            let wrapped = match value {
                Value::Array(_) => value.clone(),
                other => Value::Array(vec![other.clone()]),
            };
            (key.clone(), wrapped)
        })
        .collect()
}

/// Text of a scalar attribute, `"N/A"` when absent, null or an empty list.
fn display_value(value: Option<&Value>) -> String {
    let mut current = match value {
        Some(v) => v,
        None => return NOT_AVAILABLE.to_string(),
    };
    while let Value::Array(items) = current {
        match items.first() {
            Some(first) => current = first,
            None => return NOT_AVAILABLE.to_string(),
        }
    }
    match current {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract resources, variables and modules from one parsed document.
pub fn parse_document(doc: &Value) -> ParsedInput {
    let mut parsed = ParsedInput::default();

    if let Some(resource) = doc.get("resource") {
        for block in blocks(resource) {
            for (declared_type, named) in block {
                let Some(named) = named.as_object() else {
                    debug!("Skipping malformed resource block '{}'", declared_type);
                    continue;
                };
                for (name, value) in named {
                    let config = body(value).map(canonical_config).unwrap_or_default();
                    parsed.resources.push(RawResource {
                        declared_type: declared_type.clone(),
                        name: name.clone(),
                        config,
                    });
                }
            }
        }
    }

    if let Some(variable) = doc.get("variable") {
        for block in blocks(variable) {
            for (name, value) in block {
                let details = body(value);
                parsed.variables.push(Variable {
                    name: name.clone(),
                    description: display_value(details.and_then(|d| d.get("description"))),
                    default: display_value(details.and_then(|d| d.get("default"))),
                });
            }
        }
    }

    if let Some(module) = doc.get("module") {
        for block in blocks(module) {
            for (name, value) in block {
                parsed.modules.push(Module {
                    name: name.clone(),
                    source: display_value(body(value).and_then(|d| d.get("source"))),
                });
            }
        }
    }

    parsed
}

/// Load every `*.tf.json` file under `dir`, in sorted path order.
///
/// Files that cannot be read or parsed are logged and skipped.
pub fn load_directory(dir: &Path) -> IacResult<ParsedInput> {
    if !dir.is_dir() {
        return Err(IacError::DirectoryNotFound(dir.display().to_string()));
    }

    let mut input = ParsedInput::default();
    let mut files = 0;

    for path in sorted_files(dir).into_iter().filter(|p| is_tf_json(p)) {
        let doc = fs::read_to_string(&path)
            .map_err(IacError::from)
            .and_then(|c| serde_json::from_str::<Value>(&c).map_err(IacError::from));

        match doc {
            Ok(doc) => {
                let parsed = parse_document(&doc);
                debug!("{:?}: {} resources", path, parsed.resources.len());
                input.resources.extend(parsed.resources);
                input.variables.extend(parsed.variables);
                input.modules.extend(parsed.modules);
                files += 1;
            }
            Err(e) => warn!("Could not parse {:?}: {}", path, e),
        }
    }

    info!(
        "Loaded {} resources, {} variables, {} modules from {} files",
        input.resources.len(),
        input.variables.len(),
        input.modules.len(),
        files
    );
    Ok(input)
}
