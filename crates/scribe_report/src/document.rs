//! Solution design document assembly.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use scribe_iac::{ClassifiedModel, ClassifiedResource, DiagramArtifact, SummaryCounts};

use crate::error::{ReportError, ReportResult};
use crate::summary::executive_summary;
use crate::table::{escape, Table};

const NETWORK_CATEGORIES: &[&str] = &["vpcs", "vnets", "networks"];
const CIDR_FIELDS: &[&str] = &["cidr_block", "address_space", "address_prefixes", "ip_cidr_range"];
const COMPUTE_CATEGORIES: &[&str] = &["instances", "vms"];
const MACHINE_TYPE_FIELDS: &[&str] = &["machine_type", "instance_type", "size", "vm_size"];
const ZONE_FIELDS: &[&str] = &["zone", "availability_zone"];
const STORAGE_CATEGORIES: &[&str] = &["storage_buckets", "s3", "storage_accounts"];
const LOCATION_FIELDS: &[&str] = &["location", "region"];

/// File name of the report for a provider display name.
pub fn report_file_name(provider_name: &str) -> String {
    format!("Solution_Design_Document_{}.md", provider_name.replace(' ', "_"))
}

/// Everything a report is assembled from.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub model: ClassifiedModel,
    pub counts: SummaryCounts,
    /// Human readable provider name, e.g. `Google Cloud Platform`.
    pub provider_name: String,
    pub source_dir: PathBuf,
    pub conceptual: DiagramArtifact,
    pub network: DiagramArtifact,
}

/// Builds the Markdown solution design document.
pub struct ReportGenerator {
    input: ReportInput,
    title: Option<String>,
    generated_at: DateTime<Utc>,
}

impl ReportGenerator {
    pub fn new(input: ReportInput) -> Self {
        Self {
            input,
            title: None,
            generated_at: Utc::now(),
        }
    }

    /// Replace the default document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Solution Design Document: {} Architecture", self.input.provider_name))
    }

    /// Render the document. Diagram links use the artifact paths as given.
    pub fn render(&self) -> String {
        self.render_relative_to(None)
    }

    /// Write the document to `path`, linking diagrams relative to its directory.
    pub fn write_to(&self, path: &Path) -> ReportResult<()> {
        if path.file_name().is_none() {
            return Err(ReportError::InvalidPath(path.to_path_buf()));
        }
        let base = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = base {
            fs::create_dir_all(dir)?;
        }

        let content = self.render_relative_to(base);
        fs::write(path, content).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote report {}", path.display());
        Ok(())
    }

    fn render_relative_to(&self, base: Option<&Path>) -> String {
        let mut output = String::new();
        output.push_str(&format!("# {}\n\n", self.title()));
        output.push_str(&format!(
            "_Generated by tfscribe on {}_\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        self.introduction(&mut output);
        self.summary(&mut output);
        self.conceptual(&mut output, base);
        self.networking(&mut output, base);
        self.compute_and_storage(&mut output);
        self.security(&mut output);
        self.terraform_environment(&mut output);
        self.appendix(&mut output);

        debug!("Rendered report with {} bytes", output.len());
        output
    }

    fn introduction(&self, output: &mut String) {
        let input = &self.input;
        output.push_str("## 1. Introduction\n\n");
        output.push_str("### 1.1 Purpose of the Document\n\n");
        output.push_str(&format!(
            "This document describes the cloud architecture for the {} environment, as defined by the \
             Terraform configuration files. It provides a detailed overview of the provisioned infrastructure, \
             including networking, compute, storage, and security components based on the parsed resources.\n\n",
            input.provider_name
        ));

        output.push_str("### 1.2 Scope\n\n");
        output.push_str(&format!(
            "The scope of this document is limited to the resources defined in the Terraform files. \
             The analysis has identified {} distinct resource categories and {} module(s) used in the configuration.\n\n",
            input.model.non_empty().count(),
            input.model.modules.len()
        ));

        output.push_str("### 1.3 Detected Cloud Provider\n\n");
        output.push_str(&format!("{}\n\n", input.provider_name));
        output.push_str("### 1.4 Source Terraform Directory\n\n");
        output.push_str(&format!("`{}`\n\n", input.source_dir.display()));
    }

    fn summary(&self, output: &mut String) {
        output.push_str("## 2. Executive Summary\n\n");
        output.push_str(&executive_summary(&self.input.provider_name, &self.input.counts));
        output.push_str("\n\n");
    }

    fn conceptual(&self, output: &mut String, base: Option<&Path>) {
        output.push_str("## 3. Conceptual Architecture\n\n");
        output.push_str("### 3.1 Architecture Overview\n\n");
        output.push_str(
            "The following diagram provides a high-level overview of the solution components and their interactions.\n\n",
        );
        output.push_str("### 3.2 Conceptual Architecture Diagram\n\n");
        output.push_str(&diagram_reference("Conceptual architecture", &self.input.conceptual, base));
    }

    fn networking(&self, output: &mut String, base: Option<&Path>) {
        let model = &self.input.model;
        output.push_str("## 4. Networking Design\n\n");

        output.push_str("### 4.1 Virtual Networks\n\n");
        let mut networks = Table::new(&["Name", "Type", "CIDR"]);
        for (_, resource) in model.group(NETWORK_CATEGORIES) {
            networks.row(vec![resource.name.clone(), resource.declared_type.clone(), first_attr(resource, CIDR_FIELDS)]);
        }
        push_table(output, &networks, "No virtual networks were found.");

        output.push_str("### 4.2 Subnets\n\n");
        let mut subnets = Table::new(&["Name", "Type", "CIDR"]);
        for resource in model.resources("subnets") {
            subnets.row(vec![resource.name.clone(), resource.declared_type.clone(), first_attr(resource, CIDR_FIELDS)]);
        }
        push_table(output, &subnets, "No subnets were found.");

        output.push_str("### 4.3 Networking and Security Diagram\n\n");
        output.push_str(&diagram_reference("Networking and security", &self.input.network, base));
    }

    fn compute_and_storage(&self, output: &mut String) {
        let model = &self.input.model;
        output.push_str("## 5. Compute and Storage\n\n");

        let mut instances = Table::new(&["Name", "Machine Type", "Zone"]);
        for (_, resource) in model.group(COMPUTE_CATEGORIES) {
            instances.row(vec![
                resource.name.clone(),
                first_attr(resource, MACHINE_TYPE_FIELDS),
                first_attr(resource, ZONE_FIELDS),
            ]);
        }
        if !instances.is_empty() {
            output.push_str("### 5.1 Compute Instances\n\n");
            output.push_str(&instances.to_markdown());
            output.push('\n');
        }

        let mut buckets = Table::new(&["Name", "Location"]);
        for (_, resource) in model.group(STORAGE_CATEGORIES) {
            buckets.row(vec![resource.name.clone(), first_attr(resource, LOCATION_FIELDS)]);
        }
        if !buckets.is_empty() {
            output.push_str("### 5.2 Storage Buckets\n\n");
            output.push_str(&buckets.to_markdown());
            output.push('\n');
        }
    }

    fn security(&self, output: &mut String) {
        let model = &self.input.model;
        output.push_str("## 6. Security and Identity\n\n");

        let mut firewalls = Table::new(&["Name", "Network", "Allowed Protocols/Ports"]);
        for rule in model.resources("firewall") {
            firewalls.row(vec![rule.name.clone(), network_name(rule), allow_summary(rule)]);
        }
        if !firewalls.is_empty() {
            output.push_str("### 6.1 Firewall Rules\n\n");
            output.push_str(&firewalls.to_markdown());
            output.push('\n');
        }

        let mut accounts = Table::new(&["Account ID", "Display Name"]);
        for account in model.resources("iam_roles") {
            accounts.row(vec![account.display_attr("account_id"), account.display_attr("display_name")]);
        }
        if !accounts.is_empty() {
            output.push_str("### 6.2 Service Accounts\n\n");
            output.push_str(&accounts.to_markdown());
            output.push('\n');
        }
    }

    fn terraform_environment(&self, output: &mut String) {
        let model = &self.input.model;
        output.push_str("## 7. Terraform Environment\n\n");

        output.push_str("### 7.1 Terraform Variables\n\n");
        let mut variables = Table::new(&["Name", "Description", "Default Value"]);
        for variable in &model.variables {
            variables.row(vec![variable.name.clone(), variable.description.clone(), variable.default.clone()]);
        }
        push_table(output, &variables, "No variables are declared.");

        output.push_str("### 7.2 Modules\n\n");
        let mut modules = Table::new(&["Name", "Source"]);
        for module in &model.modules {
            modules.row(vec![module.name.clone(), module.source.clone()]);
        }
        push_table(output, &modules, "No modules are used.");
    }

    fn appendix(&self, output: &mut String) {
        output.push_str("## Appendix\n\n");
        output.push_str("### A. Raw Resource List\n\n");
        for bucket in self.input.model.non_empty() {
            output.push_str(&format!("- {}:\n", title_case(&bucket.category)));
            for resource in &bucket.resources {
                output.push_str(&format!("  - `{}.{}`\n", resource.declared_type, resource.name));
            }
        }
        output.push('\n');
    }
}

fn push_table(output: &mut String, table: &Table, empty_text: &str) {
    if table.is_empty() {
        output.push_str(&format!("{}\n\n", empty_text));
    } else {
        output.push_str(&table.to_markdown());
        output.push('\n');
    }
}

/// Paragraph pointing at a rendered diagram.
fn diagram_reference(label: &str, artifact: &DiagramArtifact, base: Option<&Path>) -> String {
    if !artifact.rendered {
        return "[Diagram file not found]\n\n".to_string();
    }
    let target = base
        .and_then(|b| artifact.path.strip_prefix(b).ok())
        .unwrap_or(&artifact.path);
    let link = target.display().to_string().replace('\\', "/");

    let mut text = format!("{} diagram (Graphviz source): [{}]({})\n\n", label, escape(&link), link.replace(' ', "%20"));
    if artifact.placeholder {
        text.push_str("_The diagram could not be generated for this configuration and shows a placeholder._\n\n");
    }
    text
}

/// First present attribute among `fields`, `"N/A"` when none is set.
fn first_attr(resource: &ClassifiedResource, fields: &[&str]) -> String {
    fields
        .iter()
        .find(|f| resource.attr(f).map_or(false, |v| !v.is_null()))
        .map(|f| resource.display_attr(f))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Last path segment of a firewall rule's network reference.
fn network_name(rule: &ClassifiedResource) -> String {
    let network = rule.display_attr("network");
    network.rsplit('/').next().unwrap_or(network.as_str()).to_string()
}

/// `protocol: ports` for every allow block, or `All` when there are none.
fn allow_summary(rule: &ClassifiedResource) -> String {
    let blocks = match rule.config.get("allow") {
        Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
        Some(other) => vec![other],
        None => Vec::new(),
    };

    let parts: Vec<String> = blocks
        .into_iter()
        .filter_map(|block| unwrap_list(block).as_object())
        .map(|block| {
            let protocol = block
                .get("protocol")
                .map(unwrap_list)
                .and_then(Value::as_str)
                .unwrap_or("N/A");
            let ports: Vec<String> = match block.get("ports") {
                Some(Value::Array(ports)) => ports.iter().map(value_text).collect(),
                Some(port) => vec![value_text(port)],
                None => Vec::new(),
            };
            format!("{}: {}", protocol, ports.join(", "))
        })
        .collect();

    if parts.is_empty() {
        "All".to_string()
    } else {
        parts.join("; ")
    }
}

fn unwrap_list(mut value: &Value) -> &Value {
    while let Value::Array(items) = value {
        match items.first() {
            Some(first) => value = first,
            None => break,
        }
    }
    value
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `route_tables` becomes `Route Tables`.
pub fn title_case(category: &str) -> String {
    category
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
