//! CLI command definitions.
//!
//! Every subcommand takes a Terraform directory; `document` runs the whole
//! pipeline, the others stop after classification or diagram rendering.

use clap::{Parser, Subcommand};

pub mod classify;
pub mod diagram;
pub mod document;

/// tfscribe - Solution design documents from Terraform
#[derive(Parser)]
#[command(name = "tfscribe")]
#[command(version, about = "tfscribe - Solution design documents from Terraform")]
#[command(long_about = r#"
tfscribe classifies the resources of a Terraform configuration, infers the
network topology and writes architecture diagrams plus a Markdown solution
design document.

COMMANDS:
  document  → Diagrams and the solution design document
  classify  → Print the classified resource model
  diagram   → Conceptual and networking diagrams only

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Provider not detected
  4 - Input error
  5 - Report error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate diagrams and the solution design document
    Document(document::DocumentArgs),

    /// Print resources grouped by category
    Classify(classify::ClassifyArgs),

    /// Generate the conceptual and networking diagrams
    Diagram(diagram::DiagramArgs),
}
