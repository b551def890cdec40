//! # scribe_iac
//!
//! Terraform resource classification, network topology inference and
//! architecture diagram synthesis for tfscribe.
//!
//! ## Features
//!
//! - Provider-scoped taxonomy of Terraform resource types (AWS, Azure, GCP)
//! - Loading of `*.tf.json` configuration and pre-parsed input bundles
//! - Containment inference (network, subnet, compute, gateways)
//! - Conceptual and networking diagram models with a Graphviz DOT renderer
//!
//! ## Example
//!
//! ```rust,no_run
//! use scribe_iac::{build_conceptual, build_network, load_directory, resolve_topology};
//! use scribe_iac::{Classifier, DotRenderer, DiagramRenderer, Taxonomy};
//! use std::path::Path;
//!
//! let taxonomy = Taxonomy::builtin();
//! let input = load_directory(Path::new("./infra")).unwrap();
//! let model = Classifier::new(&taxonomy).classify(input, "aws");
//!
//! let topology = resolve_topology(&model, "aws");
//! let renderer = DotRenderer::new("./docs");
//! renderer.render(&build_conceptual(&model, "aws"), "conceptual_architecture").unwrap();
//! renderer.render(&build_network(&model, &topology, "aws"), "network_architecture").unwrap();
//! ```

pub mod classifier;
pub mod conceptual;
pub mod diagram;
pub mod error;
pub mod input;
pub mod network;
pub mod profile;
pub mod provider;
pub mod render;
pub mod resource;
pub mod summary;
pub mod taxonomy;
pub mod topology;

pub use classifier::{CategoryBucket, ClassifiedModel, Classifier};
pub use conceptual::build_conceptual;
pub use diagram::{Cluster, DiagramEdge, DiagramModel, DiagramNode};
pub use error::{IacError, IacResult};
pub use input::{find_provider, load_directory};
pub use network::build_network;
pub use profile::ProviderProfile;
pub use provider::{display_name, CloudProvider};
pub use render::{render_artifact, DiagramArtifact, DiagramRenderer, DotRenderer};
pub use resource::{ClassifiedResource, Module, ParsedInput, RawResource, Variable};
pub use summary::{Concern, SummaryCounts};
pub use taxonomy::{Taxonomy, TaxonomyOverlay};
pub use topology::{resolve_topology, NetworkScope, Tier, TopologyForest, TopologyNode};
