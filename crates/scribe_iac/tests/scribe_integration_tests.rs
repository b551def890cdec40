//! Integration tests for classification, topology and diagram synthesis.

use std::fs;

use scribe_iac::network::{PRIVATE_SUBNETS, PUBLIC_SUBNETS};
use scribe_iac::{
    build_conceptual, build_network, find_provider, load_directory, render_artifact, resolve_topology,
    CloudProvider, ClassifiedModel, Classifier, DotRenderer, Module, ParsedInput, RawResource, SummaryCounts, Taxonomy,
    Variable,
};
use serde_json::json;
use tempfile::tempdir;

fn classify(resources: Vec<RawResource>, provider: &str) -> ClassifiedModel {
    let taxonomy = Taxonomy::builtin();
    Classifier::new(&taxonomy).classify(ParsedInput::new(resources), provider)
}

fn app_vpc() -> Vec<RawResource> {
    vec![
        RawResource::new("aws_vpc", "app-vpc"),
        RawResource::new("aws_subnet", "app-vpc-public-1").with_attr("vpc_id", "${aws_vpc.app-vpc.id}"),
        RawResource::new("aws_instance", "web").with_attr("subnet_id", "${aws_subnet.app-vpc-public-1.id}"),
        RawResource::new("aws_internet_gateway", "igw").with_attr("vpc_id", "${aws_vpc.app-vpc.id}"),
    ]
}

#[test]
fn test_end_to_end_public_subnet() {
    let model = classify(app_vpc(), "aws");
    let topology = resolve_topology(&model, "aws");
    let diagram = build_network(&model, &topology, "aws");

    assert!(!diagram.is_placeholder());
    assert_eq!(diagram.title, "Networking and Security (AWS)");
    assert_eq!(diagram.root.clusters.len(), 1);
    assert_eq!(diagram.root.clusters[0].label, "VPC: app-vpc");

    let public = diagram.find_cluster(PUBLIC_SUBNETS).expect("public tier");
    assert_eq!(public.clusters.len(), 1);
    assert_eq!(public.clusters[0].nodes[0].label, "web");
    assert!(diagram.find_cluster(PRIVATE_SUBNETS).is_none());

    let igw = diagram.root.nodes.iter().find(|n| n.category == "internet_gateways");
    assert_eq!(igw.map(|n| n.label.as_str()), Some("igw"));
}

#[test]
fn test_classification_is_idempotent() {
    let resources = vec![
        RawResource::new("aws_instance", "a"),
        RawResource::new("aws_unknown_thing", "x"),
        RawResource::new("aws_instance", "b"),
        RawResource::new("aws_s3_bucket", "c"),
    ];
    let first = classify(resources.clone(), "aws");
    let second = classify(resources, "aws");

    assert_eq!(first, second);
    let names: Vec<_> = first.resources("instances").iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(first.total_resources(), 3);
}

#[test]
fn test_unsupported_provider() {
    let mut input = ParsedInput::new(vec![RawResource::new("ibm_is_vpc", "main")]);
    input.variables.push(Variable {
        name: "region".to_string(),
        description: "N/A".to_string(),
        default: "us-south".to_string(),
    });
    input.modules.push(Module {
        name: "vpc".to_string(),
        source: "terraform-ibm-modules/vpc/ibm".to_string(),
    });

    let taxonomy = Taxonomy::builtin();
    let model = Classifier::new(&taxonomy).classify(input, "ibm");
    assert_eq!(model.categories().count(), 0);
    assert_eq!(model.total_resources(), 0);
    assert!(model.variables.is_empty());
    assert!(model.modules.is_empty());

    let topology = resolve_topology(&model, "ibm");
    assert!(build_conceptual(&model, "ibm").is_placeholder());
    assert!(build_network(&model, &topology, "ibm").is_placeholder());
    assert!(SummaryCounts::from_model(&model).is_empty());
}

#[test]
fn test_directory_to_rendered_diagrams() {
    let dir = tempdir().unwrap();
    let infra = dir.path().join("infra");
    fs::create_dir(&infra).unwrap();
    fs::write(infra.join("providers.tf"), "provider \"aws\" {\n  region = \"eu-west-1\"\n}\n").unwrap();
    fs::write(
        infra.join("main.tf.json"),
        json!({
            "resource": {
                "aws_vpc": { "main": { "cidr_block": "10.0.0.0/16" } },
                "aws_subnet": {
                    "private-a": { "vpc_id": "${aws_vpc.main.id}" }
                },
                "aws_instance": {
                    "app": { "subnet_id": "${aws_subnet.private-a.id}", "instance_type": "t3.micro" }
                },
                "aws_db_instance": { "db": { "engine": "postgres" } }
            }
        })
        .to_string(),
    )
    .unwrap();

    let provider = find_provider(&infra).unwrap();
    assert_eq!(provider, CloudProvider::Aws);

    let key = provider.provider_name();
    let taxonomy = Taxonomy::builtin();
    let model = Classifier::new(&taxonomy).classify(load_directory(&infra).unwrap(), key);
    let topology = resolve_topology(&model, key);

    let conceptual = build_conceptual(&model, key);
    assert_eq!(conceptual.edges.len(), 1);
    assert_eq!(conceptual.edges[0].source, "compute");
    assert_eq!(conceptual.edges[0].target, "database");

    let renderer = DotRenderer::new(dir.path().join("docs"));
    let artifact = render_artifact(&renderer, &build_network(&model, &topology, key), "network_architecture");
    assert!(artifact.rendered);

    let dot = fs::read_to_string(&artifact.path).unwrap();
    assert!(dot.contains("label=\"Private Subnets\";"));
    assert!(dot.contains("label=\"Subnet: private-a\";"));
    assert!(!dot.contains("Public Subnets"));
}

#[test]
fn test_first_declared_network_wins() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("main.tf.json"),
        r#"{
  "resource": {
    "aws_vpc": { "web-prod": {}, "web": {} },
    "aws_subnet": { "public-1": { "vpc_id": "${aws_vpc.web-prod.id}" } }
  }
}"#,
    )
    .unwrap();

    let taxonomy = Taxonomy::builtin();
    let model = Classifier::new(&taxonomy).classify(load_directory(dir.path()).unwrap(), "aws");
    let topology = resolve_topology(&model, "aws");
    let diagram = build_network(&model, &topology, "aws");

    let owner = diagram.find_cluster("VPC: web-prod").expect("web-prod cluster");
    assert!(owner.find("Subnet: public-1").is_some());
    let other = diagram.find_cluster("VPC: web").expect("web cluster");
    assert!(other.find("Subnet: public-1").is_none());
}
