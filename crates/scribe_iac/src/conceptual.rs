//! Conceptual architecture diagram.
//!
//! Resources are grouped by category membership into a fixed cluster tree,
//! then the provider's edge rules are applied in order. Each rule connects
//! the first source node to every target node and fires independently of
//! the others.

use std::collections::HashMap;

use tracing::debug;

use crate::classifier::ClassifiedModel;
use crate::diagram::{self, Cluster, DiagramEdge, DiagramModel};
use crate::error::IacResult;
use crate::profile::{ClusterDef, ConceptualProfile, EdgeRule, ProviderProfile};

const ATTRIBUTES: &[(&str, &str)] = &[("pad", "0.5"), ("margin", "0.5"), ("nodesep", "1.0"), ("ranksep", "1.5")];

/// Diagram title for a provider key.
pub fn conceptual_title(provider: &str) -> String {
    format!("Conceptual Architecture ({})", provider.to_uppercase())
}

/// Build the conceptual diagram. Never fails; problems become placeholders.
pub fn build_conceptual(model: &ClassifiedModel, provider: &str) -> DiagramModel {
    let title = conceptual_title(provider);
    match ProviderProfile::for_provider(provider) {
        Some(profile) => build_with(model, &profile.conceptual, &title),
        None => {
            debug!("No conceptual profile for provider '{}'", provider);
            DiagramModel::placeholder(title, diagram::unsupported_label(provider))
        }
    }
}

/// Build a conceptual diagram from an explicit profile.
pub fn build_with(model: &ClassifiedModel, profile: &ConceptualProfile, title: &str) -> DiagramModel {
    diagram::finish(title, compose(model, profile, title))
}

fn compose(model: &ClassifiedModel, profile: &ConceptualProfile, title: &str) -> IacResult<DiagramModel> {
    let mut diagram = DiagramModel::new(title).with_attributes(ATTRIBUTES);
    let mut placed: HashMap<&str, Vec<String>> = HashMap::new();

    let root = fill_cluster(&mut diagram, &profile.root, model, profile, &mut placed);
    diagram.root.clusters.push(root);

    for rule in profile.rules {
        if let Some(edge) = rule_edge(rule, model, &placed) {
            diagram.add_edge(edge);
        }
    }

    debug!("Conceptual diagram has {} edges", diagram.edges.len());
    Ok(diagram)
}

fn fill_cluster<'p>(
    diagram: &mut DiagramModel,
    def: &'p ClusterDef,
    model: &ClassifiedModel,
    profile: &'p ConceptualProfile,
    placed: &mut HashMap<&'p str, Vec<String>>,
) -> Cluster {
    let mut cluster = Cluster::new(def.label);

    for category in def.categories {
        let label_field = profile
            .label_fields
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, field)| *field);

        for resource in model.resources(category) {
            let label = label_field
                .and_then(|field| resource.attr_str(field))
                .unwrap_or(resource.name.as_str());
            let node = diagram.node(category, label);
            placed.entry(*category).or_default().push(node.id.clone());
            cluster.nodes.push(node);
        }
    }

    for child in def.children {
        let child_cluster = fill_cluster(diagram, child, model, profile, placed);
        cluster.clusters.push(child_cluster);
    }

    cluster
}

/// Edge for a rule, if it fires and its endpoints were placed in the diagram.
fn rule_edge(rule: &EdgeRule, model: &ClassifiedModel, placed: &HashMap<&str, Vec<String>>) -> Option<DiagramEdge> {
    if !rule.applies(model) {
        return None;
    }

    let from = rule
        .source
        .categories
        .iter()
        .filter_map(|c| placed.get(c))
        .flatten()
        .next()?
        .clone();

    let to: Vec<String> = rule
        .target
        .categories
        .iter()
        .filter_map(|c| placed.get(c))
        .flatten()
        .cloned()
        .collect();

    Some(DiagramEdge::new(rule.source.role, rule.target.role, from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::resource::{ParsedInput, RawResource};
    use crate::taxonomy::Taxonomy;

    fn classify(resources: Vec<RawResource>, provider: &str) -> ClassifiedModel {
        let taxonomy = Taxonomy::builtin();
        Classifier::new(&taxonomy).classify(ParsedInput::new(resources), provider)
    }

    fn roles(diagram: &DiagramModel) -> Vec<(String, String)> {
        diagram
            .edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }

    #[test]
    fn test_cluster_hierarchy_is_fixed() {
        let diagram = build_conceptual(&classify(Vec::new(), "aws"), "aws");

        assert_eq!(diagram.title, "Conceptual Architecture (AWS)");
        let region = diagram.find_cluster("Region").unwrap();
        let labels: Vec<_> = region.clusters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Networking", "Compute", "Serverless", "Database", "Storage", "Security", "Application Integration"]
        );
        assert!(diagram.edges.is_empty());
    }

    #[test]
    fn test_s3_label_uses_bucket_name() {
        let diagram = build_conceptual(
            &classify(
                vec![
                    RawResource::new("aws_s3_bucket", "logs").with_attr("bucket", "acme-logs"),
                    RawResource::new("aws_s3_bucket", "assets"),
                ],
                "aws",
            ),
            "aws",
        );
        let storage = diagram.find_cluster("Storage").unwrap();
        let labels: Vec<_> = storage.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["acme-logs", "assets"]);
    }

    #[test]
    fn test_dns_falls_back_to_load_balancer_without_cdn() {
        let diagram = build_conceptual(
            &classify(
                vec![
                    RawResource::new("aws_route53_zone", "zone"),
                    RawResource::new("aws_lb", "web"),
                    RawResource::new("aws_instance", "app"),
                ],
                "aws",
            ),
            "aws",
        );

        assert_eq!(
            roles(&diagram),
            vec![
                ("dns".to_string(), "load_balancer".to_string()),
                ("load_balancer".to_string(), "compute".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_category_skips_only_its_edges() {
        let diagram = build_conceptual(
            &classify(
                vec![
                    RawResource::new("aws_cloudfront_distribution", "cdn"),
                    RawResource::new("aws_s3_bucket", "site"),
                    RawResource::new("aws_api_gateway_rest_api", "api"),
                    RawResource::new("aws_lambda_function", "handler"),
                ],
                "aws",
            ),
            "aws",
        );

        assert_eq!(
            roles(&diagram),
            vec![
                ("cdn".to_string(), "object_storage".to_string()),
                ("api_gateway".to_string(), "serverless".to_string()),
            ]
        );
    }

    #[test]
    fn test_adding_database_adds_exactly_one_edge() {
        let mut resources = vec![
            RawResource::new("aws_lb", "web"),
            RawResource::new("aws_instance", "app-1"),
            RawResource::new("aws_instance", "app-2"),
            RawResource::new("aws_s3_bucket", "data"),
        ];
        let before = build_conceptual(&classify(resources.clone(), "aws"), "aws");

        resources.push(RawResource::new("aws_db_instance", "main"));
        let after = build_conceptual(&classify(resources, "aws"), "aws");

        let before_roles = roles(&before);
        let after_roles = roles(&after);
        assert_eq!(after_roles.len(), before_roles.len() + 1);
        for role in &before_roles {
            assert_eq!(after_roles.iter().filter(|r| *r == role).count(), 1);
        }
        let new_edge = after.edges.iter().find(|e| e.target == "database").unwrap();
        assert_eq!(new_edge.source, "compute");
        assert_eq!(new_edge.to.len(), 1);
    }

    #[test]
    fn test_azure_subscription_edges() {
        let diagram = build_conceptual(
            &classify(
                vec![
                    RawResource::new("azurerm_dns_zone", "zone"),
                    RawResource::new("azurerm_application_gateway", "agw"),
                    RawResource::new("azurerm_linux_virtual_machine", "app"),
                    RawResource::new("azurerm_mssql_database", "db"),
                ],
                "azurerm",
            ),
            "azurerm",
        );

        assert!(!diagram.is_placeholder());
        assert!(diagram.find_cluster("Azure Subscription").is_some());
        assert_eq!(
            roles(&diagram),
            vec![
                ("dns".to_string(), "app_gateway".to_string()),
                ("app_gateway".to_string(), "compute".to_string()),
                ("compute".to_string(), "database".to_string()),
            ]
        );
    }

    #[test]
    fn test_edge_connects_first_source_to_all_targets() {
        let diagram = build_conceptual(
            &classify(
                vec![
                    RawResource::new("google_compute_forwarding_rule", "lb"),
                    RawResource::new("google_compute_instance", "a"),
                    RawResource::new("google_container_cluster", "k8s"),
                ],
                "google",
            ),
            "google",
        );

        let edge = &diagram.edges[0];
        assert_eq!(edge.source, "load_balancer");
        assert_eq!(edge.to.len(), 2);
    }

    #[test]
    fn test_unsupported_provider_is_placeholder() {
        let diagram = build_conceptual(&classify(Vec::new(), "ibm"), "ibm");
        assert!(diagram.is_placeholder());
        assert_eq!(diagram.nodes()[0].label, "Diagrams for IBM not implemented.");
    }

    static BROKEN: ConceptualProfile = ConceptualProfile {
        root: ClusterDef {
            label: "Broken",
            categories: &[],
            children: &[],
        },
        rules: &[],
        label_fields: &[],
    };

    #[test]
    fn test_invalid_composition_degrades_to_placeholder() {
        let model = classify(vec![RawResource::new("aws_instance", "a")], "aws");
        let mut composed = compose(&model, &BROKEN, "t").unwrap();
        composed.edges.push(DiagramEdge::new("x", "y", "missing", vec!["gone".to_string()]));

        let finished = diagram::finish("t", Ok(composed));
        assert!(finished.is_placeholder());
        assert!(finished.nodes()[0].label.contains("unknown node"));
    }
}
