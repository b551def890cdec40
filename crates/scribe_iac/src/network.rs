//! Networking and security diagram.

use tracing::debug;

use crate::classifier::ClassifiedModel;
use crate::diagram::{self, Cluster, DiagramEdge, DiagramModel};
use crate::error::IacResult;
use crate::profile::{NetworkProfile, ProviderProfile};
use crate::topology::{NetworkScope, NodeKind, Tier, TopologyForest, TopologyNode};

const ATTRIBUTES: &[(&str, &str)] = &[("pad", "1.0"), ("margin", "1.0"), ("splines", "ortho")];

pub const PUBLIC_SUBNETS: &str = "Public Subnets";
pub const PRIVATE_SUBNETS: &str = "Private Subnets";

/// Diagram title for a provider key.
pub fn network_title(provider: &str) -> String {
    format!("Networking and Security ({})", provider.to_uppercase())
}

/// Label of the cluster drawn for a network.
pub fn network_cluster_label(name: &str) -> String {
    format!("VPC: {}", name)
}

/// Label of the cluster drawn for a subnet.
pub fn subnet_cluster_label(name: &str) -> String {
    format!("Subnet: {}", name)
}

/// Build the network diagram from a resolved topology. Never fails.
pub fn build_network(model: &ClassifiedModel, topology: &TopologyForest, provider: &str) -> DiagramModel {
    let title = network_title(provider);
    match ProviderProfile::for_provider(provider).and_then(|p| p.network.as_ref()) {
        Some(profile) => build_with(model, topology, profile, &title),
        None => {
            debug!("No network profile for provider '{}'", provider);
            DiagramModel::placeholder(title, diagram::unsupported_label(provider))
        }
    }
}

/// Build a network diagram from an explicit profile.
pub fn build_with(model: &ClassifiedModel, topology: &TopologyForest, profile: &NetworkProfile, title: &str) -> DiagramModel {
    diagram::finish(title, compose(model, topology, profile, title))
}

fn compose(model: &ClassifiedModel, topology: &TopologyForest, profile: &NetworkProfile, title: &str) -> IacResult<DiagramModel> {
    let mut diagram = DiagramModel::new(title).with_attributes(ATTRIBUTES);

    if model.resources(profile.network).is_empty() || topology.is_empty() {
        let node = diagram.node(profile.network, profile.empty_label);
        diagram.root.nodes.push(node);
        return Ok(diagram);
    }

    // The internet gateway sits outside every network.
    let igw = topology.internet_gateway.as_ref().map(|gateway| {
        let node = diagram.node(&gateway.category, gateway.name());
        let id = node.id.clone();
        diagram.root.nodes.push(node);
        (gateway.category.clone(), id)
    });

    for scope in &topology.networks {
        let (cluster, drawn) = network_cluster(&mut diagram, scope, profile);
        diagram.root.clusters.push(cluster);

        if let (Some((igw_category, igw_id)), Some((rt_category, rt_id))) = (&igw, &drawn.public_route_table) {
            diagram.add_edge(DiagramEdge::new(igw_category, rt_category, igw_id, vec![rt_id.clone()]));
        }
        if let (Some((rt_category, rt_id)), Some((nat_category, nat_id))) = (&drawn.private_route_table, &drawn.egress) {
            diagram.add_edge(DiagramEdge::new(rt_category, nat_category, rt_id, vec![nat_id.clone()]));
        }
        if let (Some((nat_category, nat_id)), Some((igw_category, igw_id))) = (&drawn.egress, &igw) {
            diagram.add_edge(DiagramEdge::new(nat_category, igw_category, nat_id, vec![igw_id.clone()]));
        }
        if let Some((router_category, router_id)) = &drawn.first_router {
            for (category, id) in &drawn.router_targets {
                diagram.add_edge(DiagramEdge::new(router_category, category, router_id, vec![id.clone()]));
            }
        }
    }

    if let (Some(first_rule), Some(first_network)) = (topology.perimeter.first(), topology.networks.first()) {
        let mut rule_ids = Vec::new();
        for rule in &topology.perimeter {
            let node = diagram.node(&rule.category, rule.name());
            rule_ids.push(node.id.clone());
            diagram.root.nodes.push(node);
        }
        let anchor = diagram.node(&first_network.network.category, first_network.name());
        let anchor_id = anchor.id.clone();
        diagram.root.nodes.push(anchor);
        diagram.add_edge(DiagramEdge::new(
            &first_rule.category,
            &first_network.network.category,
            &rule_ids[0],
            vec![anchor_id],
        ));
    }

    for node in &topology.unparented {
        place_unparented(&mut diagram, node);
    }

    debug!(
        "Network diagram has {} networks and {} edges",
        topology.networks.len(),
        diagram.edges.len()
    );
    Ok(diagram)
}

/// Ids of the nodes a network cluster contributed to structural edges.
#[derive(Default)]
struct DrawnNetwork {
    public_route_table: Option<(String, String)>,
    private_route_table: Option<(String, String)>,
    egress: Option<(String, String)>,
    first_router: Option<(String, String)>,
    router_targets: Vec<(String, String)>,
}

fn network_cluster(diagram: &mut DiagramModel, scope: &NetworkScope, profile: &NetworkProfile) -> (Cluster, DrawnNetwork) {
    let mut cluster = Cluster::new(network_cluster_label(scope.name()));
    let mut drawn = DrawnNetwork::default();

    if let Some(rt) = &scope.route_tables.public {
        drawn.public_route_table = Some(place_leaf(diagram, &mut cluster, rt));
    }
    if let Some(rt) = &scope.route_tables.private {
        drawn.private_route_table = Some(place_leaf(diagram, &mut cluster, rt));
    }

    for (index, router) in scope.routers.iter().enumerate() {
        let placed = place_leaf(diagram, &mut cluster, router);
        if index == 0 {
            drawn.first_router = Some(placed);
        }
        for gateway in &router.children {
            drawn.router_targets.push(place_leaf(diagram, &mut cluster, gateway));
        }
    }

    for member in &scope.members {
        let placed = place_leaf(diagram, &mut cluster, member);
        if member.kind == NodeKind::Gateway {
            drawn.router_targets.push(placed);
        }
    }

    let egress = scope.egress_gateway();

    if profile.tiered {
        for (tier, label, background) in [
            (Tier::Public, PUBLIC_SUBNETS, "lightblue"),
            (Tier::Private, PRIVATE_SUBNETS, "lightgrey"),
        ] {
            let mut tier_cluster = Cluster::new(label).with_background(background);
            for subnet in scope.tier_subnets(tier) {
                tier_cluster
                    .clusters
                    .push(subnet_cluster(diagram, subnet, egress, &mut drawn));
            }
            if !tier_cluster.clusters.is_empty() {
                cluster.clusters.push(tier_cluster);
            }
        }
        for subnet in scope.untiered_subnets() {
            cluster.clusters.push(subnet_cluster(diagram, subnet, egress, &mut drawn));
        }
    } else {
        for subnet in scope.subnets() {
            cluster.clusters.push(subnet_cluster(diagram, subnet, egress, &mut drawn));
        }
    }

    (cluster, drawn)
}

fn subnet_cluster(
    diagram: &mut DiagramModel,
    subnet: &TopologyNode,
    egress: Option<&TopologyNode>,
    drawn: &mut DrawnNetwork,
) -> Cluster {
    let mut cluster = Cluster::new(subnet_cluster_label(subnet.name()));
    for child in &subnet.children {
        let placed = place_leaf(diagram, &mut cluster, child);
        if egress.map_or(false, |e| std::ptr::eq(e, child)) {
            drawn.egress = Some(placed);
        }
    }
    cluster
}

/// Add a node for `node` to `cluster`, returning its category and id.
fn place_leaf(diagram: &mut DiagramModel, cluster: &mut Cluster, node: &TopologyNode) -> (String, String) {
    let drawn = diagram.node(&node.category, node.name());
    let placed = (node.category.clone(), drawn.id.clone());
    cluster.nodes.push(drawn);
    placed
}

/// Unparented resources go to the diagram root; subnets keep their children.
fn place_unparented(diagram: &mut DiagramModel, node: &TopologyNode) {
    if node.kind == NodeKind::Subnet || !node.children.is_empty() {
        let mut cluster = Cluster::new(match node.kind {
            NodeKind::Subnet => subnet_cluster_label(node.name()),
            _ => node.name().to_string(),
        });
        place_leaf(diagram, &mut cluster, node);
        for child in &node.children {
            place_leaf(diagram, &mut cluster, child);
        }
        diagram.root.clusters.push(cluster);
    } else {
        let drawn = diagram.node(&node.category, node.name());
        diagram.root.nodes.push(drawn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::resource::{ParsedInput, RawResource};
    use crate::taxonomy::Taxonomy;
    use crate::topology::resolve_topology;

    fn build(resources: Vec<RawResource>, provider: &str) -> DiagramModel {
        let taxonomy = Taxonomy::builtin();
        let model = Classifier::new(&taxonomy).classify(ParsedInput::new(resources), provider);
        let topology = resolve_topology(&model, provider);
        build_network(&model, &topology, provider)
    }

    fn edge_pairs(diagram: &DiagramModel) -> Vec<(&str, &str)> {
        diagram
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    fn aws_vpc_with_egress() -> Vec<RawResource> {
        vec![
            RawResource::new("aws_vpc", "main"),
            RawResource::new("aws_subnet", "public-a").with_attr("vpc_id", "${aws_vpc.main.id}"),
            RawResource::new("aws_subnet", "private-a").with_attr("vpc_id", "${aws_vpc.main.id}"),
            RawResource::new("aws_internet_gateway", "igw").with_attr("vpc_id", "${aws_vpc.main.id}"),
            RawResource::new("aws_nat_gateway", "nat").with_attr("subnet_id", "${aws_subnet.public-a.id}"),
            RawResource::new("aws_route_table", "public-rt").with_attr("vpc_id", "${aws_vpc.main.id}"),
            RawResource::new("aws_route_table", "private-rt").with_attr("vpc_id", "${aws_vpc.main.id}"),
            RawResource::new("aws_instance", "app").with_attr("subnet_id", "${aws_subnet.private-a.id}"),
        ]
    }

    #[test]
    fn test_structural_edges() {
        let diagram = build(aws_vpc_with_egress(), "aws");

        assert_eq!(
            edge_pairs(&diagram),
            vec![
                ("internet_gateways", "route_tables"),
                ("route_tables", "nat_gateways"),
                ("nat_gateways", "internet_gateways"),
            ]
        );
        let private = diagram.find_cluster(PRIVATE_SUBNETS).unwrap();
        assert_eq!(private.clusters[0].label, "Subnet: private-a");
        assert_eq!(private.clusters[0].nodes[0].label, "app");
    }

    #[test]
    fn test_missing_nat_omits_egress_edges() {
        let resources: Vec<_> = aws_vpc_with_egress()
            .into_iter()
            .filter(|r| r.declared_type != "aws_nat_gateway")
            .collect();
        let diagram = build(resources, "aws");

        assert_eq!(edge_pairs(&diagram), vec![("internet_gateways", "route_tables")]);
    }

    #[test]
    fn test_no_vpc_renders_explicit_placeholder_node() {
        let diagram = build(vec![RawResource::new("aws_instance", "lonely")], "aws");

        assert!(!diagram.is_placeholder());
        assert_eq!(diagram.nodes().len(), 1);
        assert_eq!(diagram.nodes()[0].label, "No VPC found.");
    }

    #[test]
    fn test_untiered_subnet_sits_directly_in_network() {
        let diagram = build(
            vec![
                RawResource::new("aws_vpc", "main"),
                RawResource::new("aws_subnet", "mgmt-a").with_attr("vpc_id", "${aws_vpc.main.id}"),
            ],
            "aws",
        );
        let network = diagram.find_cluster("VPC: main").unwrap();

        assert!(diagram.find_cluster(PUBLIC_SUBNETS).is_none());
        assert!(diagram.find_cluster(PRIVATE_SUBNETS).is_none());
        assert_eq!(network.clusters[0].label, "Subnet: mgmt-a");
    }

    #[test]
    fn test_unparented_compute_is_at_root() {
        let mut resources = aws_vpc_with_egress();
        resources.push(RawResource::new("aws_instance", "stray").with_attr("subnet_id", "subnet-0abc"));
        let diagram = build(resources, "aws");

        assert!(diagram.root.nodes.iter().any(|n| n.label == "stray"));
    }

    #[test]
    fn test_azure_network_is_unsupported_placeholder() {
        let diagram = build(vec![RawResource::new("azurerm_virtual_network", "vnet")], "azurerm");
        assert!(diagram.is_placeholder());
        assert_eq!(diagram.nodes()[0].label, "Diagrams for AZURERM not implemented.");
    }

    #[test]
    fn test_gcp_router_and_firewall_edges() {
        let diagram = build(
            vec![
                RawResource::new("google_compute_network", "main"),
                RawResource::new("google_compute_subnetwork", "app").with_attr("network", "networks/main"),
                RawResource::new("google_compute_router", "edge").with_attr("network", "networks/main"),
                RawResource::new("google_compute_router_nat", "egress").with_attr("router", "edge"),
                RawResource::new("google_compute_vpn_gateway", "vpn").with_attr("network", "networks/main"),
                RawResource::new("google_compute_firewall", "allow-ssh"),
            ],
            "google",
        );

        assert_eq!(
            edge_pairs(&diagram),
            vec![("routers", "nat"), ("routers", "vpn"), ("firewall", "networks")]
        );
        let network = diagram.find_cluster("VPC: main").unwrap();
        assert_eq!(network.clusters[0].label, "Subnet: app");
        assert!(diagram.find_cluster(PUBLIC_SUBNETS).is_none());
    }
}
