//! Network topology inference.
//!
//! Terraform references are free-form strings (`${aws_vpc.main.id}`,
//! `projects/p/global/networks/main`), so containment is reconstructed by
//! matching a parent's declared name against the child's reference field.
//! When several parents match, the first one in category order wins.
//! Resources whose reference is missing, malformed or matches nothing are
//! kept as unparented root nodes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::ClassifiedModel;
use crate::profile::{LinkRule, MemberRole, NetworkProfile, ProviderProfile};
use crate::resource::ClassifiedResource;

/// Public/private classification of a subnet-like resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Public,
    Private,
}

impl Tier {
    /// Name heuristic: `public` wins over `private`; anything else is untiered.
    pub fn classify(name: &str) -> Option<Tier> {
        let lower = name.to_lowercase();
        if lower.contains("public") {
            Some(Tier::Public)
        } else if lower.contains("private") {
            Some(Tier::Private)
        } else {
            None
        }
    }
}

/// Role of a node in the inferred hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Network,
    Subnet,
    Compute,
    Gateway,
    RouteTable,
    Router,
    Security,
}

impl From<MemberRole> for NodeKind {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Gateway => NodeKind::Gateway,
            MemberRole::Security => NodeKind::Security,
        }
    }
}

/// An inferred containment node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub kind: NodeKind,
    pub category: String,
    pub resource: ClassifiedResource,
    pub tier: Option<Tier>,
    pub children: Vec<TopologyNode>,
}

impl TopologyNode {
    pub fn new(kind: NodeKind, category: impl Into<String>, resource: ClassifiedResource) -> Self {
        let tier = match kind {
            NodeKind::Subnet | NodeKind::RouteTable => Tier::classify(&resource.name),
            _ => None,
        };
        Self {
            kind,
            category: category.into(),
            resource,
            tier,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.resource.name
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &TopologyNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }
}

/// The route tables paired with a network's public and private tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTablePair {
    pub public: Option<TopologyNode>,
    pub private: Option<TopologyNode>,
}

/// One network and everything resolved into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkScope {
    /// Network node; its children are the subnets.
    pub network: TopologyNode,
    pub route_tables: RouteTablePair,
    /// Routers, with their gateways as children.
    pub routers: Vec<TopologyNode>,
    /// Other network-scoped resources (VPN gateways, network ACLs).
    pub members: Vec<TopologyNode>,
}

impl NetworkScope {
    fn new(network: TopologyNode) -> Self {
        Self {
            network,
            route_tables: RouteTablePair::default(),
            routers: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.network.name()
    }

    pub fn subnets(&self) -> impl Iterator<Item = &TopologyNode> {
        self.network.children_of(NodeKind::Subnet)
    }

    /// Subnets of a tier, in declaration order.
    pub fn tier_subnets(&self, tier: Tier) -> impl Iterator<Item = &TopologyNode> {
        self.subnets().filter(move |s| s.tier == Some(tier))
    }

    pub fn untiered_subnets(&self) -> impl Iterator<Item = &TopologyNode> {
        self.subnets().filter(|s| s.tier.is_none())
    }

    /// The NAT-style gateway carrying egress traffic: the first gateway in a public subnet.
    pub fn egress_gateway(&self) -> Option<&TopologyNode> {
        self.tier_subnets(Tier::Public)
            .flat_map(|s| s.children_of(NodeKind::Gateway))
            .next()
    }
}

/// Result of topology inference for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyForest {
    pub networks: Vec<NetworkScope>,
    /// Resources whose parent could not be resolved.
    pub unparented: Vec<TopologyNode>,
    pub internet_gateway: Option<TopologyNode>,
    /// Perimeter rules drawn outside the networks (firewall rules).
    pub perimeter: Vec<TopologyNode>,
}

impl TopologyForest {
    /// No network was resolved; the network diagram shows a placeholder.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn network(&self, name: &str) -> Option<&NetworkScope> {
        self.networks.iter().find(|n| n.name() == name)
    }
}

/// Index of the first candidate whose name matches `resource`'s reference field.
fn first_match<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    resource: &ClassifiedResource,
    link: &LinkRule,
) -> Option<usize> {
    let reference = resource.lookup_str(link.field)?;
    candidates
        .into_iter()
        .position(|name| link.rule.matches(reference, name))
}

/// Reconstruct containment for the networking categories of `model`.
pub fn resolve_topology(model: &ClassifiedModel, provider: &str) -> TopologyForest {
    match ProviderProfile::for_provider(provider).and_then(|p| p.network.as_ref()) {
        Some(profile) => resolve_with(model, profile),
        None => {
            debug!("No network profile for provider '{}'", provider);
            TopologyForest::default()
        }
    }
}

/// Topology inference driven by an explicit network profile.
pub fn resolve_with(model: &ClassifiedModel, profile: &NetworkProfile) -> TopologyForest {
    let networks = model.resources(profile.network);
    if networks.is_empty() {
        debug!("Category '{}' is empty, no topology to resolve", profile.network);
        return TopologyForest::default();
    }

    let mut forest = TopologyForest {
        networks: networks
            .iter()
            .map(|n| NetworkScope::new(TopologyNode::new(NodeKind::Network, profile.network, n.clone())))
            .collect(),
        ..Default::default()
    };
    let network_names: Vec<&str> = networks.iter().map(|n| n.name.as_str()).collect();

    // Subnets first, so compute and gateways can find their parent.
    let subnet_resources = model.resources(profile.subnets.category);
    let subnet_names: Vec<&str> = subnet_resources.iter().map(|s| s.name.as_str()).collect();
    let mut subnets: Vec<TopologyNode> = subnet_resources
        .iter()
        .map(|s| TopologyNode::new(NodeKind::Subnet, profile.subnets.category, s.clone()))
        .collect();

    let subnet_children = profile
        .compute
        .iter()
        .map(|link| (link, NodeKind::Compute))
        .chain(profile.subnet_gateways.iter().map(|link| (link, NodeKind::Gateway)));

    for (link, kind) in subnet_children {
        for resource in model.resources(link.category) {
            let node = TopologyNode::new(kind, link.category, resource.clone());
            match first_match(subnet_names.iter().copied(), resource, link) {
                Some(index) => subnets[index].children.push(node),
                None => {
                    debug!("{} '{}' has no resolvable subnet", link.category, resource.name);
                    forest.unparented.push(node);
                }
            }
        }
    }

    for subnet in subnets {
        match first_match(network_names.iter().copied(), &subnet.resource, &profile.subnets) {
            Some(index) => forest.networks[index].network.children.push(subnet),
            None => {
                debug!("Subnet '{}' has no resolvable network", subnet.name());
                forest.unparented.push(subnet);
            }
        }
    }

    if let Some(link) = &profile.route_tables {
        for resource in model.resources(link.category) {
            let node = TopologyNode::new(NodeKind::RouteTable, link.category, resource.clone());
            let Some(index) = first_match(network_names.iter().copied(), resource, link) else {
                forest.unparented.push(node);
                continue;
            };

            // Only the first public and first private table count; extras are ignored.
            let pair = &mut forest.networks[index].route_tables;
            let tier = node.tier;
            match tier {
                Some(Tier::Public) if pair.public.is_none() => pair.public = Some(node),
                Some(Tier::Private) if pair.private.is_none() => pair.private = Some(node),
                _ => debug!("Ignoring extra route table '{}'", resource.name),
            }
        }
    }

    if let Some(link) = &profile.routers {
        let router_resources = model.resources(link.category);
        let router_names: Vec<&str> = router_resources.iter().map(|r| r.name.as_str()).collect();
        let mut routers: Vec<TopologyNode> = router_resources
            .iter()
            .map(|r| TopologyNode::new(NodeKind::Router, link.category, r.clone()))
            .collect();

        for gateway_link in profile.router_gateways {
            for resource in model.resources(gateway_link.category) {
                let node = TopologyNode::new(NodeKind::Gateway, gateway_link.category, resource.clone());
                match first_match(router_names.iter().copied(), resource, gateway_link) {
                    Some(index) => routers[index].children.push(node),
                    None => forest.unparented.push(node),
                }
            }
        }

        for router in routers {
            match first_match(network_names.iter().copied(), &router.resource, link) {
                Some(index) => forest.networks[index].routers.push(router),
                None => forest.unparented.push(router),
            }
        }
    }

    for member in profile.members {
        for resource in model.resources(member.link.category) {
            let node = TopologyNode::new(member.role.into(), member.link.category, resource.clone());
            let Some(index) = first_match(network_names.iter().copied(), resource, &member.link) else {
                forest.unparented.push(node);
                continue;
            };

            let scope = &mut forest.networks[index];
            let held = scope
                .members
                .iter()
                .filter(|m| m.category == member.link.category)
                .count();
            if member.limit.map_or(true, |limit| held < limit) {
                scope.members.push(node);
            }
        }
    }

    if let Some(category) = profile.internet_gateway {
        forest.internet_gateway = model
            .resources(category)
            .first()
            .map(|igw| TopologyNode::new(NodeKind::Gateway, category, igw.clone()));
    }

    if let Some(category) = profile.perimeter {
        forest.perimeter = model
            .resources(category)
            .iter()
            .map(|r| TopologyNode::new(NodeKind::Security, category, r.clone()))
            .collect();
    }

    debug!(
        "Resolved {} networks, {} unparented resources",
        forest.networks.len(),
        forest.unparented.len()
    );
    forest
}
