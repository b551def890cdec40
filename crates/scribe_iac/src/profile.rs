//! Per-provider configuration records.
//!
//! Everything that differs between providers (category names, cluster
//! layout, edge conventions, reference fields) lives here as static data.
//! The topology resolver and both diagram builders read these records and
//! carry no provider-specific branches of their own.

use serde::Serialize;

use crate::classifier::ClassifiedModel;
use crate::provider::CloudProvider;

/// How a reference string is compared with a candidate parent's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Parent name appears anywhere in the reference.
    Contains,
    /// Reference ends with the parent name (full resource paths).
    EndsWith,
}

impl MatchRule {
    /// Case-sensitive comparison. Empty names never match.
    pub fn matches(&self, reference: &str, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match self {
            MatchRule::Contains => reference.contains(name),
            MatchRule::EndsWith => reference.ends_with(name),
        }
    }
}

/// A category whose resources point at a parent through a reference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkRule {
    pub category: &'static str,
    /// Path to the reference, through nested blocks if needed.
    pub field: &'static [&'static str],
    pub rule: MatchRule,
}

impl LinkRule {
    pub const fn new(category: &'static str, field: &'static [&'static str], rule: MatchRule) -> Self {
        Self { category, field, rule }
    }
}

/// What a network-scoped member represents in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Gateway,
    Security,
}

/// Network-scoped resources kept inside a network cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberRule {
    pub link: LinkRule,
    pub role: MemberRole,
    /// Keep at most this many per network; extras are ignored.
    pub limit: Option<usize>,
}

/// Containment conventions for the network diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    /// Category holding the networks (VPCs).
    pub network: &'static str,
    /// Subnets and their network reference.
    pub subnets: LinkRule,
    /// Compute categories and their subnet reference.
    pub compute: &'static [LinkRule],
    /// Gateways living inside a subnet (NAT).
    pub subnet_gateways: &'static [LinkRule],
    /// Route tables and their network reference.
    pub route_tables: Option<LinkRule>,
    pub internet_gateway: Option<&'static str>,
    /// Routers and their network reference.
    pub routers: Option<LinkRule>,
    /// Gateways attached to a router (Cloud NAT).
    pub router_gateways: &'static [LinkRule],
    pub members: &'static [MemberRule],
    /// Rules drawn outside every network, pointing at the first one.
    pub perimeter: Option<&'static str>,
    /// Whether subnets are grouped into public/private tiers.
    pub tiered: bool,
    /// Label used when no network is declared.
    pub empty_label: &'static str,
}

/// A cluster of the conceptual diagram, filled by category membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterDef {
    pub label: &'static str,
    pub categories: &'static [&'static str],
    pub children: &'static [ClusterDef],
}

/// A named group of categories acting as one edge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub role: &'static str,
    pub categories: &'static [&'static str],
}

impl Endpoint {
    pub fn is_present(&self, model: &ClassifiedModel) -> bool {
        model.count(self.categories) > 0
    }
}

/// Extra condition on an edge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    Always,
    /// Only draw the edge when this endpoint has no resources.
    UnlessPresent(Endpoint),
}

/// One architectural convention: "if source and target exist, connect them".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeRule {
    pub source: Endpoint,
    pub target: Endpoint,
    pub condition: RuleCondition,
}

impl EdgeRule {
    /// Whether the rule fires for `model`.
    pub fn applies(&self, model: &ClassifiedModel) -> bool {
        let condition_holds = match &self.condition {
            RuleCondition::Always => true,
            RuleCondition::UnlessPresent(blocker) => !blocker.is_present(model),
        };
        condition_holds && self.source.is_present(model) && self.target.is_present(model)
    }
}

/// Layout and edge conventions for the conceptual diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConceptualProfile {
    pub root: ClusterDef,
    pub rules: &'static [EdgeRule],
    /// Categories whose node label comes from an attribute instead of the name.
    pub label_fields: &'static [(&'static str, &'static str)],
}

/// Everything provider-specific the engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderProfile {
    pub provider: CloudProvider,
    pub conceptual: ConceptualProfile,
    pub network: Option<NetworkProfile>,
}

impl ProviderProfile {
    /// Profile for a provider key; `None` for unsupported providers.
    pub fn for_provider(provider: &str) -> Option<&'static ProviderProfile> {
        match CloudProvider::from_str(provider)? {
            CloudProvider::Aws => Some(&AWS_PROFILE),
            CloudProvider::Azure => Some(&AZURE_PROFILE),
            CloudProvider::Gcp => Some(&GCP_PROFILE),
        }
    }
}

const fn always(source: Endpoint, target: Endpoint) -> EdgeRule {
    EdgeRule {
        source,
        target,
        condition: RuleCondition::Always,
    }
}

const fn unless(source: Endpoint, target: Endpoint, blocker: Endpoint) -> EdgeRule {
    EdgeRule {
        source,
        target,
        condition: RuleCondition::UnlessPresent(blocker),
    }
}

const fn endpoint(role: &'static str, categories: &'static [&'static str]) -> Endpoint {
    Endpoint { role, categories }
}

const fn cluster(label: &'static str, categories: &'static [&'static str]) -> ClusterDef {
    ClusterDef {
        label,
        categories,
        children: &[],
    }
}

// AWS

const AWS_DNS: Endpoint = endpoint("dns", &["route53"]);
const AWS_CDN: Endpoint = endpoint("cdn", &["cloudfront"]);
const AWS_LB: Endpoint = endpoint("load_balancer", &["alb", "nlb"]);
const AWS_CERTS: Endpoint = endpoint("certificates", &["acm"]);
const AWS_OBJECT_STORAGE: Endpoint = endpoint("object_storage", &["s3"]);
const AWS_COMPUTE: Endpoint = endpoint("compute", &["instances", "eks"]);
const AWS_API: Endpoint = endpoint("api_gateway", &["apigateway"]);
const AWS_FUNCTIONS: Endpoint = endpoint("serverless", &["lambda"]);
const AWS_DATABASE: Endpoint = endpoint("database", &["rds", "dynamodb", "elasticache"]);
const AWS_STORAGE: Endpoint = endpoint("storage", &["s3", "efs"]);

const AWS_NETWORK: NetworkProfile = NetworkProfile {
    network: "vpcs",
    subnets: LinkRule::new("subnets", &["vpc_id"], MatchRule::Contains),
    compute: &[LinkRule::new("instances", &["subnet_id"], MatchRule::Contains)],
    subnet_gateways: &[LinkRule::new("nat_gateways", &["subnet_id"], MatchRule::Contains)],
    route_tables: Some(LinkRule::new("route_tables", &["vpc_id"], MatchRule::Contains)),
    internet_gateway: Some("internet_gateways"),
    routers: None,
    router_gateways: &[],
    members: &[MemberRule {
        link: LinkRule::new("nacl", &["vpc_id"], MatchRule::Contains),
        role: MemberRole::Security,
        limit: Some(1),
    }],
    perimeter: None,
    tiered: true,
    empty_label: "No VPC found.",
};

static AWS_PROFILE: ProviderProfile = ProviderProfile {
    provider: CloudProvider::Aws,
    conceptual: ConceptualProfile {
        root: ClusterDef {
            label: "AWS Account",
            categories: &[],
            children: &[ClusterDef {
                label: "Region",
                categories: &[],
                children: &[
                    cluster("Networking", &["alb", "nlb", "cloudfront", "route53"]),
                    cluster("Compute", &["instances", "eks"]),
                    cluster("Serverless", &["lambda", "apigateway"]),
                    cluster("Database", &["rds", "dynamodb", "elasticache"]),
                    cluster("Storage", &["s3", "efs"]),
                    cluster("Security", &["acm", "iam_roles"]),
                    cluster("Application Integration", &["sqs"]),
                ],
            }],
        },
        rules: &[
            always(AWS_DNS, AWS_CDN),
            unless(AWS_DNS, AWS_LB, AWS_CDN),
            always(AWS_CDN, AWS_LB),
            always(AWS_CDN, AWS_OBJECT_STORAGE),
            always(AWS_CERTS, AWS_CDN),
            always(AWS_CERTS, AWS_LB),
            always(AWS_LB, AWS_COMPUTE),
            always(AWS_API, AWS_FUNCTIONS),
            always(AWS_COMPUTE, AWS_DATABASE),
            always(AWS_COMPUTE, AWS_STORAGE),
            always(AWS_FUNCTIONS, AWS_DATABASE),
        ],
        label_fields: &[("s3", "bucket")],
    },
    network: Some(AWS_NETWORK),
};

// Azure

const AZURE_DNS: Endpoint = endpoint("dns", &["dns"]);
const AZURE_APP_GATEWAY: Endpoint = endpoint("app_gateway", &["app_gateway"]);
const AZURE_LB: Endpoint = endpoint("load_balancer", &["load_balancer"]);
const AZURE_COMPUTE: Endpoint = endpoint("compute", &["vms", "vmss", "aks"]);
const AZURE_FUNCTIONS: Endpoint = endpoint("serverless", &["functions"]);
const AZURE_DATABASE: Endpoint = endpoint("database", &["sql_db", "cosmosdb", "redis", "postgresql", "mysql"]);
const AZURE_STORAGE: Endpoint = endpoint("storage", &["storage_accounts"]);

static AZURE_PROFILE: ProviderProfile = ProviderProfile {
    provider: CloudProvider::Azure,
    conceptual: ConceptualProfile {
        root: ClusterDef {
            label: "Azure Subscription",
            categories: &[],
            children: &[
                cluster("Networking", &["dns", "app_gateway", "load_balancer", "firewall"]),
                cluster("Compute", &["vms", "vmss", "aks"]),
                cluster("Serverless", &["functions", "servicebus", "eventgrid"]),
                cluster("Database", &["sql_db", "cosmosdb", "redis", "postgresql", "mysql"]),
                cluster("Storage", &["storage_accounts"]),
                cluster("Security", &["key_vault", "managed_identity"]),
            ],
        },
        rules: &[
            always(AZURE_DNS, AZURE_APP_GATEWAY),
            always(AZURE_DNS, AZURE_LB),
            always(AZURE_APP_GATEWAY, AZURE_COMPUTE),
            always(AZURE_LB, AZURE_COMPUTE),
            always(AZURE_COMPUTE, AZURE_DATABASE),
            always(AZURE_COMPUTE, AZURE_STORAGE),
            always(AZURE_FUNCTIONS, AZURE_DATABASE),
        ],
        label_fields: &[],
    },
    network: None,
};

// Google Cloud

const GCP_DNS: Endpoint = endpoint("dns", &["dns"]);
const GCP_LB: Endpoint = endpoint("load_balancer", &["load_balancing"]);
const GCP_COMPUTE: Endpoint = endpoint("compute", &["instances", "gke", "functions"]);
const GCP_DATABASE: Endpoint = endpoint("database", &["sql", "firestore", "memorystore"]);
const GCP_STORAGE: Endpoint = endpoint("storage", &["storage_buckets"]);

const GCP_NETWORK: NetworkProfile = NetworkProfile {
    network: "networks",
    subnets: LinkRule::new("subnets", &["network"], MatchRule::EndsWith),
    compute: &[
        LinkRule::new("instances", &["network_interface", "subnetwork"], MatchRule::EndsWith),
        LinkRule::new("gke", &["subnetwork"], MatchRule::EndsWith),
    ],
    subnet_gateways: &[],
    route_tables: None,
    internet_gateway: None,
    routers: Some(LinkRule::new("routers", &["network"], MatchRule::EndsWith)),
    router_gateways: &[LinkRule::new("nat", &["router"], MatchRule::Contains)],
    members: &[MemberRule {
        link: LinkRule::new("vpn", &["network"], MatchRule::EndsWith),
        role: MemberRole::Gateway,
        limit: None,
    }],
    perimeter: Some("firewall"),
    tiered: false,
    empty_label: "No VPC/Network found.",
};

static GCP_PROFILE: ProviderProfile = ProviderProfile {
    provider: CloudProvider::Gcp,
    conceptual: ConceptualProfile {
        root: ClusterDef {
            label: "GCP Project",
            categories: &[],
            children: &[
                cluster("Networking", &["dns", "load_balancing"]),
                cluster("Compute", &["instances", "gke", "functions"]),
                cluster("Database", &["sql", "firestore", "memorystore"]),
                cluster("Storage", &["storage_buckets"]),
                cluster("IAM", &["iam_roles"]),
            ],
        },
        rules: &[
            always(GCP_DNS, GCP_LB),
            always(GCP_LB, GCP_COMPUTE),
            always(GCP_COMPUTE, GCP_DATABASE),
            always(GCP_COMPUTE, GCP_STORAGE),
        ],
        label_fields: &[],
    },
    network: Some(GCP_NETWORK),
};
