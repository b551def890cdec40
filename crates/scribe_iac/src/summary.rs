//! Headline resource counts used by the executive summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifiedModel;

/// A primary architectural concern, counted across provider naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    NetworkFoundation,
    Compute,
    Containers,
    Serverless,
    Database,
    Storage,
    LoadBalancing,
}

impl Concern {
    pub fn all() -> &'static [Concern] {
        &[
            Concern::NetworkFoundation,
            Concern::Compute,
            Concern::Containers,
            Concern::Serverless,
            Concern::Database,
            Concern::Storage,
            Concern::LoadBalancing,
        ]
    }

    /// Categories summed for this concern. Names from every provider are
    /// listed; categories a model lacks count as zero.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Concern::NetworkFoundation => &["vpcs", "vnets", "networks"],
            Concern::Compute => &["instances", "vms"],
            Concern::Containers => &["eks", "ecs", "aks", "gke"],
            Concern::Serverless => &["lambda", "functions"],
            Concern::Database => &["rds", "sql_db", "sql", "dynamodb", "cosmosdb"],
            Concern::Storage => &["s3", "storage_accounts", "storage_buckets"],
            Concern::LoadBalancing => &["alb", "nlb", "app_gateway", "load_balancer", "load_balancing"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Concern::NetworkFoundation => "network_foundation",
            Concern::Compute => "compute",
            Concern::Containers => "containers",
            Concern::Serverless => "serverless",
            Concern::Database => "database",
            Concern::Storage => "storage",
            Concern::LoadBalancing => "load_balancing",
        }
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Count per concern, in [`Concern::all`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    counts: Vec<(Concern, usize)>,
}

impl SummaryCounts {
    pub fn from_model(model: &ClassifiedModel) -> Self {
        Self {
            counts: Concern::all()
                .iter()
                .map(|concern| (*concern, model.count(concern.categories())))
                .collect(),
        }
    }

    pub fn get(&self, concern: Concern) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == concern)
            .map_or(0, |(_, n)| *n)
    }

    /// Concerns with at least one resource.
    pub fn non_zero(&self) -> impl Iterator<Item = (Concern, usize)> + '_ {
        self.counts.iter().copied().filter(|(_, n)| *n > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.non_zero().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::resource::{ParsedInput, RawResource};
    use crate::taxonomy::Taxonomy;

    fn counts(resources: Vec<RawResource>, provider: &str) -> SummaryCounts {
        let taxonomy = Taxonomy::builtin();
        let model = Classifier::new(&taxonomy).classify(ParsedInput::new(resources), provider);
        SummaryCounts::from_model(&model)
    }

    #[test]
    fn test_counts_sum_across_categories() {
        let summary = counts(
            vec![
                RawResource::new("aws_vpc", "main"),
                RawResource::new("aws_db_instance", "a"),
                RawResource::new("aws_dynamodb_table", "b"),
                RawResource::new("aws_lb", "web"),
            ],
            "aws",
        );

        assert_eq!(summary.get(Concern::NetworkFoundation), 1);
        assert_eq!(summary.get(Concern::Database), 2);
        assert_eq!(summary.get(Concern::Compute), 0);
        let concerns: Vec<_> = summary.non_zero().map(|(c, _)| c).collect();
        assert_eq!(
            concerns,
            vec![Concern::NetworkFoundation, Concern::Database, Concern::LoadBalancing]
        );
    }

    #[test]
    fn test_gcp_naming() {
        let summary = counts(
            vec![
                RawResource::new("google_compute_network", "vpc"),
                RawResource::new("google_container_cluster", "gke"),
                RawResource::new("google_storage_bucket", "data"),
            ],
            "google",
        );
        assert_eq!(summary.get(Concern::NetworkFoundation), 1);
        assert_eq!(summary.get(Concern::Containers), 1);
        assert_eq!(summary.get(Concern::Storage), 1);
    }

    #[test]
    fn test_empty_model_has_no_concerns() {
        assert!(counts(Vec::new(), "ibm").is_empty());
    }
}
