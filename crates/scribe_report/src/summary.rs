//! Executive summary wording.

use scribe_iac::{Concern, SummaryCounts};

/// Phrase describing `count` resources of a concern.
pub fn phrase(concern: Concern, count: usize) -> String {
    match concern {
        Concern::NetworkFoundation => format!("a virtual network foundation with {} VPC/VNet(s)", count),
        Concern::Compute => format!("{} compute instance(s)", count),
        Concern::Containers => format!("containerized workloads on {} cluster(s)", count),
        Concern::Serverless => format!("{} serverless function(s)", count),
        Concern::Database => format!("{} managed database instance(s)", count),
        Concern::Storage => format!("object storage using {} bucket/account(s)", count),
        Concern::LoadBalancing => format!("load balancing across {} balancer(s)", count),
    }
}

/// Join phrases as an English list: `a`, `a and b`, `a, b, and c`.
pub fn join_phrases(phrases: &[String]) -> String {
    match phrases {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// The executive summary paragraph.
pub fn executive_summary(provider_name: &str, counts: &SummaryCounts) -> String {
    let phrases: Vec<String> = counts.non_zero().map(|(c, n)| phrase(c, n)).collect();

    if phrases.is_empty() {
        format!(
            "This document outlines the infrastructure for the {} environment. \
             No primary architectural components were detected in the Terraform configuration, \
             which may indicate a focus on other resource types such as IAM, security policies, \
             or organizational roles.",
            provider_name
        )
    } else {
        format!(
            "This document outlines the infrastructure for the {} environment as defined by Terraform. \
             The architecture's key components include {}.",
            provider_name,
            join_phrases(&phrases)
        )
    }
}
