//! Resource classification into taxonomy categories.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::resource::{ClassifiedResource, Module, ParsedInput, Variable};
use crate::taxonomy::Taxonomy;

/// Resources of one category, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    pub resources: Vec<ClassifiedResource>,
}

/// Classified view of one input directory.
///
/// Every category the taxonomy defines for the provider is present, in
/// taxonomy order, even when no resource landed in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedModel {
    pub provider: String,
    #[serde(rename = "resources_by_category")]
    buckets: Vec<CategoryBucket>,
    pub variables: Vec<Variable>,
    pub modules: Vec<Module>,
}

impl ClassifiedModel {
    /// A model without categories, variables or modules.
    pub fn empty(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            buckets: Vec::new(),
            variables: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Resources of a category; empty for unknown categories.
    pub fn resources(&self, category: &str) -> &[ClassifiedResource] {
        self.bucket(category)
            .map(|b| b.resources.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.bucket(category).is_some()
    }

    /// Category names in taxonomy order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.category.as_str())
    }

    pub fn buckets(&self) -> &[CategoryBucket] {
        &self.buckets
    }

    /// Buckets holding at least one resource.
    pub fn non_empty(&self) -> impl Iterator<Item = &CategoryBucket> {
        self.buckets.iter().filter(|b| !b.resources.is_empty())
    }

    /// Resources of several categories, concatenated in the given order.
    pub fn group<'a>(&'a self, categories: &'a [&'a str]) -> impl Iterator<Item = (&'a str, &'a ClassifiedResource)> + 'a {
        categories
            .iter()
            .flat_map(move |category| self.resources(category).iter().map(move |r| (*category, r)))
    }

    /// Number of resources across several categories.
    pub fn count(&self, categories: &[&str]) -> usize {
        categories.iter().map(|c| self.resources(c).len()).sum()
    }

    pub fn total_resources(&self) -> usize {
        self.buckets.iter().map(|b| b.resources.len()).sum()
    }

    fn bucket(&self, category: &str) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.category == category)
    }
}

/// Classifies raw resources using a taxonomy.
pub struct Classifier<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> Classifier<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Classify the loader output for `provider`.
    ///
    /// Types missing from the taxonomy are dropped. An unsupported provider
    /// yields an empty model.
    pub fn classify(&self, input: ParsedInput, provider: &str) -> ClassifiedModel {
        let Some(provider_taxonomy) = self.taxonomy.for_provider(provider) else {
            warn!("No taxonomy for provider '{}', nothing will be classified", provider);
            return ClassifiedModel::empty(provider);
        };

        let lookup = provider_taxonomy.reverse_lookup();
        let mut buckets: Vec<CategoryBucket> = provider_taxonomy
            .category_names()
            .map(|name| CategoryBucket {
                category: name.to_string(),
                resources: Vec::new(),
            })
            .collect();

        let total = input.resources.len();
        let mut dropped = 0usize;

        for resource in input.resources {
            let Some(category) = lookup.get(resource.declared_type.as_str()) else {
                debug!("Skipping unclassified resource {}.{}", resource.declared_type, resource.name);
                dropped += 1;
                continue;
            };

            match buckets.iter_mut().find(|b| b.category == *category) {
                Some(bucket) => bucket.resources.push(resource),
                None => dropped += 1,
            }
        }

        info!(
            "Classified {} of {} resources into {} categories",
            total - dropped,
            total,
            buckets.len()
        );

        ClassifiedModel {
            provider: provider_taxonomy.provider.clone(),
            buckets,
            variables: input.variables,
            modules: input.modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::RawResource;

    fn input(resources: Vec<RawResource>) -> ParsedInput {
        ParsedInput::new(resources)
    }

    #[test]
    fn test_every_category_is_present() {
        let taxonomy = Taxonomy::builtin();
        let model = Classifier::new(&taxonomy).classify(input(Vec::new()), "aws");

        for name in taxonomy.for_provider("aws").unwrap().category_names() {
            assert!(model.has_category(name), "missing category {}", name);
            assert!(model.resources(name).is_empty());
        }
    }

    #[test]
    fn test_aliases_collapse_in_input_order() {
        let taxonomy = Taxonomy::builtin();
        let model = Classifier::new(&taxonomy).classify(
            input(vec![
                RawResource::new("aws_alb", "second"),
                RawResource::new("aws_instance", "web"),
                RawResource::new("aws_lb", "first"),
            ]),
            "aws",
        );

        let names: Vec<_> = model.resources("alb").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(model.resources("instances").len(), 1);
    }

    #[test]
    fn test_unknown_types_are_dropped() {
        let taxonomy = Taxonomy::builtin();
        let model = Classifier::new(&taxonomy).classify(
            input(vec![RawResource::new("aws_made_up_service", "x")]),
            "aws",
        );

        assert_eq!(model.total_resources(), 0);
        assert!(model.buckets().iter().all(|b| b.resources.iter().all(|r| r.name != "x")));
    }

    #[test]
    fn test_unknown_category_lookup_is_empty() {
        let taxonomy = Taxonomy::builtin();
        let model = Classifier::new(&taxonomy).classify(input(Vec::new()), "google");
        assert!(model.resources("vpcs").is_empty());
        assert!(!model.has_category("vpcs"));
    }
}
