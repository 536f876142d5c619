/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! View providers: named projections of the raw collections into a graph,
//! each with its own parameters, filters and follow-up view.

use crate::config::ExplorerConfig;
use crate::error::LoadError;
use crate::filter::FilterDescriptor;
use crate::graph::{Edge, Node};
use crate::stats::RiskRange;
use crate::view_state::{ParamValue, Parameters};
use futures::future::BoxFuture;
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod diseases;
pub mod drugs;
pub mod genes;
pub mod patient_subgroups;
pub mod patients;
mod regulation;
pub mod repository;
pub mod source;
pub mod studies;

pub use repository::DataRepository;
pub use source::{Collection, DataSource, JsonDirSource, MemorySource};

/// Title shown for the view
pub const TITLE_PARAM: &str = "title";

/// Loaded graph of one view plus the ranges its defaults are derived from
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,

    /// Named value ranges (keyed by the attribute they summarize)
    pub ranges: BTreeMap<String, RiskRange>,
}

impl Dataset {
    /// Range of `name`, the empty sentinel when it was never computed
    pub fn range(&self, name: &str) -> RiskRange {
        self.ranges.get(name).copied().unwrap_or(RiskRange::EMPTY)
    }
}

/// Where a selection can lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextViewTransition {
    pub target_view: &'static str,
    pub label: &'static str,

    /// Node attribute forwarded as the next view's parameters
    pub id_attribute: &'static str,

    /// Smallest selection for which the transition is offered
    pub minimum_selection: usize,
}

/// A named projection of the data into a displayed graph
pub trait ViewProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch every collection the view needs and build its graph.
    /// Collections are fetched concurrently; nothing is returned partially.
    fn load_dataset(&self, params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>>;

    /// Parameters of a fresh activation (layout options and filter cutoffs)
    fn initial_parameters(&self, dataset: &Dataset) -> Parameters;

    fn filter_descriptors(&self, dataset: &Dataset) -> Vec<FilterDescriptor>;

    fn next_view_transition(&self) -> Option<NextViewTransition>;
}

/// Name -> provider table
#[derive(Default, Clone)]
pub struct ViewRegistry {
    providers: BTreeMap<&'static str, Arc<dyn ViewProvider>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in views over one shared repository
    pub fn standard(repository: Arc<DataRepository>, config: &ExplorerConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(diseases::DiseasesView::new(
            repository.clone(),
            config.disease_cutoff_percentile,
        )));
        registry.register(Arc::new(patient_subgroups::PatientSubgroupsView::new(
            repository.clone(),
            config.patient_subgroup_cutoff_percentile,
            config.min_cluster_size,
        )));
        registry.register(Arc::new(genes::GenesView::new(repository.clone())));
        registry.register(Arc::new(drugs::DrugsView::new(repository.clone())));
        registry.register(Arc::new(patients::PatientsView::new(repository.clone())));
        registry.register(Arc::new(studies::StudiesView::new(repository)));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn ViewProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ViewProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }
}

impl std::fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}

/// Parse numeric ids forwarded from a previous view, skipping garbage
pub(crate) fn parse_ids(view: &str, params: &[String]) -> Vec<u64> {
    params
        .iter()
        .filter_map(|p| match p.trim().parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("View {view}: ignoring non-numeric id '{p}'");
                None
            },
        })
        .collect()
}

/// Layout parameters every view starts with
pub(crate) fn layout_parameters(algorithm: &str, title: &str) -> Parameters {
    Parameters::from([
        (
            crate::layout::ALGORITHM_PARAM.to_string(),
            ParamValue::from(algorithm),
        ),
        (TITLE_PARAM.to_string(), ParamValue::from(title)),
        (
            crate::layout::EDGE_LENGTH_PARAM.to_string(),
            ParamValue::Number(45.0),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::repository::tests::sample_repository;

    #[test]
    fn test_standard_registry_names() {
        let registry = ViewRegistry::standard(sample_repository(), &ExplorerConfig::default());
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec!["diseases", "drugs", "genes", "patient_subgroups", "patients", "studies"]
        );
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_transitions_point_at_registered_views() {
        let registry = ViewRegistry::standard(sample_repository(), &ExplorerConfig::default());
        for name in registry.names() {
            let provider = registry.get(name).unwrap();
            if let Some(next) = provider.next_view_transition() {
                assert!(registry.get(next.target_view).is_some(), "{name} -> {}", next.target_view);
                assert!(next.minimum_selection >= 1);
            }
        }
    }

    #[test]
    fn test_parse_ids_skips_garbage() {
        let params = vec!["10".to_string(), " 11 ".to_string(), "x".to_string()];
        assert_eq!(parse_ids("v", &params), vec![10, 11]);
    }

    #[test]
    fn test_missing_range_is_sentinel() {
        assert!(Dataset::default().range("absoluteWeight").is_empty());
    }
}
