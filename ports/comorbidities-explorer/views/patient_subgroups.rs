/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Patient-subgroup comorbidity network of a set of diseases.
//!
//! Subgroups sit inside their disease, diseases inside their group. Edges
//! carry the relative risk plus the genes and drugs both subgroups regulate
//! in the same direction.

use super::diseases::{
    ABS_REL_RISK_PARAM, comorbidity_edge, disease_id, disease_node, disease_group_node,
    risk_cutoff_filter,
};
use super::repository::{DataRepository, DiseaseGroupRecord, PatientSubgroupRecord};
use super::{Dataset, NextViewTransition, ViewProvider, layout_parameters, parse_ids};
use crate::error::LoadError;
use crate::filter::{Control, FilterDescriptor, FilterPredicate};
use crate::graph::{ABSOLUTE_WEIGHT_ATTR, Edge, Node, Scope};
use crate::stats::{
    RegulationIndex, RiskRange, SHARED_GENES_PERCENTILE, compute_range, size_range,
};
use crate::util::subgroup_label;
use crate::view_state::{ParamValue, Parameters};
use futures::future::BoxFuture;
use log::info;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub const VIEW_NAME: &str = "patient_subgroups";

/// Smallest subgroup size shown
pub const CLUSTER_SIZE_PARAM: &str = "clusterSizeVal";

/// Smallest number of same-direction genes two subgroups must share
pub const MIN_SHARED_GENES_PARAM: &str = "minSharedGenes";

pub const SIZE_ATTR: &str = "size";
pub const SHARED_GENES_ATTR: &str = "sharedGenes";

/// Default for `CLUSTER_SIZE_PARAM`
pub const DEFAULT_MIN_CLUSTER_SIZE: u64 = 4;

pub(crate) fn patient_subgroup_id(id: u64) -> String {
    format!("PSG{id}")
}

/// Subgroup node; `parent` places it inside its disease when that is shown
pub(crate) fn patient_subgroup_node(subgroup: &PatientSubgroupRecord, parent: bool) -> Node {
    let mut node = Node::new(patient_subgroup_id(subgroup.id))
        .with_attr("name", subgroup_label(&subgroup.name))
        .with_attr("label", subgroup.name.clone())
        .with_attr("patient_subgroup_id", subgroup.id)
        .with_attr("disease_id", subgroup.disease_id)
        .with_attr(SIZE_ATTR, subgroup.size)
        .with_classes("PSG");
    if parent {
        node = node.with_parent(disease_id(subgroup.disease_id));
    }
    node
}

pub struct PatientSubgroupsView {
    repository: Arc<DataRepository>,
    cutoff_percentile: f64,
    min_cluster_size: u64,
}

impl PatientSubgroupsView {
    pub fn new(repository: Arc<DataRepository>, cutoff_percentile: f64, min_cluster_size: u64) -> Self {
        Self {
            repository,
            cutoff_percentile,
            min_cluster_size,
        }
    }
}

impl ViewProvider for PatientSubgroupsView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load_dataset(&self, params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
        let repository = self.repository.clone();
        let percentile = self.cutoff_percentile;
        let selected: BTreeSet<u64> = parse_ids(VIEW_NAME, params).into_iter().collect();
        Box::pin(async move {
            let (groups, diseases, subgroups, comorbidities, genes, drugs) = tokio::try_join!(
                repository.disease_groups(),
                repository.diseases(),
                repository.patient_subgroups(),
                repository.patient_subgroup_comorbidities(),
                repository.subgroup_genes(),
                repository.subgroup_drugs(),
            )?;

            let groups_by_id: HashMap<u64, &DiseaseGroupRecord> =
                groups.iter().map(|g| (g.id, g)).collect();
            let chosen_diseases: Vec<_> =
                diseases.iter().filter(|d| selected.contains(&d.id)).collect();
            let chosen_groups: BTreeSet<u64> =
                chosen_diseases.iter().map(|d| d.disease_group_id).collect();
            let disease_colors: HashMap<u64, Option<String>> = chosen_diseases
                .iter()
                .map(|d| {
                    let color = d.color.clone().or_else(|| {
                        groups_by_id
                            .get(&d.disease_group_id)
                            .and_then(|g| g.color.clone())
                    });
                    (d.id, color)
                })
                .collect();

            let chosen_subgroups: HashMap<u64, &PatientSubgroupRecord> = subgroups
                .iter()
                .filter(|s| selected.contains(&s.disease_id))
                .map(|s| (s.id, s))
                .collect();

            let mut nodes: Vec<Node> = Vec::new();
            let mut sorted: Vec<&&PatientSubgroupRecord> = chosen_subgroups.values().collect();
            sorted.sort_by_key(|s| s.id);
            for subgroup in sorted {
                let mut node = patient_subgroup_node(subgroup, true);
                if let Some(Some(color)) = disease_colors.get(&subgroup.disease_id) {
                    node = node.with_attr("color", color.clone());
                }
                nodes.push(node);
            }
            nodes.extend(chosen_diseases.iter().map(|d| disease_node(d, &groups_by_id)));
            nodes.extend(
                groups
                    .iter()
                    .filter(|g| chosen_groups.contains(&g.id))
                    .map(disease_group_node),
            );

            let gene_index = RegulationIndex::from_records(genes.iter().map(|r| {
                (r.patient_subgroup_id.to_string(), r.gene_symbol.clone(), r.regulation_sign)
            }));
            let drug_index = RegulationIndex::from_records(drugs.iter().map(|r| {
                (r.patient_subgroup_id.to_string(), r.drug_id.to_string(), r.regulation_sign)
            }));

            let mut edges: Vec<Edge> = Vec::new();
            let mut edge_sizes: Vec<u64> = Vec::new();
            for (i, c) in comorbidities.iter().enumerate() {
                let (Some(from), Some(to)) =
                    (chosen_subgroups.get(&c.from_id), chosen_subgroups.get(&c.to_id))
                else {
                    continue;
                };
                let shared_genes = gene_index.shared_between(&from.id.to_string(), &to.id.to_string());
                let shared_drugs = drug_index.shared_between(&from.id.to_string(), &to.id.to_string());
                edge_sizes.extend([from.size, to.size]);

                let edge = comorbidity_edge(
                    format!("PSGC{i}"),
                    patient_subgroup_id(c.from_id),
                    patient_subgroup_id(c.to_id),
                    c.rel_risk,
                )
                .with_attr("isIntraDisease", from.disease_id == to.disease_id)
                .with_attr("sharedUpGenes", shared_genes.up.len())
                .with_attr("sharedDownGenes", shared_genes.down.len())
                .with_attr(SHARED_GENES_ATTR, shared_genes.total())
                .with_attr("sharedDrugs", shared_drugs.total());
                edges.push(edge);
            }

            info!(
                "Patient subgroups of {} diseases: {} subgroups, {} comorbidities",
                chosen_diseases.len(),
                chosen_subgroups.len(),
                edges.len()
            );

            let risks: Vec<f64> = edges.iter().map(Edge::absolute_weight).collect();
            let shared: Vec<f64> = edges
                .iter()
                .filter_map(|e| e.attribute(SHARED_GENES_ATTR).and_then(|v| v.as_f64()))
                .collect();

            let mut dataset = Dataset {
                nodes,
                edges,
                ..Dataset::default()
            };
            dataset.ranges.insert(
                ABSOLUTE_WEIGHT_ATTR.to_string(),
                compute_range(&risks, percentile),
            );
            if let Some((min, max)) = size_range(edge_sizes) {
                dataset.ranges.insert(
                    SIZE_ATTR.to_string(),
                    RiskRange {
                        min: min as f64,
                        initial: min as f64,
                        max: max as f64,
                    },
                );
            }
            dataset.ranges.insert(
                SHARED_GENES_ATTR.to_string(),
                compute_range(&shared, SHARED_GENES_PERCENTILE),
            );
            Ok(dataset)
        })
    }

    fn initial_parameters(&self, dataset: &Dataset) -> Parameters {
        let mut params = layout_parameters("cose-bilkent", "Patient subgroups");
        params.insert("nodeSpacing".to_string(), ParamValue::Number(5.0));
        params.insert(
            ABS_REL_RISK_PARAM.to_string(),
            ParamValue::Number(dataset.range(ABSOLUTE_WEIGHT_ATTR).initial),
        );
        params.insert(
            CLUSTER_SIZE_PARAM.to_string(),
            ParamValue::Number(self.min_cluster_size as f64),
        );
        params.insert(MIN_SHARED_GENES_PARAM.to_string(), ParamValue::Number(0.0));
        params
    }

    fn filter_descriptors(&self, dataset: &Dataset) -> Vec<FilterDescriptor> {
        let sizes = dataset.range(SIZE_ATTR);
        let shared = dataset.range(SHARED_GENES_ATTR);
        vec![
            risk_cutoff_filter(dataset),
            FilterDescriptor::new(Scope::Nodes, SIZE_ATTR, CLUSTER_SIZE_PARAM, FilterPredicate::Below)
                .labelled("Cut-off on cluster size")
                .on_context()
                .with_control(Control::Slider {
                    min: sizes.min,
                    max: sizes.max,
                    step: Some(1.0),
                    logarithmic: true,
                }),
            FilterDescriptor::new(
                Scope::Edges,
                SHARED_GENES_ATTR,
                MIN_SHARED_GENES_PARAM,
                FilterPredicate::Below,
            )
            .labelled("Minimum shared regulated genes")
            .with_control(Control::Slider {
                min: 0.0,
                max: shared.max.max(0.0),
                step: Some(1.0),
                logarithmic: false,
            }),
        ]
    }

    fn next_view_transition(&self) -> Option<NextViewTransition> {
        Some(NextViewTransition {
            target_view: super::genes::VIEW_NAME,
            label: "See regulated genes",
            id_attribute: "patient_subgroup_id",
            minimum_selection: 1,
        })
    }
}
