/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Disease comorbidity network: one node per disease, one edge per
//! significant relative risk between two diseases.

use super::repository::{DataRepository, DiseaseGroupRecord, DiseaseRecord};
use super::{Dataset, NextViewTransition, ViewProvider, layout_parameters};
use crate::error::LoadError;
use crate::filter::{ChoiceOption, Control, FilterDescriptor, FilterPredicate};
use crate::graph::{ABSOLUTE_WEIGHT_ATTR, Edge, Node, Scope, WEIGHT_ATTR};
use crate::stats::compute_range;
use crate::util::multiline_label;
use crate::view_state::{ParamValue, Parameters};
use futures::future::BoxFuture;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const VIEW_NAME: &str = "diseases";

/// Cutoff on |relative risk|
pub const ABS_REL_RISK_PARAM: &str = "absRelRiskVal";

/// -1 inverse only, 0 all, +1 direct only
pub const SHOW_COMORBIDITIES_PARAM: &str = "showComor";

pub(crate) fn disease_id(id: u64) -> String {
    format!("D{id}")
}

pub(crate) fn disease_group_id(id: u64) -> String {
    format!("DG{id}")
}

pub(crate) fn disease_group_node(group: &DiseaseGroupRecord) -> Node {
    let mut node = Node::new(disease_group_id(group.id))
        .with_attr("name", group.name.clone())
        .with_attr("label", multiline_label(&group.name))
        .with_attr("disease_group_id", group.id)
        .with_classes("DG");
    if let Some(color) = &group.color {
        node = node.with_attr("color", color.clone());
    }
    node
}

/// Disease node inside its group container. Diseases without a color of
/// their own take the group's.
pub(crate) fn disease_node(
    disease: &DiseaseRecord,
    groups: &HashMap<u64, &DiseaseGroupRecord>,
) -> Node {
    let group = groups.get(&disease.disease_group_id);
    let mut node = Node::new(disease_id(disease.id))
        .with_attr("name", disease.name.clone())
        .with_attr("label", multiline_label(&disease.name))
        .with_attr("disease_id", disease.id)
        .with_attr("disease_group_id", disease.disease_group_id)
        .with_parent(disease_group_id(disease.disease_group_id))
        .with_classes("D");
    if let Some(icd9) = &disease.icd9 {
        node = node.with_attr("icd9", icd9.clone());
    }
    if let Some(icd10) = &disease.icd10 {
        node = node.with_attr("icd10", icd10.clone());
    }
    if let Some(group) = group {
        node = node.with_attr("disease_group", group.name.clone());
    }
    let color = disease
        .color
        .clone()
        .or_else(|| group.and_then(|g| g.color.clone()));
    if let Some(color) = color {
        node = node.with_attr("color", color);
    }
    node
}

/// Relative-risk edge, classed by the sign of the risk
pub(crate) fn comorbidity_edge(id: String, source: String, target: String, rel_risk: f64) -> Edge {
    let classes = if rel_risk > 0.0 { "CM CMp" } else { "CM CMn" };
    Edge::new(id, source, target, rel_risk)
        .with_attr("rel_risk", rel_risk)
        .with_attr("abs_rel_risk", rel_risk.abs())
        .with_classes(classes)
}

/// |relative risk| cutoff slider shared by the comorbidity views
pub(crate) fn risk_cutoff_filter(dataset: &Dataset) -> FilterDescriptor {
    let range = dataset.range(ABSOLUTE_WEIGHT_ATTR);
    FilterDescriptor::new(
        Scope::Edges,
        ABSOLUTE_WEIGHT_ATTR,
        ABS_REL_RISK_PARAM,
        FilterPredicate::Below,
    )
    .labelled("Cut-off on |Relative risk|")
    .on_context()
    .with_control(Control::Slider {
        min: range.min,
        max: range.max,
        step: Some(0.1),
        logarithmic: true,
    })
}

pub struct DiseasesView {
    repository: Arc<DataRepository>,
    cutoff_percentile: f64,
}

impl DiseasesView {
    pub fn new(repository: Arc<DataRepository>, cutoff_percentile: f64) -> Self {
        Self {
            repository,
            cutoff_percentile,
        }
    }
}

impl ViewProvider for DiseasesView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load_dataset(&self, _params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
        let repository = self.repository.clone();
        let percentile = self.cutoff_percentile;
        Box::pin(async move {
            let (groups, diseases, comorbidities) = tokio::try_join!(
                repository.disease_groups(),
                repository.diseases(),
                repository.disease_comorbidities(),
            )?;

            let groups_by_id: HashMap<u64, &DiseaseGroupRecord> =
                groups.iter().map(|g| (g.id, g)).collect();
            let known: HashSet<u64> = diseases.iter().map(|d| d.id).collect();

            // group containers are left out; the dangling parent is dropped on load
            let nodes: Vec<Node> = diseases
                .iter()
                .map(|d| disease_node(d, &groups_by_id))
                .collect();

            let edges: Vec<Edge> = comorbidities
                .iter()
                .enumerate()
                .filter(|(i, c)| {
                    let keep = known.contains(&c.from_id) && known.contains(&c.to_id);
                    if !keep {
                        debug!("Comorbidity DC{i} refers to an unknown disease");
                    }
                    keep
                })
                .map(|(i, c)| {
                    comorbidity_edge(
                        format!("DC{i}"),
                        disease_id(c.from_id),
                        disease_id(c.to_id),
                        c.rel_risk,
                    )
                })
                .collect();

            let risks: Vec<f64> = edges.iter().map(Edge::absolute_weight).collect();
            let mut dataset = Dataset {
                nodes,
                edges,
                ..Dataset::default()
            };
            dataset.ranges.insert(
                ABSOLUTE_WEIGHT_ATTR.to_string(),
                compute_range(&risks, percentile),
            );
            Ok(dataset)
        })
    }

    fn initial_parameters(&self, dataset: &Dataset) -> Parameters {
        let mut params = layout_parameters("concentric", "Diseases");
        params.insert(
            ABS_REL_RISK_PARAM.to_string(),
            ParamValue::Number(dataset.range(ABSOLUTE_WEIGHT_ATTR).initial),
        );
        params.insert(SHOW_COMORBIDITIES_PARAM.to_string(), ParamValue::Number(0.0));
        params
    }

    fn filter_descriptors(&self, dataset: &Dataset) -> Vec<FilterDescriptor> {
        vec![
            risk_cutoff_filter(dataset),
            FilterDescriptor::new(
                Scope::Edges,
                WEIGHT_ATTR,
                SHOW_COMORBIDITIES_PARAM,
                FilterPredicate::SignMismatch,
            )
            .labelled("Show comorbidities")
            .with_control(Control::Choice {
                options: vec![
                    ChoiceOption::new("-", "Only inverse comorbidities", -1.0),
                    ChoiceOption::new("all", "All kind of comorbidities", 0.0),
                    ChoiceOption::new("+", "Only direct comorbidities", 1.0),
                ],
            }),
        ]
    }

    fn next_view_transition(&self) -> Option<NextViewTransition> {
        Some(NextViewTransition {
            target_view: super::patient_subgroups::VIEW_NAME,
            label: "See subgroups",
            id_attribute: "disease_id",
            minimum_selection: 2,
        })
    }
}
