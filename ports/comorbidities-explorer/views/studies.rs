/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Studies and the patient subgroups their patients fall into.

use super::patient_subgroups::{patient_subgroup_id, patient_subgroup_node};
use super::patients::{study_id, study_node};
use super::repository::DataRepository;
use super::{Dataset, NextViewTransition, ViewProvider, layout_parameters};
use crate::error::LoadError;
use crate::filter::{Control, FilterDescriptor, FilterPredicate};
use crate::graph::{ABSOLUTE_WEIGHT_ATTR, Edge, Node, Scope};
use crate::stats::{MIN_PATIENTS_PERCENTILE, compute_range};
use crate::view_state::{ParamValue, Parameters};
use futures::future::BoxFuture;
use log::info;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const VIEW_NAME: &str = "studies";

/// Smallest number of patients a study must contribute to a subgroup
pub const MIN_PATIENTS_PARAM: &str = "minPatients";

pub struct StudiesView {
    repository: Arc<DataRepository>,
}

impl StudiesView {
    pub fn new(repository: Arc<DataRepository>) -> Self {
        Self { repository }
    }
}

impl ViewProvider for StudiesView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load_dataset(&self, _params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
        let repository = self.repository.clone();
        Box::pin(async move {
            let (subgroups, patients, studies) = tokio::try_join!(
                repository.patient_subgroups(),
                repository.patients(),
                repository.studies(),
            )?;

            let mut counts: BTreeMap<(&str, u64), u64> = BTreeMap::new();
            for patient in patients.iter() {
                *counts
                    .entry((patient.study_id.as_str(), patient.patient_subgroup_id))
                    .or_default() += 1;
            }
            let known_studies: BTreeSet<&str> = studies.iter().map(|s| s.id.as_str()).collect();
            let linked: BTreeSet<u64> = counts.keys().map(|&(_, subgroup)| subgroup).collect();

            let mut nodes: Vec<Node> = studies.iter().map(study_node).collect();
            nodes.extend(
                subgroups
                    .iter()
                    .filter(|s| linked.contains(&s.id))
                    .map(|s| patient_subgroup_node(s, false)),
            );

            let edges: Vec<Edge> = counts
                .iter()
                .filter(|((study, _), _)| known_studies.contains(study))
                .map(|(&(study, subgroup), &count)| {
                    let source = study_id(study);
                    let target = patient_subgroup_id(subgroup);
                    Edge::new(format!("{source}-{target}"), source, target, count as f64)
                        .with_attr("patients", count)
                        .with_classes("SPSG")
                })
                .collect();

            info!(
                "Studies: {} studies, {} subgroups, {} links",
                studies.len(),
                linked.len(),
                edges.len()
            );
            let weights: Vec<f64> = edges.iter().map(Edge::absolute_weight).collect();
            let mut dataset = Dataset {
                nodes,
                edges,
                ..Dataset::default()
            };
            dataset.ranges.insert(
                ABSOLUTE_WEIGHT_ATTR.to_string(),
                compute_range(&weights, MIN_PATIENTS_PERCENTILE),
            );
            Ok(dataset)
        })
    }

    fn initial_parameters(&self, dataset: &Dataset) -> Parameters {
        let mut params = layout_parameters("concentric", "Studies");
        params.insert(
            MIN_PATIENTS_PARAM.to_string(),
            ParamValue::Number(dataset.range(ABSOLUTE_WEIGHT_ATTR).initial),
        );
        params
    }

    fn filter_descriptors(&self, dataset: &Dataset) -> Vec<FilterDescriptor> {
        let range = dataset.range(ABSOLUTE_WEIGHT_ATTR);
        vec![
            FilterDescriptor::new(
                Scope::Edges,
                ABSOLUTE_WEIGHT_ATTR,
                MIN_PATIENTS_PARAM,
                FilterPredicate::Below,
            )
            .labelled("Minimum patients per subgroup")
            .on_context()
            .with_control(Control::Slider {
                min: range.min,
                max: range.max,
                step: Some(1.0),
                logarithmic: false,
            }),
        ]
    }

    fn next_view_transition(&self) -> Option<NextViewTransition> {
        Some(NextViewTransition {
            target_view: super::patients::VIEW_NAME,
            label: "See patients",
            id_attribute: "patient_subgroup_id",
            minimum_selection: 1,
        })
    }
}
