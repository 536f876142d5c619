/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Patients of a set of subgroups, grouped by subgroup and linked to the
//! study that enrolled them.

use super::patient_subgroups::{patient_subgroup_id, patient_subgroup_node};
use super::repository::{DataRepository, StudyRecord};
use super::{Dataset, NextViewTransition, ViewProvider, layout_parameters, parse_ids};
use crate::error::LoadError;
use crate::filter::FilterDescriptor;
use crate::graph::{Edge, Node};
use crate::view_state::Parameters;
use futures::future::BoxFuture;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub const VIEW_NAME: &str = "patients";

pub(crate) fn patient_id(id: u64) -> String {
    format!("P{id}")
}

pub(crate) fn study_id(code: &str) -> String {
    format!("S{code}")
}

pub(crate) fn study_node(study: &StudyRecord) -> Node {
    Node::new(study_id(&study.id))
        .with_attr("name", study.id.clone())
        .with_attr("study_id", study.id.clone())
        .with_attr("source", study.source.clone())
        .with_classes("S")
}

pub struct PatientsView {
    repository: Arc<DataRepository>,
}

impl PatientsView {
    pub fn new(repository: Arc<DataRepository>) -> Self {
        Self { repository }
    }
}

impl ViewProvider for PatientsView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load_dataset(&self, params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
        let repository = self.repository.clone();
        let selected: BTreeSet<u64> = parse_ids(VIEW_NAME, params).into_iter().collect();
        Box::pin(async move {
            let (subgroups, patients, studies) = tokio::try_join!(
                repository.patient_subgroups(),
                repository.patients(),
                repository.studies(),
            )?;
            let studies_by_id: HashMap<&str, &StudyRecord> =
                studies.iter().map(|s| (s.id.as_str(), s)).collect();

            let mut nodes: Vec<Node> = subgroups
                .iter()
                .filter(|s| selected.contains(&s.id))
                .map(|s| patient_subgroup_node(s, false))
                .collect();
            let mut used_studies: BTreeSet<&str> = BTreeSet::new();
            let mut edges = Vec::new();

            for patient in patients.iter().filter(|p| selected.contains(&p.patient_subgroup_id)) {
                let id = patient_id(patient.id);
                nodes.push(
                    Node::new(id.clone())
                        .with_attr("name", id.clone())
                        .with_attr("patient_id", patient.id)
                        .with_attr("patient_subgroup_id", patient.patient_subgroup_id)
                        .with_parent(patient_subgroup_id(patient.patient_subgroup_id))
                        .with_classes("P"),
                );
                if !studies_by_id.contains_key(patient.study_id.as_str()) {
                    debug!("Patient {} enrolled by unknown study {}", patient.id, patient.study_id);
                    continue;
                }
                used_studies.insert(patient.study_id.as_str());
                edges.push(
                    Edge::new(format!("{id}-{}", study_id(&patient.study_id)), id, study_id(&patient.study_id), 1.0)
                        .with_classes("PS"),
                );
            }
            nodes.extend(
                used_studies
                    .iter()
                    .filter_map(|code| studies_by_id.get(code))
                    .map(|s| study_node(s)),
            );

            info!(
                "Patients of {} subgroups: {} nodes, {} enrolments",
                selected.len(),
                nodes.len(),
                edges.len()
            );
            Ok(Dataset {
                nodes,
                edges,
                ..Dataset::default()
            })
        })
    }

    fn initial_parameters(&self, _dataset: &Dataset) -> Parameters {
        layout_parameters("cose", "Patients")
    }

    fn filter_descriptors(&self, _dataset: &Dataset) -> Vec<FilterDescriptor> {
        Vec::new()
    }

    fn next_view_transition(&self) -> Option<NextViewTransition> {
        None
    }
}
