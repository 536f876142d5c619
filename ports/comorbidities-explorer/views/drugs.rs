/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Drugs whose targets are regulated in a set of patient subgroups.

use super::regulation::{Regulated, regulation_dataset, regulation_filters, regulation_parameters};
use super::repository::{DataRepository, DrugRecord};
use super::{Dataset, NextViewTransition, ViewProvider, layout_parameters, parse_ids};
use crate::error::LoadError;
use crate::filter::FilterDescriptor;
use crate::graph::Node;
use crate::view_state::Parameters;
use futures::future::BoxFuture;
use log::info;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub const VIEW_NAME: &str = "drugs";

pub(crate) fn drug_id(id: u64) -> String {
    format!("DR{id}")
}

pub struct DrugsView {
    repository: Arc<DataRepository>,
}

impl DrugsView {
    pub fn new(repository: Arc<DataRepository>) -> Self {
        Self { repository }
    }
}

impl ViewProvider for DrugsView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load_dataset(&self, params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
        let repository = self.repository.clone();
        let selected: BTreeSet<u64> = parse_ids(VIEW_NAME, params).into_iter().collect();
        Box::pin(async move {
            let (subgroups, drugs, regulation) = tokio::try_join!(
                repository.patient_subgroups(),
                repository.drugs(),
                repository.subgroup_drugs(),
            )?;
            // regulation records name drugs by numeric id
            let by_key: HashMap<String, &DrugRecord> =
                drugs.iter().map(|d| (d.id.to_string(), d)).collect();
            let keys: Vec<(u64, String, i64)> = regulation
                .iter()
                .map(|r| (r.patient_subgroup_id, r.drug_id.to_string(), r.regulation_sign))
                .collect();

            let dataset = regulation_dataset(
                &subgroups,
                &selected,
                keys.iter().map(|(subgroup_id, entity, sign)| Regulated {
                    subgroup_id: *subgroup_id,
                    entity,
                    sign: *sign,
                }),
                |key| {
                    by_key.get(key).map(|drug| {
                        Node::new(drug_id(drug.id))
                            .with_attr("name", drug.name.clone())
                            .with_attr("drug_id", drug.id)
                            .with_classes("DR")
                    })
                },
            );
            info!(
                "Drugs of {} subgroups: {} nodes, {} regulation edges",
                selected.len(),
                dataset.nodes.len(),
                dataset.edges.len()
            );
            Ok(dataset)
        })
    }

    fn initial_parameters(&self, _dataset: &Dataset) -> Parameters {
        let mut params = layout_parameters("cose-bilkent", "Related drugs");
        regulation_parameters(&mut params);
        params
    }

    fn filter_descriptors(&self, dataset: &Dataset) -> Vec<FilterDescriptor> {
        regulation_filters(dataset, "drugs")
    }

    fn next_view_transition(&self) -> Option<NextViewTransition> {
        None
    }
}
