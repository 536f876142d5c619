/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Genes up- or down-regulated in a set of patient subgroups.

use super::regulation::{Regulated, regulation_dataset, regulation_filters, regulation_parameters};
use super::repository::{DataRepository, GeneRecord};
use super::{Dataset, NextViewTransition, ViewProvider, layout_parameters, parse_ids};
use crate::error::LoadError;
use crate::filter::FilterDescriptor;
use crate::graph::Node;
use crate::view_state::Parameters;
use futures::future::BoxFuture;
use log::info;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub const VIEW_NAME: &str = "genes";

pub(crate) fn gene_id(symbol: &str) -> String {
    format!("G{symbol}")
}

fn gene_node(gene: &GeneRecord) -> Node {
    let mut node = Node::new(gene_id(&gene.symbol))
        .with_attr("name", gene.symbol.clone())
        .with_attr("symbol", gene.symbol.clone())
        .with_classes("G");
    if let Some(ensembl) = &gene.ensembl_id {
        node = node.with_attr("ensembl_id", ensembl.clone());
    }
    if let Some(uniprot) = &gene.uniprot_acc {
        node = node.with_attr("uniprot_acc", uniprot.clone());
    }
    node
}

pub struct GenesView {
    repository: Arc<DataRepository>,
}

impl GenesView {
    pub fn new(repository: Arc<DataRepository>) -> Self {
        Self { repository }
    }
}

impl ViewProvider for GenesView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load_dataset(&self, params: &[String]) -> BoxFuture<'static, Result<Dataset, LoadError>> {
        let repository = self.repository.clone();
        let selected: BTreeSet<u64> = parse_ids(VIEW_NAME, params).into_iter().collect();
        Box::pin(async move {
            let (subgroups, genes, regulation) = tokio::try_join!(
                repository.patient_subgroups(),
                repository.genes(),
                repository.subgroup_genes(),
            )?;
            let by_symbol: HashMap<&str, &GeneRecord> =
                genes.iter().map(|g| (g.symbol.as_str(), g)).collect();

            let dataset = regulation_dataset(
                &subgroups,
                &selected,
                regulation.iter().map(|r| Regulated {
                    subgroup_id: r.patient_subgroup_id,
                    entity: &r.gene_symbol,
                    sign: r.regulation_sign,
                }),
                |symbol| by_symbol.get(symbol).map(|g| gene_node(g)),
            );
            info!(
                "Genes of {} subgroups: {} nodes, {} regulation edges",
                selected.len(),
                dataset.nodes.len(),
                dataset.edges.len()
            );
            Ok(dataset)
        })
    }

    fn initial_parameters(&self, _dataset: &Dataset) -> Parameters {
        let mut params = layout_parameters("cose-bilkent", "Regulated genes");
        regulation_parameters(&mut params);
        params
    }

    fn filter_descriptors(&self, dataset: &Dataset) -> Vec<FilterDescriptor> {
        regulation_filters(dataset, "genes")
    }

    fn next_view_transition(&self) -> Option<NextViewTransition> {
        Some(NextViewTransition {
            target_view: super::drugs::VIEW_NAME,
            label: "See related drugs",
            id_attribute: "patient_subgroup_id",
            minimum_selection: 1,
        })
    }
}
