/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bipartite subgroup -> entity regulation networks (genes, drugs).

use super::Dataset;
use super::patient_subgroups::patient_subgroup_node;
use super::repository::PatientSubgroupRecord;
use crate::filter::{ChoiceOption, Control, FilterDescriptor, FilterPredicate};
use crate::graph::{Edge, Node, Scope, WEIGHT_ATTR};
use crate::stats::{Regulation, RegulationIndex, SHARED_EVIDENCE_PERCENTILE, compute_range};
use crate::view_state::{ParamValue, Parameters};
use log::debug;
use std::collections::{BTreeSet, HashMap, HashSet};

/// -1 down only, 0 all, +1 up only
pub const SHOW_REGULATION_PARAM: &str = "showRegulation";

/// Smallest number of selected subgroups regulating an entity the same way
pub const MIN_SHARED_EVIDENCE_PARAM: &str = "minSharedEvidence";

pub const SHARED_EVIDENCE_ATTR: &str = "sharedEvidence";

/// One `(subgroup, entity, sign)` regulation record
pub(crate) struct Regulated<'a> {
    pub subgroup_id: u64,
    pub entity: &'a str,
    pub sign: i64,
}

/// Build the network between the `selected` subgroups and every entity one
/// of them regulates. `entity_node` maps an entity key to its node; entities
/// it does not know are skipped.
pub(crate) fn regulation_dataset<'a, F>(
    subgroups: &[PatientSubgroupRecord],
    selected: &BTreeSet<u64>,
    records: impl IntoIterator<Item = Regulated<'a>>,
    entity_node: F,
) -> Dataset
where
    F: Fn(&str) -> Option<Node>,
{
    let chosen: Vec<&PatientSubgroupRecord> =
        subgroups.iter().filter(|s| selected.contains(&s.id)).collect();
    let owners: Vec<String> = chosen.iter().map(|s| s.id.to_string()).collect();

    let records: Vec<Regulated<'a>> = records
        .into_iter()
        .filter(|r| selected.contains(&r.subgroup_id))
        .collect();
    let index = RegulationIndex::from_records(
        records
            .iter()
            .map(|r| (r.subgroup_id.to_string(), r.entity, r.sign)),
    );

    let mut nodes: Vec<Node> = chosen
        .iter()
        .map(|s| patient_subgroup_node(s, false))
        .collect();
    let mut entity_ids: HashMap<&str, Option<String>> = HashMap::new();
    let mut edge_ids: HashSet<String> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::new();

    for record in &records {
        let Some(direction) = Regulation::from_sign(record.sign) else {
            continue;
        };
        let target = entity_ids.entry(record.entity).or_insert_with(|| {
            let node = entity_node(record.entity)?;
            let id = node.id.clone();
            nodes.push(node);
            Some(id)
        });
        let Some(target) = target.clone() else {
            debug!("Regulated entity {} is unknown, skipped", record.entity);
            continue;
        };
        let source = super::patient_subgroups::patient_subgroup_id(record.subgroup_id);
        let id = format!("{source}-{target}");
        if !edge_ids.insert(id.clone()) {
            continue;
        }

        let support = index.support(owners.iter().map(String::as_str), record.entity, direction);
        let (regulation, classes) = match direction {
            Regulation::Up => ("up", "REG REGp"),
            Regulation::Down => ("down", "REG REGn"),
        };
        edges.push(
            Edge::new(id, source, target, direction.sign() as f64)
                .with_attr("regulation", regulation)
                .with_attr(SHARED_EVIDENCE_ATTR, support)
                .with_classes(classes),
        );
    }

    let evidence: Vec<f64> = edges
        .iter()
        .filter_map(|e| e.attribute(SHARED_EVIDENCE_ATTR).and_then(|v| v.as_f64()))
        .collect();
    let mut dataset = Dataset {
        nodes,
        edges,
        ..Dataset::default()
    };
    dataset.ranges.insert(
        SHARED_EVIDENCE_ATTR.to_string(),
        compute_range(&evidence, SHARED_EVIDENCE_PERCENTILE),
    );
    dataset
}

pub(crate) fn regulation_parameters(params: &mut Parameters) {
    params.insert(SHOW_REGULATION_PARAM.to_string(), ParamValue::Number(0.0));
    params.insert(MIN_SHARED_EVIDENCE_PARAM.to_string(), ParamValue::Number(1.0));
}

pub(crate) fn regulation_filters(dataset: &Dataset, entity: &str) -> Vec<FilterDescriptor> {
    let evidence = dataset.range(SHARED_EVIDENCE_ATTR);
    vec![
        FilterDescriptor::new(
            Scope::Edges,
            WEIGHT_ATTR,
            SHOW_REGULATION_PARAM,
            FilterPredicate::SignMismatch,
        )
        .labelled("Show regulation")
        .with_control(Control::Choice {
            options: vec![
                ChoiceOption::new("down", &format!("Only down-regulated {entity}"), -1.0),
                ChoiceOption::new("all", &format!("All regulated {entity}"), 0.0),
                ChoiceOption::new("up", &format!("Only up-regulated {entity}"), 1.0),
            ],
        }),
        FilterDescriptor::new(
            Scope::Edges,
            SHARED_EVIDENCE_ATTR,
            MIN_SHARED_EVIDENCE_PARAM,
            FilterPredicate::Below,
        )
        .labelled("Minimum subgroups in agreement")
        .on_context()
        .with_control(Control::Slider {
            min: 1.0,
            max: evidence.max.max(1.0),
            step: Some(1.0),
            logarithmic: false,
        }),
    ]
}
