/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Attribute filters and the pass that turns them into a hidden set.
//!
//! A pass always starts from the unfiltered graph: both hidden sets are
//! restored first, so filters never compound across parameter changes.

use crate::graph::{ElementRef, ElementSet, GraphStore, Scope};
use crate::highlight;
use crate::view_state::{HighlightState, ParamValue, ViewState};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Predicate signature for `FilterPredicate::Custom`
pub type CustomPredicate = dyn Fn(Option<&Value>, &ParamValue) -> bool + Send + Sync;

/// Decides whether an element is hidden, given its attribute value and the
/// live parameter value. Missing or non-numeric attributes never hide.
#[derive(Clone)]
pub enum FilterPredicate {
    /// Hide when `attribute < parameter`
    Below,

    /// Hide when `attribute > parameter`
    Above,

    /// Hide when the parameter is a non-zero sign and the attribute's sign
    /// differs from it
    SignMismatch,

    /// Hide when the attribute differs from the parameter
    NotEqual,

    Custom(Arc<CustomPredicate>),
}

impl std::fmt::Debug for FilterPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterPredicate::Below => write!(f, "Below"),
            FilterPredicate::Above => write!(f, "Above"),
            FilterPredicate::SignMismatch => write!(f, "SignMismatch"),
            FilterPredicate::NotEqual => write!(f, "NotEqual"),
            FilterPredicate::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl FilterPredicate {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &ParamValue) -> bool + Send + Sync + 'static,
    {
        FilterPredicate::Custom(Arc::new(f))
    }

    /// Whether an element with `attribute` is hidden under `parameter`
    pub fn fires(&self, attribute: Option<&Value>, parameter: &ParamValue) -> bool {
        let numbers = || Some((attribute?.as_f64()?, parameter.as_f64()?));
        match self {
            FilterPredicate::Below => numbers().is_some_and(|(a, p)| a < p),
            FilterPredicate::Above => numbers().is_some_and(|(a, p)| a > p),
            FilterPredicate::SignMismatch => numbers().is_some_and(|(a, p)| {
                let wanted = p.trunc();
                wanted != 0.0 && sign(a) != wanted
            }),
            FilterPredicate::NotEqual => match attribute.and_then(ParamValue::from_json) {
                Some(ParamValue::Number(a)) => parameter.as_f64().is_some_and(|p| a != p),
                Some(value) => value != *parameter,
                None => false,
            },
            FilterPredicate::Custom(f) => f(attribute, parameter),
        }
    }
}

/// One selectable choice of a `Control::Choice`
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    pub title: String,
    pub value: ParamValue,
}

impl ChoiceOption {
    pub fn new(label: &str, title: &str, value: impl Into<ParamValue>) -> Self {
        Self {
            label: label.to_string(),
            title: title.to_string(),
            value: value.into(),
        }
    }
}

/// How a front end should present the parameter of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Slider {
        min: f64,
        max: f64,
        step: Option<f64>,
        logarithmic: bool,
    },
    Choice {
        options: Vec<ChoiceOption>,
    },
}

/// Hides elements of `scope` for which
/// `predicate(attributes[attribute_name], parameters[parameter_name])` holds
#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    pub scope: Scope,
    pub attribute_name: String,
    pub parameter_name: String,
    pub predicate: FilterPredicate,
    pub label: String,

    /// Whether "filter by this element" may set the parameter from an element
    pub filter_on_context: bool,

    pub control: Option<Control>,
}

impl FilterDescriptor {
    pub fn new(scope: Scope, attribute_name: &str, parameter_name: &str, predicate: FilterPredicate) -> Self {
        Self {
            scope,
            attribute_name: attribute_name.to_string(),
            parameter_name: parameter_name.to_string(),
            predicate,
            label: attribute_name.to_string(),
            filter_on_context: false,
            control: None,
        }
    }

    pub fn labelled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn on_context(mut self) -> Self {
        self.filter_on_context = true;
        self
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.control = Some(control);
        self
    }

    /// Whether this filter hides `element` under `parameters`
    pub fn hides(&self, element: ElementRef<'_>, parameter: &ParamValue) -> bool {
        self.predicate
            .fires(element.attribute(&self.attribute_name), parameter)
    }
}

/// What a filter pass did to the selection that was highlighted before it
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// Nothing was selected
    None,

    /// These survivors of the old selection are highlighted again
    Reapplied(ElementSet),

    /// Nothing of the old selection survived; the selection is now empty
    Cleared,
}

/// Elements of `scope` hidden by at least one descriptor
fn matching(store: &GraphStore, state: &ViewState, scope: Scope) -> ElementSet {
    let active: Vec<(&FilterDescriptor, &ParamValue)> = state
        .filters
        .iter()
        .filter(|d| d.scope == scope)
        .filter_map(|d| match state.parameters.get(&d.parameter_name) {
            Some(value) => Some((d, value)),
            None => {
                warn!("Parameter '{}' vanished, filter skipped", d.parameter_name);
                None
            },
        })
        .collect();
    if active.is_empty() {
        return ElementSet::new();
    }
    store.query(scope, |element| {
        active.iter().any(|(d, value)| d.hides(element, value))
    })
}

/// Recompute the filter hidden set from scratch.
///
/// Order: restore highlight, restore filter, hide edges, hide nodes plus the
/// edges they leave dangling, cull orphans. The previous selection is then
/// re-highlighted if any of it survived.
pub fn recompute(store: &mut GraphStore, state: &mut ViewState) -> SelectionOutcome {
    let previous = match std::mem::take(&mut state.highlight) {
        HighlightState::Idle => None,
        HighlightState::Highlighted { selection } => Some(selection),
    };

    if let Some(handle) = state.hidden_by_highlight.take() {
        store.restore(handle);
    }
    if let Some(handle) = state.hidden_by_filter.take() {
        store.restore(handle);
    }

    let edges = matching(store, state, Scope::Edges);
    let mut hidden = store.hide(&edges);

    let nodes = matching(store, state, Scope::Nodes);
    hidden.absorb(store.hide(&nodes));

    let mut dangling = ElementSet::new();
    dangling.edges = store
        .visible_edges()
        .filter(|(key, _)| {
            store
                .endpoints(*key)
                .is_some_and(|(s, t)| !store.is_node_visible(s) || !store.is_node_visible(t))
        })
        .map(|(key, _)| key)
        .collect();
    hidden.absorb(store.hide(&dangling));

    let orphans = ElementSet::from_nodes(
        store
            .visible_nodes()
            .map(|(key, _)| key)
            .filter(|&key| !store.is_group(key) && store.visible_degree(key) == 0)
            .collect::<Vec<_>>(),
    );
    let orphan_count = orphans.nodes.len();
    hidden.absorb(store.hide(&orphans));

    debug!(
        "Filter pass hid {} elements ({} orphans)",
        hidden.len(),
        orphan_count
    );
    state.hidden_by_filter = Some(hidden);

    let Some(previous) = previous else {
        return SelectionOutcome::None;
    };
    let surviving = ElementSet {
        nodes: previous
            .nodes
            .into_iter()
            .filter(|&key| store.is_node_visible(key))
            .collect(),
        edges: previous
            .edges
            .into_iter()
            .filter(|&key| store.is_edge_visible(key))
            .collect(),
    };
    if surviving.nodes.is_empty() {
        SelectionOutcome::Cleared
    } else {
        highlight::highlight(store, state, surviving.clone());
        SelectionOutcome::Reapplied(surviving)
    }
}

/// Set every context-enabled parameter of `element`'s scope to the element's
/// own attribute value. Returns the names of the parameters that changed.
pub fn filter_on_element(state: &mut ViewState, element: ElementRef<'_>) -> Vec<String> {
    let mut changed = Vec::new();
    for descriptor in &state.filters {
        if !descriptor.filter_on_context || descriptor.scope != element.scope() {
            continue;
        }
        let Some(value) = element
            .attribute(&descriptor.attribute_name)
            .and_then(ParamValue::from_json)
        else {
            continue;
        };
        let previous = state
            .parameters
            .insert(descriptor.parameter_name.clone(), value.clone());
        if previous.as_ref() != Some(&value) {
            changed.push(descriptor.parameter_name.clone());
        }
    }
    changed
}
