/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The displayed view: graph, filter/highlight state and layout.
//!
//! Every visibility change goes through here so the hidden sets are always
//! rebuilt in the same order: restore highlight, restore filter, recompute
//! filter, reapply highlight, re-run the layout.

use crate::filter::{self, SelectionOutcome};
use crate::graph::snapshot::GraphSnapshot;
use crate::graph::{ElementRef, ElementSet, GraphStore, LoadReport, NodeKey};
use crate::highlight;
use crate::layout::LayoutEngine;
use crate::search;
use crate::view_state::{ParamValue, Parameters, ViewState};
use crate::views::{Dataset, NextViewTransition, ViewProvider};
use log::{debug, info};
use serde_json::Value;

/// Target view and forwarded ids of a selection-driven transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextViewRequest {
    pub target_view: &'static str,
    pub params: Vec<String>,
}

pub struct ExplorerSession<L = Box<dyn LayoutEngine>> {
    store: GraphStore,
    state: ViewState,
    layout: L,
    view: Option<&'static str>,
    transition: Option<NextViewTransition>,
}

impl<L: LayoutEngine> ExplorerSession<L> {
    pub fn new(layout: L) -> Self {
        Self {
            store: GraphStore::new(),
            state: ViewState::default(),
            layout,
            view: None,
            transition: None,
        }
    }

    /// Replace the displayed graph with `dataset`.
    ///
    /// `saved_parameters` are restored verbatim when given, otherwise the
    /// provider's defaults apply. Saved selection ids that are not loaded or
    /// are filtered out are dropped.
    pub fn activate(
        &mut self,
        provider: &dyn ViewProvider,
        dataset: Dataset,
        saved_parameters: Option<Parameters>,
        saved_selection: &[String],
    ) -> LoadReport {
        self.layout.stop();

        let parameters =
            saved_parameters.unwrap_or_else(|| provider.initial_parameters(&dataset));
        let filters = provider.filter_descriptors(&dataset);
        let report = self.store.load(dataset.nodes, dataset.edges);
        self.state = ViewState::new(parameters, filters);
        self.view = Some(provider.name());
        self.transition = provider.next_view_transition();

        filter::recompute(&mut self.store, &mut self.state);
        let selection = self.selectable(saved_selection);
        if !selection.is_empty() {
            highlight::highlight(&mut self.store, &mut self.state, ElementSet::from_nodes(selection));
        }
        self.layout.run(&self.store, &self.state.parameters, true);

        info!(
            "Activated view {}: {} of {} nodes visible",
            provider.name(),
            self.store.visible_node_count(),
            self.store.node_count()
        );
        report
    }

    pub fn view_name(&self) -> Option<&'static str> {
        self.view
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn parameters(&self) -> &Parameters {
        &self.state.parameters
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn transition(&self) -> Option<NextViewTransition> {
        self.transition
    }

    /// Set one parameter and rebuild visibility
    pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> SelectionOutcome {
        self.state.set_parameter(name, value);
        self.refilter()
    }

    /// Recompute the filter from scratch, re-highlighting what survives
    pub fn refilter(&mut self) -> SelectionOutcome {
        self.layout.stop();
        let outcome = filter::recompute(&mut self.store, &mut self.state);
        let randomize = matches!(outcome, SelectionOutcome::Reapplied(_));
        self.layout.run(&self.store, &self.state.parameters, randomize);
        outcome
    }

    /// Replace the selection. Nodes hidden by the filter are ignored; nodes
    /// hidden only by the current highlight stay selectable. An empty
    /// selection unselects.
    pub fn select(&mut self, nodes: impl IntoIterator<Item = NodeKey>) {
        let nodes: Vec<NodeKey> = nodes
            .into_iter()
            .filter(|&key| self.is_selectable(key))
            .collect();
        if nodes.is_empty() {
            self.unselect_all();
            return;
        }
        self.layout.stop();
        highlight::highlight(&mut self.store, &mut self.state, ElementSet::from_nodes(nodes));
        self.layout.run(&self.store, &self.state.parameters, true);
    }

    /// Select elements; a selected edge selects its endpoints
    pub fn select_elements(&mut self, elements: ElementSet) {
        let mut nodes = elements.nodes;
        for edge in elements.edges {
            if let Some((source, target)) = self.store.endpoints(edge) {
                nodes.insert(source);
                nodes.insert(target);
            }
        }
        self.select(nodes);
    }

    /// Add nodes by id to the current selection. Unknown ids and ids hidden
    /// by the filter are ignored.
    pub fn add_selection_by_ids(&mut self, ids: &[String]) {
        let mut nodes = self.state.selection().cloned().unwrap_or_default().nodes;
        nodes.extend(self.selectable(ids));
        self.select(nodes);
    }

    pub fn unselect_all(&mut self) {
        if self.state.selection().is_none() {
            return;
        }
        self.layout.stop();
        highlight::clear(&mut self.store, &mut self.state);
        self.layout.run(&self.store, &self.state.parameters, false);
    }

    /// Ids of the selected nodes
    pub fn selected_node_ids(&self) -> Vec<String> {
        self.state
            .selection()
            .map(|selection| {
                selection
                    .nodes
                    .iter()
                    .filter_map(|&key| self.store.node(key))
                    .map(|node| node.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set every context-enabled filter parameter from the element `id`,
    /// refiltering when something changed. Returns the changed parameters.
    pub fn filter_on_element(&mut self, id: &str) -> Vec<String> {
        let element = if let Some(node) = self.store.node_key(id).and_then(|k| self.store.node(k)) {
            ElementRef::Node(node)
        } else if let Some(edge) = self.store.edge_key(id).and_then(|k| self.store.edge(k)) {
            ElementRef::Edge(edge)
        } else {
            debug!("Filter on unknown element {id}");
            return Vec::new();
        };
        let changed = filter::filter_on_element(&mut self.state, element);
        if !changed.is_empty() {
            self.refilter();
        }
        changed
    }

    /// Where the current selection can lead, if it is large enough
    pub fn next_view_request(&self) -> Option<NextViewRequest> {
        let transition = self.transition?;
        let selection = self.state.selection()?;
        let params: Vec<String> = selection
            .nodes
            .iter()
            .filter_map(|&key| self.store.node(key))
            .filter_map(|node| node.attribute(transition.id_attribute))
            .filter_map(forwarded_id)
            .collect();
        (params.len() >= transition.minimum_selection).then_some(NextViewRequest {
            target_view: transition.target_view,
            params,
        })
    }

    /// Visible graph with the latest layout positions
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(
            self.view.unwrap_or_default(),
            &self.store,
            &self.layout.positions(),
        )
    }

    /// `(visible nodes, visible edges)`
    pub fn visible_counts(&self) -> (usize, usize) {
        (
            self.store.visible_node_count(),
            self.store.visible_edge_count(),
        )
    }

    /// Ids of the visible nodes best matching `query`
    pub fn search(&self, query: &str) -> Vec<String> {
        search::fuzzy_match_visible_nodes(&self.store, query)
            .into_iter()
            .filter_map(|key| self.store.node(key))
            .map(|node| node.id.clone())
            .collect()
    }

    /// Keys of the loaded, filter-visible nodes among `ids`
    fn selectable(&self, ids: &[String]) -> Vec<NodeKey> {
        ids.iter()
            .filter_map(|id| self.store.node_key(id))
            .filter(|&key| self.is_selectable(key))
            .collect()
    }

    fn is_selectable(&self, key: NodeKey) -> bool {
        self.store.node(key).is_some()
            && !self
                .state
                .hidden_by_filter
                .as_ref()
                .is_some_and(|hidden| hidden.elements().contains_node(key))
    }
}

fn forwarded_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NullLayout;
    use crate::views::diseases::{ABS_REL_RISK_PARAM, DiseasesView};
    use crate::views::repository::tests::sample_repository;

    async fn diseases_session() -> ExplorerSession<NullLayout> {
        let view = DiseasesView::new(sample_repository(), 0.95);
        let dataset = view.load_dataset(&[]).await.unwrap();
        let mut session = ExplorerSession::new(NullLayout::new());
        session.activate(&view, dataset, None, &[]);
        session
    }

    fn key(session: &ExplorerSession<NullLayout>, id: &str) -> NodeKey {
        session.store().node_key(id).unwrap()
    }

    #[tokio::test]
    async fn test_activate_applies_default_filters() {
        let session = diseases_session().await;
        assert_eq!(session.view_name(), Some("diseases"));
        assert_eq!(session.visible_counts(), (2, 1));
        assert_eq!(session.layout().runs.len(), 1);
        assert_eq!(session.layout().last_run().unwrap().algorithm.as_deref(), Some("concentric"));
    }

    #[tokio::test]
    async fn test_selection_survives_refilter() {
        let mut session = diseases_session().await;
        session.set_parameter(ABS_REL_RISK_PARAM, ParamValue::Number(0.0));
        assert_eq!(session.visible_counts(), (3, 3));

        session.select([key(&session, "D10")]);
        // DC2 between the two neighbours is outside the neighbourhood
        assert_eq!(session.visible_counts(), (3, 2));

        let outcome = session.set_parameter(ABS_REL_RISK_PARAM, ParamValue::Number(2.0));
        assert!(matches!(outcome, SelectionOutcome::Reapplied(_)));
        assert_eq!(session.visible_counts(), (2, 1));
        assert!(session.layout().last_run().unwrap().randomize);

        let outcome = session.set_parameter(ABS_REL_RISK_PARAM, ParamValue::Number(5.0));
        assert_eq!(outcome, SelectionOutcome::Cleared);
        assert!(session.selected_node_ids().is_empty());
        assert_eq!(session.visible_counts(), (2, 1));
    }

    #[tokio::test]
    async fn test_select_moves_highlight_to_node_outside_it() {
        let mut session = diseases_session().await;
        session.set_parameter(ABS_REL_RISK_PARAM, ParamValue::Number(1.5));
        assert_eq!(session.visible_counts(), (3, 2));

        session.select([key(&session, "D10")]);
        assert_eq!(session.visible_counts(), (2, 1));
        let d11 = key(&session, "D11");
        assert!(!session.store().is_node_visible(d11));

        session.select([d11]);
        assert_eq!(session.selected_node_ids(), vec!["D11"]);
        assert!(session.store().is_node_visible(d11));
        assert!(!session.store().is_node_visible(key(&session, "D10")));
        assert_eq!(session.visible_counts(), (2, 1));
    }

    #[tokio::test]
    async fn test_add_selection_ignores_filtered_ids() {
        let mut session = diseases_session().await;
        session.add_selection_by_ids(&["D10".to_string(), "D11".to_string(), "nope".to_string()]);
        assert_eq!(session.selected_node_ids(), vec!["D11"]);

        session.add_selection_by_ids(&["D20".to_string()]);
        assert_eq!(session.selected_node_ids(), vec!["D11", "D20"]);
    }

    #[tokio::test]
    async fn test_edge_selection_selects_endpoints() {
        let mut session = diseases_session().await;
        let edge = session.store().edge_key("DC2").unwrap();
        let mut elements = ElementSet::new();
        elements.edges.insert(edge);
        session.select_elements(elements);
        assert_eq!(session.selected_node_ids(), vec!["D11", "D20"]);

        session.unselect_all();
        assert!(session.state().selection().is_none());
        assert!(!session.layout().last_run().unwrap().randomize);
    }

    #[tokio::test]
    async fn test_next_view_needs_minimum_selection() {
        let mut session = diseases_session().await;
        session.select([key(&session, "D11")]);
        assert_eq!(session.next_view_request(), None);

        session.add_selection_by_ids(&["D20".to_string()]);
        let request = session.next_view_request().unwrap();
        assert_eq!(request.target_view, "patient_subgroups");
        assert_eq!(request.params, vec!["11", "20"]);
    }

    #[tokio::test]
    async fn test_filter_on_edge_sets_cutoff() {
        let mut session = diseases_session().await;
        session.set_parameter(ABS_REL_RISK_PARAM, ParamValue::Number(0.0));

        let changed = session.filter_on_element("DC1");
        assert_eq!(changed, vec![ABS_REL_RISK_PARAM.to_string()]);
        assert_eq!(session.parameters().get(ABS_REL_RISK_PARAM), Some(&ParamValue::Number(2.0)));
        assert_eq!(session.visible_counts(), (3, 2));

        assert!(session.filter_on_element("DC1").is_empty());
        assert!(session.filter_on_element("missing").is_empty());
    }

    #[tokio::test]
    async fn test_activate_restores_saved_state() {
        let view = DiseasesView::new(sample_repository(), 0.95);
        let dataset = view.load_dataset(&[]).await.unwrap();
        let mut saved = view.initial_parameters(&dataset);
        saved.insert(ABS_REL_RISK_PARAM.to_string(), ParamValue::Number(0.0));

        let mut session = ExplorerSession::new(NullLayout::new());
        session.activate(&view, dataset, Some(saved), &["D11".to_string(), "D99".to_string()]);
        assert_eq!(session.selected_node_ids(), vec!["D11"]);
        assert_eq!(session.parameters().get(ABS_REL_RISK_PARAM), Some(&ParamValue::Number(0.0)));
        // all three diseases neighbour D11
        assert_eq!(session.visible_counts(), (3, 2));
    }

    #[tokio::test]
    async fn test_snapshot_and_search() {
        let session = diseases_session().await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.view, "diseases");
        assert_eq!(snapshot.elements.nodes.len(), 2);
        assert_eq!(snapshot.elements.edges.len(), 1);

        assert_eq!(session.search("parkinson"), vec!["D11"]);
        // filtered out
        assert!(session.search("alzheimer").is_empty());
    }
}
