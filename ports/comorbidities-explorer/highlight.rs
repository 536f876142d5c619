/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Neighborhood isolation around a selection.

use crate::graph::{ElementSet, GraphStore};
use crate::view_state::{HighlightState, ViewState};
use log::debug;

/// Closed neighborhood of `selection` over the visible graph: the selection,
/// its visible incident edges, their endpoints and every ancestor of the
/// nodes gathered so far.
pub fn neighborhood(store: &GraphStore, selection: &ElementSet) -> ElementSet {
    let mut hood = selection.clone();

    for &node in &selection.nodes {
        for edge in store.visible_incident_edges(node) {
            hood.edges.insert(edge);
            if let Some((source, target)) = store.endpoints(edge) {
                hood.nodes.insert(source);
                hood.nodes.insert(target);
            }
        }
    }

    let ancestors: Vec<_> = hood
        .nodes
        .iter()
        .flat_map(|&node| store.ancestors(node))
        .collect();
    hood.nodes.extend(ancestors);
    hood
}

/// Isolate `selection`, or drop back to idle when it is empty.
///
/// The previous highlight is always undone first, so calling this twice with
/// the same selection leaves the same visible graph.
pub fn highlight(store: &mut GraphStore, state: &mut ViewState, selection: ElementSet) {
    clear(store, state);
    if selection.nodes.is_empty() {
        return;
    }

    let hood = neighborhood(store, &selection);
    let mut outside = store.visible_elements();
    outside.nodes.retain(|key| !hood.nodes.contains(key));
    outside.edges.retain(|key| !hood.edges.contains(key));

    let handle = store.hide(&outside);
    debug!(
        "Highlight of {} nodes keeps {} elements, hides {}",
        selection.nodes.len(),
        hood.len(),
        handle.len()
    );
    state.hidden_by_highlight = Some(handle);
    state.highlight = HighlightState::Highlighted { selection };
}

/// Undo the current highlight, if any
pub fn clear(store: &mut GraphStore, state: &mut ViewState) {
    if let Some(handle) = state.hidden_by_highlight.take() {
        store.restore(handle);
    }
    state.highlight = HighlightState::Idle;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::path_store;
    use crate::graph::{Edge, Node};
    use std::collections::BTreeSet;

    #[test]
    fn test_neighborhood_of_path_end() {
        let mut store = path_store();
        let n1 = store.node_key("n1").unwrap();
        let mut state = ViewState::default();
        highlight(&mut store, &mut state, ElementSet::from_nodes([n1]));

        let visible = store.visible_elements();
        assert_eq!(
            visible.nodes,
            BTreeSet::from([n1, store.node_key("n2").unwrap()])
        );
        assert_eq!(visible.edges, BTreeSet::from([store.edge_key("e12").unwrap()]));
        assert_eq!(
            state.selection(),
            Some(&ElementSet::from_nodes([n1]))
        );
    }

    #[test]
    fn test_highlight_is_idempotent() {
        let mut store = path_store();
        let n2 = store.node_key("n2").unwrap();
        let mut state = ViewState::default();

        highlight(&mut store, &mut state, ElementSet::from_nodes([n2]));
        let once = store.visible_elements();
        highlight(&mut store, &mut state, ElementSet::from_nodes([n2]));
        assert_eq!(store.visible_elements(), once);
    }

    #[test]
    fn test_empty_selection_restores_everything() {
        let mut store = path_store();
        let before = store.visible_elements();
        let n1 = store.node_key("n1").unwrap();
        let mut state = ViewState::default();

        highlight(&mut store, &mut state, ElementSet::from_nodes([n1]));
        highlight(&mut store, &mut state, ElementSet::new());
        assert_eq!(store.visible_elements(), before);
        assert_eq!(state.highlight, HighlightState::Idle);
        assert!(state.hidden_by_highlight.is_none());
    }

    #[test]
    fn test_neighborhood_includes_ancestors() {
        let mut store = GraphStore::new();
        store.load(
            vec![
                Node::new("DG1"),
                Node::new("D1").with_parent("DG1"),
                Node::new("PSG1").with_parent("D1"),
                Node::new("DG2"),
                Node::new("D2").with_parent("DG2"),
                Node::new("PSG2").with_parent("D2"),
                Node::new("PSG3").with_parent("D2"),
            ],
            vec![
                Edge::new("PSGC0", "PSG1", "PSG2", 2.0),
                Edge::new("PSGC1", "PSG2", "PSG3", 2.0),
            ],
        );
        let psg1 = store.node_key("PSG1").unwrap();
        let hood = neighborhood(&store, &ElementSet::from_nodes([psg1]));

        let ids: BTreeSet<&str> = hood
            .nodes
            .iter()
            .filter_map(|&k| store.node(k).map(|n| n.id.as_str()))
            .collect();
        assert_eq!(
            ids,
            BTreeSet::from(["D1", "D2", "DG1", "DG2", "PSG1", "PSG2"])
        );
        assert_eq!(hood.edges.len(), 1);
    }

    #[test]
    fn test_neighborhood_ignores_hidden_edges() {
        let mut store = path_store();
        let n2 = store.node_key("n2").unwrap();
        let mut hidden = ElementSet::new();
        hidden.edges.insert(store.edge_key("e23").unwrap());
        let _handle = store.hide(&hidden);

        let hood = neighborhood(&store, &ElementSet::from_nodes([n2]));
        assert!(!hood.contains_node(store.node_key("n3").unwrap()));
        assert!(hood.contains_node(store.node_key("n1").unwrap()));
    }
}
