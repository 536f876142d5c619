/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Fuzzy search over the visible nodes.

use crate::graph::{GraphStore, NodeKey};
use nucleo::pattern::{CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher};

#[derive(Clone)]
struct SearchCandidate {
    key: NodeKey,
    text: String,
}

impl AsRef<str> for SearchCandidate {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Visible node keys ranked by fuzzy match of `query` against each node's
/// name, label and id.
pub fn fuzzy_match_visible_nodes(store: &GraphStore, query: &str) -> Vec<NodeKey> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let normalized_query = query.to_lowercase();
    let pattern = Pattern::parse(
        &normalized_query,
        CaseMatching::Respect,
        Normalization::Smart,
    );
    let mut matcher = Matcher::new(Config::DEFAULT);

    let candidates: Vec<SearchCandidate> = store
        .visible_nodes()
        .map(|(key, node)| {
            let text_of = |name: &str| {
                node.attribute(name)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .replace('\n', " ")
            };
            SearchCandidate {
                key,
                text: format!("{} {} {}", text_of("name"), text_of("label"), node.id)
                    .to_lowercase(),
            }
        })
        .collect();

    pattern
        .match_list(candidates, &mut matcher)
        .into_iter()
        .map(|(candidate, _score)| candidate.key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ElementSet, Node};

    fn diseases() -> GraphStore {
        let mut store = GraphStore::new();
        store.load(
            vec![
                Node::new("D10").with_attr("name", "Alzheimer disease"),
                Node::new("D11").with_attr("name", "Parkinson disease"),
                Node::new("D20").with_attr("name", "Hypertension"),
            ],
            Vec::new(),
        );
        store
    }

    #[test]
    fn test_fuzzy_match_tolerates_missing_letters() {
        let store = diseases();
        let matches = fuzzy_match_visible_nodes(&store, "alzhmr");
        assert_eq!(matches.first().copied(), store.node_key("D10"));

        let matches = fuzzy_match_visible_nodes(&store, "Parkinsn");
        assert_eq!(matches.first().copied(), store.node_key("D11"));
    }

    #[test]
    fn test_fuzzy_match_by_id() {
        let store = diseases();
        let matches = fuzzy_match_visible_nodes(&store, "d20");
        assert_eq!(matches.first().copied(), store.node_key("D20"));
    }

    #[test]
    fn test_hidden_nodes_are_not_matched() {
        let mut store = diseases();
        let Some(d10) = store.node_key("D10") else {
            panic!("D10 not loaded");
        };
        let _handle = store.hide(&ElementSet::from_nodes([d10]));
        assert!(fuzzy_match_visible_nodes(&store, "alzheimer").is_empty());
    }

    #[test]
    fn test_empty_query_returns_no_matches() {
        let store = diseases();
        assert!(fuzzy_match_visible_nodes(&store, "").is_empty());
        assert!(fuzzy_match_visible_nodes(&store, "   ").is_empty());
    }
}
