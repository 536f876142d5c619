/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph store for the active view.
//!
//! Core structures:
//! - `GraphStore`: the single displayed graph, backed by petgraph::StableGraph
//! - `Node` / `Edge`: attributed elements with namespaced string ids
//! - `ElementSet`: a set of node and edge handles
//! - `HiddenHandle`: proof of a hide, consumed by `GraphStore::restore`
//!
//! Elements are never removed while a view is active. Hiding flips a
//! visibility flag, so restoring is exact and cheap.

use log::debug;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

pub mod elements;
pub mod snapshot;

/// Stable node handle (petgraph NodeIndex, valid until the next `load`)
pub type NodeKey = NodeIndex;

/// Stable edge handle (petgraph EdgeIndex, valid until the next `load`)
pub type EdgeKey = EdgeIndex;

/// Free-form element attributes, as carried by the wire shape
pub type Attributes = Map<String, Value>;

/// Attribute holding the signed edge weight
pub const WEIGHT_ATTR: &str = "weight";

/// Attribute holding `|weight|`, derived once at ingestion
pub const ABSOLUTE_WEIGHT_ATTR: &str = "absoluteWeight";

/// A graph node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Globally unique id, namespaced by a type prefix (`D12`, `PSG3`, ...)
    pub id: String,

    pub attributes: Attributes,

    /// Compound container this node belongs to
    pub parent_id: Option<String>,

    /// Style classes carried through to exports
    pub classes: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
            parent_id: None,
            classes: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.classes = Some(classes.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// A graph edge between two node ids
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,

    /// Signed weight (relative risk, regulation sign, patient count)
    pub weight: f64,

    pub attributes: Attributes,
    pub classes: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            weight,
            attributes: Attributes::new(),
            classes: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.classes = Some(classes.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn absolute_weight(&self) -> f64 {
        self.weight.abs()
    }
}

/// Which kind of element a filter or query addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Nodes,
    Edges,
}

/// Borrowed view of either element kind
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Node(&'a Node),
    Edge(&'a Edge),
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ElementRef::Node(n) => &n.id,
            ElementRef::Edge(e) => &e.id,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&'a Value> {
        match self {
            ElementRef::Node(n) => n.attributes.get(name),
            ElementRef::Edge(e) => e.attributes.get(name),
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            ElementRef::Node(_) => Scope::Nodes,
            ElementRef::Edge(_) => Scope::Edges,
        }
    }
}

/// A set of nodes and edges of one graph instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSet {
    pub nodes: BTreeSet<NodeKey>,
    pub edges: BTreeSet<EdgeKey>,
}

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeKey>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            edges: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    pub fn merge(&mut self, other: ElementSet) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains(&key)
    }

    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edges.contains(&key)
    }
}

/// Record of one `hide` call.
///
/// Only holds elements that were visible when hidden, so restoring it can
/// never reveal something another handle is still responsible for.
#[derive(Debug)]
#[must_use = "a dropped handle can no longer restore what it hid"]
pub struct HiddenHandle {
    epoch: u64,
    elements: ElementSet,
}

impl HiddenHandle {
    pub fn elements(&self) -> &ElementSet {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Fold `other` into this handle. Handles of different epochs never
    /// describe the same graph, so a mismatched one is dropped.
    pub fn absorb(&mut self, other: HiddenHandle) {
        if other.epoch != self.epoch {
            debug!(
                "Dropping hidden handle from epoch {} while merging into {}",
                other.epoch, self.epoch
            );
            return;
        }
        self.elements.merge(other.elements);
    }
}

/// Summary of a `load`, mostly useful for logging data-shape issues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes: usize,
    pub edges: usize,
    pub duplicate_ids: usize,
    pub detached_parents: usize,
    pub skipped_edges: usize,
}

#[derive(Debug, Clone)]
struct NodeSlot {
    node: Node,
    visible: bool,
}

#[derive(Debug, Clone)]
struct EdgeSlot {
    edge: Edge,
    visible: bool,
}

/// The one graph instance of the active view
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    inner: StableGraph<NodeSlot, EdgeSlot, Directed>,

    node_ids: HashMap<String, NodeKey>,
    edge_ids: HashMap<String, EdgeKey>,

    /// Resolved compound membership (child -> parent)
    parents: HashMap<NodeKey, NodeKey>,

    /// Nodes that are the parent of at least one loaded node
    groups: HashSet<NodeKey>,

    /// Bumped by every `load`; handles from older epochs are inert
    epoch: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents wholesale.
    ///
    /// Nodes naming an unknown parent lose the parent; edges naming an unknown
    /// endpoint are skipped. Both are data-shape problems, not failures.
    pub fn load(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> LoadReport {
        self.inner = StableGraph::new();
        self.node_ids.clear();
        self.edge_ids.clear();
        self.parents.clear();
        self.groups.clear();
        self.epoch += 1;

        let mut report = LoadReport::default();

        for node in nodes {
            if self.node_ids.contains_key(&node.id) {
                debug!("Duplicate node id {} ignored", node.id);
                report.duplicate_ids += 1;
                continue;
            }
            let id = node.id.clone();
            let key = self.inner.add_node(NodeSlot {
                node,
                visible: true,
            });
            self.node_ids.insert(id, key);
            report.nodes += 1;
        }

        let keys: Vec<NodeKey> = self.inner.node_indices().collect();
        for key in keys {
            let Some(parent_id) = self.inner[key].node.parent_id.clone() else {
                continue;
            };
            match self.node_ids.get(&parent_id) {
                Some(&parent) if parent != key => {
                    self.parents.insert(key, parent);
                    self.groups.insert(parent);
                },
                _ => {
                    debug!(
                        "Node {} refers to missing parent {parent_id}",
                        self.inner[key].node.id
                    );
                    self.inner[key].node.parent_id = None;
                    report.detached_parents += 1;
                },
            }
        }

        for mut edge in edges {
            if self.edge_ids.contains_key(&edge.id) {
                debug!("Duplicate edge id {} ignored", edge.id);
                report.duplicate_ids += 1;
                continue;
            }
            let endpoints = (
                self.node_ids.get(&edge.source_id).copied(),
                self.node_ids.get(&edge.target_id).copied(),
            );
            let (Some(source), Some(target)) = endpoints else {
                debug!(
                    "Edge {} skipped: endpoint {} or {} is not loaded",
                    edge.id, edge.source_id, edge.target_id
                );
                report.skipped_edges += 1;
                continue;
            };
            edge.attributes
                .insert(WEIGHT_ATTR.to_string(), Value::from(edge.weight));
            edge.attributes.insert(
                ABSOLUTE_WEIGHT_ATTR.to_string(),
                Value::from(edge.absolute_weight()),
            );
            let id = edge.id.clone();
            let key = self.inner.add_edge(source, target, EdgeSlot {
                edge,
                visible: true,
            });
            self.edge_ids.insert(id, key);
            report.edges += 1;
        }

        debug!(
            "Graph loaded: {} nodes, {} edges ({} skipped edges, {} detached parents)",
            report.nodes, report.edges, report.skipped_edges, report.detached_parents
        );
        report
    }

    /// Load generation of the current contents
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Make `elements` invisible and return a handle for exactly those that
    /// were visible. Nodes and edges are independent: hiding one never hides
    /// the other.
    pub fn hide(&mut self, elements: &ElementSet) -> HiddenHandle {
        let mut hidden = ElementSet::new();
        for &key in &elements.nodes {
            if let Some(slot) = self.inner.node_weight_mut(key) {
                if slot.visible {
                    slot.visible = false;
                    hidden.nodes.insert(key);
                }
            }
        }
        for &key in &elements.edges {
            if let Some(slot) = self.inner.edge_weight_mut(key) {
                if slot.visible {
                    slot.visible = false;
                    hidden.edges.insert(key);
                }
            }
        }
        HiddenHandle {
            epoch: self.epoch,
            elements: hidden,
        }
    }

    /// Make the elements of `handle` visible again. Returns how many elements
    /// changed state; already-visible ones are skipped silently.
    pub fn restore(&mut self, handle: HiddenHandle) -> usize {
        if handle.epoch != self.epoch {
            debug!(
                "Ignoring hidden handle from epoch {} (store is at {})",
                handle.epoch, self.epoch
            );
            return 0;
        }
        let mut restored = 0;
        for key in handle.elements.nodes {
            if let Some(slot) = self.inner.node_weight_mut(key) {
                if !slot.visible {
                    slot.visible = true;
                    restored += 1;
                }
            }
        }
        for key in handle.elements.edges {
            if let Some(slot) = self.inner.edge_weight_mut(key) {
                if !slot.visible {
                    slot.visible = true;
                    restored += 1;
                }
            }
        }
        restored
    }

    /// All visible elements of `scope` matching `predicate`
    pub fn query<F>(&self, scope: Scope, predicate: F) -> ElementSet
    where
        F: Fn(ElementRef<'_>) -> bool,
    {
        let mut found = ElementSet::new();
        match scope {
            Scope::Nodes => {
                found.nodes = self
                    .visible_nodes()
                    .filter(|(_, node)| predicate(ElementRef::Node(node)))
                    .map(|(key, _)| key)
                    .collect();
            },
            Scope::Edges => {
                found.edges = self
                    .visible_edges()
                    .filter(|(_, edge)| predicate(ElementRef::Edge(edge)))
                    .map(|(key, _)| key)
                    .collect();
            },
        }
        found
    }

    /// Every visible node and edge
    pub fn visible_elements(&self) -> ElementSet {
        ElementSet {
            nodes: self.visible_nodes().map(|(key, _)| key).collect(),
            edges: self.visible_edges().map(|(key, _)| key).collect(),
        }
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.inner.node_weight(key).map(|slot| &slot.node)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.inner.edge_weight(key).map(|slot| &slot.edge)
    }

    pub fn node_key(&self, id: &str) -> Option<NodeKey> {
        self.node_ids.get(id).copied()
    }

    pub fn edge_key(&self, id: &str) -> Option<EdgeKey> {
        self.edge_ids.get(id).copied()
    }

    pub fn is_node_visible(&self, key: NodeKey) -> bool {
        self.inner.node_weight(key).is_some_and(|slot| slot.visible)
    }

    pub fn is_edge_visible(&self, key: EdgeKey) -> bool {
        self.inner.edge_weight(key).is_some_and(|slot| slot.visible)
    }

    /// Iterate over all loaded nodes, hidden or not
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.inner
            .node_indices()
            .map(move |key| (key, &self.inner[key].node))
    }

    /// Iterate over all loaded edges, hidden or not
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> {
        self.inner
            .edge_indices()
            .map(move |key| (key, &self.inner[key].edge))
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.inner
            .node_indices()
            .filter(move |&key| self.inner[key].visible)
            .map(move |key| (key, &self.inner[key].node))
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> {
        self.inner
            .edge_indices()
            .filter(move |&key| self.inner[key].visible)
            .map(move |key| (key, &self.inner[key].edge))
    }

    /// Source and target of an edge
    pub fn endpoints(&self, key: EdgeKey) -> Option<(NodeKey, NodeKey)> {
        self.inner.edge_endpoints(key)
    }

    /// Edges touching `key` in either direction, hidden or not
    pub fn incident_edges(&self, key: NodeKey) -> BTreeSet<EdgeKey> {
        self.inner
            .edges_directed(key, Direction::Outgoing)
            .chain(self.inner.edges_directed(key, Direction::Incoming))
            .map(|edge| edge.id())
            .collect()
    }

    /// Visible edges touching `key`
    pub fn visible_incident_edges(&self, key: NodeKey) -> BTreeSet<EdgeKey> {
        self.incident_edges(key)
            .into_iter()
            .filter(|&edge| self.is_edge_visible(edge))
            .collect()
    }

    /// Degree over visible edges only
    pub fn visible_degree(&self, key: NodeKey) -> usize {
        self.visible_incident_edges(key).len()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.parents.get(&key).copied()
    }

    /// Transitive parents of `key`, nearest first
    pub fn ancestors(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([key]);
        let mut current = key;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Whether `key` is a compound container of some loaded node
    pub fn is_group(&self, key: NodeKey) -> bool {
        self.groups.contains(&key)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn visible_node_count(&self) -> usize {
        self.visible_nodes().count()
    }

    pub fn visible_edge_count(&self) -> usize {
        self.visible_edges().count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// `n1 - n2 - n3` path with edge weights 1, -4
    pub(crate) fn path_store() -> GraphStore {
        let mut store = GraphStore::new();
        store.load(
            vec![Node::new("n1"), Node::new("n2"), Node::new("n3")],
            vec![
                Edge::new("e12", "n1", "n2", 1.0),
                Edge::new("e23", "n2", "n3", -4.0),
            ],
        );
        store
    }

    fn key(store: &GraphStore, id: &str) -> NodeKey {
        store.node_key(id).unwrap()
    }

    #[test]
    fn test_store_new() {
        let store = GraphStore::new();
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.epoch(), 0);
    }

    #[test]
    fn test_load_derives_absolute_weight() {
        let store = path_store();
        let edge = store.edge(store.edge_key("e23").unwrap()).unwrap();
        assert_eq!(edge.attribute(WEIGHT_ATTR), Some(&Value::from(-4.0)));
        assert_eq!(edge.attribute(ABSOLUTE_WEIGHT_ATTR), Some(&Value::from(4.0)));
    }

    #[test]
    fn test_load_replaces_contents() {
        let mut store = path_store();
        let first_epoch = store.epoch();
        store.load(vec![Node::new("x")], vec![]);

        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
        assert!(store.node_key("n1").is_none());
        assert!(store.epoch() > first_epoch);
    }

    #[test]
    fn test_load_skips_edges_with_missing_endpoints() {
        let mut store = GraphStore::new();
        let report = store.load(
            vec![Node::new("a"), Node::new("b")],
            vec![
                Edge::new("ab", "a", "b", 2.0),
                Edge::new("az", "a", "zzz", 2.0),
            ],
        );
        assert_eq!(report.edges, 1);
        assert_eq!(report.skipped_edges, 1);
        assert!(store.edge_key("az").is_none());
    }

    #[test]
    fn test_load_detaches_missing_parent() {
        let mut store = GraphStore::new();
        let report = store.load(
            vec![Node::new("D1").with_parent("DG9"), Node::new("DG1"), Node::new("D2").with_parent("DG1")],
            vec![],
        );
        assert_eq!(report.detached_parents, 1);

        let d1 = key(&store, "D1");
        let d2 = key(&store, "D2");
        let dg1 = key(&store, "DG1");
        assert_eq!(store.node(d1).unwrap().parent_id, None);
        assert_eq!(store.parent(d2), Some(dg1));
        assert!(store.is_group(dg1));
        assert!(!store.is_group(d1));
    }

    #[test]
    fn test_load_ignores_duplicate_ids() {
        let mut store = GraphStore::new();
        let report = store.load(
            vec![Node::new("a").with_attr("v", 1), Node::new("a").with_attr("v", 2)],
            vec![],
        );
        assert_eq!(report.duplicate_ids, 1);
        let node = store.node(key(&store, "a")).unwrap();
        assert_eq!(node.attribute("v"), Some(&Value::from(1)));
    }

    #[test]
    fn test_hide_does_not_cascade() {
        let mut store = path_store();
        let n2 = key(&store, "n2");
        let _handle = store.hide(&ElementSet::from_nodes([n2]));

        assert!(!store.is_node_visible(n2));
        // edges of a hidden node stay visible until hidden explicitly
        assert_eq!(store.visible_edge_count(), 2);
    }

    #[test]
    fn test_restore_is_inverse_of_hide() {
        let mut store = path_store();
        let before = store.visible_elements();

        let mut targets = ElementSet::from_nodes([key(&store, "n3")]);
        targets.edges.insert(store.edge_key("e23").unwrap());
        let handle = store.hide(&targets);
        assert_eq!(handle.len(), 2);
        assert_eq!(store.restore(handle), 2);
        assert_eq!(store.visible_elements(), before);

        let again = store.hide(&targets);
        let after_rehide = store.visible_elements();
        assert_eq!(store.restore(again), 2);
        assert_ne!(after_rehide, before);
        assert_eq!(store.visible_elements(), before);
    }

    #[test]
    fn test_handle_only_records_visible_elements() {
        let mut store = path_store();
        let n1 = key(&store, "n1");
        let n2 = key(&store, "n2");

        let first = store.hide(&ElementSet::from_nodes([n1]));
        let second = store.hide(&ElementSet::from_nodes([n1, n2]));
        assert_eq!(second.elements().nodes, BTreeSet::from([n2]));

        // restoring the second handle must not reveal what the first one hid
        store.restore(second);
        assert!(!store.is_node_visible(n1));
        assert!(store.is_node_visible(n2));
        store.restore(first);
        assert!(store.is_node_visible(n1));
    }

    #[test]
    fn test_absorbed_handles_restore_together() {
        let mut store = path_store();
        let mut first = store.hide(&ElementSet::from_nodes([key(&store, "n1")]));
        let second = store.hide(&ElementSet::from_nodes([key(&store, "n3")]));
        first.absorb(second);
        assert_eq!(first.len(), 2);

        assert_eq!(store.restore(first), 2);
        assert_eq!(store.visible_node_count(), 3);
    }

    #[test]
    fn test_restore_visible_is_noop() {
        let mut store = path_store();
        let handle = store.hide(&ElementSet::new());
        assert!(handle.is_empty());
        assert_eq!(store.restore(handle), 0);
        assert_eq!(store.visible_node_count(), 3);
    }

    #[test]
    fn test_restore_ignores_stale_epoch() {
        let mut store = path_store();
        let handle = store.hide(&ElementSet::from_nodes([key(&store, "n1")]));
        store.load(vec![Node::new("n1")], vec![]);
        let n1 = key(&store, "n1");

        assert_eq!(store.restore(handle), 0);
        assert!(store.is_node_visible(n1));
    }

    #[test]
    fn test_query_only_returns_visible() {
        let mut store = path_store();
        let e23 = store.edge_key("e23").unwrap();
        let heavy = store.query(Scope::Edges, |e| {
            e.attribute(ABSOLUTE_WEIGHT_ATTR).and_then(Value::as_f64) > Some(2.0)
        });
        assert_eq!(heavy.edges, BTreeSet::from([e23]));

        let _handle = store.hide(&heavy);
        let heavy = store.query(Scope::Edges, |e| {
            e.attribute(ABSOLUTE_WEIGHT_ATTR).and_then(Value::as_f64) > Some(2.0)
        });
        assert!(heavy.is_empty());
    }

    #[test]
    fn test_visible_degree() {
        let mut store = path_store();
        let n2 = key(&store, "n2");
        assert_eq!(store.visible_degree(n2), 2);

        let mut edges = ElementSet::new();
        edges.edges.insert(store.edge_key("e12").unwrap());
        let _handle = store.hide(&edges);
        assert_eq!(store.visible_degree(n2), 1);
        assert_eq!(store.visible_degree(key(&store, "n1")), 0);
    }

    #[test]
    fn test_ancestors_transitive() {
        let mut store = GraphStore::new();
        store.load(
            vec![
                Node::new("DG1"),
                Node::new("D1").with_parent("DG1"),
                Node::new("PSG1").with_parent("D1"),
            ],
            vec![],
        );
        let chain = store.ancestors(key(&store, "PSG1"));
        assert_eq!(chain, vec![key(&store, "D1"), key(&store, "DG1")]);
        assert!(store.ancestors(key(&store, "DG1")).is_empty());
    }

    #[test]
    fn test_ancestors_survive_parent_cycle() {
        let mut store = GraphStore::new();
        store.load(
            vec![Node::new("a").with_parent("b"), Node::new("b").with_parent("a")],
            vec![],
        );
        assert_eq!(store.ancestors(key(&store, "a")), vec![key(&store, "b")]);
    }
}
