/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable element shape shared by exports and embedders.
//!
//! Every element is `{ "data": { "id", ...attributes }, "classes"? }`. Nodes
//! carry their container in `data.parent`, edges their endpoints in
//! `data.source` / `data.target`. Positions are only present on exports.

use super::{Attributes, Edge, Node, WEIGHT_ATTR};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ID_KEY: &str = "id";
const PARENT_KEY: &str = "parent";
const SOURCE_KEY: &str = "source";
const TARGET_KEY: &str = "target";

/// Position attached to exported nodes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ElementPosition {
    pub x: f32,
    pub y: f32,
}

/// One element in wire form
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ElementJson {
    pub data: Attributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ElementPosition>,
}

impl ElementJson {
    pub fn id(&self) -> Option<&str> {
        self.data.get(ID_KEY).and_then(Value::as_str)
    }

    /// Decode a node; `None` when `data.id` is missing.
    pub fn into_node(mut self) -> Option<Node> {
        let id = take_string(&mut self.data, ID_KEY)?;
        let parent_id = take_string(&mut self.data, PARENT_KEY);
        Some(Node {
            id,
            attributes: self.data,
            parent_id,
            classes: self.classes,
        })
    }

    /// Decode an edge; `None` when an id or endpoint is missing.
    /// A missing or non-numeric `weight` decodes as zero.
    pub fn into_edge(mut self) -> Option<Edge> {
        let id = take_string(&mut self.data, ID_KEY)?;
        let source_id = take_string(&mut self.data, SOURCE_KEY)?;
        let target_id = take_string(&mut self.data, TARGET_KEY)?;
        let weight = self
            .data
            .get(WEIGHT_ATTR)
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        Some(Edge {
            id,
            source_id,
            target_id,
            weight,
            attributes: self.data,
            classes: self.classes,
        })
    }
}

fn take_string(data: &mut Attributes, key: &str) -> Option<String> {
    match data.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            // non-string ids are kept as attributes so nothing is lost
            data.insert(key.to_string(), other);
            None
        },
        None => None,
    }
}

impl From<&Node> for ElementJson {
    fn from(node: &Node) -> Self {
        let mut data = Attributes::new();
        data.insert(ID_KEY.to_string(), Value::from(node.id.clone()));
        for (k, v) in &node.attributes {
            data.insert(k.clone(), v.clone());
        }
        if let Some(parent) = &node.parent_id {
            data.insert(PARENT_KEY.to_string(), Value::from(parent.clone()));
        }
        ElementJson {
            data,
            classes: node.classes.clone(),
            position: None,
        }
    }
}

impl From<&Edge> for ElementJson {
    fn from(edge: &Edge) -> Self {
        let mut data = Attributes::new();
        data.insert(ID_KEY.to_string(), Value::from(edge.id.clone()));
        for (k, v) in &edge.attributes {
            data.insert(k.clone(), v.clone());
        }
        data.insert(SOURCE_KEY.to_string(), Value::from(edge.source_id.clone()));
        data.insert(TARGET_KEY.to_string(), Value::from(edge.target_id.clone()));
        data.insert(WEIGHT_ATTR.to_string(), Value::from(edge.weight));
        ElementJson {
            data,
            classes: edge.classes.clone(),
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_wire_shape() {
        let node = Node::new("D7")
            .with_attr("name", "Asthma")
            .with_parent("DG2")
            .with_classes("D");
        let json = serde_json::to_value(ElementJson::from(&node)).unwrap();
        assert_eq!(
            json,
            json!({
                "data": { "id": "D7", "name": "Asthma", "parent": "DG2" },
                "classes": "D"
            })
        );
    }

    #[test]
    fn test_edge_wire_shape_carries_endpoints() {
        let edge = Edge::new("DC0", "D1", "D2", -2.5).with_attr("rel_risk", -2.5);
        let element = ElementJson::from(&edge);
        assert_eq!(element.id(), Some("DC0"));
        assert_eq!(element.data["source"], json!("D1"));
        assert_eq!(element.data["target"], json!("D2"));
        assert_eq!(element.data["weight"], json!(-2.5));
        assert!(element.classes.is_none());
    }

    #[test]
    fn test_decode_node_from_json() {
        let element: ElementJson = serde_json::from_value(json!({
            "data": { "id": "PSG3", "parent": "D1", "size": 12 },
            "classes": "PSG"
        }))
        .unwrap();
        let node = element.into_node().unwrap();
        assert_eq!(node.id, "PSG3");
        assert_eq!(node.parent_id.as_deref(), Some("D1"));
        assert_eq!(node.attribute("size"), Some(&json!(12)));
        assert!(node.attribute("parent").is_none());
    }

    #[test]
    fn test_decode_edge_requires_endpoints() {
        let element: ElementJson =
            serde_json::from_value(json!({ "data": { "id": "e", "source": "a" } })).unwrap();
        assert!(element.into_edge().is_none());

        let element: ElementJson = serde_json::from_value(json!({
            "data": { "id": "e", "source": "a", "target": "b", "weight": 3 }
        }))
        .unwrap();
        let edge = element.into_edge().unwrap();
        assert_eq!(edge.weight, 3.0);
        assert_eq!(edge.source_id, "a");
    }

    #[test]
    fn test_decode_node_without_id() {
        let element: ElementJson = serde_json::from_value(json!({ "data": { "id": 4 } })).unwrap();
        assert!(element.into_node().is_none());
    }
}
