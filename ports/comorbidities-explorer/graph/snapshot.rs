/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Export of the visible graph as a JSON document.

use super::elements::{ElementJson, ElementPosition};
use super::{Edge, GraphStore, Node};
use euclid::default::Point2D;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Visible elements grouped by kind
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SnapshotElements {
    pub nodes: Vec<ElementJson>,
    pub edges: Vec<ElementJson>,
}

/// Exported state of one view
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GraphSnapshot {
    pub view: String,
    pub timestamp_secs: u64,
    pub elements: SnapshotElements,
}

impl GraphSnapshot {
    /// Capture the visible part of `store`. Nodes found in `positions` carry
    /// their laid-out coordinates.
    pub fn capture(
        view: &str,
        store: &GraphStore,
        positions: &HashMap<String, Point2D<f32>>,
    ) -> Self {
        let nodes = store
            .visible_nodes()
            .map(|(_, node)| {
                let mut element = ElementJson::from(node);
                element.position = positions
                    .get(&node.id)
                    .map(|p| ElementPosition { x: p.x, y: p.y });
                element
            })
            .collect();

        let edges = store
            .visible_edges()
            .map(|(_, edge)| ElementJson::from(edge))
            .collect();

        let timestamp_secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        GraphSnapshot {
            view: view.to_string(),
            timestamp_secs,
            elements: SnapshotElements { nodes, edges },
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
            .map_err(std::io::Error::other)
    }

    /// Decode back into elements, dropping any that lack ids or endpoints
    pub fn into_elements(self) -> (Vec<Node>, Vec<Edge>) {
        let nodes = self
            .elements
            .nodes
            .into_iter()
            .filter_map(ElementJson::into_node)
            .collect();
        let edges = self
            .elements
            .edges
            .into_iter()
            .filter_map(ElementJson::into_edge)
            .collect();
        (nodes, edges)
    }
}
