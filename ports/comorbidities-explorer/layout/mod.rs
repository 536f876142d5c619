/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layout of the visible subgraph.
//!
//! The session only talks to `LayoutEngine`. Implementations:
//! - `NullLayout`: records runs, computes nothing
//! - `ForceLayout`: synchronous spring/repulsion simulation
//! - `LayoutWorker`: `ForceLayout` on a background thread

use crate::graph::GraphStore;
use crate::view_state::Parameters;
use euclid::default::Point2D;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod force;
pub mod spatial;
pub mod worker;

pub use force::{ForceLayout, LayoutJob};
pub use worker::LayoutWorker;

/// Parameter naming the layout algorithm of a view
pub const ALGORITHM_PARAM: &str = "name";

/// Parameter overriding the ideal edge length
pub const EDGE_LENGTH_PARAM: &str = "edgeLengthVal";

/// Force layout tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Simulation steps per run
    pub iterations: usize,

    /// Ideal edge length, unless the view sets `edgeLengthVal`
    pub spring_length: f32,

    /// Repulsion strength between nodes
    pub repulsion_strength: f32,

    /// Spring strength for edges (Hooke's law)
    pub spring_strength: f32,

    /// Velocity damping factor (0.0 - 1.0)
    pub damping: f32,

    /// Runs end early once every node moves slower than this
    pub velocity_threshold: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            spring_length: 45.0,
            repulsion_strength: 5000.0,
            spring_strength: 0.1,
            damping: 0.92,
            velocity_threshold: 0.01,
        }
    }
}

/// Positions the visible part of a graph
pub trait LayoutEngine: Send {
    /// Abandon any run in progress
    fn stop(&mut self);

    /// Lay out the visible elements of `store`. With `randomize`, previous
    /// positions are discarded.
    fn run(&mut self, store: &GraphStore, params: &Parameters, randomize: bool);

    /// Latest known position of each laid-out node, by node id
    fn positions(&self) -> HashMap<String, Point2D<f32>>;
}

impl<T: LayoutEngine + ?Sized> LayoutEngine for Box<T> {
    fn stop(&mut self) {
        (**self).stop();
    }

    fn run(&mut self, store: &GraphStore, params: &Parameters, randomize: bool) {
        (**self).run(store, params, randomize);
    }

    fn positions(&self) -> HashMap<String, Point2D<f32>> {
        (**self).positions()
    }
}

/// One recorded `NullLayout::run`
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRun {
    pub algorithm: Option<String>,
    pub visible_nodes: usize,
    pub visible_edges: usize,
    pub randomize: bool,
}

/// Layout engine that only records what it was asked to do
#[derive(Debug, Default)]
pub struct NullLayout {
    pub runs: Vec<LayoutRun>,
    pub stops: usize,
}

impl NullLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_run(&self) -> Option<&LayoutRun> {
        self.runs.last()
    }
}

impl LayoutEngine for NullLayout {
    fn stop(&mut self) {
        self.stops += 1;
    }

    fn run(&mut self, store: &GraphStore, params: &Parameters, randomize: bool) {
        self.runs.push(LayoutRun {
            algorithm: params
                .get(ALGORITHM_PARAM)
                .and_then(|v| v.as_str())
                .map(str::to_string),
            visible_nodes: store.visible_node_count(),
            visible_edges: store.visible_edge_count(),
            randomize,
        });
    }

    fn positions(&self) -> HashMap<String, Point2D<f32>> {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::path_store;
    use crate::view_state::ParamValue;

    #[test]
    fn test_null_layout_records_runs() {
        let store = path_store();
        let params = Parameters::from([(ALGORITHM_PARAM.to_string(), ParamValue::from("cose"))]);
        let mut layout = NullLayout::new();
        layout.stop();
        layout.run(&store, &params, true);

        assert_eq!(layout.stops, 1);
        assert_eq!(
            layout.last_run(),
            Some(&LayoutRun {
                algorithm: Some("cose".to_string()),
                visible_nodes: 3,
                visible_edges: 2,
                randomize: true,
            })
        );
        assert!(layout.positions().is_empty());
    }

    #[test]
    fn test_boxed_engine_positions_visible_nodes() {
        let store = path_store();
        let mut layout: Box<dyn LayoutEngine> = Box::new(ForceLayout::seeded(LayoutConfig::default(), 7));
        layout.run(&store, &Parameters::new(), true);
        layout.stop();
        let positions = layout.positions();
        assert_eq!(positions.len(), 3);
        assert!(positions.contains_key("n2"));
    }

    #[test]
    fn test_layout_config_partial_toml() {
        let config: LayoutConfig = toml::from_str("iterations = 10").unwrap();
        assert_eq!(config.iterations, 10);
        assert_eq!(config.damping, LayoutConfig::default().damping);
    }
}
