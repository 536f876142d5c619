/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Force-directed layout.
//!
//! Uses:
//! - Spatial grid for near-neighbor repulsion
//! - Hooke's law springs on edges
//! - Velocity damping, early exit on convergence
//!
//! Compound containers are not simulated; they sit at the centroid of their
//! visible members.

use super::spatial::SpatialGrid;
use super::{EDGE_LENGTH_PARAM, LayoutConfig, LayoutEngine};
use crate::graph::{GraphStore, NodeKey};
use crate::view_state::Parameters;
use euclid::default::{Point2D, Vector2D};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};

/// Self-contained input of one layout run, detached from the store so it can
/// be shipped to a worker thread
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutJob {
    /// Simulated nodes (visible, not containers)
    pub nodes: Vec<String>,

    /// Springs, as indices into `nodes`
    pub edges: Vec<(usize, usize)>,

    /// Visible containers with the indices of their visible members
    pub groups: Vec<(String, Vec<usize>)>,

    pub spring_length: f32,
    pub randomize: bool,
}

impl LayoutJob {
    pub fn from_store(
        store: &GraphStore,
        params: &Parameters,
        config: &LayoutConfig,
        randomize: bool,
    ) -> Self {
        let mut slots: HashMap<NodeKey, usize> = HashMap::new();
        let mut nodes = Vec::new();
        let mut members: BTreeMap<NodeKey, Vec<usize>> = BTreeMap::new();

        for (key, node) in store.visible_nodes() {
            if store.is_group(key) {
                continue;
            }
            let slot = nodes.len();
            slots.insert(key, slot);
            nodes.push(node.id.clone());
            for ancestor in store.ancestors(key) {
                if store.is_node_visible(ancestor) {
                    members.entry(ancestor).or_default().push(slot);
                }
            }
        }

        let edges = store
            .visible_edges()
            .filter_map(|(key, _)| {
                let (source, target) = store.endpoints(key)?;
                Some((*slots.get(&source)?, *slots.get(&target)?))
            })
            .filter(|(a, b)| a != b)
            .collect();

        let groups = members
            .into_iter()
            .filter_map(|(key, slots)| Some((store.node(key)?.id.clone(), slots)))
            .collect();

        let spring_length = params
            .get(EDGE_LENGTH_PARAM)
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v as f32)
            .unwrap_or(config.spring_length);

        Self {
            nodes,
            edges,
            groups,
            spring_length,
            randomize,
        }
    }
}

/// Synchronous force-directed layout engine
pub struct ForceLayout {
    pub config: LayoutConfig,
    positions: HashMap<String, Point2D<f32>>,
    rng: StdRng,
}

impl ForceLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            positions: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic engine for reproducible layouts
    pub fn seeded(config: LayoutConfig, seed: u64) -> Self {
        Self {
            config,
            positions: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self, id: &str) -> Option<Point2D<f32>> {
        self.positions.get(id).copied()
    }

    /// Run the simulation for `job`, checking `cancelled` before every step.
    /// Returns the number of steps taken.
    pub fn simulate<F>(&mut self, job: &LayoutJob, cancelled: F) -> usize
    where
        F: Fn() -> bool,
    {
        let count = job.nodes.len();
        let length = job.spring_length.max(1.0);
        let spread = length * (count.max(1) as f32).sqrt();

        let mut positions: Vec<Point2D<f32>> = Vec::with_capacity(count);
        for id in &job.nodes {
            let previous = if job.randomize {
                None
            } else {
                self.positions.get(id).copied()
            };
            let position = match previous {
                Some(p) => p,
                None => Point2D::new(
                    self.rng.random_range(-spread..=spread) * 0.5,
                    self.rng.random_range(-spread..=spread) * 0.5,
                ),
            };
            positions.push(position);
        }

        let mut velocities = vec![Vector2D::<f32>::zero(); count];
        let mut grid = SpatialGrid::new(length * 3.0);
        let cutoff = grid.cell_size();
        let max_speed = length;

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];
        for &(a, b) in &job.edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        let mut steps = 0;
        while steps < self.config.iterations {
            if cancelled() {
                debug!("Layout cancelled after {steps} steps");
                break;
            }
            steps += 1;

            grid.clear();
            for (slot, position) in positions.iter().enumerate() {
                grid.insert(slot, *position);
            }

            for slot in 0..count {
                let here = positions[slot];
                let mut force = Vector2D::zero();

                for other in grid.query_nearby(here) {
                    if other == slot {
                        continue;
                    }
                    let delta = here - positions[other];
                    let distance = delta.length().max(1.0);
                    if distance < cutoff {
                        let direction = if delta.length() > 0.0 {
                            delta.normalize()
                        } else {
                            // coincident nodes are pushed apart along a slot-dependent axis
                            Vector2D::new(1.0, (slot as f32 - other as f32).signum())
                                .normalize()
                        };
                        force += direction * (self.config.repulsion_strength / (distance * distance));
                    }
                }

                for &other in &adjacency[slot] {
                    let delta = positions[other] - here;
                    let distance = delta.length();
                    if distance > 0.0 {
                        force += delta.normalize() * (self.config.spring_strength * (distance - length));
                    }
                }

                let mut velocity = (velocities[slot] + force) * self.config.damping;
                if velocity.length() > max_speed {
                    velocity = velocity.normalize() * max_speed;
                }
                velocities[slot] = velocity;
            }

            let mut fastest = 0.0_f32;
            for slot in 0..count {
                positions[slot] += velocities[slot];
                fastest = fastest.max(velocities[slot].length());
            }
            if fastest < self.config.velocity_threshold {
                break;
            }
        }

        self.positions = job.nodes.iter().cloned().zip(positions.iter().copied()).collect();
        for (group, slots) in &job.groups {
            if slots.is_empty() {
                continue;
            }
            let sum = slots
                .iter()
                .fold(Vector2D::zero(), |acc, &slot| acc + positions[slot].to_vector());
            self.positions
                .insert(group.clone(), (sum / slots.len() as f32).to_point());
        }

        debug!(
            "Layout of {} nodes, {} springs finished in {} steps",
            count,
            job.edges.len(),
            steps
        );
        steps
    }
}

impl LayoutEngine for ForceLayout {
    fn stop(&mut self) {
        // runs complete inside `run`, so there is never one to abandon
    }

    fn run(&mut self, store: &GraphStore, params: &Parameters, randomize: bool) {
        let job = LayoutJob::from_store(store, params, &self.config, randomize);
        self.simulate(&job, || false);
    }

    fn positions(&self) -> HashMap<String, Point2D<f32>> {
        self.positions.clone()
    }
}
