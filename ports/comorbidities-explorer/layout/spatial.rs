/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Uniform grid for near-neighbor repulsion.
//!
//! Items are simulation slots (indices into a `LayoutJob`), so the grid is
//! rebuilt every step from scratch.

use euclid::default::Point2D;
use std::collections::HashMap;

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, slot: usize, position: Point2D<f32>) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(slot);
    }

    /// Slots in the cell of `position` and the eight around it
    pub fn query_nearby(&self, position: Point2D<f32>) -> Vec<usize> {
        let (cx, cy) = self.cell_of(position);
        let mut nearby = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(slots) = self.cells.get(&(cx + dx, cy + dy)) {
                    nearby.extend_from_slice(slots);
                }
            }
        }
        nearby
    }

    fn cell_of(&self, position: Point2D<f32>) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_includes_adjacent_cells() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, Point2D::new(50.0, 50.0));
        grid.insert(1, Point2D::new(150.0, 50.0));
        grid.insert(2, Point2D::new(450.0, 450.0));

        let nearby = grid.query_nearby(Point2D::new(60.0, 60.0));
        assert!(nearby.contains(&0));
        assert!(nearby.contains(&1));
        assert!(!nearby.contains(&2));
    }

    #[test]
    fn test_negative_coordinates() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(7, Point2D::new(-5.0, -5.0));
        assert_eq!(grid.query_nearby(Point2D::new(-1.0, -1.0)), vec![7]);
        grid.clear();
        assert!(grid.query_nearby(Point2D::new(-1.0, -1.0)).is_empty());
    }
}
