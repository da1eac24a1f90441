//! The walk engine: turns a symbol stream into a 3D path.
//!
//! Everything here is pure. For a fixed `(symbols, mapping, stride)` the
//! output is bit-identical across calls, which keeps the on-demand re-render
//! path and the batch thumbnails in agreement.

use crate::mapping::Mapping;
use crate::turtle::{TurtleOp, TurtleState};
use glam::{IVec2, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Positions visited by a walk, plus the turtle's final orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalkPath {
    /// Ordered positions; always starts at the origin.
    pub points: Vec<Vec3>,
    pub orientation: Quat,
}

/// Walks `symbols` through 3D space.
///
/// Only symbols at `0, stride, 2 * stride, ...` are interpreted; skipped
/// symbols have no effect at all, not even on orientation. A `stride` of 0 is
/// treated as 1. Translations append the new position; rotations append
/// nothing.
pub fn walk(symbols: &[u8], mapping: &Mapping, stride: usize) -> WalkPath {
    let stride = stride.max(1);
    let mut turtle = TurtleState::default();
    let mut points = Vec::with_capacity(symbols.len() / stride + 1);
    points.push(turtle.position);

    for &symbol in symbols.iter().step_by(stride) {
        let op = TurtleOp::from_action(mapping.action(symbol));
        if turtle.apply(op) {
            points.push(turtle.position);
        }
    }

    WalkPath {
        points,
        orientation: turtle.rotation,
    }
}

/// Shorthand for [`walk`] when only the positions matter.
pub fn walk_points(symbols: &[u8], mapping: &Mapping, stride: usize) -> Vec<Vec3> {
    walk(symbols, mapping, stride).points
}

const LATTICE_DIRS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Walks a base-4 stream on the XY lattice.
///
/// Symbols are reduced mod 4 and step ±X/±Y. Each revisit of a lattice cell
/// stacks the point one unit higher, so `z` is the number of earlier visits.
pub fn lattice_walk(symbols: &[u8]) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(symbols.len() + 1);
    points.push(Vec3::ZERO);

    let mut cell = IVec2::ZERO;
    let mut visits: HashMap<IVec2, u32> = HashMap::new();
    visits.insert(cell, 1);

    for &symbol in symbols {
        cell += LATTICE_DIRS[(symbol % 4) as usize];
        let count = visits.entry(cell).or_insert(0);
        *count += 1;
        points.push(Vec3::new(cell.x as f32, cell.y as f32, (*count - 1) as f32));
    }

    points
}
