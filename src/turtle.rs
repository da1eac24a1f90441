//! Turtle state and the twelve walk actions.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Magnitude of every rotation step (15 degrees).
pub const TURN_ANGLE: f32 = PI / 12.0;

/// Local translation directions, indexed by action `0..6`.
const LOCAL_DIRS: [Vec3; 6] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// Local rotation axes, indexed by `action - 6`. Odd entries turn the other way.
const ROT_AXES: [Vec3; 6] = [Vec3::X, Vec3::X, Vec3::Y, Vec3::Y, Vec3::Z, Vec3::Z];

/// A decoded turtle action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Step one unit along a turtle-local direction.
    Translate(Vec3),
    /// Turn about a turtle-local axis by a signed angle in radians.
    Rotate { axis: Vec3, angle: f32 },
}

impl TurtleOp {
    /// Decodes an action index. Indices past 11 wrap around.
    pub fn from_action(action: u8) -> Self {
        let action = action as usize % 12;
        if action < 6 {
            TurtleOp::Translate(LOCAL_DIRS[action])
        } else {
            let idx = action - 6;
            let sign = if idx % 2 == 0 { 1.0 } else { -1.0 };
            TurtleOp::Rotate {
                axis: ROT_AXES[idx],
                angle: TURN_ANGLE * sign,
            }
        }
    }
}

/// Position and orientation of the walking turtle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position.
    pub position: Vec3,

    /// Current world-space orientation. Always unit length.
    pub rotation: Quat,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TurtleState {
    /// Moves the turtle along `local_dir`, expressed in its own frame.
    pub fn translate_local(&mut self, local_dir: Vec3) {
        self.position += self.rotation * local_dir;
    }

    /// Composes a turn onto the orientation.
    ///
    /// The new rotation is the left operand: `rotation = turn * rotation`.
    /// Swapping the operands silently changes every walk, so keep it this way.
    pub fn rotate_local(&mut self, axis: Vec3, angle: f32) {
        let turn = Quat::from_axis_angle(axis, angle);
        self.rotation = (turn * self.rotation).normalize();
    }

    /// Applies one op. Returns `true` when the position changed.
    pub fn apply(&mut self, op: TurtleOp) -> bool {
        match op {
            TurtleOp::Translate(dir) => {
                self.translate_local(dir);
                true
            }
            TurtleOp::Rotate { axis, angle } => {
                self.rotate_local(axis, angle);
                false
            }
        }
    }
}
