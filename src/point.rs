//! Coordinate normalization for precomputed walk data.
//!
//! Datasets write points either as `[x, y, z]` tuples or as `{x, y, z}`
//! records. Both become a [`Vec3`]. A component that is absent or `null`
//! defaults to zero, but at least one component must be a number.

use glam::Vec3;
use serde_json::Value;
use tracing::debug;

const AXES: [&str; 3] = ["x", "y", "z"];

/// Reads one coordinate-like value. Returns `None` for anything else.
pub fn parse_point(value: &Value) -> Option<Vec3> {
    match value {
        Value::Array(items) => components([items.first(), items.get(1), items.get(2)]),
        Value::Object(record) => components(AXES.map(|k| record.get(k))),
        _ => None,
    }
}

fn components(raw: [Option<&Value>; 3]) -> Option<Vec3> {
    let mut out = [0.0f32; 3];
    let mut numeric = false;
    for (slot, v) in out.iter_mut().zip(raw) {
        match v {
            None | Some(Value::Null) => {}
            Some(v) => {
                *slot = v.as_f64()? as f32;
                numeric = true;
            }
        }
    }
    numeric.then_some(Vec3::from_array(out))
}

/// True for values that look like a point, used when sniffing raw arrays.
pub fn is_coordinate_like(value: &Value) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(record) => AXES.iter().any(|k| record.contains_key(*k)),
        _ => false,
    }
}

/// Normalizes a list of raw points, dropping entries that are not coordinates.
pub fn normalize_points(values: &[Value]) -> Vec<Vec3> {
    let points: Vec<Vec3> = values.iter().filter_map(parse_point).collect();
    if points.len() != values.len() {
        debug!(
            dropped = values.len() - points.len(),
            "ignored non-coordinate entries"
        );
    }
    points
}
