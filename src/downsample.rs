//! Fixed-stride decimation of long paths.

use glam::Vec3;

/// Keeps every `step`-th point, `step = ceil(len / max_count)`.
///
/// Paths already within the bound come back unchanged. The first point is
/// always kept; no averaging is done. A bound of zero yields an empty path.
pub fn downsample(points: &[Vec3], max_count: usize) -> Vec<Vec3> {
    if points.len() <= max_count {
        return points.to_vec();
    }
    if max_count == 0 {
        return Vec::new();
    }
    let step = points.len().div_ceil(max_count);
    points.iter().step_by(step).copied().collect()
}

/// Walk-engine stride that yields roughly `target_points` output points.
///
/// Used where decimation happens while walking rather than afterwards:
/// `round(symbol_count / (target_points - 1))`, never below 1.
pub fn stride_for_target(symbol_count: usize, target_points: usize) -> usize {
    if target_points < 2 {
        return symbol_count.max(1);
    }
    let stride = (symbol_count as f64 / (target_points - 1) as f64).round() as usize;
    stride.max(1)
}
