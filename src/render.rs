//! Rasterizes a walk into a small PNG.
//!
//! The [`Renderer`] owns a single drawing surface that is cleared at the start
//! of every render and released when the renderer is dropped. Framing is
//! computed by [`frame`], which is pure and usable on its own. Stretches of
//! the path that pass through busy lattice cells are drawn wider and lighter,
//! see [`revisit_weights`].

use crate::config::{RenderConfig, Rgba};
use crate::error::RenderError;
use glam::{IVec3, Mat4, Vec3};
use std::collections::HashMap;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};
use tracing::debug;

/// Walk colors, assigned by walk index.
pub const PALETTE: [Rgba; 12] = [
    [0x4f, 0xc3, 0xf7, 0xff], // sky
    [0xff, 0xb7, 0x4d, 0xff], // amber
    [0xba, 0x68, 0xc8, 0xff], // violet
    [0x81, 0xc7, 0x84, 0xff], // green
    [0xe5, 0x73, 0x73, 0xff], // red
    [0xff, 0xf1, 0x76, 0xff], // yellow
    [0x4d, 0xb6, 0xac, 0xff], // teal
    [0xf0, 0x62, 0x92, 0xff], // pink
    [0x79, 0x86, 0xcb, 0xff], // indigo
    [0xa1, 0x88, 0x7f, 0xff], // brown
    [0xdc, 0xe7, 0x75, 0xff], // lime
    [0x90, 0xa4, 0xae, 0xff], // slate
];

/// Palette entry for a walk index.
pub fn palette_color(color_index: usize) -> Rgba {
    PALETTE[color_index % PALETTE.len()]
}

/// Number of distinct stroke weights a path is split into.
const REVISIT_LEVELS: u8 = 4;

/// Per-segment revisit density in `[0, 1]`.
///
/// Points are binned by their rounded coordinates. A segment weighs the log of
/// the mean visit count of its two cells over the log of the busiest cell, so
/// a walk that never returns to a cell weighs zero everywhere.
pub fn revisit_weights(points: &[Vec3]) -> Vec<f32> {
    let cell = |p: Vec3| -> IVec3 { p.round().as_ivec3() };
    let mut counts: HashMap<IVec3, u32> = HashMap::new();
    for &p in points {
        *counts.entry(cell(p)).or_default() += 1;
    }
    let busiest = counts.values().copied().max().unwrap_or(1) as f32;
    let ln_max = busiest.ln().max(1.0);
    points
        .windows(2)
        .map(|pair| {
            let visits = |p: Vec3| counts.get(&cell(p)).copied().unwrap_or(1) as f32;
            let mean = (visits(pair[0]) + visits(pair[1])) * 0.5;
            mean.ln().max(0.0) / ln_max
        })
        .collect()
}

fn revisit_level(weight: f32) -> u8 {
    (weight * REVISIT_LEVELS as f32).round() as u8
}

/// Mixes `color` toward white by `amount`, keeping alpha.
fn lighten(color: Rgba, amount: f32) -> Rgba {
    let [r, g, b, a] = color;
    let lift = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
    [lift(r), lift(g), lift(b), a]
}

/// Camera and marker placement for one path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    /// Radius the camera must keep in view.
    pub radius: f32,
    /// Start/end marker radius in world units.
    pub marker_radius: f32,
    /// Camera position; it always looks at `center`.
    pub eye: Vec3,
    /// The path has negligible extent and uses the fixed fallbacks.
    pub degenerate: bool,
}

/// Computes bounds, marker size and camera placement.
///
/// Returns `None` for an empty path or non-finite coordinates.
pub fn frame(points: &[Vec3], config: &RenderConfig) -> Option<Framing> {
    let first = *points.first()?;
    if !points.iter().all(|p| p.is_finite()) {
        return None;
    }
    let (min, max) = points
        .iter()
        .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));

    let center = (min + max) * 0.5;
    let extent = max - min;
    let degenerate = extent.max_element() < config.degenerate_extent;
    let (radius, marker_radius) = if degenerate {
        (1.0, config.degenerate_marker_radius)
    } else {
        let diag = extent.length();
        (
            diag * 0.5,
            (diag * config.marker_scale).max(config.min_marker_radius),
        )
    };

    let half_fov = config.fov_degrees.to_radians() * 0.5;
    let distance = radius / half_fov.sin() / config.margin;
    let eye = center + Vec3::ONE.normalize() * distance;

    Some(Framing {
        min,
        max,
        center,
        radius,
        marker_radius,
        eye,
        degenerate,
    })
}

/// Owns the drawing surface shared by every render of a run.
pub struct Renderer {
    config: RenderConfig,
    surface: Pixmap,
}

impl Renderer {
    /// Creates the surface. Failure here is fatal for a batch.
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let size = config.image_size;
        let surface = Pixmap::new(size, size).ok_or(RenderError::SurfaceInit {
            width: size,
            height: size,
        })?;
        Ok(Self { config, surface })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Resets the surface to the background color.
    pub fn clear(&mut self) {
        let [r, g, b, a] = self.config.background;
        self.surface.fill(Color::from_rgba8(r, g, b, a));
    }

    /// Renders `points` and encodes the result as PNG.
    ///
    /// Returns `Ok(None)` when there is nothing to draw: fewer than two points
    /// or coordinates that cannot be framed.
    pub fn render_png(
        &mut self,
        points: &[Vec3],
        color_index: usize,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        if points.len() < 2 {
            return Ok(None);
        }
        let Some(framing) = frame(points, &self.config) else {
            return Ok(None);
        };

        self.clear();
        let camera = Camera::new(&framing, &self.config);

        let screen: Vec<(f32, f32)> = points.iter().map(|&p| camera.to_screen(p)).collect();
        let levels: Vec<u8> = revisit_weights(points)
            .into_iter()
            .map(revisit_level)
            .collect();
        let color = palette_color(color_index);
        // Consecutive segments of equal weight share one path so joins stay round.
        let mut first = 0;
        for run in levels.chunk_by(|a, b| a == b) {
            self.stroke_run(&screen[first..=first + run.len()], color, run[0]);
            first += run.len();
        }

        let start = points[0];
        let end = points[points.len() - 1];
        self.marker(&camera, start, framing.marker_radius, self.config.start_color);
        self.marker(&camera, end, framing.marker_radius, self.config.end_color);

        let png = self
            .surface
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        debug!(
            points = points.len(),
            degenerate = framing.degenerate,
            bytes = png.len(),
            "rendered walk"
        );
        Ok(Some(png))
    }

    fn stroke_run(&mut self, screen: &[(f32, f32)], color: Rgba, level: u8) {
        let Some((&(x, y), rest)) = screen.split_first() else {
            return;
        };
        let mut line = PathBuilder::new();
        line.move_to(x, y);
        for &(x, y) in rest {
            line.line_to(x, y);
        }
        // Identical points have no area to stroke; markers still go down.
        let Some(path) = line.finish() else {
            return;
        };
        let boost = level as f32 / REVISIT_LEVELS as f32;
        let scale = self.config.image_size as f32 / 200.0;
        let stroke = Stroke {
            width: self.config.line_width * scale * (1.0 + boost),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let paint = paint(lighten(color, boost * 0.5));
        self.surface
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn marker(&mut self, camera: &Camera, at: Vec3, radius: f32, color: Rgba) {
        let (x, y) = camera.to_screen(at);
        let r = camera.pixel_radius(at, radius).max(1.0);
        if let Some(circle) = PathBuilder::from_circle(x, y, r) {
            self.surface.fill_path(
                &circle,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

fn paint(color: Rgba) -> Paint<'static> {
    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Perspective camera looking at the framing center.
struct Camera {
    view: Mat4,
    view_proj: Mat4,
    focal: f32,
    half_size: f32,
}

impl Camera {
    fn new(framing: &Framing, config: &RenderConfig) -> Self {
        let fov = config.fov_degrees.to_radians();
        let distance = framing.eye.distance(framing.center);
        let near = (distance * 0.01).max(1e-4);
        let far = distance + framing.radius * 4.0 + 1.0;
        let view = Mat4::look_at_rh(framing.eye, framing.center, Vec3::Y);
        let proj = Mat4::perspective_rh(fov, 1.0, near, far);
        Self {
            view,
            view_proj: proj * view,
            focal: 1.0 / (fov * 0.5).tan(),
            half_size: config.image_size as f32 * 0.5,
        }
    }

    fn to_screen(&self, p: Vec3) -> (f32, f32) {
        let ndc = self.view_proj.project_point3(p);
        (
            (ndc.x + 1.0) * self.half_size,
            (1.0 - ndc.y) * self.half_size,
        )
    }

    /// Projected size of a sphere of `radius` centered at `p`, in pixels.
    fn pixel_radius(&self, p: Vec3, radius: f32) -> f32 {
        let depth = -self.view.transform_point3(p).z;
        if depth <= f32::EPSILON {
            return 0.0;
        }
        radius * self.focal / depth * self.half_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn single_pass_walk_has_no_revisit_weight() {
        let points: Vec<Vec3> = (0..5).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        assert_eq!(revisit_weights(&points), vec![0.0; 4]);
        assert!(revisit_weights(&[Vec3::ZERO]).is_empty());
    }

    #[test]
    fn retraced_segments_weigh_most() {
        // 0 -> 1 -> 0 -> 1 -> 2: cells 0 and 1 are each visited twice.
        let points = [Vec3::ZERO, Vec3::X, Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)];
        let weights = revisit_weights(&points);
        assert_eq!(weights.len(), 4);
        assert!(weights[0] > 0.0);
        assert_eq!(weights[0], weights[2]);
        assert!(weights[3] < weights[0]);
        assert!(weights.iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn lighten_keeps_alpha() {
        assert_eq!(lighten([0, 100, 255, 7], 0.0), [0, 100, 255, 7]);
        assert_eq!(lighten([0, 100, 255, 7], 1.0), [255, 255, 255, 7]);
    }

    #[test]
    fn degenerate_framing_uses_fixed_radius() {
        let cfg = RenderConfig::default();
        let f = frame(&[Vec3::ONE, Vec3::ONE], &cfg).unwrap();
        assert!(f.degenerate);
        assert_eq!(f.radius, 1.0);
        assert_eq!(f.marker_radius, cfg.degenerate_marker_radius);
        assert!(f.eye.is_finite());
    }

    #[test]
    fn camera_sits_on_the_diagonal() {
        let cfg = RenderConfig::default();
        let f = frame(&[Vec3::ZERO, Vec3::new(10.0, 4.0, 2.0)], &cfg).unwrap();
        let offset = f.eye - f.center;
        assert!((offset.x - offset.y).abs() < 1e-4);
        assert!((offset.y - offset.z).abs() < 1e-4);
        assert!(offset.x > 0.0);
        // The bounding sphere fits inside the field of view with margin.
        let half_fov = cfg.fov_degrees.to_radians() * 0.5;
        assert!(f.radius / offset.length() < half_fov.sin());
    }

    #[test]
    fn marker_radius_has_a_floor() {
        let cfg = RenderConfig::default();
        let f = frame(&[Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)], &cfg).unwrap();
        assert!(!f.degenerate);
        assert_eq!(f.marker_radius, cfg.min_marker_radius);

        let big = frame(&[Vec3::ZERO, Vec3::new(1000.0, 0.0, 0.0)], &cfg).unwrap();
        assert!((big.marker_radius - 1000.0 * cfg.marker_scale).abs() < 1e-3);
    }

    #[test]
    fn non_finite_points_cannot_be_framed() {
        let cfg = RenderConfig::default();
        assert!(frame(&[Vec3::ZERO, Vec3::splat(f32::NAN)], &cfg).is_none());
        assert!(frame(&[], &cfg).is_none());
    }

    #[test]
    fn zero_size_surface_fails() {
        let cfg = RenderConfig {
            image_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Renderer::new(cfg),
            Err(RenderError::SurfaceInit { .. })
        ));
    }
}
