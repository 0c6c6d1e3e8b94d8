//! Weight projection: turns a weight vector into ternary-chart geometry.
//!
//! Each trait owns a fixed axis around a shared center:
//!
//! ```text
//!              logic (-90°)
//!                  ▲
//!                  │
//!                  ●
//!                ╱   ╲
//!   psyche (150°)     instinct (30°)
//! ```
//!
//! Only the band `[MIN_WEIGHT, MAX_WEIGHT]` is meaningful.  It is stretched
//! onto the radius band `[0.25, 1.0]` so no marker collapses to the center
//! and small differences near the extremes stay visible.

use serde::{Deserialize, Serialize};

use super::trait_id::{TraitId, TraitMap, WeightVector};
use crate::utilities::errors::{PersonaError, Result};

/// Weights at or below this sit on the inner radius.
pub const MIN_WEIGHT: f64 = 0.20;
/// Weights at or above this sit on the outer radius.
pub const MAX_WEIGHT: f64 = 0.60;
/// Display magnitude of a weight at `MIN_WEIGHT`.
pub const MIN_MAGNITUDE: f64 = 0.25;

pub const DEFAULT_CENTER: Point2 = Point2 { x: 100.0, y: 100.0 };
pub const DEFAULT_BASE_RADIUS: f64 = 80.0;
pub const DEFAULT_MIN_SIZE: f64 = 40.0;
pub const DEFAULT_MAX_SIZE: f64 = 90.0;

/// Vertex order of the closed triangle.
pub const TRIANGLE_ORDER: [TraitId; 3] = [TraitId::Logic, TraitId::Psyche, TraitId::Instinct];

/// Axis angle of each trait, in degrees, with y growing downwards.
pub fn axis_angle_degrees(id: TraitId) -> f64 {
    match id {
        TraitId::Logic => -90.0,
        TraitId::Psyche => 150.0,
        TraitId::Instinct => 30.0,
    }
}

/// Position of `w` inside the meaningful band, in `[0, 1]`.
///
/// NaN is treated as the band floor; infinities clamp to the nearest edge.
pub fn fraction(w: f64) -> f64 {
    let w = if w.is_nan() { MIN_WEIGHT } else { w };
    (w.clamp(MIN_WEIGHT, MAX_WEIGHT) - MIN_WEIGHT) / (MAX_WEIGHT - MIN_WEIGHT)
}

/// Display magnitude in `[0.25, 1.0]`.
pub fn normalize(w: f64) -> f64 {
    MIN_MAGNITUDE + fraction(w) * (1.0 - MIN_MAGNITUDE)
}

// ============================================================================
// Geometry types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

/// Where one trait's marker is drawn and how large.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    #[serde(rename = "trait")]
    pub trait_id: TraitId,
    pub x: f64,
    pub y: f64,
    /// Marker image edge length.
    pub size: f64,
}

impl ProjectedPoint {
    pub fn position(&self) -> Point2 {
        Point2 {
            x: self.x,
            y: self.y,
        }
    }
}

/// Closed polygon through the three trait points in [`TRIANGLE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrianglePath {
    pub vertices: [Point2; 3],
}

impl TrianglePath {
    /// Edges including the closing edge back to the first vertex.
    pub fn edges(&self) -> [(Point2, Point2); 3] {
        let v = self.vertices;
        [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])]
    }

    /// Enclosed area (shoelace formula).
    pub fn area(&self) -> f64 {
        let s: f64 = self
            .edges()
            .iter()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum();
        s.abs() / 2.0
    }
}

// ============================================================================
// Projector
// ============================================================================

/// Chart dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    #[serde(default = "default_center")]
    pub center: Point2,
    #[serde(default = "default_base_radius")]
    pub base_radius: f64,
    #[serde(default = "default_min_size")]
    pub min_size: f64,
    #[serde(default = "default_max_size")]
    pub max_size: f64,
}

fn default_center() -> Point2 {
    DEFAULT_CENTER
}

fn default_base_radius() -> f64 {
    DEFAULT_BASE_RADIUS
}

fn default_min_size() -> f64 {
    DEFAULT_MIN_SIZE
}

fn default_max_size() -> f64 {
    DEFAULT_MAX_SIZE
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            base_radius: DEFAULT_BASE_RADIUS,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl ProjectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_radius.is_finite() && self.base_radius > 0.0) {
            return Err(PersonaError::Config(format!(
                "base_radius must be positive, got {}",
                self.base_radius
            )));
        }
        if !(self.min_size > 0.0 && self.min_size <= self.max_size) {
            return Err(PersonaError::Config(format!(
                "marker sizes must satisfy 0 < min_size <= max_size, got {}..{}",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

/// Stateless projection of weight vectors onto the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightProjector {
    config: ProjectorConfig,
}

impl WeightProjector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Marker edge length for weight `w`.
    pub fn image_size(&self, w: f64) -> f64 {
        self.config.min_size + fraction(w) * (self.config.max_size - self.config.min_size)
    }

    /// Projected point for one trait.
    pub fn project(&self, id: TraitId, w: f64) -> ProjectedPoint {
        let angle = axis_angle_degrees(id).to_radians();
        let r = normalize(w) * self.config.base_radius;
        ProjectedPoint {
            trait_id: id,
            x: self.config.center.x + r * angle.cos(),
            y: self.config.center.y + r * angle.sin(),
            size: self.image_size(w),
        }
    }

    /// Projected points for all three traits.
    pub fn layout(&self, weights: &WeightVector) -> TraitMap<ProjectedPoint> {
        weights.map(|id, w| self.project(id, *w))
    }

    pub fn triangle_path(&self, weights: &WeightVector) -> TrianglePath {
        let points = self.layout(weights);
        TrianglePath {
            vertices: TRIANGLE_ORDER.map(|id| points.get(id).position()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_normalize_band_edges() {
        assert!((normalize(0.20) - 0.25).abs() < EPS);
        assert!((normalize(0.60) - 1.0).abs() < EPS);
        assert!((normalize(0.80) - 1.0).abs() < EPS);
        assert!((normalize(0.0) - 0.25).abs() < EPS);
        assert!((normalize(0.40) - 0.625).abs() < EPS);
    }

    #[test]
    fn test_normalize_non_finite() {
        assert!((normalize(f64::NAN) - 0.25).abs() < EPS);
        assert!((normalize(f64::INFINITY) - 1.0).abs() < EPS);
        assert!((normalize(f64::NEG_INFINITY) - 0.25).abs() < EPS);
        let p = WeightProjector::default();
        assert!((p.image_size(f64::INFINITY) - 90.0).abs() < EPS);
        assert!((p.image_size(f64::NAN) - 40.0).abs() < EPS);
    }

    #[test]
    fn test_image_size_range() {
        let p = WeightProjector::default();
        assert!((p.image_size(0.1) - 40.0).abs() < EPS);
        assert!((p.image_size(0.4) - 65.0).abs() < EPS);
        assert!((p.image_size(0.9) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_layout_uniform_axes() {
        let p = WeightProjector::default();
        let pts = p.layout(&WeightVector::uniform());
        // Uniform weights sit at half the base radius.
        assert!((pts.logic.x - 100.0).abs() < EPS);
        assert!((pts.logic.y - 60.0).abs() < EPS);
        let half = 40.0;
        assert!((pts.instinct.x - (100.0 + half * 30f64.to_radians().cos())).abs() < EPS);
        assert!((pts.instinct.y - (100.0 + half * 0.5)).abs() < EPS);
        assert!((pts.psyche.x - (100.0 - half * 30f64.to_radians().cos())).abs() < EPS);
        assert!((pts.psyche.y - pts.instinct.y).abs() < EPS);
    }

    #[test]
    fn test_triangle_path_order() {
        let p = WeightProjector::default();
        let w = WeightVector::new(0.25, 0.45, 0.30);
        let path = p.triangle_path(&w);
        let pts = p.layout(&w);
        assert_eq!(path.vertices[0], pts.logic.position());
        assert_eq!(path.vertices[1], pts.psyche.position());
        assert_eq!(path.vertices[2], pts.instinct.position());
        assert_eq!(path.edges()[2], (path.vertices[2], path.vertices[0]));
        assert!(path.area() > 0.0);
    }

    #[test]
    fn test_projection_idempotent() {
        let p = WeightProjector::default();
        let w = WeightVector::new(0.31, 0.22, 0.47);
        assert_eq!(p.layout(&w), p.layout(&w));
        assert_eq!(p.triangle_path(&w), p.triangle_path(&w));
    }

    #[test]
    fn test_config_validate() {
        assert!(ProjectorConfig::default().validate().is_ok());
        let bad = ProjectorConfig {
            min_size: 100.0,
            ..ProjectorConfig::default()
        };
        assert!(bad.validate().is_err());
        let yaml = "base_radius: 120.0\n";
        let cfg: ProjectorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.base_radius, 120.0);
        assert_eq!(cfg.center, DEFAULT_CENTER);
    }
}
