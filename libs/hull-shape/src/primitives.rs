//! # Primitive Factories
//!
//! Cylinders and cones around the Y axis, approximated by rings of points.
//!
//! Ring points start at `(radius, 0, 0)` and advance by repeated rotation
//! about Y, so the cylinder's two rings line up vertex for vertex.

use crate::hull::ConvexHull;
use config::constants::{HullConfig, MAX_HULL_VERTICES};
use glam::{DQuat, DVec3};
use std::f64::consts::TAU;

/// Writes `segments` points of a ring of `radius` at height `y` into `out`.
fn ring(radius: f64, y: f64, segments: usize, out: &mut [DVec3]) {
    let step = DQuat::from_rotation_y(TAU / segments as f64);
    let mut direction = DVec3::X;
    for point in out.iter_mut().take(segments) {
        *point = DVec3::new(0.0, y, 0.0) + radius * direction;
        direction = step * direction;
    }
}

impl ConvexHull {
    /// Sets the hull to a cylinder standing on the XZ plane, with its axis
    /// from `(0, 0, 0)` to `(0, height, 0)`.
    ///
    /// # Panics
    ///
    /// If `radius` or `height` is not positive.
    pub fn set_as_cylinder(&mut self, radius: f64, height: f64) {
        self.set_as_cylinder_with(radius, height, &HullConfig::default());
    }

    /// [`set_as_cylinder`](Self::set_as_cylinder) with the ring segment count
    /// of `config`.
    pub fn set_as_cylinder_with(&mut self, radius: f64, height: f64, config: &HullConfig) {
        assert!(radius > 0.0, "cylinder radius must be positive: {}", radius);
        assert!(height > 0.0, "cylinder height must be positive: {}", height);

        let segments = config.ring_segments() as usize;
        let mut points = [DVec3::ZERO; MAX_HULL_VERTICES];
        ring(radius, 0.0, segments, &mut points[..segments]);
        ring(radius, height, segments, &mut points[segments..2 * segments]);

        self.set_hull(&points[..2 * segments], config);
    }

    /// Sets the hull to a cone with its base ring on the XZ plane and its
    /// apex at `(0, height, 0)`.
    ///
    /// # Panics
    ///
    /// If `radius` or `height` is not positive.
    pub fn set_as_cone(&mut self, radius: f64, height: f64) {
        self.set_as_cone_with(radius, height, &HullConfig::default());
    }

    /// [`set_as_cone`](Self::set_as_cone) with the ring segment count of
    /// `config`.
    pub fn set_as_cone_with(&mut self, radius: f64, height: f64, config: &HullConfig) {
        assert!(radius > 0.0, "cone radius must be positive: {}", radius);
        assert!(height > 0.0, "cone height must be positive: {}", height);

        let segments = config.ring_segments() as usize;
        let mut points = [DVec3::ZERO; MAX_HULL_VERTICES];
        ring(radius, 0.0, segments, &mut points[..segments]);
        points[segments] = DVec3::new(0.0, height, 0.0);

        self.set_hull(&points[..segments + 1], config);
    }

    fn set_hull(&mut self, points: &[DVec3], config: &HullConfig) {
        // Rejections are logged by try_set_in
        let _ = self.try_set_with(points, config);
    }

    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Creates the hull of `points`; see [`set`](Self::set).
    pub fn from_points(points: &[DVec3]) -> Self {
        let mut hull = Self::new();
        hull.set(points);
        hull
    }

    /// Creates a cylinder; see [`set_as_cylinder`](Self::set_as_cylinder).
    pub fn cylinder(radius: f64, height: f64) -> Self {
        let mut hull = Self::new();
        hull.set_as_cylinder(radius, height);
        hull
    }

    /// Creates a cone; see [`set_as_cone`](Self::set_as_cone).
    pub fn cone(radius: f64, height: f64) -> Self {
        let mut hull = Self::new();
        hull.set_as_cone(radius, height);
        hull
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ring_closes_on_itself() {
        let mut points = [DVec3::ZERO; 8];
        ring(2.0, 1.0, 8, &mut points);
        assert_relative_eq!(points[0].x, 2.0);
        for p in &points {
            assert_relative_eq!(p.y, 1.0);
            assert_relative_eq!(DVec3::new(p.x, 0.0, p.z).length(), 2.0, epsilon = 1e-12);
        }
        // One more step returns to the start
        let step = DQuat::from_rotation_y(TAU / 8.0);
        let wrapped = step * (points[7] - DVec3::Y);
        assert!(wrapped.abs_diff_eq(points[0] - DVec3::Y, 1e-12));
    }

    #[test]
    #[should_panic(expected = "radius must be positive")]
    fn test_cylinder_rejects_zero_radius() {
        ConvexHull::cylinder(0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "height must be positive")]
    fn test_cone_rejects_negative_height() {
        ConvexHull::cone(1.0, -1.0);
    }
}
