//! Volume and centroid by surface integration.
//!
//! Each face is fan-triangulated from its representative edge and the
//! divergence theorem turns the volume integrals of `1`, `x`, `y` and `z`
//! into sums over those triangles. Positions are taken relative to the
//! vertex mean, which lies inside the hull, to keep the sums well scaled.

use crate::hull::ConvexHull;
use config::constants::EPSILON;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Volume and center of mass of a solid of uniform density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    /// Enclosed volume.
    pub volume: f64,
    /// Center of mass.
    pub centroid: DVec3,
}

/// Integrates the volume and centroid of a closed, outward-wound hull.
pub fn compute_mass_properties(hull: &ConvexHull) -> MassProperties {
    debug_assert!(hull.vertex_count() >= 4, "hull has no volume");

    let vertices = hull.vertices();
    let reference = vertices.iter().copied().sum::<DVec3>() / vertices.len().max(1) as f64;

    let mut volume = 0.0;
    let mut moment = DVec3::ZERO;

    for face in 0..hull.face_count() as u8 {
        let begin = hull.face(face).edge;
        let p1 = hull.vertex(hull.edge(begin).origin) - reference;

        let mut edge = hull.edge(begin).next;
        loop {
            let next = hull.edge(edge).next;
            if next == begin {
                break;
            }
            let p2 = hull.vertex(hull.edge(edge).origin) - reference;
            let p3 = hull.vertex(hull.edge(next).origin) - reference;

            let d = (p2 - p1).cross(p3 - p1);
            volume += d.x * (p1.x + p2.x + p3.x) / 6.0;

            let squares = p1 * p1 + p1 * p2 + p1 * p3 + p2 * p2 + p2 * p3 + p3 * p3;
            moment += d * squares / 24.0;

            edge = next;
        }
    }

    debug_assert!(volume > EPSILON, "hull volume {} is not positive", volume);
    MassProperties {
        volume,
        centroid: moment / volume + reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn box_hull(min: DVec3, max: DVec3) -> ConvexHull {
        let corners: Vec<DVec3> = (0..8)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                )
            })
            .collect();
        ConvexHull::from_points(&corners)
    }

    #[test]
    fn test_unit_cube() {
        let hull = box_hull(DVec3::ZERO, DVec3::ONE);
        let mass = compute_mass_properties(&hull);
        assert_relative_eq!(mass.volume, 1.0, epsilon = 1e-12);
        assert_relative_eq!(mass.centroid.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mass.centroid.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mass.centroid.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_box() {
        let hull = box_hull(DVec3::new(1.0, -2.0, 3.0), DVec3::new(3.0, 1.0, 4.0));
        let mass = compute_mass_properties(&hull);
        assert_relative_eq!(mass.volume, 6.0, epsilon = 1e-10);
        assert_relative_eq!(mass.centroid.x, 2.0, epsilon = 1e-10);
        assert_relative_eq!(mass.centroid.y, -0.5, epsilon = 1e-10);
        assert_relative_eq!(mass.centroid.z, 3.5, epsilon = 1e-10);
    }

    #[test]
    fn test_tetrahedron_centroid_is_vertex_mean() {
        let points = [
            DVec3::ZERO,
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(0.0, 0.0, 2.0),
        ];
        let hull = ConvexHull::from_points(&points);
        let mass = compute_mass_properties(&hull);
        assert_relative_eq!(mass.volume, 8.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(mass.centroid.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mass.centroid.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(mass.centroid.z, 0.5, epsilon = 1e-12);
    }
}
