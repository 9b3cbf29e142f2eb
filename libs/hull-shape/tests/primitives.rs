//! Integration tests for the cylinder and cone factories.

use approx::assert_relative_eq;
use config::constants::{HullConfig, HULL_RING_SEGMENTS, HULL_TOLERANCE, MAX_HULL_VERTICES};
use glam::DVec3;
use hull_shape::ConvexHull;
use std::f64::consts::TAU;

/// Area of a regular polygon inscribed in a circle of `radius`.
fn polygon_area(radius: f64, segments: u32) -> f64 {
    0.5 * segments as f64 * radius * radius * (TAU / segments as f64).sin()
}

/// Number of faces with `edges` edges whose normal is close to `normal`.
fn faces_facing(hull: &ConvexHull, normal: DVec3, edges: usize) -> usize {
    (0..hull.face_count() as u8)
        .filter(|&face| {
            hull.plane(face).normal.abs_diff_eq(normal, 1e-9)
                && hull.face_edge_count(face) == edges
        })
        .count()
}

/// Checks Euler's formula and that no vertex lies in front of any plane.
fn assert_closed_and_convex(hull: &ConvexHull) {
    assert!(hull.validate().is_ok());
    let euler = hull.vertex_count() as i64 - (hull.edge_count() / 2) as i64
        + hull.face_count() as i64;
    assert_eq!(euler, 2);
    for plane in hull.planes() {
        for vertex in hull.vertices() {
            assert!(
                plane.distance(*vertex) <= HULL_TOLERANCE + 1e-9,
                "vertex {:?} in front of plane {:?}",
                vertex,
                plane
            );
        }
    }
}

#[test]
fn cylinder_has_two_rings_and_quad_sides() {
    let segments = HULL_RING_SEGMENTS as usize;
    let hull = ConvexHull::cylinder(0.5, 2.0);

    assert_eq!(hull.vertex_count(), 2 * segments);
    assert_eq!(hull.face_count(), segments + 2);
    assert_eq!(hull.edge_count(), 2 * 3 * segments);
    assert!(hull.validate().is_ok());

    assert_eq!(faces_facing(&hull, DVec3::Y, segments), 1);
    assert_eq!(faces_facing(&hull, DVec3::NEG_Y, segments), 1);
    let quads = (0..hull.face_count() as u8)
        .filter(|&face| hull.face_edge_count(face) == 4)
        .count();
    assert_eq!(quads, segments);
}

#[test]
fn cylinder_extents_and_centroid() {
    let hull = ConvexHull::cylinder(0.5, 2.0);

    let (min, max) = hull.bounds().unwrap();
    assert_relative_eq!(min.y, 0.0);
    assert_relative_eq!(max.y, 2.0);
    assert_relative_eq!(max.x, 0.5, epsilon = 1e-12);
    assert!(min.x >= -0.5 - 1e-12 && max.z <= 0.5 + 1e-12);

    let centroid = hull.centroid();
    assert_relative_eq!(centroid.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(centroid.y, 1.0, epsilon = 1e-9);
    assert_relative_eq!(centroid.z, 0.0, epsilon = 1e-9);

    let mass = hull.mass_properties().unwrap();
    assert_relative_eq!(
        mass.volume,
        polygon_area(0.5, HULL_RING_SEGMENTS) * 2.0,
        epsilon = 1e-9
    );
}

#[test]
fn cone_has_ring_and_apex() {
    let segments = HULL_RING_SEGMENTS as usize;
    let hull = ConvexHull::cone(1.0, 3.0);

    assert_eq!(hull.vertex_count(), segments + 1);
    assert_eq!(hull.face_count(), segments + 1);
    assert_eq!(hull.edge_count(), 2 * 2 * segments);
    assert!(hull.validate().is_ok());
    assert_eq!(faces_facing(&hull, DVec3::NEG_Y, segments), 1);

    let (min, max) = hull.bounds().unwrap();
    assert_relative_eq!(min.y, 0.0);
    assert_relative_eq!(max.y, 3.0);
    assert!(hull
        .vertices()
        .iter()
        .any(|v| v.abs_diff_eq(DVec3::new(0.0, 3.0, 0.0), HULL_TOLERANCE)));

    // Centroid of a cone sits at a quarter of its height
    let centroid = hull.centroid();
    assert_relative_eq!(centroid.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(centroid.y, 0.75, epsilon = 1e-9);
    assert_relative_eq!(centroid.z, 0.0, epsilon = 1e-9);

    let mass = hull.mass_properties().unwrap();
    assert_relative_eq!(
        mass.volume,
        polygon_area(1.0, HULL_RING_SEGMENTS) * 3.0 / 3.0,
        epsilon = 1e-9
    );
}

#[test]
fn ring_segments_follow_config() {
    let config = HullConfig::new(0.005, 8).unwrap();

    let mut cylinder = ConvexHull::new();
    cylinder.set_as_cylinder_with(1.0, 1.0, &config);
    assert_eq!(cylinder.vertex_count(), 16);
    assert_eq!(cylinder.face_count(), 10);
    assert_eq!(faces_facing(&cylinder, DVec3::Y, 8), 1);

    let mut cone = ConvexHull::new();
    cone.set_as_cone_with(1.0, 1.0, &config);
    assert_eq!(cone.vertex_count(), 9);
    assert_eq!(cone.face_count(), 9);
}

#[test]
fn factory_replaces_previous_hull() {
    let mut hull = ConvexHull::cylinder(0.5, 2.0);
    hull.set_as_cone(0.5, 1.0);
    assert_eq!(hull.vertex_count(), HULL_RING_SEGMENTS as usize + 1);
    assert_relative_eq!(hull.bounds().unwrap().1.y, 1.0);
}

// =============================================================================
// PROPORTIONS
// =============================================================================

#[test]
fn cylinders_keep_both_rings_across_proportions() {
    let segments = HULL_RING_SEGMENTS as usize;
    for (radius, height) in [(1.0, 0.01), (1.0, 0.006), (0.1, 0.1), (0.5, 2.0), (2.0, 0.5)] {
        let hull = ConvexHull::cylinder(radius, height);
        assert_eq!(
            hull.vertex_count(),
            2 * segments,
            "cylinder({}, {})",
            radius,
            height
        );
        assert_eq!(
            hull.face_count(),
            segments + 2,
            "cylinder({}, {})",
            radius,
            height
        );
        assert_closed_and_convex(&hull);

        let (min, max) = hull.bounds().unwrap();
        assert_relative_eq!(min.y, 0.0);
        assert_relative_eq!(max.y, height);
    }
}

#[test]
fn cones_keep_their_ring_across_proportions() {
    let segments = HULL_RING_SEGMENTS as usize;
    for (radius, height) in [(1.0, 3.0), (0.5, 1.0), (2.0, 1.0), (1.0, 0.2)] {
        let hull = ConvexHull::cone(radius, height);
        assert_eq!(hull.vertex_count(), segments + 1, "cone({}, {})", radius, height);
        assert_eq!(hull.face_count(), segments + 1, "cone({}, {})", radius, height);
        assert_closed_and_convex(&hull);
    }

    // Ring points clear the sides through their neighbours by just over the
    // tolerance
    let flat = ConvexHull::cone(10.0, 0.05);
    assert_eq!(flat.vertex_count(), segments + 1);
    assert_eq!(faces_facing(&flat, DVec3::NEG_Y, segments), 1);
    assert_closed_and_convex(&flat);
}

#[test]
fn thin_cones_and_cylinders_stay_closed() {
    for hull in [
        ConvexHull::cone(1.0, 0.01),
        ConvexHull::cone(1.0, 0.006),
        ConvexHull::cylinder(1.0, 0.006),
    ] {
        assert!(!hull.is_empty());
        assert_closed_and_convex(&hull);
    }
}

#[test]
fn ring_points_within_tolerance_of_the_hull_are_dropped() {
    // Each ring point sits less than the tolerance outside the side through
    // its two neighbours
    let (radius, height) = (0.05, 1.0);
    let hull = ConvexHull::cone(radius, height);
    assert!(hull.vertex_count() <= HULL_RING_SEGMENTS as usize);
    assert_closed_and_convex(&hull);

    for i in 0..HULL_RING_SEGMENTS {
        let angle = TAU * i as f64 / HULL_RING_SEGMENTS as f64;
        let point = DVec3::new(radius * angle.cos(), 0.0, -radius * angle.sin());
        for plane in hull.planes() {
            assert!(plane.distance(point) <= HULL_TOLERANCE + 1e-9);
        }
    }
    let (min, max) = hull.bounds().unwrap();
    assert_relative_eq!(min.y, 0.0);
    assert_relative_eq!(max.y, height);
}

#[test]
fn ring_segments_at_capacity_fill_the_vertex_budget() {
    let segments = (MAX_HULL_VERTICES / 2) as u32;
    let config = HullConfig::new(0.005, segments).unwrap();
    assert_eq!(config.ring_segments(), segments);

    let mut cylinder = ConvexHull::new();
    cylinder.set_as_cylinder_with(1.0, 1.0, &config);
    assert_eq!(cylinder.vertex_count(), MAX_HULL_VERTICES);
    assert_eq!(cylinder.face_count(), segments as usize + 2);
    assert_closed_and_convex(&cylinder);

    assert!(HullConfig::new(0.005, segments + 1).is_err());
}
