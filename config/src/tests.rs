//! # Tests for Config Constants
//!
//! Unit tests verifying the relationships between the configuration
//! constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_hull_tolerance_is_half_slop() {
    assert!(HULL_TOLERANCE > EPSILON);
    assert!(HULL_TOLERANCE < LINEAR_SLOP);
}

// =============================================================================
// CAPACITY TESTS
// =============================================================================

#[test]
fn test_capacities_fit_a_byte() {
    // 0xFF is reserved for "no feature"
    assert!(MAX_HULL_VERTICES <= 254);
    assert!(MAX_HULL_EDGES <= 254);
    assert!(MAX_HULL_FACES <= 254);
}

#[test]
fn test_edge_capacity_covers_euler_bound() {
    // E = V + F - 2 undirected edges, two half-edges each
    assert!(MAX_HULL_EDGES >= 2 * (MAX_HULL_VERTICES + MAX_HULL_FACES - 2));
    assert_eq!(MAX_HULL_EDGES % 2, 0);
}

#[test]
fn test_ring_segments_fit_two_rings() {
    assert!(HULL_RING_SEGMENTS >= 3);
    assert!(2 * HULL_RING_SEGMENTS as usize <= MAX_HULL_VERTICES);
}
