//! Centralized configuration values shared by the hull builder and the
//! runtime hull.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Used as the lower bound for quantities that must be strictly positive,
/// such as the enclosed volume of a hull.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// let volume = 1.0e-12;
/// assert!(volume < EPSILON);
/// ```
pub const EPSILON: f64 = 1e-10;

/// Distance below which two points or planes are treated as coincident.
///
/// # Examples
/// ```
/// use config::constants::LINEAR_SLOP;
/// assert!(LINEAR_SLOP > 0.0 && LINEAR_SLOP < 0.1);
/// ```
pub const LINEAR_SLOP: f64 = 0.005;

/// Plane and deduplication tolerance of the hull builder.
///
/// Points closer than this to an accepted point are dropped, and points
/// closer than this to a face plane are not considered outside of it.
///
/// # Examples
/// ```
/// use config::constants::{HULL_TOLERANCE, LINEAR_SLOP};
/// assert_eq!(HULL_TOLERANCE, 0.5 * LINEAR_SLOP);
/// ```
pub const HULL_TOLERANCE: f64 = 0.5 * LINEAR_SLOP;

// =============================================================================
// CAPACITY CONSTANTS
// =============================================================================

/// Maximum number of vertices of a runtime hull, and maximum number of input
/// points accepted by a single hull build.
///
/// # Examples
/// ```
/// use config::constants::MAX_HULL_VERTICES;
/// assert!(MAX_HULL_VERTICES >= 4);
/// ```
pub const MAX_HULL_VERTICES: usize = 64;

/// Maximum number of half-edges of a runtime hull.
///
/// Sized so that any hull within the vertex and face limits fits:
/// `2 * (V + F - 2)` by Euler's formula.
pub const MAX_HULL_EDGES: usize = 2 * (MAX_HULL_VERTICES + MAX_HULL_FACES - 2);

/// Maximum number of faces of a runtime hull.
pub const MAX_HULL_FACES: usize = 64;

/// Number of segments used to discretize the rings of the cylinder and cone
/// factories.
///
/// # Examples
/// ```
/// use config::constants::{HULL_RING_SEGMENTS, MAX_HULL_VERTICES};
/// // Two rings must fit in a hull
/// assert!(2 * HULL_RING_SEGMENTS as usize <= MAX_HULL_VERTICES);
/// ```
pub const HULL_RING_SEGMENTS: u32 = 20;

// Byte indices with 0xFF reserved as the null feature.
const _: () = assert!(MAX_HULL_VERTICES < u8::MAX as usize);
const _: () = assert!(MAX_HULL_EDGES < u8::MAX as usize);
const _: () = assert!(MAX_HULL_FACES < u8::MAX as usize);

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tunable parameters of a hull build.
///
/// Fields are only reachable through [`HullConfig::new`], so every value,
/// deserialized ones included, has passed validation.
///
/// # Examples
/// ```
/// use config::constants::HullConfig;
/// let config = HullConfig::default();
/// assert!(config.tolerance() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HullConfigFields")]
pub struct HullConfig {
    linear_slop: f64,
    ring_segments: u32,
}

/// Unvalidated form of [`HullConfig`] as it appears in serialized data.
#[derive(Deserialize)]
struct HullConfigFields {
    linear_slop: f64,
    ring_segments: u32,
}

impl TryFrom<HullConfigFields> for HullConfig {
    type Error = ConfigError;

    fn try_from(fields: HullConfigFields) -> Result<Self, ConfigError> {
        Self::new(fields.linear_slop, fields.ring_segments)
    }
}

impl HullConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// slop and ring segment count.
    ///
    /// # Examples
    /// ```
    /// use config::constants::HullConfig;
    /// let cfg = HullConfig::new(0.01, 12).expect("valid config");
    /// assert_eq!(cfg.ring_segments(), 12);
    /// ```
    pub fn new(linear_slop: f64, ring_segments: u32) -> Result<Self, ConfigError> {
        if linear_slop.is_nan() || linear_slop <= 0.0 {
            return Err(ConfigError::InvalidSlop(linear_slop));
        }
        if ring_segments < 3 || 2 * ring_segments as usize > MAX_HULL_VERTICES {
            return Err(ConfigError::InvalidSegments(ring_segments));
        }
        Ok(Self {
            linear_slop,
            ring_segments,
        })
    }

    /// Coincidence distance; the builder tolerance is half of it.
    #[inline]
    pub fn linear_slop(&self) -> f64 {
        self.linear_slop
    }

    /// Segment count for ring-based factories, at most half the vertex
    /// capacity.
    #[inline]
    pub fn ring_segments(&self) -> u32 {
        self.ring_segments
    }

    /// Plane and deduplication tolerance derived from the slop.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        0.5 * self.linear_slop
    }
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            linear_slop: LINEAR_SLOP,
            ring_segments: HULL_RING_SEGMENTS,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Raised when the slop is zero, negative or NaN.
    #[error("linear slop must be positive: {0}")]
    InvalidSlop(f64),
    /// Raised when the ring cannot form a polygon or two rings exceed the
    /// vertex capacity.
    #[error("ring segments must be in 3..={}: {0}", MAX_HULL_VERTICES / 2)]
    InvalidSegments(u32),
}
