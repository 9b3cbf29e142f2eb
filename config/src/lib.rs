//! # Config Crate
//!
//! Centralized configuration constants for the convex hull kernel.
//! All tolerances and fixed capacities are defined here so that the
//! construction mesh and the runtime hull agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{HULL_TOLERANCE, LINEAR_SLOP, MAX_HULL_VERTICES};
//!
//! // Two points closer than HULL_TOLERANCE are the same hull vertex
//! let d: f64 = 0.001;
//! assert!(d < HULL_TOLERANCE);
//! assert_eq!(HULL_TOLERANCE, 0.5 * LINEAR_SLOP);
//!
//! // Runtime hull indices are stored in a byte
//! assert!(MAX_HULL_VERTICES < u8::MAX as usize);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Byte-Sized Capacities**: Runtime hull limits fit a `u8` index
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

#[cfg(test)]
mod tests;
