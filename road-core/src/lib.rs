//! Procedural road network generation on a bounded 2-D map.
//!
//! Main components:
//! - [`geometry`] — points, rectangles and road segments.
//! - [`constraints`] — validation of candidate roads against the map,
//!   forbidden areas and committed roads.
//! - [`branch`] — random proposal of new roads at a committed road's end.
//! - [`growth`] — the priority queue driving generation.
//! - [`config`] — tuning values for the growth algorithm.
//! - [`town`] — town descriptors and the map layout built from them.
//! - [`types`] — shared type aliases.

pub mod branch;
pub mod config;
pub mod constraints;
pub mod geometry;
pub mod growth;
pub mod town;
pub mod types;

pub use geometry::{Rect, RoadSegment};
pub use growth::{Network, RoadGrowth, generate, generate_dense};
