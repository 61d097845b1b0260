//! Core types of the lodtiles workspace: tile coordinates and their bounding boxes,
//! the level-of-detail tiers, byte ranges, and random-access file reading.
//!
//! Nothing in here knows about HTTP or databases.

pub mod io;

pub mod types;
pub use types::*;
