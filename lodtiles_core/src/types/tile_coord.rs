//! Tile coordinates in a slippy-map pyramid.
//!
//! [`TileCoord`] identifies one tile by zoom `level`, column `x` and row `y`. It converts
//! a tile index into the area it covers, both as a geographic [`GeoBBox`] in degrees and
//! as a Web Mercator [`MercatorBBox`] in metres.
//!
//! # Examples
//!
//! ```
//! use lodtiles_core::TileCoord;
//!
//! let coord = TileCoord::new(1, 1, 0).unwrap();
//! let bbox = coord.to_geo_bbox();
//! assert_eq!(bbox.x_min, 0.0);
//! assert_eq!(bbox.x_max, 180.0);
//! ```

use crate::{GeoBBox, MercatorBBox};
use anyhow::{Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug},
};

/// Highest zoom level a `TileCoord` can address.
pub const MAX_LEVEL: u8 = 31;

/// A tile coordinate with zoom level, column and row.
///
/// Only constructed through [`TileCoord::new`], so `x` and `y` are always inside
/// `[0, 2^level)`.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The column of the tile, growing eastwards.
	pub x: u32,
	/// The row of the tile, growing southwards.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given zoom `level` and tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or if `x`/`y` are outside `[0, 2^level)`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = 1u64 << level;
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Number of tiles along one axis at `level`.
	fn size(level: u8) -> f64 {
		2.0f64.powi(i32::from(level))
	}

	/// Longitude in degrees of the western edge of column `x`.
	pub fn column_to_lon(level: u8, x: u32) -> f64 {
		Self::edge_lon(level, u64::from(x))
	}

	/// Latitude in degrees of the northern edge of row `y`.
	///
	/// Inverse Mercator: `atan(sinh(π·(1 − 2·y/2^level)))`.
	pub fn row_to_lat(level: u8, y: u32) -> f64 {
		Self::edge_lat(level, u64::from(y))
	}

	/// Northwest corner of the tile as `[longitude, latitude]`.
	#[must_use]
	pub fn as_geo(&self) -> [f64; 2] {
		[Self::column_to_lon(self.level, self.x), Self::row_to_lat(self.level, self.y)]
	}

	/// Geographic area covered by this tile.
	///
	/// Edges are computed from the tile's own index and its successor, so neighbouring
	/// tiles share bit-identical boundaries.
	#[must_use]
	pub fn to_geo_bbox(&self) -> GeoBBox {
		let x_next = u64::from(self.x) + 1;
		let y_next = u64::from(self.y) + 1;
		GeoBBox::from_edges(
			Self::column_to_lon(self.level, self.x),
			Self::edge_lat(self.level, y_next),
			Self::edge_lon(self.level, x_next),
			Self::row_to_lat(self.level, self.y),
		)
	}

	/// Web Mercator area (EPSG:3857, metres) covered by this tile.
	///
	/// Matches PostGIS `ST_TileEnvelope(z, x, y)` with the default world bounds.
	#[must_use]
	pub fn to_mercator_bbox(&self) -> MercatorBBox {
		let size = Self::size(self.level);
		let span = MercatorBBox::WORLD_EXTENT * 2.0 / size;
		let origin = -MercatorBBox::WORLD_EXTENT;
		MercatorBBox::from_edges(
			origin + f64::from(self.x) * span,
			MercatorBBox::WORLD_EXTENT - (f64::from(self.y) + 1.0) * span,
			origin + (f64::from(self.x) + 1.0) * span,
			MercatorBBox::WORLD_EXTENT - f64::from(self.y) * span,
		)
	}

	// `x + 1` may be `2^31`, which no longer fits into u32.
	fn edge_lon(level: u8, x: u64) -> f64 {
		x as f64 / Self::size(level) * 360.0 - 180.0
	}

	fn edge_lat(level: u8, y: u64) -> f64 {
		(PI * (1.0 - 2.0 * y as f64 / Self::size(level))).sinh().atan().to_degrees()
	}
}

/// Custom `Debug` format as `TileCoord(z, [x, y])` for readability.
impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", &self.level, &self.x, &self.y))
	}
}

impl fmt::Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}
