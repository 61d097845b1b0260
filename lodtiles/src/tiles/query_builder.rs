//! Turns a tile coordinate into the one SQL statement that renders it.
//!
//! The statement always has the same three steps:
//! 1. `filtered`: rows whose geometry intersects the tile's geographic box. The box is built
//!    in WGS84 and transformed into the table's own SRID, so the spatial index can be used;
//! 2. `mvtgeom`: geometries reprojected to Web Mercator and clipped/quantized into the
//!    tile grid by `ST_AsMVTGeom`;
//! 3. one `ST_AsMVT` aggregate encoding all remaining rows as a single layer.
//!
//! Every number and the layer name are bound parameters. Identifiers come from a
//! validated [`LodPolicy`] and are quoted.

use super::{Identifier, LodPolicy};
use lodtiles_core::{DetailTier, GeoBBox, MercatorBBox, TileCoord};
use std::fmt::Write;

/// Size of the tile grid geometries are quantized into.
pub const MVT_EXTENT: u32 = 4096;
/// Margin around the tile, in grid units, kept when clipping.
pub const MVT_BUFFER: u32 = 256;

/// Everything needed to render one tile. Built per request, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct TileQuery {
	pub coord: TileCoord,
	pub tier: DetailTier,
	pub layer_name: String,
	pub table: Identifier,
	pub geometry_column: Identifier,
	pub srid: i32,
	pub columns: Vec<Identifier>,
	pub group_by: Option<Identifier>,
	pub geo_bbox: GeoBBox,
	pub mercator_bbox: MercatorBBox,
}

pub struct QueryBuilder<'a> {
	policy: &'a LodPolicy,
}

impl<'a> QueryBuilder<'a> {
	pub fn new(policy: &'a LodPolicy) -> QueryBuilder<'a> {
		QueryBuilder { policy }
	}

	pub fn build(&self, coord: &TileCoord) -> TileQuery {
		let tier = self.policy.select_tier(coord.level);
		let dataset = self.policy.dataset(tier);

		TileQuery {
			coord: *coord,
			tier,
			layer_name: self.policy.layer_name().to_string(),
			table: dataset.table.clone(),
			geometry_column: self.policy.geometry_column().clone(),
			srid: self.policy.srid(),
			columns: dataset.columns.clone(),
			group_by: dataset.group_by.clone(),
			geo_bbox: coord.to_geo_bbox(),
			mercator_bbox: coord.to_mercator_bbox(),
		}
	}
}

impl TileQuery {
	/// The SQL statement, with placeholders:
	/// `$1..$4` geographic box in degrees, `$5` source SRID, `$6..$9` Mercator box,
	/// `$10` layer name.
	pub fn sql(&self) -> String {
		let geom = self.geometry_column.quoted();
		let mut columns = String::new();
		for column in &self.columns {
			let _ = write!(columns, ", {}", column.quoted());
		}

		format!(
			"WITH filtered AS (\
			\n  SELECT {geom}{columns}\
			\n  FROM {table}\
			\n  WHERE {geom} && ST_Transform(ST_MakeEnvelope($1, $2, $3, $4, 4326), $5)\
			\n),\
			\nmvtgeom AS (\
			\n  SELECT ST_AsMVTGeom(ST_Transform({geom}, 3857), ST_MakeEnvelope($6, $7, $8, $9, 3857), {MVT_EXTENT}, {MVT_BUFFER}, true) AS geom{columns}\
			\n  FROM filtered\
			\n)\
			\nSELECT ST_AsMVT(mvtgeom.*, $10::text, {MVT_EXTENT}, 'geom') AS mvt\
			\nFROM mvtgeom\
			\nWHERE geom IS NOT NULL",
			table = self.table.quoted(),
		)
	}

	/// Values for `$1..$4` and `$6..$9`, in that order.
	pub fn envelope_params(&self) -> [f64; 8] {
		let [a, b, c, d] = self.geo_bbox.as_array();
		let [e, f, g, h] = self.mercator_bbox.as_array();
		[a, b, c, d, e, f, g, h]
	}
}
