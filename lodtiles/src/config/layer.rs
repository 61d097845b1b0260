//! Vector layers served under `/tiles/{layer}/{z}/{x}/{y}.pbf`.
//!
//! Every layer names one backing dataset per detail tier. Omitted tiers fall back to the
//! built-in datasets, so the smallest useful entry is just a name:
//!
//! ```yaml
//! layers:
//!   - name: small_areas
//!   - name: boundaries
//!     geometry_column: wkb_geometry
//!     srid: 4326
//!     nation:
//!       table: nations_outline
//!       group_by: lookups_nation
//!       columns: [lookups_nation]
//! ```
//!
//! Table and column names are checked when the server is built, never here.

use lodtiles_core::DetailTier;
use serde::Deserialize;

pub const DEFAULT_LAYER_NAME: &str = "small_areas";
pub const DEFAULT_GEOMETRY_COLUMN: &str = "geom";
pub const DEFAULT_SRID: i32 = 4326;

/// Co-benefit values carried by every tier.
pub const BENEFIT_COLUMNS: [&str; 12] = [
	"air_quality",
	"congestion",
	"dampness",
	"diet_change",
	"excess_cold",
	"excess_heat",
	"hassle_costs",
	"noise",
	"physical_activity",
	"road_repairs",
	"road_safety",
	"sum",
];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
	/// URL segment and MVT layer name.
	pub name: String,

	/// Geometry column, the same in every tier table.
	#[serde(default)]
	pub geometry_column: Option<String>,

	/// SRID the geometries are stored in.
	#[serde(default)]
	pub srid: Option<i32>,

	#[serde(default)]
	pub nation: Option<TierDatasetConfig>,

	#[serde(default)]
	pub region: Option<TierDatasetConfig>,

	#[serde(default)]
	pub area: Option<TierDatasetConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TierDatasetConfig {
	/// Table (optionally `schema.table`) holding this tier's features.
	pub table: String,

	/// Attribute the table was aggregated by, if any.
	#[serde(default)]
	pub group_by: Option<String>,

	/// Attributes copied into each feature.
	#[serde(default)]
	pub columns: Vec<String>,
}

impl LayerConfig {
	pub fn new(name: &str) -> LayerConfig {
		LayerConfig {
			name: name.to_string(),
			geometry_column: None,
			srid: None,
			nation: None,
			region: None,
			area: None,
		}
	}

	pub fn geometry_column_or_default(&self) -> &str {
		self.geometry_column.as_deref().unwrap_or(DEFAULT_GEOMETRY_COLUMN)
	}

	pub fn srid_or_default(&self) -> i32 {
		self.srid.unwrap_or(DEFAULT_SRID)
	}

	/// The dataset configured for `tier`, or the built-in one.
	pub fn dataset(&self, tier: DetailTier) -> TierDatasetConfig {
		let configured = match tier {
			DetailTier::Nation => &self.nation,
			DetailTier::Region => &self.region,
			DetailTier::Area => &self.area,
		};
		configured
			.clone()
			.unwrap_or_else(|| TierDatasetConfig::default_for(tier))
	}
}

impl Default for LayerConfig {
	fn default() -> Self {
		LayerConfig::new(DEFAULT_LAYER_NAME)
	}
}

impl TierDatasetConfig {
	pub fn default_for(tier: DetailTier) -> TierDatasetConfig {
		let (table, group_by, keys): (&str, Option<&str>, &[&str]) = match tier {
			DetailTier::Nation => ("nations_aggregated", Some("lookups_nation"), &["lookups_nation"]),
			DetailTier::Region => (
				"local_authorities_aggregated",
				Some("lookups_local_authority"),
				&["lookups_local_authority", "lookups_nation"],
			),
			DetailTier::Area => (
				"small_areas_standardized",
				None,
				&[
					"small_area",
					"lookups_local_authority",
					"lookups_nation",
					"urban_rural",
					"area_type_display",
				],
			),
		};

		TierDatasetConfig {
			table: table.to_string(),
			group_by: group_by.map(str::to_string),
			columns: keys
				.iter()
				.chain(BENEFIT_COLUMNS.iter())
				.map(|c| (*c).to_string())
				.collect(),
		}
	}
}
