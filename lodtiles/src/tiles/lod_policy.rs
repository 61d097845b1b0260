//! Which dataset answers which zoom level.
//!
//! A [`LodPolicy`] is the validated form of one configured layer: for every [`DetailTier`]
//! it knows the backing table, the attribute the table was aggregated by, and the
//! allow-list of attributes copied into the tile. Tier selection itself is the threshold
//! table on [`DetailTier`].

use super::Identifier;
use crate::config::LayerConfig;
use anyhow::{Context, Result, bail, ensure};
use lodtiles_core::DetailTier;
use std::collections::{BTreeMap, HashSet};

/// One tier's backing dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct TierDataset {
	pub tier: DetailTier,
	pub table: Identifier,
	pub group_by: Option<Identifier>,
	pub columns: Vec<Identifier>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LodPolicy {
	layer_name: String,
	geometry_column: Identifier,
	srid: i32,
	datasets: [TierDataset; 3],
}

impl LodPolicy {
	/// Validates a layer's configuration.
	///
	/// Fails on invalid identifiers, duplicate attributes, attributes named like the geometry
	/// column, or a grouping attribute that is not part of the attribute list.
	pub fn from_config(config: &LayerConfig) -> Result<LodPolicy> {
		let layer_name = config.name.trim();
		ensure!(
			!layer_name.is_empty()
				&& layer_name
					.bytes()
					.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'),
			"layer name '{layer_name}' may only contain letters, digits, '_' and '-'"
		);

		let geometry_column = Identifier::parse(config.geometry_column_or_default())
			.with_context(|| format!("geometry column of layer '{layer_name}'"))?;

		let srid = config.srid_or_default();
		ensure!(srid > 0, "srid of layer '{layer_name}' must be positive, got {srid}");

		let datasets = DetailTier::ALL.map(|tier| {
			build_dataset(config, tier, &geometry_column)
				.with_context(|| format!("{tier} dataset of layer '{layer_name}'"))
		});
		let [nation, region, area] = datasets;

		Ok(LodPolicy {
			layer_name: layer_name.to_string(),
			geometry_column,
			srid,
			datasets: [nation?, region?, area?],
		})
	}

	pub fn layer_name(&self) -> &str {
		&self.layer_name
	}

	pub fn geometry_column(&self) -> &Identifier {
		&self.geometry_column
	}

	pub fn srid(&self) -> i32 {
		self.srid
	}

	/// The tier responsible for `zoom`.
	#[allow(clippy::unused_self)]
	pub fn select_tier(&self, zoom: u8) -> DetailTier {
		DetailTier::from_zoom(zoom)
	}

	pub fn dataset(&self, tier: DetailTier) -> &TierDataset {
		match tier {
			DetailTier::Nation => &self.datasets[0],
			DetailTier::Region => &self.datasets[1],
			DetailTier::Area => &self.datasets[2],
		}
	}
}

fn build_dataset(config: &LayerConfig, tier: DetailTier, geometry_column: &Identifier) -> Result<TierDataset> {
	let dataset = config.dataset(tier);

	let table = Identifier::parse(&dataset.table)?;
	let columns = dataset
		.columns
		.iter()
		.map(|c| Identifier::parse(c))
		.collect::<Result<Vec<_>>>()?;

	let mut seen = HashSet::new();
	for column in &columns {
		if column == geometry_column {
			bail!("attribute '{column}' clashes with the geometry column");
		}
		if !seen.insert(column.as_str()) {
			bail!("attribute '{column}' is listed twice");
		}
	}

	let group_by = dataset.group_by.as_deref().map(Identifier::parse).transpose()?;
	if let Some(group_by) = &group_by {
		ensure!(
			columns.contains(group_by),
			"grouping attribute '{group_by}' must be one of the attributes"
		);
	}

	Ok(TierDataset {
		tier,
		table,
		group_by,
		columns,
	})
}

/// All configured layers, by name.
#[derive(Clone, Debug, Default)]
pub struct LayerCatalog {
	layers: BTreeMap<String, LodPolicy>,
}

impl LayerCatalog {
	pub fn from_configs(configs: &[LayerConfig]) -> Result<LayerCatalog> {
		let mut layers = BTreeMap::new();
		for config in configs {
			let policy = LodPolicy::from_config(config)?;
			let name = policy.layer_name().to_string();
			ensure!(!layers.contains_key(&name), "layer '{name}' is defined twice");
			layers.insert(name, policy);
		}
		Ok(LayerCatalog { layers })
	}

	pub fn get(&self, name: &str) -> Option<&LodPolicy> {
		self.layers.get(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.layers.keys().map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.layers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::TierDatasetConfig;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn default_policy() -> LodPolicy {
		LodPolicy::from_config(&LayerConfig::default()).unwrap()
	}

	#[rstest]
	#[case(5, DetailTier::Nation, "nations_aggregated")]
	#[case(8, DetailTier::Region, "local_authorities_aggregated")]
	#[case(11, DetailTier::Area, "small_areas_standardized")]
	fn tier_and_table_per_zoom(#[case] zoom: u8, #[case] tier: DetailTier, #[case] table: &str) {
		let policy = default_policy();
		assert_eq!(policy.select_tier(zoom), tier);
		assert_eq!(policy.dataset(tier).table.as_str(), table);
		assert_eq!(policy.dataset(tier).tier, tier);
	}

	#[test]
	fn grouping_attributes() {
		let policy = default_policy();
		let group_by = |tier| policy.dataset(tier).group_by.as_ref().map(Identifier::as_str);
		assert_eq!(group_by(DetailTier::Nation), Some("lookups_nation"));
		assert_eq!(group_by(DetailTier::Region), Some("lookups_local_authority"));
		assert_eq!(group_by(DetailTier::Area), None);
	}

	fn with_area(area: TierDatasetConfig) -> LayerConfig {
		LayerConfig {
			area: Some(area),
			..LayerConfig::default()
		}
	}

	#[rstest]
	#[case(with_area(TierDatasetConfig { table: "bad table".into(), group_by: None, columns: vec![] }))]
	#[case(with_area(TierDatasetConfig { table: "t".into(), group_by: None, columns: vec!["a;--".into()] }))]
	#[case(with_area(TierDatasetConfig { table: "t".into(), group_by: None, columns: vec!["a".into(), "a".into()] }))]
	#[case(with_area(TierDatasetConfig { table: "t".into(), group_by: None, columns: vec!["geom".into()] }))]
	#[case(with_area(TierDatasetConfig { table: "t".into(), group_by: Some("b".into()), columns: vec!["a".into()] }))]
	#[case(LayerConfig { srid: Some(0), ..LayerConfig::default() })]
	#[case(LayerConfig { geometry_column: Some("the geom".into()), ..LayerConfig::default() })]
	#[case(LayerConfig::new("bad/name"))]
	#[case(LayerConfig::new(""))]
	fn invalid_configs(#[case] config: LayerConfig) {
		assert!(LodPolicy::from_config(&config).is_err(), "{config:?}");
	}

	#[test]
	fn error_names_the_tier() {
		let config = with_area(TierDatasetConfig {
			table: "t".into(),
			group_by: None,
			columns: vec!["x y".into()],
		});
		let message = format!("{:#}", LodPolicy::from_config(&config).unwrap_err());
		assert!(message.starts_with("area dataset of layer 'small_areas'"), "{message}");
	}

	#[test]
	fn catalog() {
		let catalog = LayerCatalog::from_configs(&[LayerConfig::new("b"), LayerConfig::new("a")]).unwrap();
		assert_eq!(catalog.names().collect::<Vec<_>>(), ["a", "b"]);
		assert!(catalog.get("a").is_some());
		assert!(catalog.get("c").is_none());

		assert!(LayerCatalog::from_configs(&[LayerConfig::new("a"), LayerConfig::new("a")]).is_err());
	}
}
