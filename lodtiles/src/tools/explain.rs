use anyhow::{Context, Result};
use lodtiles::{
	Config,
	tiles::{LayerCatalog, QueryBuilder, TileQuery},
};
use lodtiles_core::TileCoord;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// Layer name, as in /tiles/{layer}/{z}/{x}/{y}.pbf
	pub layer: String,

	/// Zoom level
	pub z: u8,

	/// Tile column
	pub x: u32,

	/// Tile row
	pub y: u32,

	/// Path to a configuration file (YAML) defining the layers.
	#[arg(short = 'c', long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let query = explain(arguments)?;
	print!("{}", describe(&query));
	Ok(())
}

fn explain(arguments: &Subcommand) -> Result<TileQuery> {
	let config = if let Some(config_path) = &arguments.config {
		Config::from_path(config_path)?
	} else {
		Config::default()
	};

	let catalog = LayerCatalog::from_configs(&config.layers_or_default())?;
	let policy = catalog.get(&arguments.layer).with_context(|| {
		let names = catalog.names().collect::<Vec<_>>().join(", ");
		format!("unknown layer '{}', known layers: {names}", arguments.layer)
	})?;
	let coord = TileCoord::new(arguments.z, arguments.x, arguments.y)?;

	Ok(QueryBuilder::new(policy).build(&coord))
}

fn describe(query: &TileQuery) -> String {
	let [x0, y0, x1, y1] = query.geo_bbox.as_array();
	let [mx0, my0, mx1, my1] = query.mercator_bbox.as_array();
	let group_by = query.group_by.as_ref().map_or("-", |g| g.as_str());
	let columns = query.columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ");
	format!(
		"tile:      {}\nlayer:     {}\ntier:      {}\ntable:     {}\ngroup by:  {group_by}\ncolumns:   {columns}\nbbox:      [{x0}, {y0}, {x1}, {y1}] (wgs84, filtered in srid {})\nmercator:  [{mx0}, {my0}, {mx1}, {my1}]\n\n{}\n",
		query.coord,
		query.layer_name,
		query.tier,
		query.table,
		query.srid,
		query.sql()
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn arguments(layer: &str, z: u8, x: u32, y: u32) -> Subcommand {
		Subcommand {
			layer: layer.to_string(),
			z,
			x,
			y,
			config: None,
		}
	}

	#[rstest]
	#[case(5, "nation", "nations_aggregated", "lookups_nation")]
	#[case(8, "region", "local_authorities_aggregated", "lookups_local_authority")]
	#[case(11, "area", "small_areas_standardized", "-")]
	fn tier_per_zoom(#[case] z: u8, #[case] tier: &str, #[case] table: &str, #[case] group_by: &str) {
		let text = describe(&explain(&arguments("small_areas", z, 0, 0)).unwrap());
		assert!(text.contains(&format!("tier:      {tier}\n")), "{text}");
		assert!(text.contains(&format!("table:     {table}\n")), "{text}");
		assert!(text.contains(&format!("group by:  {group_by}\n")), "{text}");
		assert!(text.contains("ST_AsMVT("), "{text}");
	}

	#[test]
	fn world_tile() {
		let text = describe(&explain(&arguments("small_areas", 0, 0, 0)).unwrap());
		let line = text.lines().find(|l| l.starts_with("mercator:")).unwrap();
		assert_eq!(
			line,
			"mercator:  [-20037508.342789244, -20037508.342789244, 20037508.342789244, 20037508.342789244]"
		);
	}

	#[test]
	fn unknown_layer() {
		let err = explain(&arguments("roads", 3, 0, 0)).unwrap_err();
		assert_eq!(err.to_string(), "unknown layer 'roads', known layers: small_areas");
	}

	#[test]
	fn out_of_range() {
		assert!(explain(&arguments("small_areas", 3, 8, 0)).is_err());
	}

	#[test]
	fn subcommand() {
		run_command(vec!["lodtiles", "explain", "small_areas", "12", "2048", "1362"]).unwrap();
	}
}
