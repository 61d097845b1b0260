use super::{CorsConfig, DatabaseConfig, LayerConfig, ServerConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	collections::HashMap,
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// HTTP server configuration
	#[serde(default)]
	pub server: ServerConfig,

	/// PostGIS connection
	#[serde(default)]
	pub database: DatabaseConfig,

	/// Cross-Origin Resource Sharing (CORS) settings
	#[serde(default)]
	pub cors: CorsConfig,

	/// Extra response headers added to every HTTP response.
	#[serde(default)]
	pub extra_response_headers: HashMap<String, String>,

	/// Vector layers. Defaults to a single `small_areas` layer.
	#[serde(default)]
	pub layers: Vec<LayerConfig>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parses a YAML file and resolves relative paths against its directory.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("failed to open config file {path:?}"))?;
		let mut config =
			Config::from_reader(BufReader::new(file)).with_context(|| format!("failed to parse config file {path:?}"))?;

		if let Some(base) = path.parent() {
			config.server.resolve_paths(base);
		}
		Ok(config)
	}

	/// Configured layers, or the built-in one if none are configured.
	pub fn layers_or_default(&self) -> Vec<LayerConfig> {
		if self.layers.is_empty() {
			vec![LayerConfig::default()]
		} else {
			self.layers.clone()
		}
	}
}
