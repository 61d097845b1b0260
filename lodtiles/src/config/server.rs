use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_IP: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TILES_DIR: &str = "./tiles";
pub const DEFAULT_TILE_CACHE_CONTROL: &str = "public, max-age=3600, no-transform";

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
	/// IP to bind to.
	#[serde(default)]
	pub ip: Option<String>,

	/// TCP port to bind to.
	#[serde(default)]
	pub port: Option<u16>,

	/// Directory holding the static tile archives served under `/tiles/{filename}`.
	#[serde(default)]
	pub tiles_dir: Option<PathBuf>,

	/// `Cache-Control` value for generated vector tiles.
	#[serde(default)]
	pub tile_cache_control: Option<String>,
}

impl ServerConfig {
	pub fn override_optional_ip(&mut self, ip: &Option<String>) {
		if ip.is_some() {
			self.ip.clone_from(ip);
		}
	}

	pub fn override_optional_port(&mut self, port: &Option<u16>) {
		if port.is_some() {
			self.port = *port;
		}
	}

	pub fn override_optional_tiles_dir(&mut self, tiles_dir: &Option<PathBuf>) {
		if tiles_dir.is_some() {
			self.tiles_dir.clone_from(tiles_dir);
		}
	}

	pub fn ip_or_default(&self) -> String {
		self.ip.clone().unwrap_or_else(|| DEFAULT_IP.to_string())
	}

	pub fn port_or_default(&self) -> u16 {
		self.port.unwrap_or(DEFAULT_PORT)
	}

	pub fn tiles_dir_or_default(&self) -> PathBuf {
		self
			.tiles_dir
			.clone()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_TILES_DIR))
	}

	pub fn tile_cache_control_or_default(&self) -> String {
		self
			.tile_cache_control
			.clone()
			.unwrap_or_else(|| DEFAULT_TILE_CACHE_CONTROL.to_string())
	}

	/// Makes a relative `tiles_dir` relative to `base` instead of the working directory.
	pub fn resolve_paths(&mut self, base: &Path) {
		if let Some(dir) = &self.tiles_dir
			&& dir.is_relative()
		{
			self.tiles_dir = Some(base.join(dir));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn defaults() {
		let config = ServerConfig::default();
		assert_eq!(config.ip_or_default(), "0.0.0.0");
		assert_eq!(config.port_or_default(), 3000);
		assert_eq!(config.tiles_dir_or_default(), PathBuf::from("./tiles"));
		assert_eq!(config.tile_cache_control_or_default(), DEFAULT_TILE_CACHE_CONTROL);
	}

	#[test]
	fn overrides_only_apply_when_set() {
		let mut config = ServerConfig {
			ip: Some("127.0.0.1".into()),
			port: Some(8080),
			..Default::default()
		};
		config.override_optional_ip(&None);
		config.override_optional_port(&Some(9000));
		config.override_optional_tiles_dir(&Some(PathBuf::from("/srv/tiles")));

		assert_eq!(config.ip.as_deref(), Some("127.0.0.1"));
		assert_eq!(config.port, Some(9000));
		assert_eq!(config.tiles_dir, Some(PathBuf::from("/srv/tiles")));
	}

	#[test]
	fn resolve_relative_tiles_dir() {
		let mut config = ServerConfig {
			tiles_dir: Some(PathBuf::from("data/tiles")),
			..Default::default()
		};
		config.resolve_paths(Path::new("/etc/lodtiles"));
		assert_eq!(config.tiles_dir, Some(PathBuf::from("/etc/lodtiles/data/tiles")));

		let mut absolute = ServerConfig {
			tiles_dir: Some(PathBuf::from("/srv/tiles")),
			..Default::default()
		};
		absolute.resolve_paths(Path::new("/etc/lodtiles"));
		assert_eq!(absolute.tiles_dir, Some(PathBuf::from("/srv/tiles")));
	}
}
