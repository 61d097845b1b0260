use anyhow::Result;
use lodtiles::{
	Config,
	server::TileServer,
	tiles::{PgTileStore, TileStore},
};
use std::{path::PathBuf, sync::Arc};
use tokio::time::{Duration, sleep};

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true, verbatim_doc_comment)]
pub struct Subcommand {
	/// Path to a configuration file (YAML) for server, database, CORS and layers.
	/// Command line arguments override configuration file settings.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0)]
	pub config: Option<PathBuf>,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long, display_order = 0)]
	pub ip: Option<String>,

	/// Serve via port. Default: 3000
	#[arg(short, long, display_order = 0)]
	pub port: Option<u16>,

	/// Directory with the tile archives served at /tiles/{filename}. Default: ./tiles
	#[arg(short = 't', long, value_name = "DIR", display_order = 1)]
	pub tiles_dir: Option<PathBuf>,

	/// PostgreSQL connection url, e.g. postgres://user@host:5432/database
	/// The password may also be set with LODTILES_DB_PASSWORD.
	#[arg(long, value_name = "URL", display_order = 2, verbatim_doc_comment)]
	pub database_url: Option<String>,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long, display_order = 4)]
	pub auto_shutdown: Option<u64>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let mut config = if let Some(config_path) = &arguments.config {
		Config::from_path(config_path)?
	} else {
		Config::default()
	};

	config.server.override_optional_ip(&arguments.ip);
	config.server.override_optional_port(&arguments.port);
	config.server.override_optional_tiles_dir(&arguments.tiles_dir);
	config.database.override_optional_url(&arguments.database_url);

	let store: Arc<dyn TileStore> = Arc::new(PgTileStore::connect_lazy(&config.database)?);
	let mut server = TileServer::from_config(config, store)?;

	server.start().await?;
	server.spawn_database_probe();

	if let Some(milliseconds) = arguments.auto_shutdown {
		sleep(Duration::from_millis(milliseconds)).await;
	} else {
		tokio::signal::ctrl_c().await?;
	}

	server.stop().await;
	Ok(())
}
