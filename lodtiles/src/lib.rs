//! Adaptive vector tiles for a map client.
//!
//! Tiles at `/tiles/{layer}/{z}/{x}/{y}.pbf` are rendered on demand from PostGIS, choosing a
//! coarser pre-aggregated dataset at lower zoom levels. Pre-built PMTiles archives in the tiles
//! directory are served at `/tiles/{filename}` with HTTP range support.
//!
//! ```no_run
//! use lodtiles::{Config, server::TileServer, tiles::PgTileStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_path(std::path::Path::new("lodtiles.yml"))?;
//! let store = PgTileStore::connect_lazy(&config.database)?;
//! let mut server = TileServer::from_config(config, Arc::new(store))?;
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod tiles;

pub use config::Config;
pub use error::TileError;
