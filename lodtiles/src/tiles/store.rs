use super::TileQuery;
use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lodtiles_core::Blob;
use sqlx::{
	PgPool, Postgres,
	postgres::PgPoolOptions,
};
use std::fmt::Debug;

/// Something that can run a [`TileQuery`].
///
/// `Ok(None)` means the query produced no row or a NULL encoding.
#[async_trait]
pub trait TileStore: Debug + Send + Sync {
	async fn execute(&self, query: &TileQuery) -> Result<Option<Blob>>;

	/// Cheap round trip to check connectivity. Returns the server's clock.
	async fn probe(&self) -> Result<String>;
}

/// [`TileStore`] backed by a PostGIS connection pool.
#[derive(Clone, Debug)]
pub struct PgTileStore {
	pool: PgPool,
}

impl PgTileStore {
	/// Creates the pool without opening a connection.
	///
	/// Connections are established on first use, so the server comes up even if the
	/// database is not reachable yet.
	pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgTileStore> {
		let options = config.connect_options()?;
		let pool = PgPoolOptions::new()
			.max_connections(config.max_connections_or_default())
			.connect_lazy_with(options);
		log::info!(
			"database pool for {} with up to {} connections",
			config.describe(),
			config.max_connections_or_default()
		);
		Ok(PgTileStore { pool })
	}
}

#[async_trait]
impl TileStore for PgTileStore {
	async fn execute(&self, query: &TileQuery) -> Result<Option<Blob>> {
		let sql = query.sql();
		log::trace!("tile sql for {}: {sql}", query.coord);

		let [x0, y0, x1, y1, mx0, my0, mx1, my1] = query.envelope_params();
		let row: Option<Option<Vec<u8>>> = sqlx::query_scalar::<Postgres, Option<Vec<u8>>>(&sql)
			.bind(x0)
			.bind(y0)
			.bind(x1)
			.bind(y1)
			.bind(query.srid)
			.bind(mx0)
			.bind(my0)
			.bind(mx1)
			.bind(my1)
			.bind(&query.layer_name)
			.fetch_optional(&self.pool)
			.await
			.with_context(|| format!("query on {} failed", query.table))?;

		Ok(row.flatten().map(Blob::from))
	}

	async fn probe(&self) -> Result<String> {
		let now: String = sqlx::query_scalar("SELECT NOW()::text")
			.fetch_one(&self.pool)
			.await
			.context("database probe failed")?;
		Ok(now)
	}
}
