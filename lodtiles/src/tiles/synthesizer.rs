use super::{TileQuery, TileStore};
use crate::error::TileError;
use lodtiles_core::Blob;
use std::{sync::Arc, time::Instant};

/// Result of rendering one tile.
#[derive(Clone, Debug, PartialEq)]
pub enum TilePayload {
	/// Encoded vector tile, never empty.
	Tile(Blob),
	/// No feature touches this tile.
	Empty,
}

/// Runs tile queries against a [`TileStore`] and classifies the outcome.
#[derive(Clone, Debug)]
pub struct TileSynthesizer {
	store: Arc<dyn TileStore>,
}

impl TileSynthesizer {
	pub fn new(store: Arc<dyn TileStore>) -> TileSynthesizer {
		TileSynthesizer { store }
	}

	pub fn store(&self) -> &Arc<dyn TileStore> {
		&self.store
	}

	/// Runs `query` once. No retries, no partial results.
	pub async fn synthesize(&self, query: &TileQuery) -> Result<TilePayload, TileError> {
		let start = Instant::now();
		let result = self.store.execute(query).await;
		let elapsed = start.elapsed().as_millis();

		match result {
			Ok(Some(blob)) if !blob.is_empty() => {
				log::info!(
					"tile {} generated in {elapsed}ms ({}, table: {}, {} bytes)",
					query.coord,
					query.tier,
					query.table,
					blob.len()
				);
				Ok(TilePayload::Tile(blob))
			}
			Ok(_) => {
				log::debug!(
					"tile {} is empty after {elapsed}ms ({}, table: {})",
					query.coord,
					query.tier,
					query.table
				);
				Ok(TilePayload::Empty)
			}
			Err(err) => {
				log::error!("error generating tile {} after {elapsed}ms: {err:#}", query.coord);
				Err(TileError::QueryFailed(format!("{err:#}")))
			}
		}
	}
}
