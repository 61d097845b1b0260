//! Server lifecycle: configuration ingestion, middleware, listening and shutdown.
//!
//! Request handling is in `handlers`, routing in `routes`, origin checks in `cors`.

use super::{ArchiveServer, cors, handlers::TileHandlerState, routes};
use crate::{
	config::Config,
	tiles::{LayerCatalog, TileStore, TileSynthesizer},
};
use anyhow::{Context, Result, bail};
use axum::http::{HeaderName, HeaderValue};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::{catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer};

pub struct TileServer {
	ip: String,
	port: u16,
	config: Config,
	state: TileHandlerState,
	exit_signal: Option<oneshot::Sender<()>>,
	join: Option<JoinHandle<()>>,
	local_addr: Option<SocketAddr>,
}

impl TileServer {
	/// Builds a server from `config`. `store` runs the dynamic tile queries.
	///
	/// Fails on invalid layer definitions or response headers; nothing is bound yet.
	pub fn from_config(config: Config, store: Arc<dyn TileStore>) -> Result<TileServer> {
		let catalog = LayerCatalog::from_configs(&config.layers_or_default()).context("invalid layer configuration")?;
		if catalog.is_empty() {
			bail!("no layers configured");
		}
		log::info!("layers: {}", catalog.names().collect::<Vec<_>>().join(", "));

		let cache_control = config.server.tile_cache_control_or_default();
		let tile_cache_control = HeaderValue::from_str(&cache_control)
			.with_context(|| format!("invalid tile_cache_control '{cache_control}'"))?;

		// validate early so start() cannot fail on them
		extra_headers(&config)?;
		cors::build_cors_layer(&config.cors)?;

		let state = TileHandlerState {
			catalog: Arc::new(catalog),
			synthesizer: TileSynthesizer::new(store),
			archives: Arc::new(ArchiveServer::new(&config.server.tiles_dir_or_default())),
			tile_cache_control,
		};

		Ok(TileServer {
			ip: config.server.ip_or_default(),
			port: config.server.port_or_default(),
			config,
			state,
			exit_signal: None,
			join: None,
			local_addr: None,
		})
	}

	/// Runs the connectivity probe in the background and logs the outcome.
	///
	/// The pool connects lazily, so the server is usable even if the probe fails.
	pub fn spawn_database_probe(&self) -> JoinHandle<bool> {
		let store = Arc::clone(self.state.synthesizer.store());
		tokio::spawn(async move {
			match store.probe().await {
				Ok(now) => {
					log::info!("database connection ok (server time {now})");
					true
				}
				Err(err) => {
					log::error!("database connection failed: {err:#}");
					false
				}
			}
		})
	}

	/// Binds the socket and starts serving in a background task.
	///
	/// Starting a running server restarts it.
	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() || self.join.is_some() {
			self.stop().await;
		}

		let mut router = routes::build_router(self.state.clone())
			.layer(cors::build_cors_layer(&self.config.cors)?)
			.layer(CatchPanicLayer::new());
		for (name, value) in extra_headers(&self.config)? {
			router = router.layer(SetResponseHeaderLayer::overriding(name, value));
		}

		let addr = format!("{}:{}", self.ip, self.port);
		let listener = TcpListener::bind(&addr)
			.await
			.with_context(|| format!("failed to bind {addr}"))?;
		let local_addr = listener.local_addr()?;
		log::info!("server listening on {local_addr}");

		let (tx, rx) = oneshot::channel::<()>();
		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
			{
				log::error!("server task exited with error: {err}");
			}
		});

		self.exit_signal = Some(tx);
		self.join = Some(handle);
		self.local_addr = Some(local_addr);
		Ok(())
	}

	/// Signals shutdown and waits up to ten seconds for in-flight requests.
	pub async fn stop(&mut self) {
		if self.exit_signal.is_none() && self.join.is_none() {
			return;
		}
		log::info!("stopping server");

		if let Some(tx) = self.exit_signal.take() {
			let _ = tx.send(());
		}
		if let Some(handle) = self.join.take() {
			match tokio::time::timeout(Duration::from_secs(10), handle).await {
				Ok(Err(join_err)) => log::warn!("server task join error: {join_err}"),
				Ok(Ok(())) => {}
				Err(_) => log::warn!("server task did not shut down within timeout"),
			}
		}
		self.local_addr = None;
	}

	/// The bound address while running. Useful with port `0`.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.local_addr
	}
}

fn extra_headers(config: &Config) -> Result<Vec<(HeaderName, HeaderValue)>> {
	let mut headers = config
		.extra_response_headers
		.iter()
		.map(|(name, value)| {
			let header_name =
				HeaderName::from_bytes(name.as_bytes()).with_context(|| format!("invalid header name '{name}'"))?;
			let header_value =
				HeaderValue::from_str(value).with_context(|| format!("invalid value for header '{name}'"))?;
			Ok((header_name, header_value))
		})
		.collect::<Result<Vec<_>>>()?;
	headers.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{config::LayerConfig, tiles::TileQuery};
	use async_trait::async_trait;
	use lodtiles_core::Blob;
	use pretty_assertions::assert_eq;

	#[derive(Debug)]
	struct OfflineStore;

	#[async_trait]
	impl TileStore for OfflineStore {
		async fn execute(&self, _query: &TileQuery) -> Result<Option<Blob>> {
			bail!("connection refused")
		}

		async fn probe(&self) -> Result<String> {
			bail!("connection refused")
		}
	}

	fn config() -> Config {
		let mut config = Config::default();
		config.server.ip = Some(String::from("127.0.0.1"));
		config.server.port = Some(0);
		config
	}

	#[tokio::test]
	async fn start_and_stop() {
		let mut server = TileServer::from_config(config(), Arc::new(OfflineStore)).unwrap();
		assert!(server.local_addr().is_none());
		assert!(!server.spawn_database_probe().await.unwrap());

		server.start().await.unwrap();
		let addr = server.local_addr().unwrap();
		let text = reqwest::get(format!("http://{addr}/status"))
			.await
			.unwrap()
			.text()
			.await
			.unwrap();
		assert_eq!(text, "ready!");

		// restart picks a new port
		server.start().await.unwrap();
		assert!(server.local_addr().is_some());

		server.stop().await;
		server.stop().await;
		assert!(server.local_addr().is_none());
	}

	#[test]
	fn rejects_invalid_headers() {
		let mut config = config();
		config
			.extra_response_headers
			.insert(String::from("bad header"), String::from("x"));
		assert!(TileServer::from_config(config, Arc::new(OfflineStore)).is_err());
	}

	#[test]
	fn rejects_duplicate_layers() {
		let mut config = config();
		config.layers = vec![LayerConfig::new("a"), LayerConfig::new("a")];
		assert!(TileServer::from_config(config, Arc::new(OfflineStore)).is_err());
	}

	#[test]
	fn rejects_invalid_cache_control() {
		let mut config = config();
		config.server.tile_cache_control = Some(String::from("bad\nvalue"));
		assert!(TileServer::from_config(config, Arc::new(OfflineStore)).is_err());
	}
}
