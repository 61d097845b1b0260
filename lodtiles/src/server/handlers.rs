//! HTTP handlers for `/tiles/...`.
//!
//! One wildcard route receives every tile request and dispatches on the shape of the path:
//! - `{layer}/{z}/{x}/{y}.pbf` is synthesized from the database
//! - `{filename}` is a byte range of an archive file
//!
//! Every failure is a [`TileError`], rendered as JSON by its `IntoResponse` impl. CORS
//! headers are left to the `CorsLayer`.

use super::ArchiveServer;
use crate::{
	error::TileError,
	tiles::{LayerCatalog, QueryBuilder, TilePayload, TileSynthesizer},
};
use axum::{
	body::Body,
	extract::{Path, State},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
};
use lodtiles_core::TileCoord;
use std::sync::Arc;

/// Shared, read-only state of the tile routes.
#[derive(Clone, Debug)]
pub struct TileHandlerState {
	pub catalog: Arc<LayerCatalog>,
	pub synthesizer: TileSynthesizer,
	pub archives: Arc<ArchiveServer>,
	pub tile_cache_control: HeaderValue,
}

/// A parsed `/tiles/...` path.
#[derive(Debug, PartialEq)]
enum TileRequest<'a> {
	Dynamic { layer: &'a str, coord: TileCoord },
	Archive { filename: &'a str },
}

impl<'a> TileRequest<'a> {
	fn parse(path: &'a str) -> Result<TileRequest<'a>, TileError> {
		let segments: Vec<&str> = path.split('/').collect();
		match *segments.as_slice() {
			[filename] => Ok(TileRequest::Archive { filename }),
			[layer, z, x, y] if y.ends_with(".pbf") => {
				let coord = parse_coord(z, x, &y[..y.len() - 4])?;
				Ok(TileRequest::Dynamic { layer, coord })
			}
			_ => Err(TileError::ArchiveNotFound(path.to_string())),
		}
	}
}

fn parse_coord(z: &str, x: &str, y: &str) -> Result<TileCoord, TileError> {
	let malformed = || TileError::MalformedCoordinate(format!("{z}/{x}/{y}"));
	let level: u8 = parse_number(z).ok_or_else(malformed)?;
	let x: u32 = parse_number(x).ok_or_else(malformed)?;
	let y: u32 = parse_number(y).ok_or_else(malformed)?;
	TileCoord::new(level, x, y).map_err(|err| TileError::MalformedCoordinate(err.to_string()))
}

/// Plain decimal digits only; `str::parse` would also take a leading `+`.
fn parse_number<T: std::str::FromStr>(text: &str) -> Option<T> {
	if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	text.parse().ok()
}

/// Entry point for `GET /tiles/{*path}`.
pub async fn serve_tiles(
	Path(path): Path<String>,
	headers: HeaderMap,
	State(state): State<TileHandlerState>,
) -> Response<Body> {
	log::debug!("handle tile request: {path}");

	let result = match TileRequest::parse(&path) {
		Ok(TileRequest::Dynamic { layer, coord }) => serve_dynamic(&state, layer, &coord).await,
		Ok(TileRequest::Archive { filename }) => {
			let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
			state.archives.serve(filename, range).await
		}
		Err(err) => Err(err),
	};

	result.unwrap_or_else(|err| {
		match err.status_code() {
			StatusCode::INTERNAL_SERVER_ERROR => log::warn!("send 500 for {path}: {err}"),
			status => log::debug!("send {} for {path}: {err}", status.as_u16()),
		}
		err.into_response()
	})
}

async fn serve_dynamic(
	state: &TileHandlerState,
	layer: &str,
	coord: &TileCoord,
) -> Result<Response<Body>, TileError> {
	let policy = state
		.catalog
		.get(layer)
		.ok_or_else(|| TileError::UnknownLayer(layer.to_string()))?;
	let query = QueryBuilder::new(policy).build(coord);

	match state.synthesizer.synthesize(&query).await? {
		TilePayload::Tile(blob) => Ok(Response::builder()
			.status(StatusCode::OK)
			.header(header::CONTENT_TYPE, "application/x-protobuf")
			.header(header::CACHE_CONTROL, state.tile_cache_control.clone())
			.header(header::CONTENT_LENGTH, blob.len())
			.body(Body::from(blob.into_bytes()))
			.map_err(|err| TileError::Io(err.to_string()))?),
		TilePayload::Empty => Ok(StatusCode::NO_CONTENT.into_response()),
	}
}
