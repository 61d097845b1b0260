//! Router composition. Lifecycle and middleware live in `tile_server.rs`.

use super::handlers::{TileHandlerState, serve_tiles};
use crate::error::ErrorBody;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};

/// `/status`, `/tiles/{*path}` and a JSON 404 for everything else.
pub fn build_router(state: TileHandlerState) -> Router {
	let tiles = Router::new()
		.route("/tiles/{*path}", get(serve_tiles))
		.with_state(state);

	Router::new()
		.route("/status", get(|| async { "ready!" }))
		.merge(tiles)
		.fallback(not_found)
}

async fn not_found() -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorBody {
			error: String::from("not found"),
		}),
	)
}
