//! Outcomes of a tile request that are not a tile.
//!
//! Everything below the HTTP handlers returns a [`TileError`]; only the handlers turn it into
//! a status code and a JSON body of the form `{"error": "..."}`.

use axum::{
	Json,
	http::{HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TileError {
	#[error("malformed tile coordinate: {0}")]
	MalformedCoordinate(String),

	#[error("unknown layer '{0}'")]
	UnknownLayer(String),

	#[error("{0}")]
	QueryFailed(String),

	#[error("file not found: {0}")]
	ArchiveNotFound(String),

	#[error("range not satisfiable for {total} bytes")]
	RangeUnsatisfiable { total: u64 },

	#[error("i/o error: {0}")]
	Io(String),
}

impl TileError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::MalformedCoordinate(_) | Self::UnknownLayer(_) => StatusCode::BAD_REQUEST,
			Self::QueryFailed(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::ArchiveNotFound(_) => StatusCode::NOT_FOUND,
			Self::RangeUnsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
		}
	}
}

impl IntoResponse for TileError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		let content_range = match &self {
			Self::RangeUnsatisfiable { total } => HeaderValue::from_str(&format!("bytes */{total}")).ok(),
			_ => None,
		};
		let body = ErrorBody { error: self.to_string() };

		let mut response = (status, Json(body)).into_response();
		if let Some(value) = content_range {
			response.headers_mut().insert(header::CONTENT_RANGE, value);
		}
		response
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	async fn body_text(response: Response) -> String {
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
		String::from_utf8_lossy(&bytes).into_owned()
	}

	#[rstest]
	#[case(TileError::MalformedCoordinate("x".into()), 400)]
	#[case(TileError::UnknownLayer("roads".into()), 400)]
	#[case(TileError::QueryFailed("boom".into()), 500)]
	#[case(TileError::ArchiveNotFound("a.pmtiles".into()), 404)]
	#[case(TileError::RangeUnsatisfiable { total: 10 }, 416)]
	#[case(TileError::Io("disk".into()), 500)]
	fn status_codes(#[case] error: TileError, #[case] status: u16) {
		assert_eq!(error.status_code().as_u16(), status);
	}

	#[tokio::test]
	async fn json_body() {
		let response = TileError::QueryFailed("relation \"x\" does not exist".into()).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(
			response.headers().get(header::CONTENT_TYPE).unwrap(),
			"application/json"
		);
		assert_eq!(body_text(response).await, r#"{"error":"relation \"x\" does not exist"}"#);
	}

	#[tokio::test]
	async fn unsatisfiable_range_reports_size() {
		let response = TileError::RangeUnsatisfiable { total: 500_000 }.into_response();
		assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
		assert_eq!(response.headers().get(header::CONTENT_RANGE).unwrap(), "bytes */500000");
	}
}
