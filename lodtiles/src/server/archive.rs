//! Byte-range delivery of pre-built tile archives.
//!
//! Archives are large immutable files in one directory. A PMTiles client fetches the header
//! and directories first and then single tiles, each with its own `Range` request, so this
//! module implements exactly the partial-content subset of HTTP it needs:
//!
//! - no `Range`: `200` with the whole file streamed and `Accept-Ranges: bytes`
//! - `Range: bytes=a-b`, `bytes=a-` or `bytes=-n`: `206` with `Content-Range`; ranges above
//!   [`BUFFERED_RANGE_LIMIT`] are streamed, smaller ones read into memory first
//! - anything unsatisfiable or unparsable: `416` with `Content-Range: bytes */size`
//!
//! Files that don't exist, and names that try to leave the directory, are both `404`.

use crate::error::TileError;
use anyhow::Result;
use axum::{
	body::Body,
	http::{HeaderValue, StatusCode, header},
	response::Response,
};
use lodtiles_core::{ByteRange, RangeRequest, io::DataReaderFile};
use std::path::{Path, PathBuf};

/// Archives are content-addressed by filename and never rewritten in place.
pub const ARCHIVE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Largest range read into memory before responding. A buffered range whose read comes up
/// short is answered with the bytes actually read.
pub const BUFFERED_RANGE_LIMIT: u64 = 64 * 1024;

#[derive(Clone, Debug)]
pub struct ArchiveServer {
	root: PathBuf,
}

impl ArchiveServer {
	/// Serves files from `root`.
	///
	/// A missing directory is not an error: every archive request will be answered with `404`
	/// until it appears.
	pub fn new(root: &Path) -> ArchiveServer {
		let root = match root.canonicalize() {
			Ok(root) => root,
			Err(err) => {
				log::warn!("tiles directory {root:?} is not accessible: {err}");
				root.to_path_buf()
			}
		};
		log::info!("serving archives from {root:?}");
		ArchiveServer { root }
	}

	/// Maps a requested filename to a regular file inside the root directory.
	pub async fn resolve(&self, filename: &str) -> Result<PathBuf, TileError> {
		let not_found = || TileError::ArchiveNotFound(filename.to_string());

		if filename.is_empty()
			|| filename.starts_with('.')
			|| filename.contains(['/', '\\', '\0'])
		{
			log::debug!("rejected archive name {filename:?}");
			return Err(not_found());
		}

		let path = tokio::fs::canonicalize(self.root.join(filename))
			.await
			.map_err(|_| not_found())?;
		if !path.starts_with(&self.root) {
			log::warn!("archive {filename:?} resolves outside of the tiles directory");
			return Err(not_found());
		}

		match tokio::fs::metadata(&path).await {
			Ok(metadata) if metadata.is_file() => Ok(path),
			_ => Err(not_found()),
		}
	}

	/// Answers one archive request. `range` is the raw `Range` header, if any.
	pub async fn serve(&self, filename: &str, range: Option<&str>) -> Result<Response<Body>, TileError> {
		let path = self.resolve(filename).await?;
		let reader = DataReaderFile::open(&path)
			.await
			.map_err(|err| TileError::Io(format!("{err:#}")))?;
		respond(reader, filename, range).await
	}
}

async fn respond(
	mut reader: DataReaderFile,
	filename: &str,
	range: Option<&str>,
) -> Result<Response<Body>, TileError> {
	let total = reader.size();
	let content_type = archive_mime(reader.path());

	let Some(range) = range else {
		log::info!("full file request: {filename} ({total} bytes)");
		return Response::builder()
			.status(StatusCode::OK)
			.header(header::CONTENT_TYPE, content_type)
			.header(header::CONTENT_LENGTH, total)
			.header(header::ACCEPT_RANGES, "bytes")
			.header(header::CACHE_CONTROL, ARCHIVE_CACHE_CONTROL)
			.body(Body::from_stream(reader.into_stream()))
			.map_err(|err| TileError::Io(err.to_string()));
	};

	let unsatisfiable = || TileError::RangeUnsatisfiable { total };
	let requested = RangeRequest::parse(range)
		.map_err(|err| {
			log::debug!("invalid range for {filename}: {err}");
			unsatisfiable()
		})?
		.resolve(total)
		.ok_or_else(unsatisfiable)?;

	if requested.length() > BUFFERED_RANGE_LIMIT {
		log::debug!("stream {} bytes of {filename}", requested.length());
		let stream = reader
			.into_range_stream(&requested)
			.await
			.map_err(|err| TileError::Io(format!("{err:#}")))?;
		return partial_content(content_type, &requested, Body::from_stream(stream));
	}

	let blob = reader
		.read_range(&requested)
		.await
		.map_err(|err| TileError::Io(format!("{err:#}")))?;
	// the file may have shrunk since it was opened
	let sent = requested.truncated(blob.len()).ok_or_else(unsatisfiable)?;
	log::debug!(
		"read {} bytes of {filename}, expected {}",
		blob.len(),
		requested.length()
	);
	partial_content(content_type, &sent, Body::from(blob.into_bytes()))
}

fn partial_content(content_type: HeaderValue, range: &ByteRange, body: Body) -> Result<Response<Body>, TileError> {
	Response::builder()
		.status(StatusCode::PARTIAL_CONTENT)
		.header(header::CONTENT_TYPE, content_type)
		.header(header::CONTENT_LENGTH, range.length())
		.header(header::CONTENT_RANGE, range.content_range())
		.header(header::ACCEPT_RANGES, "bytes")
		.header(header::CACHE_CONTROL, ARCHIVE_CACHE_CONTROL)
		.body(body)
		.map_err(|err| TileError::Io(err.to_string()))
}

/// PMTiles archives are sent as protobuf, like the tiles they contain; other files by extension.
fn archive_mime(path: &Path) -> HeaderValue {
	let is_pmtiles = path
		.extension()
		.is_some_and(|ext| ext.eq_ignore_ascii_case("pmtiles"));
	if is_pmtiles {
		return HeaderValue::from_static("application/x-protobuf");
	}
	let mime = mime_guess::from_path(path).first_or_octet_stream();
	HeaderValue::from_str(mime.essence_str()).unwrap_or(HeaderValue::from_static("application/octet-stream"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{TempDir, prelude::*};
	use axum::{body::HttpBody, response::IntoResponse};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	const SIZE: usize = 500_000;

	fn sample() -> Vec<u8> {
		(0..SIZE).map(|i| (i % 251) as u8).collect()
	}

	fn setup() -> (TempDir, ArchiveServer) {
		let dir = TempDir::new().unwrap();
		dir.child("tiles/nation_wgs84.pmtiles").write_binary(&sample()).unwrap();
		dir.child("tiles/readme.json").write_str("{}").unwrap();
		dir.child("tiles/sub/inner.pmtiles").write_binary(b"x").unwrap();
		dir.child("secret.txt").write_str("secret").unwrap();
		let server = ArchiveServer::new(&dir.path().join("tiles"));
		(dir, server)
	}

	async fn body(response: Response<Body>) -> Vec<u8> {
		axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap()
			.to_vec()
	}

	fn header_str<'a>(response: &'a Response<Body>, name: header::HeaderName) -> &'a str {
		response.headers().get(name).unwrap().to_str().unwrap()
	}

	#[tokio::test]
	async fn whole_file() {
		let (_dir, server) = setup();
		let response = server.serve("nation_wgs84.pmtiles", None).await.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(header_str(&response, header::CONTENT_LENGTH), "500000");
		assert_eq!(header_str(&response, header::ACCEPT_RANGES), "bytes");
		assert_eq!(header_str(&response, header::CACHE_CONTROL), ARCHIVE_CACHE_CONTROL);
		assert_eq!(header_str(&response, header::CONTENT_TYPE), "application/x-protobuf");
		assert!(body(response).await == sample());
	}

	#[tokio::test]
	async fn partial_content() {
		let (_dir, server) = setup();
		let response = server
			.serve("nation_wgs84.pmtiles", Some("bytes=100-199"))
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
		assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 100-199/500000");
		assert_eq!(header_str(&response, header::CONTENT_LENGTH), "100");
		assert_eq!(header_str(&response, header::CACHE_CONTROL), ARCHIVE_CACHE_CONTROL);
		assert_eq!(body(response).await, sample()[100..200].to_vec());
	}

	#[rstest]
	#[case("bytes=0-", "bytes 0-499999/500000", 500_000)]
	#[case("bytes=499990-", "bytes 499990-499999/500000", 10)]
	#[case("bytes=499990-600000", "bytes 499990-499999/500000", 10)]
	#[case("bytes=-16", "bytes 499984-499999/500000", 16)]
	#[tokio::test]
	async fn range_variants(#[case] range: &str, #[case] content_range: &str, #[case] length: usize) {
		let (_dir, server) = setup();
		let response = server.serve("nation_wgs84.pmtiles", Some(range)).await.unwrap();
		assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
		assert_eq!(header_str(&response, header::CONTENT_RANGE), content_range);
		assert_eq!(header_str(&response, header::CONTENT_LENGTH), length.to_string());
		assert_eq!(body(response).await.len(), length);
	}

	#[rstest]
	#[case("bytes=0-65535", true)]
	#[case("bytes=0-65536", false)]
	#[case("bytes=0-", false)]
	#[case("bytes=-100", true)]
	#[tokio::test]
	async fn large_ranges_are_streamed(#[case] range: &str, #[case] buffered: bool) {
		let (_dir, server) = setup();
		let response = server.serve("nation_wgs84.pmtiles", Some(range)).await.unwrap();
		assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);

		let length: u64 = header_str(&response, header::CONTENT_LENGTH).parse().unwrap();
		let exact = response.body().size_hint().exact();
		assert_eq!(exact.is_some(), buffered, "{range}: {exact:?}");

		let (start, end) = match range {
			"bytes=-100" => (SIZE - 100, SIZE),
			_ => (0, usize::try_from(length).unwrap()),
		};
		assert!(body(response).await == sample()[start..end]);
	}

	#[tokio::test]
	async fn file_shrunk_after_open() {
		let (dir, _server) = setup();
		let file = dir.child("tiles/shrinking.pmtiles");
		file.write_binary(&sample()[..1000]).unwrap();

		let reader = DataReaderFile::open(file.path()).await.unwrap();
		std::fs::OpenOptions::new()
			.write(true)
			.open(file.path())
			.unwrap()
			.set_len(950)
			.unwrap();

		let response = respond(reader, "shrinking.pmtiles", Some("bytes=900-999")).await.unwrap();
		assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
		assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 900-949/1000");
		assert_eq!(header_str(&response, header::CONTENT_LENGTH), "50");
		assert_eq!(body(response).await, sample()[900..950].to_vec());
	}

	#[tokio::test]
	async fn file_shrunk_below_range_start() {
		let (dir, _server) = setup();
		let file = dir.child("tiles/shrinking.pmtiles");
		file.write_binary(&sample()[..1000]).unwrap();

		let reader = DataReaderFile::open(file.path()).await.unwrap();
		std::fs::OpenOptions::new()
			.write(true)
			.open(file.path())
			.unwrap()
			.set_len(900)
			.unwrap();

		let err = respond(reader, "shrinking.pmtiles", Some("bytes=950-999")).await.unwrap_err();
		assert!(matches!(err, TileError::RangeUnsatisfiable { total: 1000 }), "{err:?}");
	}

	#[tokio::test]
	async fn repeated_ranges_are_identical() {
		let (_dir, server) = setup();
		let first = body(server.serve("nation_wgs84.pmtiles", Some("bytes=4096-8191")).await.unwrap()).await;
		let second = body(server.serve("nation_wgs84.pmtiles", Some("bytes=4096-8191")).await.unwrap()).await;
		assert_eq!(first.len(), 4096);
		assert_eq!(first, second);
	}

	#[rstest]
	#[case("bytes=500000-")]
	#[case("bytes=900000-900100")]
	#[case("bytes=200-100")]
	#[case("bytes=0-10,20-30")]
	#[case("lines=1-2")]
	#[case("bytes=abc")]
	#[tokio::test]
	async fn unsatisfiable(#[case] range: &str) {
		let (_dir, server) = setup();
		let err = server.serve("nation_wgs84.pmtiles", Some(range)).await.unwrap_err();
		assert!(matches!(err, TileError::RangeUnsatisfiable { total: 500_000 }), "{err:?}");

		let response = err.into_response();
		assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
		assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes */500000");
	}

	#[rstest]
	#[case("missing.pmtiles")]
	#[case("../secret.txt")]
	#[case("..")]
	#[case(".hidden")]
	#[case("sub")]
	#[case("sub/inner.pmtiles")]
	#[case("..\\secret.txt")]
	#[case("")]
	#[tokio::test]
	async fn not_found(#[case] filename: &str) {
		let (_dir, server) = setup();
		let err = server.serve(filename, None).await.unwrap_err();
		assert!(matches!(err, TileError::ArchiveNotFound(_)), "{filename}: {err:?}");
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn symlink_out_of_root_is_not_found() {
		let (dir, server) = setup();
		std::os::unix::fs::symlink(dir.path().join("secret.txt"), dir.path().join("tiles/link.txt")).unwrap();
		let err = server.serve("link.txt", None).await.unwrap_err();
		assert!(matches!(err, TileError::ArchiveNotFound(_)));
	}

	#[tokio::test]
	async fn missing_root_serves_nothing() {
		let server = ArchiveServer::new(Path::new("/nonexistent/lodtiles/tiles"));
		assert!(matches!(
			server.serve("a.pmtiles", None).await,
			Err(TileError::ArchiveNotFound(_))
		));
	}

	#[tokio::test]
	async fn mime_by_extension() {
		let (_dir, server) = setup();
		let response = server.serve("readme.json", Some("bytes=0-")).await.unwrap();
		assert_eq!(header_str(&response, header::CONTENT_TYPE), "application/json");
	}
}
