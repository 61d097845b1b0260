//! Reading byte ranges from files.
//!
//! A [`DataReaderFile`] owns one open file handle. Archive requests open a fresh reader each
//! time and drop it with the response, so no handle outlives the request that needed it and
//! concurrent requests never share a file position.
//!
//! ```rust
//! use lodtiles_core::{ByteRange, io::DataReaderFile};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let dir = std::env::temp_dir().join("lodtiles_doc_reader");
//!     std::fs::create_dir_all(&dir)?;
//!     let path = dir.join("hello.bin");
//!     std::fs::write(&path, b"Hello, world!")?;
//!
//!     let mut reader = DataReaderFile::open(&path).await?;
//!     assert_eq!(reader.size(), 13);
//!
//!     let blob = reader.read_range(&ByteRange::new(7, 11, 13)?).await?;
//!     assert_eq!(blob.as_slice(), b"world");
//!     Ok(())
//! }
//! ```

use crate::{Blob, ByteRange};
use anyhow::{Context, Result, ensure};
use bytes::Bytes;
use futures::Stream;
use std::{
	io::SeekFrom,
	path::{Path, PathBuf},
};
use tokio::{
	fs::File,
	io::{AsyncReadExt, AsyncSeekExt},
};
use tokio_util::io::ReaderStream;

/// An open file with a known size.
#[derive(Debug)]
pub struct DataReaderFile {
	path: PathBuf,
	file: File,
	size: u64,
}

impl DataReaderFile {
	/// Opens `path` for reading.
	///
	/// # Errors
	/// Fails if the path does not exist, is not a regular file, or cannot be opened.
	pub async fn open(path: &Path) -> Result<DataReaderFile> {
		let file = File::open(path)
			.await
			.with_context(|| format!("failed to open file {path:?}"))?;
		let metadata = file
			.metadata()
			.await
			.with_context(|| format!("failed to read metadata of {path:?}"))?;
		ensure!(metadata.is_file(), "path {path:?} must be a file");

		Ok(DataReaderFile {
			path: path.to_path_buf(),
			file,
			size: metadata.len(),
		})
	}

	/// Size of the file in bytes, as seen when it was opened.
	#[must_use]
	pub fn size(&self) -> u64 {
		self.size
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the bytes covered by `range`.
	///
	/// Stops early if the file ends before the range does, e.g. because it was truncated
	/// after opening. The returned blob holds exactly the bytes that were read, so its
	/// length may be smaller than `range.length()`.
	pub async fn read_range(&mut self, range: &ByteRange) -> Result<Blob> {
		self
			.file
			.seek(SeekFrom::Start(range.start))
			.await
			.with_context(|| format!("failed to seek to offset {} in {:?}", range.start, self.path))?;

		let mut buffer = Vec::with_capacity(usize::try_from(range.length()).unwrap_or(0));
		(&mut self.file)
			.take(range.length())
			.read_to_end(&mut buffer)
			.await
			.with_context(|| {
				format!(
					"failed to read {} bytes at offset {} in {:?}",
					range.length(),
					range.start,
					self.path
				)
			})?;

		if (buffer.len() as u64) < range.length() {
			log::warn!(
				"short read in {:?}: requested {} bytes at offset {}, got {}",
				self.path,
				range.length(),
				range.start,
				buffer.len()
			);
		}
		Ok(Blob::from(buffer))
	}

	/// Turns the reader into a stream over the bytes covered by `range`.
	///
	/// Nothing is buffered beyond the stream's chunk size. If the file ends before the range
	/// does, the stream ends early.
	pub async fn into_range_stream(
		mut self,
		range: &ByteRange,
	) -> Result<impl Stream<Item = std::io::Result<Bytes>> + Send + 'static> {
		self
			.file
			.seek(SeekFrom::Start(range.start))
			.await
			.with_context(|| format!("failed to seek to offset {} in {:?}", range.start, self.path))?;
		Ok(ReaderStream::new(self.file.take(range.length())))
	}

	/// Turns the reader into a stream over the whole file, consuming the handle.
	///
	/// The file is closed as soon as the stream is dropped.
	pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
		ReaderStream::new(self.file)
	}
}
