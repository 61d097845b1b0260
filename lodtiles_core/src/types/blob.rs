//! The [`Blob`] struct, an owned chunk of bytes.
//!
//! Used for everything that travels as opaque binary data: encoded vector tiles coming back
//! from the database and byte ranges read from archive files.
//!
//! ```rust
//! use lodtiles_core::Blob;
//!
//! let blob = Blob::from(vec![0, 1, 2, 3]);
//! assert_eq!(blob.len(), 4);
//! assert_eq!(blob.as_slice(), &[0, 1, 2, 3]);
//! ```

use bytes::Bytes;
use std::fmt::Debug;

/// A thin wrapper around [`Vec<u8>`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_slice()
	}

	/// Converts into [`Bytes`] without copying, for handing over to an HTTP body.
	#[must_use]
	pub fn into_bytes(self) -> Bytes {
		Bytes::from(self.0)
	}

	#[must_use]
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(value: Vec<u8>) -> Self {
		Blob(value)
	}
}

impl From<&[u8]> for Blob {
	fn from(value: &[u8]) -> Self {
		Blob(value.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(value: &str) -> Self {
		Blob(value.as_bytes().to_vec())
	}
}

impl From<Bytes> for Blob {
	fn from(value: Bytes) -> Self {
		Blob(value.to_vec())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		const PREVIEW: usize = 16;
		let head = &self.0[..self.0.len().min(PREVIEW)];
		let hex: Vec<String> = head.iter().map(|b| format!("{b:02x}")).collect();
		let ellipsis = if self.0.len() > PREVIEW { " …" } else { "" };
		write!(f, "Blob({} bytes: {}{ellipsis})", self.0.len(), hex.join(" "))
	}
}
