//! Byte ranges for HTTP partial content.
//!
//! A [`RangeRequest`] is what a client asked for in its `Range` header. Only once the size of
//! the file is known can it be resolved into a concrete [`ByteRange`], whose bounds are
//! guaranteed to satisfy `start <= end < total`.
//!
//! ```rust
//! use lodtiles_core::{ByteRange, RangeRequest};
//!
//! let request = RangeRequest::parse("bytes=100-199").unwrap();
//! let range = request.resolve(500_000).unwrap();
//! assert_eq!(range.length(), 100);
//! assert_eq!(range.content_range(), "bytes 100-199/500000");
//! ```

use anyhow::{Context, Result, bail, ensure};
use std::fmt;

/// An inclusive range of bytes inside a file of `total` bytes.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct ByteRange {
	/// First byte, inclusive.
	pub start: u64,
	/// Last byte, inclusive.
	pub end: u64,
	/// Size of the whole file.
	pub total: u64,
}

impl ByteRange {
	/// # Errors
	/// Fails unless `start <= end < total`.
	pub fn new(start: u64, end: u64, total: u64) -> Result<ByteRange> {
		ensure!(start <= end, "range start ({start}) must be <= end ({end})");
		ensure!(end < total, "range end ({end}) must be < total size ({total})");
		Ok(ByteRange { start, end, total })
	}

	/// Number of bytes covered, `end - start + 1`.
	#[must_use]
	pub fn length(&self) -> u64 {
		self.end - self.start + 1
	}

	/// Shortens the range to `length` bytes, e.g. after a read came up short.
	///
	/// Returns `None` if nothing at all is left.
	#[must_use]
	pub fn truncated(&self, length: u64) -> Option<ByteRange> {
		if length == 0 {
			return None;
		}
		let length = length.min(self.length());
		Some(ByteRange {
			start: self.start,
			end: self.start + length - 1,
			total: self.total,
		})
	}

	/// Value for a `Content-Range` response header.
	#[must_use]
	pub fn content_range(&self) -> String {
		format!("bytes {}-{}/{}", self.start, self.end, self.total)
	}
}

impl fmt::Debug for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ByteRange[{}..={}/{}]", self.start, self.end, self.total)
	}
}

/// A single range as sent in a `Range: bytes=…` request header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeRequest {
	/// `bytes=start-` or `bytes=start-end`.
	FromStart { start: u64, end: Option<u64> },
	/// `bytes=-length`: the last `length` bytes.
	Suffix { length: u64 },
}

impl RangeRequest {
	/// Parses the value of a `Range` header.
	///
	/// Only a single range in the `bytes` unit is accepted. Multiple ranges are rejected.
	///
	/// # Errors
	/// Fails on any other unit, malformed numbers, multiple ranges, or `end < start`.
	pub fn parse(header: &str) -> Result<RangeRequest> {
		let header = header.trim();
		let Some(spec) = header.strip_prefix("bytes=") else {
			bail!("unsupported range unit in '{header}'");
		};
		ensure!(!spec.contains(','), "multiple ranges are not supported: '{header}'");

		let (start, end) = spec
			.split_once('-')
			.with_context(|| format!("range '{header}' is missing '-'"))?;
		let (start, end) = (start.trim(), end.trim());

		if start.is_empty() {
			let length = parse_number(end, header)?;
			ensure!(length > 0, "suffix range must not be empty: '{header}'");
			return Ok(RangeRequest::Suffix { length });
		}

		let start = parse_number(start, header)?;
		let end = if end.is_empty() {
			None
		} else {
			let end = parse_number(end, header)?;
			ensure!(start <= end, "range end must not be before start: '{header}'");
			Some(end)
		};
		Ok(RangeRequest::FromStart { start, end })
	}

	/// Resolves the request against a file of `total` bytes.
	///
	/// An end beyond the file is clamped to the last byte. Returns `None` if the request
	/// cannot be satisfied, i.e. it starts at or beyond the end of the file.
	#[must_use]
	pub fn resolve(&self, total: u64) -> Option<ByteRange> {
		if total == 0 {
			return None;
		}
		let last = total - 1;
		match *self {
			RangeRequest::FromStart { start, end } => {
				if start > last {
					return None;
				}
				let end = end.map_or(last, |end| end.min(last));
				Some(ByteRange { start, end, total })
			}
			RangeRequest::Suffix { length } => Some(ByteRange {
				start: total.saturating_sub(length),
				end: last,
				total,
			}),
		}
	}
}

fn parse_number(text: &str, header: &str) -> Result<u64> {
	ensure!(
		!text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()),
		"invalid number '{text}' in range '{header}'"
	);
	text
		.parse::<u64>()
		.with_context(|| format!("number '{text}' in range '{header}' is too large"))
}
