use crate::MercatorBBox;
use anyhow::{Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug},
};

static MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A geographical bounding box (`GeoBBox`) represents a rectangular area on a map
/// defined by its minimum and maximum longitude (x) and latitude (y) in degrees (WGS84).
///
/// The bounding box is defined by four `f64` values:
/// - `x_min` (west): Minimum longitude.
/// - `y_min` (south): Minimum latitude.
/// - `x_max` (east): Maximum longitude.
/// - `y_max` (north): Maximum latitude.
///
/// # Examples
///
/// ```
/// use lodtiles_core::GeoBBox;
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.as_array(), [-10.0, -5.0, 10.0, 5.0]);
/// assert!(GeoBBox::new(10.0, -5.0, -10.0, 5.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// # Errors
	/// Returns an error if the values are outside of `[-180, 180]` / `[-90, 90]` or if a
	/// minimum is not strictly smaller than its maximum.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// Builds a box from edges that are known to be valid, e.g. computed by tile math.
	pub(crate) fn from_edges(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> GeoBBox {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
	}

	fn checked(self) -> Result<GeoBBox> {
		ensure!(self.x_min >= -180., "x_min ({}) must be >= -180", self.x_min);
		ensure!(self.y_min >= -90., "y_min ({}) must be >= -90", self.y_min);
		ensure!(self.x_max <= 180., "x_max ({}) must be <= 180", self.x_max);
		ensure!(self.y_max <= 90., "y_max ({}) must be <= 90", self.y_max);
		ensure!(self.x_min < self.x_max, "x_min ({}) must be < x_max ({})", self.x_min, self.x_max);
		ensure!(self.y_min < self.y_max, "y_min ({}) must be < y_max ({})", self.y_min, self.y_max);
		Ok(self)
	}

	/// Returns the bounding box as `[west, south, east, north]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Projects the box into Web Mercator metres.
	///
	/// Latitudes beyond ±85.0511° are clamped first, since Mercator diverges at the poles.
	#[must_use]
	pub fn to_mercator(&self) -> MercatorBBox {
		fn x(lon: f64) -> f64 {
			lon / 180.0 * MercatorBBox::WORLD_EXTENT
		}
		fn y(lat: f64) -> f64 {
			let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
			((90.0 + lat) * PI / 360.0).tan().ln() / PI * MercatorBBox::WORLD_EXTENT
		}
		MercatorBBox::from_edges(x(self.x_min), y(self.y_min), x(self.x_max), y(self.y_max))
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}
