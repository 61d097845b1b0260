use std::fmt::{self, Debug};

/// A rectangle in Web Mercator (EPSG:3857) metres.
///
/// This is the coordinate space of `ST_TileEnvelope` and `ST_AsMVTGeom`: the tile grid the
/// vector tile geometry is quantized into.
#[derive(Clone, Copy, PartialEq)]
pub struct MercatorBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl MercatorBBox {
	/// Half the circumference of the Earth at the equator (`π · 6 378 137 m`).
	///
	/// The Web Mercator world square spans `[-WORLD_EXTENT, WORLD_EXTENT]` on both axes.
	pub const WORLD_EXTENT: f64 = 20_037_508.342_789_244;

	pub(crate) fn from_edges(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> MercatorBBox {
		MercatorBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
	}

	/// Returns the rectangle as `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}
}

impl Debug for MercatorBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"MercatorBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TileCoord;
	use approx::assert_relative_eq;

	#[test]
	fn tiles_are_square() {
		for level in [0u8, 3, 10, 20] {
			let bbox = TileCoord::new(level, 0, 0).unwrap().to_mercator_bbox();
			assert_relative_eq!(bbox.width(), bbox.height(), epsilon = 1e-6);
			assert_relative_eq!(
				bbox.width(),
				MercatorBBox::WORLD_EXTENT * 2.0 / f64::from(1u32 << level),
				epsilon = 1e-6
			);
		}
	}

	#[test]
	fn debug() {
		let bbox = MercatorBBox::from_edges(0.0, 1.0, 2.0, 3.0);
		assert_eq!(format!("{bbox:?}"), "MercatorBBox(0, 1, 2, 3)");
	}
}
