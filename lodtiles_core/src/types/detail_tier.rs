//! Level-of-detail tiers.
//!
//! Every zoom level is answered by exactly one [`DetailTier`]. The zoom thresholds live in
//! a single ordered table, [`TIER_THRESHOLDS`], which partitions `[0, ∞)` without gaps:
//!
//! | zoom      | tier     |
//! |-----------|----------|
//! | `0..7`    | `Nation` |
//! | `7..10`   | `Region` |
//! | `10..`    | `Area`   |
//!
//! ```
//! use lodtiles_core::DetailTier;
//!
//! assert_eq!(DetailTier::from_zoom(5), DetailTier::Nation);
//! assert_eq!(DetailTier::from_zoom(8), DetailTier::Region);
//! assert_eq!(DetailTier::from_zoom(22), DetailTier::Area);
//! ```

use std::fmt;

/// A level of detail, ordered from coarsest to finest.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DetailTier {
	/// One feature per nation.
	Nation,
	/// One feature per local authority.
	Region,
	/// Full-resolution small areas.
	Area,
}

/// Tiers with the zoom level at which they stop being authoritative (exclusive).
///
/// The last entry has no upper bound; overzoom always resolves to full detail.
pub const TIER_THRESHOLDS: [(DetailTier, Option<u8>); 3] = [
	(DetailTier::Nation, Some(7)),
	(DetailTier::Region, Some(10)),
	(DetailTier::Area, None),
];

impl DetailTier {
	pub const ALL: [DetailTier; 3] = [DetailTier::Nation, DetailTier::Region, DetailTier::Area];

	/// Selects the tier that is authoritative for `zoom`.
	pub fn from_zoom(zoom: u8) -> DetailTier {
		for (tier, max_zoom) in TIER_THRESHOLDS {
			match max_zoom {
				Some(max_zoom) if zoom >= max_zoom => {}
				_ => return tier,
			}
		}
		DetailTier::Area
	}

	/// First zoom level this tier answers.
	pub fn min_zoom(self) -> u8 {
		let index = self.index();
		if index == 0 {
			0
		} else {
			TIER_THRESHOLDS[index - 1].1.unwrap_or(u8::MAX)
		}
	}

	/// First zoom level this tier no longer answers, `None` for the finest tier.
	pub fn max_zoom(self) -> Option<u8> {
		TIER_THRESHOLDS[self.index()].1
	}

	fn index(self) -> usize {
		match self {
			DetailTier::Nation => 0,
			DetailTier::Region => 1,
			DetailTier::Area => 2,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			DetailTier::Nation => "nation",
			DetailTier::Region => "region",
			DetailTier::Area => "area",
		}
	}
}

impl fmt::Display for DetailTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
