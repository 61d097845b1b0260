//! Contains types like coordinates, bounding boxes (bboxes), detail tiers, and more.

mod blob;
pub use blob::*;

mod byte_range;
pub use byte_range::*;

mod detail_tier;
pub use detail_tier::*;

mod geo_bbox;
pub use geo_bbox::*;

mod mercator_bbox;
pub use mercator_bbox::*;

mod tile_coord;
pub use tile_coord::*;
