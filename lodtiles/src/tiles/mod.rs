//! Dynamic vector tiles.
//!
//! `/tiles/{layer}/{z}/{x}/{y}.pbf` flows through:
//! [`LodPolicy`] (which dataset) → [`QueryBuilder`] (which SQL) → [`TileSynthesizer`]
//! (run it on a [`TileStore`] and classify the result).

mod identifier;
mod lod_policy;
mod query_builder;
mod store;
mod synthesizer;

pub use identifier::Identifier;
pub use lod_policy::{LayerCatalog, LodPolicy, TierDataset};
pub use query_builder::{MVT_BUFFER, MVT_EXTENT, QueryBuilder, TileQuery};
pub use store::{PgTileStore, TileStore};
pub use synthesizer::{TilePayload, TileSynthesizer};
