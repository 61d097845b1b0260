//! Server configuration.
//!
//! A single YAML file (`lodtiles.yml`) deserialized into [`Config`]:
//! - [`ServerConfig`]: socket, archive directory, tile cache policy
//! - [`DatabaseConfig`]: PostGIS connection pool
//! - [`CorsConfig`]: allowed browser origins
//! - [`LayerConfig`]: vector layers and their per-tier datasets
//!
//! Command line flags override values from the file.

mod cors;
mod database;
mod layer;
mod main;
mod server;

pub use cors::CorsConfig;
pub use database::{DatabaseConfig, PASSWORD_ENV};
pub use layer::{BENEFIT_COLUMNS, LayerConfig, TierDatasetConfig};
pub use main::Config;
pub use server::ServerConfig;
