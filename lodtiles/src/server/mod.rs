//! The HTTP surface: dynamic tiles, archive byte ranges and `/status`.

mod archive;
mod cors;
mod handlers;
mod routes;
mod tile_server;

pub use archive::{ARCHIVE_CACHE_CONTROL, ArchiveServer};
pub use cors::build_cors_layer;
pub use handlers::TileHandlerState;
pub use routes::build_router;
pub use tile_server::TileServer;
