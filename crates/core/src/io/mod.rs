//! I/O for the native JSON workspace format

mod catalog_path;
mod lock;
mod native;

pub use catalog_path::CatalogPath;
pub use lock::WorkspaceLock;
pub use native::{read_geodatabase, write_geodatabase};

// Buffer-based I/O (no filesystem dependency)
pub use native::{read_geodatabase_from_buffer, write_geodatabase_to_buffer};
