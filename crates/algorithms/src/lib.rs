//! # gdbkit Algorithms
//!
//! Geodatabase maintenance tools for gdbkit.
//!
//! ## Available Tool Categories
//!
//! - **domains**: Delete attribute domains by type
//! - **vector**: Line length measurements, sinuosity index

pub mod domains;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::domains::{prune_domains, PruneDomains, PruneParams, PruneReport};
    pub use crate::vector::{
        sinuosity, Baseline, LengthMethod, Sinuosity, SinuosityParams, SinuosityReport,
    };
    pub use gdbkit_core::prelude::*;
}
