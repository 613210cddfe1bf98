//! Vector analysis tools
//!
//! Measurements on line features:
//! - Length: planar 2D/3D and surface-aware (geodesic, great elliptic,
//!   loxodrome, preserve shape)
//! - Sinuosity: path length over endpoint distance, written to a field

mod measurements;
mod sinuosity;

pub use measurements::{
    endpoint_distance, length_2d, length_3d, path_length, surface_distance, surface_length,
    LengthMethod,
};
pub use sinuosity::{
    sinuosity, sinuosity_index, Baseline, Sinuosity, SinuosityParams, SinuosityReport,
    SINUOSITY_ALIAS,
};
