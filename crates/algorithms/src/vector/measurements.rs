//! Line measurements: path length and endpoint distance under a method
//!
//! Planar methods work in CRS units. Surface methods expect longitude /
//! latitude in degrees and return metres:
//! - GEODESIC: shortest path on the WGS84 ellipsoid (Karney)
//! - GREAT_ELLIPTIC: great-circle arc on the mean-radius sphere
//! - LOXODROME: constant-bearing rhumb line
//! - PRESERVE_SHAPE: each segment is followed as drawn in lon/lat space,
//!   densified and measured geodesically

use std::fmt;
use std::str::FromStr;

use gdbkit_core::vector::{Polyline, Vertex};
use gdbkit_core::{Error, Result};
use geo::{Densify, Distance, Euclidean, Geodesic, Haversine, Length, Line, Rhumb};

/// Maximum densification step for PRESERVE_SHAPE, in degrees
const DENSIFY_STEP_DEG: f64 = 0.01;

/// Length measurement method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthMethod {
    Euclidean,
    Geodesic,
    GreatElliptic,
    Loxodrome,
    Planar,
    PreserveShape,
}

impl LengthMethod {
    pub const ALL: [LengthMethod; 6] = [
        LengthMethod::Euclidean,
        LengthMethod::Geodesic,
        LengthMethod::GreatElliptic,
        LengthMethod::Loxodrome,
        LengthMethod::Planar,
        LengthMethod::PreserveShape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthMethod::Euclidean => "EUCLIDEAN",
            LengthMethod::Geodesic => "GEODESIC",
            LengthMethod::GreatElliptic => "GREAT_ELLIPTIC",
            LengthMethod::Loxodrome => "LOXODROME",
            LengthMethod::Planar => "PLANAR",
            LengthMethod::PreserveShape => "PRESERVE_SHAPE",
        }
    }

    /// Whether the method measures on the earth's surface (needs lon/lat input)
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            LengthMethod::Geodesic
                | LengthMethod::GreatElliptic
                | LengthMethod::Loxodrome
                | LengthMethod::PreserveShape
        )
    }
}

impl fmt::Display for LengthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LengthMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidParameter {
                name: "method",
                value: s.to_string(),
                reason: "expected EUCLIDEAN, GEODESIC, GREAT_ELLIPTIC, LOXODROME, PLANAR or PRESERVE_SHAPE"
                    .into(),
            })
    }
}

/// Planar 2D length in CRS units.
pub fn length_2d(line: &Polyline) -> f64 {
    Euclidean.length(&line.to_multi_line_string())
}

/// Planar 3D length in CRS units; vertices without Z count as Z = 0.
pub fn length_3d(line: &Polyline) -> f64 {
    line.segments().map(|(a, b)| a.distance_3d(b)).sum()
}

/// Surface length in metres. Planar methods fall back to `length_2d`.
pub fn surface_length(line: &Polyline, method: LengthMethod) -> f64 {
    let lines = line.to_multi_line_string();
    match method {
        LengthMethod::Geodesic => Geodesic.length(&lines),
        LengthMethod::GreatElliptic => Haversine.length(&lines),
        LengthMethod::Loxodrome => Rhumb.length(&lines),
        // Follow each segment as drawn in lon/lat, measured in geodesic steps
        LengthMethod::PreserveShape => {
            Geodesic.length(&Euclidean.densify(&lines, DENSIFY_STEP_DEG))
        }
        LengthMethod::Euclidean | LengthMethod::Planar => Euclidean.length(&lines),
    }
}

/// Distance between two lon/lat vertices under a surface method, in metres.
/// Planar methods return the 2D planar distance.
pub fn surface_distance(a: &Vertex, b: &Vertex, method: LengthMethod) -> f64 {
    let (p, q) = (a.to_point(), b.to_point());
    match method {
        LengthMethod::Geodesic => Geodesic.distance(p, q),
        LengthMethod::GreatElliptic => Haversine.distance(p, q),
        LengthMethod::Loxodrome => Rhumb.distance(p, q),
        LengthMethod::PreserveShape => {
            Geodesic.length(&Euclidean.densify(&Line::new(p, q), DENSIFY_STEP_DEG))
        }
        LengthMethod::Euclidean | LengthMethod::Planar => Euclidean.distance(p, q),
    }
}

/// Path length along the line.
///
/// Methods are checked in order and the first match wins:
/// 1. EUCLIDEAN on 3D data: 3D length
/// 2. surface methods: surface length
/// 3. everything else (EUCLIDEAN on 2D data, PLANAR): planar 2D length
pub fn path_length(line: &Polyline, method: LengthMethod, has_z: bool) -> f64 {
    match method {
        LengthMethod::Euclidean if has_z => length_3d(line),
        m if m.is_surface() => surface_length(line, m),
        _ => length_2d(line),
    }
}

/// Straight-line distance between the first and last vertex in CRS units,
/// 3D when the source has Z. `None` for an empty line.
pub fn endpoint_distance(line: &Polyline, has_z: bool) -> Option<f64> {
    let (first, last) = (line.first_point()?, line.last_point()?);
    Some(if has_z {
        first.distance_3d(&last)
    } else {
        Euclidean.distance(first.to_point(), last.to_point())
    })
}
