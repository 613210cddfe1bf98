//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG codes of common geographic (longitude/latitude) systems.
const GEOGRAPHIC_EPSG: &[u32] = &[4326, 4269, 4258, 4283, 4167, 4617, 4674, 4979, 4806];

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// EPSG code if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    epsg: Option<u32>,
    /// WKT representation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wkt: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Whether coordinates are longitude/latitude in degrees.
    ///
    /// Recognizes a fixed set of geographic EPSG codes and WKT strings whose
    /// root node is `GEOGCS` / `GEOGCRS`. Anything else is treated as projected.
    pub fn is_geographic(&self) -> bool {
        if let Some(code) = self.epsg {
            return GEOGRAPHIC_EPSG.contains(&code);
        }
        match &self.wkt {
            Some(wkt) => {
                let root = wkt.trim_start().to_ascii_uppercase();
                root.starts_with("GEOGCS") || root.starts_with("GEOGCRS")
            }
            None => false,
        }
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt.char_indices().nth(50).map_or(wkt.len(), |(i, _)| i);
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(4326);
        assert_eq!(crs, CRS::wgs84());
        assert_eq!(crs.identifier(), "EPSG:4326");
        assert_eq!(CRS::from_wkt("GEOGCS[\"GCS_WGS_1984\"]").to_string(), "WKT:GEOGCS[\"GCS_WGS_1984\"]");
    }

    #[test]
    fn test_geographic_detection() {
        assert!(CRS::wgs84().is_geographic());
        assert!(!CRS::from_epsg(32719).is_geographic());
        assert!(CRS::from_wkt("GEOGCS[\"GCS_WGS_1984\"]").is_geographic());
        assert!(!CRS::from_wkt("PROJCS[\"WGS_1984_UTM_Zone_19S\"]").is_geographic());
    }
}
