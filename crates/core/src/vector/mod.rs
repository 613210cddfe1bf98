//! Vector features: geometry plus attributes
//!
//! Geometry is stored per vertex with an optional Z so 3D lines survive a
//! round trip through the workspace format. Conversions to `geo-types` are
//! provided for measurement code.

use geo_types::{Coord, LineString, MultiLineString, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Option<f64>> for AttributeValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(AttributeValue::Null, AttributeValue::Float)
    }
}

/// A vertex with optional elevation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Vertex {
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Planar distance including Z; a missing Z counts as 0
    pub fn distance_3d(&self, other: &Vertex) -> f64 {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        let dz = other.z.unwrap_or(0.0) - self.z.unwrap_or(0.0);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }
}

/// A line made of one or more paths (parts)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub paths: Vec<Vec<Vertex>>,
}

impl Polyline {
    /// Single-part line from a vertex list
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            paths: vec![vertices],
        }
    }

    pub fn from_xy(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Vertex::xy(x, y)).collect())
    }

    pub fn from_xyz(coords: &[(f64, f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y, z)| Vertex::xyz(x, y, z)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.is_empty())
    }

    /// First vertex of the first non-empty path
    pub fn first_point(&self) -> Option<Vertex> {
        self.paths.iter().find_map(|p| p.first().copied())
    }

    /// Last vertex of the last non-empty path
    pub fn last_point(&self) -> Option<Vertex> {
        self.paths.iter().rev().find_map(|p| p.last().copied())
    }

    /// Consecutive vertex pairs within each path. Paths are not joined.
    pub fn segments(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> + '_ {
        self.paths
            .iter()
            .flat_map(|p| p.windows(2).map(|w| (&w[0], &w[1])))
    }

    /// 2D `geo-types` view of the paths, one line string per path
    pub fn to_multi_line_string(&self) -> MultiLineString<f64> {
        MultiLineString::new(
            self.paths
                .iter()
                .map(|p| {
                    LineString::new(p.iter().map(|v| Coord { x: v.x, y: v.y }).collect())
                })
                .collect(),
        )
    }
}

/// Feature geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Point(Vertex),
    Polyline(Polyline),
    Polygon { rings: Vec<Vec<Vertex>> },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "point",
            Shape::Polyline(_) => "polyline",
            Shape::Polygon { .. } => "polygon",
        }
    }
}

/// A row of a feature class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub oid: i64,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(oid: i64, shape: Shape) -> Self {
        Self {
            oid,
            shape: Some(shape),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}
