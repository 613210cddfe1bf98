//! Engine seam: catalog enumeration, schema edits and feature cursors.
//!
//! Tools are written against these traits. [`Geodatabase`] is the native
//! implementation backed by a JSON workspace file.

mod geodatabase;

pub use geodatabase::{
    FeatureClass, FeatureDataset, Geodatabase, RasterDataset, Table,
};

use crate::crs::CRS;
use crate::error::Result;
use crate::schema::{Domain, Field};
use crate::vector::Feature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a field container inside a workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    Table(String),
    FeatureClass {
        dataset: Option<String>,
        name: String,
    },
    Raster(String),
}

impl ContainerRef {
    pub fn table(name: impl Into<String>) -> Self {
        ContainerRef::Table(name.into())
    }

    pub fn feature_class(name: impl Into<String>) -> Self {
        ContainerRef::FeatureClass {
            dataset: None,
            name: name.into(),
        }
    }

    pub fn in_dataset(dataset: impl Into<String>, name: impl Into<String>) -> Self {
        ContainerRef::FeatureClass {
            dataset: Some(dataset.into()),
            name: name.into(),
        }
    }

    pub fn raster(name: impl Into<String>) -> Self {
        ContainerRef::Raster(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            ContainerRef::Table(name) | ContainerRef::Raster(name) => name,
            ContainerRef::FeatureClass { name, .. } => name,
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::FeatureClass {
                dataset: Some(ds),
                name,
            } => write!(f, "{}/{}", ds, name),
            other => f.write_str(other.name()),
        }
    }
}

/// Raster listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterInfo {
    pub name: String,
    /// Raster carries an attribute table
    pub has_rat: bool,
}

/// Geometry type of a feature class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    Polyline,
    Polygon,
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of describing a feature class
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureClassInfo {
    pub geometry_type: GeometryType,
    pub has_z: bool,
    pub crs: Option<CRS>,
}

/// Read-only enumeration of a workspace
pub trait Catalog {
    fn list_domains(&self) -> Result<Vec<Domain>>;

    /// Standalone tables
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Feature classes at the workspace root (`None`) or inside a dataset
    fn list_feature_classes(&self, dataset: Option<&str>) -> Result<Vec<String>>;

    /// Feature datasets
    fn list_datasets(&self) -> Result<Vec<String>>;

    fn list_rasters(&self) -> Result<Vec<RasterInfo>>;

    fn list_fields(&self, container: &ContainerRef) -> Result<Vec<Field>>;
}

/// Schema mutations used by domain maintenance
pub trait SchemaEditor: Catalog {
    /// Clear the domain reference of one field
    fn remove_domain_from_field(&mut self, container: &ContainerRef, field: &str) -> Result<()>;

    /// Delete a domain definition. Fails while any field still references it.
    fn delete_domain(&mut self, name: &str) -> Result<()>;
}

/// Feature-level access used by attribute calculators
pub trait FeatureEditor: Catalog {
    fn describe(&self, fc: &ContainerRef) -> Result<FeatureClassInfo>;

    fn add_field(&mut self, fc: &ContainerRef, field: Field) -> Result<()>;

    fn feature_count(&self, fc: &ContainerRef) -> Result<usize>;

    /// Update cursor: visit every feature in object-id order.
    ///
    /// The feature class is locked for the duration of the call and
    /// released on return, including when `visit` fails. The first error
    /// stops the scan.
    fn update_features(
        &mut self,
        fc: &ContainerRef,
        visit: &mut dyn FnMut(&mut Feature) -> Result<()>,
    ) -> Result<()>;
}
