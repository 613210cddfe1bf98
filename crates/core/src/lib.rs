//! # gdbkit Core
//!
//! Core types, engine traits and I/O for the gdbkit geodatabase tools.
//!
//! This crate provides:
//! - Schema types: `Domain`, `Field`
//! - Vector types: `Feature`, `Polyline`, `Shape`
//! - `CRS`: Coordinate Reference System handling
//! - Engine traits (`Catalog`, `SchemaEditor`, `FeatureEditor`) and the
//!   native `Geodatabase` implementation
//! - I/O for the JSON workspace format

pub mod crs;
pub mod error;
pub mod io;
pub mod schema;
pub mod vector;
pub mod workspace;

pub use crs::CRS;
pub use error::{Error, Result};
pub use workspace::{Catalog, ContainerRef, FeatureEditor, Geodatabase, SchemaEditor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::schema::{Domain, DomainType, Field, FieldType};
    pub use crate::vector::{AttributeValue, Feature, Polyline, Shape, Vertex};
    pub use crate::workspace::{
        Catalog, ContainerRef, FeatureEditor, Geodatabase, GeometryType, SchemaEditor,
    };
    pub use crate::Tool;
}

/// Core trait for all tools in gdbkit.
///
/// A tool runs once against a workspace `W`, mutating it through the engine
/// traits, and returns a report of what it did.
pub trait Tool<W: ?Sized> {
    /// Parameters controlling tool behavior
    type Params;
    /// Report returned on success
    type Output;

    /// Returns the tool name
    fn name(&self) -> &'static str;

    /// Returns a description of what the tool does
    fn description(&self) -> &'static str;

    /// Execute the tool
    fn execute(&self, workspace: &mut W, params: Self::Params) -> Result<Self::Output>;
}
