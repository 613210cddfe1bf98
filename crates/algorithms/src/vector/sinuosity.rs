//! Line sinuosity
//!
//! Sinuosity is the path length along a line divided by the straight-line
//! distance between its first and last vertex: 1.0 for a straight line,
//! larger for curvier ones. Closed loops and zero-length lines have no
//! defined sinuosity and are written as null.

use gdbkit_core::schema::{Field, FieldType};
use gdbkit_core::vector::{AttributeValue, Polyline, Shape};
use gdbkit_core::workspace::GeometryType;
use gdbkit_core::{ContainerRef, Error, FeatureEditor, Result, Tool};
use tracing::{debug, info, warn};

use super::measurements::{endpoint_distance, path_length, surface_distance, LengthMethod};

/// Alias given to a newly created sinuosity field
pub const SINUOSITY_ALIAS: &str = "Sinuosity Index";

/// How the straight-line baseline is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// Planar distance in CRS units, 3D when the source has Z
    #[default]
    Planar,
    /// Same method as the path length, so surface methods give a unit-free ratio
    Method,
}

/// Parameters for the sinuosity tool
#[derive(Debug, Clone)]
pub struct SinuosityParams {
    /// Line feature class to update
    pub features: ContainerRef,
    /// Output field, created as Double if missing
    pub field: String,
    pub method: LengthMethod,
    pub baseline: Baseline,
}

impl SinuosityParams {
    pub fn new(features: ContainerRef, field: impl Into<String>) -> Self {
        Self {
            features,
            field: field.into(),
            method: LengthMethod::Planar,
            baseline: Baseline::Planar,
        }
    }

    pub fn with_method(mut self, method: LengthMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// What a sinuosity run did
#[derive(Debug, Clone, PartialEq)]
pub struct SinuosityReport {
    pub features: ContainerRef,
    /// Actual name of the output field (existing spelling if it was reused)
    pub field: String,
    pub field_created: bool,
    /// Features written, including nulls
    pub updated: usize,
    /// Object ids of closed loops and zero-length lines
    pub null_features: Vec<i64>,
}

/// Sinuosity tool
#[derive(Debug, Clone, Default)]
pub struct Sinuosity;

impl<W: FeatureEditor + ?Sized> Tool<W> for Sinuosity {
    type Params = SinuosityParams;
    type Output = SinuosityReport;

    fn name(&self) -> &'static str {
        "Add Sinuosity Measure To Line"
    }

    fn description(&self) -> &'static str {
        "Write path length over endpoint distance for every line feature"
    }

    fn execute(&self, workspace: &mut W, params: Self::Params) -> Result<Self::Output> {
        sinuosity(workspace, &params)
    }
}

/// Sinuosity index of one line, or `None` when the endpoints coincide.
///
/// # Arguments
/// * `line` - Line geometry; surface methods expect lon/lat degrees
/// * `method` - Path length method
/// * `has_z` - Whether the source stores Z values
/// * `baseline` - How the endpoint distance is measured
pub fn sinuosity_index(
    line: &Polyline,
    method: LengthMethod,
    has_z: bool,
    baseline: Baseline,
) -> Option<f64> {
    let straight = match baseline {
        Baseline::Method if method.is_surface() => {
            surface_distance(&line.first_point()?, &line.last_point()?, method)
        }
        _ => endpoint_distance(line, has_z)?,
    };
    if straight == 0.0 {
        return None;
    }
    Some(path_length(line, method, has_z) / straight)
}

/// Add or refresh a sinuosity field on a line feature class.
///
/// Degenerate lines get null and a warning; any engine error aborts the
/// scan. Surface methods require a geographic coordinate system.
pub fn sinuosity<W: FeatureEditor + ?Sized>(
    workspace: &mut W,
    params: &SinuosityParams,
) -> Result<SinuosityReport> {
    let fc = &params.features;
    if params.field.trim().is_empty() {
        return Err(Error::InvalidParameter {
            name: "field",
            value: params.field.clone(),
            reason: "field name must not be empty".into(),
        });
    }

    let info = workspace.describe(fc)?;
    if info.geometry_type != GeometryType::Polyline {
        return Err(Error::UnsupportedGeometry(format!(
            "{} has {} geometry, expected Polyline",
            fc, info.geometry_type
        )));
    }
    if params.method.is_surface() && !info.crs.as_ref().is_some_and(|c| c.is_geographic()) {
        let actual = info
            .crs
            .as_ref()
            .map_or_else(|| "no coordinate system".to_string(), |c| c.to_string());
        return Err(Error::Crs(format!(
            "{} measurement requires a geographic coordinate system; {} has {}",
            params.method, fc, actual
        )));
    }

    let (field, field_created) = ensure_field(workspace, fc, &params.field)?;

    info!(
        "Adding measure to {} features...",
        workspace.feature_count(fc)?
    );

    let mut updated = 0;
    let mut null_features = Vec::new();
    workspace.update_features(fc, &mut |feature| {
        let value = match &feature.shape {
            Some(Shape::Polyline(line)) => {
                sinuosity_index(line, params.method, info.has_z, params.baseline)
            }
            None => None,
            Some(other) => {
                return Err(Error::UnsupportedGeometry(format!(
                    "feature {} in {} is a {}",
                    feature.oid,
                    fc,
                    other.kind()
                )))
            }
        };

        match value {
            Some(v) => debug!("{}: {}", feature.oid, v),
            None => {
                warn!(
                    "{} is a closed loop or zero-length line. Sinuosity is null.",
                    feature.oid
                );
                null_features.push(feature.oid);
            }
        }
        feature.set_attribute(field.clone(), AttributeValue::from(value));
        updated += 1;
        Ok(())
    })?;

    Ok(SinuosityReport {
        features: fc.clone(),
        field,
        field_created,
        updated,
        null_features,
    })
}

/// Find the output field or create it. Returns its name and whether it was added.
fn ensure_field<W: FeatureEditor + ?Sized>(
    workspace: &mut W,
    fc: &ContainerRef,
    name: &str,
) -> Result<(String, bool)> {
    let existing = workspace
        .list_fields(fc)?
        .into_iter()
        .find(|f| f.is_named(name));

    match existing {
        Some(field) if !field.field_type.is_floating() => Err(Error::FieldTypeMismatch {
            container: fc.to_string(),
            field: field.name,
            expected: FieldType::Double.to_string(),
            actual: field.field_type.to_string(),
        }),
        Some(field) => {
            warn!("{} field already exists. Updating existing field.", field.name);
            Ok((field.name, false))
        }
        None => {
            info!("Adding field {}...", name);
            workspace.add_field(
                fc,
                Field::new(name, FieldType::Double).with_alias(SINUOSITY_ALIAS),
            )?;
            Ok((name.to_string(), true))
        }
    }
}
