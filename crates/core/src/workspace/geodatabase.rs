//! Native in-memory geodatabase
//!
//! Serializable model of a file geodatabase: domains at the root, standalone
//! tables, feature classes (top level or grouped in feature datasets) and
//! rasters with optional attribute tables. Implements the engine traits with
//! the same rules a geodatabase enforces on schema edits.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Catalog, ContainerRef, FeatureClassInfo, FeatureEditor, GeometryType, RasterInfo,
    SchemaEditor,
};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::schema::{Domain, Field};
use crate::vector::{AttributeValue, Feature};

/// Standalone attribute table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, AttributeValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// Homogeneous collection of features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureClass {
    pub name: String,
    pub geometry_type: GeometryType,
    #[serde(default)]
    pub has_z: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<CRS>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureClass {
    pub fn new(name: impl Into<String>, geometry_type: GeometryType) -> Self {
        Self {
            name: name.into(),
            geometry_type,
            has_z: false,
            crs: None,
            fields: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn with_z(mut self, has_z: bool) -> Self {
        self.has_z = has_z;
        self
    }

    pub fn with_crs(mut self, crs: CRS) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }
}

/// Group of feature classes sharing a spatial reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDataset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<CRS>,
    #[serde(default)]
    pub feature_classes: Vec<FeatureClass>,
}

impl FeatureDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crs: None,
            feature_classes: Vec::new(),
        }
    }

    pub fn with_feature_class(mut self, fc: FeatureClass) -> Self {
        self.feature_classes.push(fc);
        self
    }
}

/// Raster catalog entry; only the attribute table schema is modeled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterDataset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_table: Option<Vec<Field>>,
}

impl RasterDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_table: None,
        }
    }

    pub fn with_attribute_table(mut self, fields: Vec<Field>) -> Self {
        self.attribute_table = Some(fields);
        self
    }
}

/// File geodatabase model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geodatabase {
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub feature_classes: Vec<FeatureClass>,
    #[serde(default)]
    pub datasets: Vec<FeatureDataset>,
    #[serde(default)]
    pub rasters: Vec<RasterDataset>,
}

impl Geodatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domains.push(domain);
        self
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_feature_class(mut self, fc: FeatureClass) -> Self {
        self.feature_classes.push(fc);
        self
    }

    pub fn with_dataset(mut self, dataset: FeatureDataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn with_raster(mut self, raster: RasterDataset) -> Self {
        self.rasters.push(raster);
        self
    }

    /// Reject duplicate names that would make catalog paths ambiguous.
    pub fn validate(&self) -> Result<()> {
        check_unique("domain", self.domains.iter().map(|d| d.name.as_str()))?;
        check_unique(
            "container",
            self.tables
                .iter()
                .map(|t| t.name.as_str())
                .chain(self.feature_classes.iter().map(|f| f.name.as_str()))
                .chain(self.datasets.iter().map(|d| d.name.as_str()))
                .chain(self.rasters.iter().map(|r| r.name.as_str())),
        )?;
        for ds in &self.datasets {
            check_unique("feature class", ds.feature_classes.iter().map(|f| f.name.as_str()))?;
        }
        Ok(())
    }

    /// Every container that can hold fields, in catalog order
    pub fn containers(&self) -> Vec<ContainerRef> {
        let mut out: Vec<ContainerRef> =
            self.tables.iter().map(|t| ContainerRef::table(&t.name)).collect();
        out.extend(self.feature_classes.iter().map(|f| ContainerRef::feature_class(&f.name)));
        for ds in &self.datasets {
            out.extend(
                ds.feature_classes
                    .iter()
                    .map(|f| ContainerRef::in_dataset(&ds.name, &f.name)),
            );
        }
        out.extend(
            self.rasters
                .iter()
                .filter(|r| r.attribute_table.is_some())
                .map(|r| ContainerRef::raster(&r.name)),
        );
        out
    }

    /// Number of fields in the workspace referencing `domain`
    pub fn domain_references(&self, domain: &str) -> usize {
        self.containers()
            .iter()
            .filter_map(|c| self.fields(c).ok())
            .flat_map(|fields| fields.iter())
            .filter(|f| f.domain == domain)
            .count()
    }

    pub fn feature_class(&self, fc: &ContainerRef) -> Result<&FeatureClass> {
        let ContainerRef::FeatureClass { dataset, name } = fc else {
            return Err(Error::ContainerNotFound(fc.to_string()));
        };
        let classes = match dataset {
            None => &self.feature_classes,
            Some(ds) => &self.dataset(ds)?.feature_classes,
        };
        classes
            .iter()
            .find(|f| &f.name == name)
            .ok_or_else(|| Error::ContainerNotFound(fc.to_string()))
    }

    fn feature_class_mut(&mut self, fc: &ContainerRef) -> Result<&mut FeatureClass> {
        let ContainerRef::FeatureClass { dataset, name } = fc else {
            return Err(Error::ContainerNotFound(fc.to_string()));
        };
        let classes = match dataset {
            None => &mut self.feature_classes,
            Some(ds) => {
                &mut self
                    .datasets
                    .iter_mut()
                    .find(|d| &d.name == ds)
                    .ok_or_else(|| Error::ContainerNotFound(ds.clone()))?
                    .feature_classes
            }
        };
        classes
            .iter_mut()
            .find(|f| &f.name == name)
            .ok_or_else(|| Error::ContainerNotFound(fc.to_string()))
    }

    fn dataset(&self, name: &str) -> Result<&FeatureDataset> {
        self.datasets
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::ContainerNotFound(name.to_string()))
    }

    fn fields(&self, container: &ContainerRef) -> Result<&Vec<Field>> {
        match container {
            ContainerRef::Table(name) => self
                .tables
                .iter()
                .find(|t| &t.name == name)
                .map(|t| &t.fields)
                .ok_or_else(|| Error::ContainerNotFound(container.to_string())),
            ContainerRef::FeatureClass { .. } => self.feature_class(container).map(|f| &f.fields),
            ContainerRef::Raster(name) => self
                .rasters
                .iter()
                .find(|r| &r.name == name)
                .and_then(|r| r.attribute_table.as_ref())
                .ok_or_else(|| Error::ContainerNotFound(container.to_string())),
        }
    }

    fn fields_mut(&mut self, container: &ContainerRef) -> Result<&mut Vec<Field>> {
        match container {
            ContainerRef::Table(name) => self
                .tables
                .iter_mut()
                .find(|t| &t.name == name)
                .map(|t| &mut t.fields)
                .ok_or_else(|| Error::ContainerNotFound(container.to_string())),
            ContainerRef::FeatureClass { .. } => {
                self.feature_class_mut(container).map(|f| &mut f.fields)
            }
            ContainerRef::Raster(name) => self
                .rasters
                .iter_mut()
                .find(|r| &r.name == name)
                .and_then(|r| r.attribute_table.as_mut())
                .ok_or_else(|| Error::ContainerNotFound(container.to_string())),
        }
    }
}

fn check_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(Error::Other(format!("duplicate {} name: {}", kind, name)));
        }
    }
    Ok(())
}

impl Catalog for Geodatabase {
    fn list_domains(&self) -> Result<Vec<Domain>> {
        Ok(self.domains.clone())
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn list_feature_classes(&self, dataset: Option<&str>) -> Result<Vec<String>> {
        let classes = match dataset {
            None => &self.feature_classes,
            Some(ds) => &self.dataset(ds)?.feature_classes,
        };
        Ok(classes.iter().map(|f| f.name.clone()).collect())
    }

    fn list_datasets(&self) -> Result<Vec<String>> {
        Ok(self.datasets.iter().map(|d| d.name.clone()).collect())
    }

    fn list_rasters(&self) -> Result<Vec<RasterInfo>> {
        Ok(self
            .rasters
            .iter()
            .map(|r| RasterInfo {
                name: r.name.clone(),
                has_rat: r.attribute_table.is_some(),
            })
            .collect())
    }

    fn list_fields(&self, container: &ContainerRef) -> Result<Vec<Field>> {
        self.fields(container).cloned()
    }
}

impl SchemaEditor for Geodatabase {
    fn remove_domain_from_field(&mut self, container: &ContainerRef, field: &str) -> Result<()> {
        let fields = self.fields_mut(container)?;
        let target = fields
            .iter_mut()
            .find(|f| f.is_named(field))
            .ok_or_else(|| Error::FieldNotFound {
                container: container.to_string(),
                field: field.to_string(),
            })?;
        debug!("Cleared domain {} on {}.{}", target.domain, container, target.name);
        target.domain.clear();
        Ok(())
    }

    fn delete_domain(&mut self, name: &str) -> Result<()> {
        let position = self
            .domains
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| Error::DomainNotFound(name.to_string()))?;
        let references = self.domain_references(name);
        if references > 0 {
            return Err(Error::DomainInUse {
                name: name.to_string(),
                references,
            });
        }
        self.domains.remove(position);
        Ok(())
    }
}

impl FeatureEditor for Geodatabase {
    fn describe(&self, fc: &ContainerRef) -> Result<FeatureClassInfo> {
        let class = self.feature_class(fc)?;
        // Classes inside a dataset inherit its spatial reference
        let crs = match (&class.crs, fc) {
            (Some(crs), _) => Some(crs.clone()),
            (None, ContainerRef::FeatureClass { dataset: Some(ds), .. }) => {
                self.dataset(ds)?.crs.clone()
            }
            _ => None,
        };
        Ok(FeatureClassInfo {
            geometry_type: class.geometry_type,
            has_z: class.has_z,
            crs,
        })
    }

    fn add_field(&mut self, fc: &ContainerRef, field: Field) -> Result<()> {
        let class = self.feature_class_mut(fc)?;
        if class.fields.iter().any(|f| f.is_named(&field.name)) {
            return Err(Error::FieldExists {
                container: fc.to_string(),
                field: field.name,
            });
        }
        for feature in &mut class.features {
            feature.set_attribute(field.name.clone(), AttributeValue::Null);
        }
        class.fields.push(field);
        Ok(())
    }

    fn feature_count(&self, fc: &ContainerRef) -> Result<usize> {
        Ok(self.feature_class(fc)?.features.len())
    }

    fn update_features(
        &mut self,
        fc: &ContainerRef,
        visit: &mut dyn FnMut(&mut Feature) -> Result<()>,
    ) -> Result<()> {
        let class = self.feature_class_mut(fc)?;
        // Visit in object-id order without reordering the stored rows
        let mut order: Vec<usize> = (0..class.features.len()).collect();
        order.sort_by_key(|&i| class.features[i].oid);
        order
            .into_iter()
            .try_for_each(|i| visit(&mut class.features[i]))
    }
}
