//! Field definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    OID,
    Geometry,
    SmallInteger,
    Integer,
    Single,
    Double,
    String,
    Date,
    GlobalID,
}

impl FieldType {
    /// Whether the field can hold a floating point measure
    pub fn is_floating(&self) -> bool {
        matches!(self, FieldType::Single | FieldType::Double)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A column of a table, feature class or raster attribute table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Name of the attached domain; empty means none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            alias: None,
            domain: String::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn has_domain(&self) -> bool {
        !self.domain.is_empty()
    }

    /// Field names compare case-insensitively
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
