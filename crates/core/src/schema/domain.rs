//! Attribute domains

use crate::error::{Error, Result};
use crate::schema::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of constraint a domain enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainType {
    CodedValue,
    Range,
}

impl DomainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::CodedValue => "CodedValue",
            DomainType::Range => "Range",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = Error;

    /// Type strings must match exactly, as the engine reports them.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CodedValue" => Ok(DomainType::CodedValue),
            "Range" => Ok(DomainType::Range),
            other => Err(Error::InvalidParameter {
                name: "domain_type",
                value: other.to_string(),
                reason: "expected CodedValue or Range".into(),
            }),
        }
    }
}

/// A single entry of a coded-value domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedValue {
    pub code: serde_json::Value,
    pub description: String,
}

/// A named, reusable constraint stored at the workspace level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    #[serde(rename = "type")]
    pub domain_type: DomainType,
    #[serde(default)]
    pub description: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coded_values: Vec<CodedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

impl Domain {
    /// Coded-value domain with no entries yet
    pub fn coded(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            domain_type: DomainType::CodedValue,
            description: String::new(),
            field_type,
            coded_values: Vec::new(),
            range: None,
        }
    }

    /// Range domain over `[min, max]`
    pub fn range(name: impl Into<String>, field_type: FieldType, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            domain_type: DomainType::Range,
            description: String::new(),
            field_type,
            coded_values: Vec::new(),
            range: Some((min, max)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_type() {
        assert_eq!("CodedValue".parse::<DomainType>().unwrap(), DomainType::CodedValue);
        assert_eq!("Range".parse::<DomainType>().unwrap(), DomainType::Range);
    }

    #[test]
    fn test_parse_is_exact() {
        assert!("codedvalue".parse::<DomainType>().is_err());
        assert!(" Range".parse::<DomainType>().is_err());
        assert!("".parse::<DomainType>().is_err());
    }

    #[test]
    fn test_type_serializes_under_type_key() {
        let d = Domain::range("Depth", FieldType::Double, 0.0, 100.0);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "Range");
        assert_eq!(json["field_type"], "Double");
    }
}
