//! Workspace schema: attribute domains and fields

mod domain;
mod field;

pub use domain::{CodedValue, Domain, DomainType};
pub use field::{Field, FieldType};
