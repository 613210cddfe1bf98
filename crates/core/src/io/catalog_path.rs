//! Catalog paths: a workspace file followed by a dataset path inside it
//!
//! `data/city.gdb.json/Roads` names feature class `Roads` at the workspace
//! root; `data/city.gdb.json/Transport/Roads` names `Roads` inside feature
//! dataset `Transport`.

use crate::error::{Error, Result};
use crate::workspace::ContainerRef;
use std::path::{Component, Path, PathBuf};

/// A feature class addressed through its workspace file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPath {
    pub workspace: PathBuf,
    pub container: ContainerRef,
}

impl CatalogPath {
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |reason: &str| Error::InvalidParameter {
            name: "features",
            value: path.display().to_string(),
            reason: reason.to_string(),
        };

        let components: Vec<Component> = path.components().collect();
        let split = components
            .iter()
            .position(|c| {
                c.as_os_str()
                    .to_str()
                    .is_some_and(|s| s.to_ascii_lowercase().ends_with(".json"))
            })
            .ok_or_else(|| invalid("no .json workspace component"))?;

        let workspace: PathBuf = components[..=split].iter().collect();
        let rest: Vec<&str> = components[split + 1..]
            .iter()
            .map(|c| c.as_os_str().to_str().ok_or_else(|| invalid("non UTF-8 path")))
            .collect::<Result<_>>()?;

        let container = match rest.as_slice() {
            [name] => ContainerRef::feature_class(*name),
            [dataset, name] => ContainerRef::in_dataset(*dataset, *name),
            [] => return Err(invalid("missing feature class name")),
            _ => return Err(invalid("expected <workspace>/<dataset>/<feature class>")),
        };

        Ok(Self {
            workspace,
            container,
        })
    }
}
