//! Attribute domain maintenance
//!
//! - Prune: detach and delete every domain of one type

mod prune;

pub use prune::{
    delete_domains, detach_domains, field_containers, prune_domains, select_domains,
    DomainFailure, FieldDetachment, PruneDomains, PruneParams, PruneReport,
};
