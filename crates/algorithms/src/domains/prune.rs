//! Delete all attribute domains of one type
//!
//! A domain cannot be deleted while fields reference it, so the tool runs in
//! three passes:
//! 1. select the domains of the requested type, sorted by name
//! 2. detach them from every field in tables, feature classes (top level
//!    and inside feature datasets) and raster attribute tables
//! 3. delete each selected domain; a failure is recorded and the next
//!    domain is still attempted

use std::collections::BTreeSet;

use gdbkit_core::schema::{Domain, DomainType};
use gdbkit_core::{Catalog, ContainerRef, Result, SchemaEditor, Tool};
use tracing::{debug, info, warn};

/// Parameters for domain pruning
#[derive(Debug, Clone)]
pub struct PruneParams {
    /// Domain type to remove
    pub domain_type: DomainType,
    /// Report what would change without editing the workspace
    pub dry_run: bool,
}

impl PruneParams {
    pub fn new(domain_type: DomainType) -> Self {
        Self {
            domain_type,
            dry_run: false,
        }
    }
}

/// A field whose domain reference was (or would be) cleared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDetachment {
    pub container: ContainerRef,
    pub field: String,
    pub domain: String,
}

/// A domain that could not be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFailure {
    pub name: String,
    pub reason: String,
}

/// What a prune run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Domains in the workspace before the run
    pub total_domains: usize,
    /// Domains of the requested type, ascending by name
    pub targets: Vec<String>,
    pub detached: Vec<FieldDetachment>,
    /// Deleted domains, in deletion order
    pub deleted: Vec<String>,
    pub failed: Vec<DomainFailure>,
}

/// Domain pruning tool
#[derive(Debug, Clone, Default)]
pub struct PruneDomains;

impl<W: SchemaEditor + ?Sized> Tool<W> for PruneDomains {
    type Params = PruneParams;
    type Output = PruneReport;

    fn name(&self) -> &'static str {
        "Delete Domains By Type"
    }

    fn description(&self) -> &'static str {
        "Detach and delete every attribute domain of one type"
    }

    fn execute(&self, workspace: &mut W, params: Self::Params) -> Result<Self::Output> {
        prune_domains(workspace, &params)
    }
}

/// Names of the domains of `domain_type`, sorted ascending.
pub fn select_domains(domains: &[Domain], domain_type: DomainType) -> Vec<String> {
    let mut targets: Vec<String> = domains
        .iter()
        .inspect(|d| debug!("{} is type {}", d.name, d.domain_type))
        .filter(|d| d.domain_type == domain_type)
        .map(|d| d.name.clone())
        .collect();
    targets.sort();
    targets
}

/// Every field container in catalog order: standalone tables, top-level
/// feature classes, feature classes of each dataset, then rasters that
/// carry an attribute table.
pub fn field_containers<C: Catalog + ?Sized>(catalog: &C) -> Result<Vec<ContainerRef>> {
    let mut containers: Vec<ContainerRef> = catalog
        .list_tables()?
        .into_iter()
        .map(ContainerRef::Table)
        .collect();

    containers.extend(
        catalog
            .list_feature_classes(None)?
            .into_iter()
            .map(ContainerRef::feature_class),
    );

    for dataset in catalog.list_datasets()? {
        let classes = catalog.list_feature_classes(Some(&dataset))?;
        containers.extend(
            classes
                .into_iter()
                .map(|name| ContainerRef::in_dataset(dataset.clone(), name)),
        );
    }

    containers.extend(
        catalog
            .list_rasters()?
            .into_iter()
            .filter(|r| r.has_rat)
            .map(|r| ContainerRef::Raster(r.name)),
    );

    Ok(containers)
}

/// Clear every field reference to one of `targets`.
///
/// With `dry_run` the workspace is left untouched and the returned list
/// describes what would be cleared.
pub fn detach_domains<W: SchemaEditor + ?Sized>(
    workspace: &mut W,
    containers: &[ContainerRef],
    targets: &BTreeSet<&str>,
    dry_run: bool,
) -> Result<Vec<FieldDetachment>> {
    let mut detached = Vec::new();
    for container in containers {
        info!("Dropping domains from {}", container);
        for field in workspace.list_fields(container)? {
            if !field.has_domain() {
                continue;
            }
            if !targets.contains(field.domain.as_str()) {
                debug!("Skipping {}", field.domain);
                continue;
            }
            info!("Dropping {} from {}", field.domain, field.name);
            if !dry_run {
                workspace.remove_domain_from_field(container, &field.name)?;
            }
            detached.push(FieldDetachment {
                container: container.clone(),
                field: field.name,
                domain: field.domain,
            });
        }
    }
    Ok(detached)
}

/// Delete each domain in order. Failures are collected, never propagated.
pub fn delete_domains<W: SchemaEditor + ?Sized>(
    workspace: &mut W,
    targets: &[String],
) -> (Vec<String>, Vec<DomainFailure>) {
    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for name in targets {
        info!("Deleting {}", name);
        match workspace.delete_domain(name) {
            Ok(()) => deleted.push(name.clone()),
            Err(e) => {
                warn!("Could not remove domain {}: {}", name, e);
                failed.push(DomainFailure {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (deleted, failed)
}

/// Detach and delete every domain of `params.domain_type`.
///
/// Errors while enumerating or detaching abort the run. Per-domain delete
/// failures end up in [`PruneReport::failed`].
pub fn prune_domains<W: SchemaEditor + ?Sized>(
    workspace: &mut W,
    params: &PruneParams,
) -> Result<PruneReport> {
    let domains = workspace.list_domains()?;
    info!("There are {} domains in the workspace", domains.len());

    info!("Making list of domains to remove ...");
    let targets = select_domains(&domains, params.domain_type);
    info!("Found {} domains of type {}", targets.len(), params.domain_type);
    debug!("Domains to delete: {:?}", targets);

    info!("Domains must be dropped from fields before they can be deleted ...");
    let containers = field_containers(&*workspace)?;
    let target_set: BTreeSet<&str> = targets.iter().map(String::as_str).collect();
    let detached = detach_domains(workspace, &containers, &target_set, params.dry_run)?;

    let (deleted, failed) = if params.dry_run {
        info!("Dry run: {} domains would be deleted", targets.len());
        (Vec::new(), Vec::new())
    } else {
        info!("Deleting domains ...");
        delete_domains(workspace, &targets)
    };

    Ok(PruneReport {
        total_domains: domains.len(),
        targets,
        detached,
        deleted,
        failed,
    })
}
