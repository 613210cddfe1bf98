//! End-to-end runs of the tools against JSON workspace files.
//!
//! Each test writes a small workspace into a temporary directory, runs a
//! tool through the same read / lock / write path the CLI uses, and checks
//! the reloaded file.

use gdbkit_algorithms::domains::{prune_domains, PruneParams};
use gdbkit_algorithms::vector::{sinuosity, Baseline, LengthMethod, SinuosityParams};
use gdbkit_core::io::{read_geodatabase, write_geodatabase, CatalogPath, WorkspaceLock};
use gdbkit_core::schema::DomainType;
use gdbkit_core::vector::AttributeValue;
use gdbkit_core::{Catalog, Error};
use std::path::{Path, PathBuf};

const UTILITY_GDB: &str = r#"{
  "domains": [
    {"name": "PipeMaterial", "type": "CodedValue", "field_type": "String",
     "coded_values": [{"code": "PVC", "description": "Polyvinyl chloride"}]},
    {"name": "Diameter", "type": "Range", "field_type": "Double", "range": [0.0, 2.5]},
    {"name": "Condition", "type": "CodedValue", "field_type": "SmallInteger",
     "coded_values": [{"code": 1, "description": "Good"}, {"code": 2, "description": "Poor"}]},
    {"name": "Unused", "type": "CodedValue", "field_type": "String"}
  ],
  "tables": [
    {"name": "Inspections", "fields": [
      {"name": "OBJECTID", "type": "OID"},
      {"name": "Condition", "type": "SmallInteger", "domain": "Condition"}
    ]}
  ],
  "datasets": [
    {"name": "Water", "crs": {"epsg": 4326}, "feature_classes": [
      {"name": "Mains", "geometry_type": "Polyline", "has_z": false,
       "fields": [
         {"name": "Material", "type": "String", "domain": "PipeMaterial"},
         {"name": "Diam", "type": "Double", "domain": "Diameter"}
       ],
       "features": [
         {"oid": 1, "shape": {"polyline": {"paths": [[{"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.01}, {"x": 0.01, "y": 0.01}]]}}},
         {"oid": 2, "shape": {"polyline": {"paths": [[{"x": 0.0, "y": 0.0}, {"x": 0.01, "y": 0.0}, {"x": 0.0, "y": 0.0}]]}}}
       ]}
    ]}
  ],
  "feature_classes": [
    {"name": "Trails", "geometry_type": "Polyline", "has_z": true,
     "crs": {"epsg": 32719},
     "fields": [{"name": "Surface", "type": "String", "domain": "PipeMaterial"}],
     "features": [
       {"oid": 10, "shape": {"polyline": {"paths": [[
         {"x": 0.0, "y": 0.0, "z": 100.0},
         {"x": 0.0, "y": 4.0, "z": 100.0},
         {"x": 4.5, "y": 4.0, "z": 100.0},
         {"x": 3.0, "y": 4.0, "z": 100.0}]]}}}
     ]}
  ],
  "rasters": [
    {"name": "Landcover", "attribute_table": [{"name": "Class", "type": "SmallInteger", "domain": "Condition"}]},
    {"name": "Dem"}
  ]
}"#;

fn workspace(dir: &Path) -> PathBuf {
    let path = dir.join("utility.gdb.json");
    std::fs::write(&path, UTILITY_GDB).unwrap();
    path
}

#[test]
fn prune_coded_value_domains_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = workspace(dir.path());

    let report = {
        let _lock = WorkspaceLock::acquire(&path).unwrap();
        let mut gdb = read_geodatabase(&path).unwrap();
        let report = prune_domains(&mut gdb, &PruneParams::new(DomainType::CodedValue)).unwrap();
        write_geodatabase(&gdb, &path).unwrap();
        report
    };

    assert_eq!(report.total_domains, 4);
    assert_eq!(report.targets, vec!["Condition", "PipeMaterial", "Unused"]);
    assert_eq!(report.deleted, report.targets);
    assert_eq!(report.detached.len(), 4);

    let gdb = read_geodatabase(&path).unwrap();
    let names: Vec<&str> = gdb.domains.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Diameter"]);
    for container in gdb.containers() {
        for field in gdb.list_fields(&container).unwrap() {
            assert!(field.domain.is_empty() || field.domain == "Diameter");
        }
    }
    assert!(!WorkspaceLock::lock_path(&path).exists());
}

#[test]
fn prune_refuses_locked_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let path = workspace(dir.path());

    let _held = WorkspaceLock::acquire(&path).unwrap();
    assert!(matches!(
        WorkspaceLock::acquire(&path),
        Err(Error::SchemaLocked(_))
    ));
}

#[test]
fn malformed_domain_type_is_rejected() {
    assert!(matches!(
        "Coded Value".parse::<DomainType>(),
        Err(Error::InvalidParameter { .. })
    ));
}

#[test]
fn sinuosity_on_projected_3d_class() {
    let dir = tempfile::tempdir().unwrap();
    let path = workspace(dir.path());
    let features = path.join("Trails");

    let catalog = CatalogPath::parse(&features).unwrap();
    assert_eq!(catalog.workspace, path);

    let mut gdb = read_geodatabase(&catalog.workspace).unwrap();
    let params = SinuosityParams::new(catalog.container.clone(), "Sinuosity")
        .with_method(LengthMethod::Planar);
    let report = sinuosity(&mut gdb, &params).unwrap();
    write_geodatabase(&gdb, &catalog.workspace).unwrap();

    assert!(report.field_created);
    assert!(report.null_features.is_empty());

    let gdb = read_geodatabase(&path).unwrap();
    let trails = gdb.feature_class(&catalog.container).unwrap();
    assert_eq!(
        trails.features[0].attribute("Sinuosity"),
        Some(&AttributeValue::Float(2.0))
    );
}

#[test]
fn sinuosity_geodesic_in_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = workspace(dir.path());
    let catalog = CatalogPath::parse(path.join("Water").join("Mains")).unwrap();

    let mut gdb = read_geodatabase(&catalog.workspace).unwrap();
    let params = SinuosityParams::new(catalog.container.clone(), "Sinuosity")
        .with_method(LengthMethod::Geodesic)
        .with_baseline(Baseline::Method);
    let report = sinuosity(&mut gdb, &params).unwrap();

    // Feature 2 returns to its start
    assert_eq!(report.updated, 2);
    assert_eq!(report.null_features, vec![2]);

    let mains = gdb.feature_class(&catalog.container).unwrap();
    let s = mains.features[0]
        .attribute("Sinuosity")
        .and_then(AttributeValue::as_f64)
        .unwrap();
    // Two legs of a ~1.1 km right angle near the equator
    assert!((s - std::f64::consts::SQRT_2).abs() < 1e-2, "sinuosity = {s}");
    assert_eq!(mains.features[1].attribute("Sinuosity"), Some(&AttributeValue::Null));
}

#[test]
fn geodesic_on_projected_class_fails_before_editing() {
    let dir = tempfile::tempdir().unwrap();
    let path = workspace(dir.path());
    let catalog = CatalogPath::parse(path.join("Trails")).unwrap();

    let mut gdb = read_geodatabase(&catalog.workspace).unwrap();
    let before = gdb.clone();
    let params = SinuosityParams::new(catalog.container.clone(), "Sinuosity")
        .with_method(LengthMethod::Loxodrome);
    assert!(matches!(sinuosity(&mut gdb, &params), Err(Error::Crs(_))));
    assert_eq!(gdb, before);
}
