//! gdbkit CLI - Geodatabase maintenance tools

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gdbkit_algorithms::domains::{prune_domains, PruneParams, PruneReport};
use gdbkit_algorithms::vector::{
    sinuosity, Baseline, LengthMethod, SinuosityParams, SinuosityReport,
};
use gdbkit_core::io::{read_geodatabase, write_geodatabase, CatalogPath, WorkspaceLock};
use gdbkit_core::schema::DomainType;
use gdbkit_core::{Catalog, Geodatabase};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gdbkit")]
#[command(author, version, about = "Geodatabase maintenance tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show domains and field containers of a workspace
    Info {
        /// Workspace file (.json)
        workspace: PathBuf,
    },
    /// Detach and delete every attribute domain of one type
    PruneDomains {
        /// Workspace file (.json)
        workspace: PathBuf,
        /// Domain type to remove: CodedValue or Range
        domain_type: String,
        /// Report what would be removed without editing the workspace
        #[arg(long)]
        dry_run: bool,
    },
    /// Add a sinuosity index field to line features
    Sinuosity {
        /// Line feature class as <workspace.json>/[<dataset>/]<feature class>
        features: PathBuf,
        /// Output field name
        field: String,
        /// Length method: EUCLIDEAN, GEODESIC, GREAT_ELLIPTIC, LOXODROME, PLANAR, PRESERVE_SHAPE
        #[arg(default_value = "PLANAR")]
        method: String,
        /// Straight-line baseline: planar or method
        #[arg(short, long, default_value = "planar")]
        baseline: String,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_workspace(path: &Path) -> Result<Geodatabase> {
    let pb = spinner("Reading workspace...");
    let gdb = read_geodatabase(path).context("Failed to read workspace");
    pb.finish_and_clear();
    let gdb = gdb?;
    info!(
        "Workspace: {} ({} domains, {} containers)",
        path.display(),
        gdb.domains.len(),
        gdb.containers().len()
    );
    Ok(gdb)
}

fn write_workspace(gdb: &Geodatabase, path: &Path) -> Result<()> {
    let pb = spinner("Writing workspace...");
    let result = write_geodatabase(gdb, path).context("Failed to write workspace");
    pb.finish_and_clear();
    result
}

fn parse_baseline(s: &str) -> Result<Baseline> {
    match s.to_lowercase().as_str() {
        "planar" => Ok(Baseline::Planar),
        "method" => Ok(Baseline::Method),
        _ => anyhow::bail!("Unknown baseline: {}. Use planar or method.", s),
    }
}

fn print_prune_summary(out: &mut impl Write, report: &PruneReport, dry_run: bool) -> Result<()> {
    writeln!(
        out,
        "Domains: {} total, {} targeted",
        report.total_domains,
        report.targets.len()
    )?;
    let verb = if dry_run { "would be detached" } else { "detached" };
    writeln!(out, "  Field references {}: {}", verb, report.detached.len())?;
    for d in &report.detached {
        writeln!(out, "    {}.{} ({})", d.container, d.field, d.domain)?;
    }
    if !dry_run {
        writeln!(out, "  Deleted: {}", report.deleted.len())?;
        for f in &report.failed {
            writeln!(out, "  Failed: {} ({})", f.name, f.reason)?;
        }
    }
    Ok(())
}

fn done(out: &mut impl Write, elapsed: std::time::Duration) -> Result<()> {
    writeln!(out, "  Processing time: {:.2?}", elapsed)?;
    Ok(())
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run_info(out: &mut impl Write, workspace: &Path) -> Result<()> {
    let gdb = read_workspace(workspace)?;

    writeln!(out, "Workspace: {}", workspace.display())?;
    writeln!(out, "Domains: {}", gdb.domains.len())?;
    for d in &gdb.domains {
        writeln!(
            out,
            "  {} [{}] {} field reference(s)",
            d.name,
            d.domain_type,
            gdb.domain_references(&d.name)
        )?;
    }
    writeln!(out, "Containers:")?;
    for c in gdb.containers() {
        let fields = gdb.list_fields(&c)?;
        writeln!(out, "  {} ({} fields)", c, fields.len())?;
    }
    let bare: Vec<&str> = gdb
        .rasters
        .iter()
        .filter(|r| r.attribute_table.is_none())
        .map(|r| r.name.as_str())
        .collect();
    if !bare.is_empty() {
        writeln!(out, "Rasters without attribute table: {}", bare.join(", "))?;
    }
    Ok(())
}

fn run_prune(
    out: &mut impl Write,
    workspace: &Path,
    domain_type: &str,
    dry_run: bool,
) -> Result<PruneReport> {
    let domain_type: DomainType = domain_type.parse()?;
    warn!(
        "All domains of type {} will be removed from {}",
        domain_type,
        workspace.display()
    );

    let _lock = if dry_run {
        None
    } else {
        Some(WorkspaceLock::acquire(workspace).context("Failed to lock workspace")?)
    };
    let mut gdb = read_workspace(workspace)?;

    let start = Instant::now();
    let params = PruneParams {
        domain_type,
        dry_run,
    };
    let report = prune_domains(&mut gdb, &params).context("Failed to prune domains")?;
    if !dry_run {
        write_workspace(&gdb, workspace)?;
    }
    let elapsed = start.elapsed();

    print_prune_summary(out, &report, dry_run)?;
    done(out, elapsed)?;
    writeln!(out, "{}", workspace.display())?;
    Ok(report)
}

fn run_sinuosity(
    out: &mut impl Write,
    features: &Path,
    field: &str,
    method: &str,
    baseline: &str,
) -> Result<SinuosityReport> {
    let catalog = CatalogPath::parse(features)?;
    let method: LengthMethod = method.parse()?;
    let baseline = parse_baseline(baseline)?;

    let _lock = WorkspaceLock::acquire(&catalog.workspace).context("Failed to lock workspace")?;
    let mut gdb = read_workspace(&catalog.workspace)?;

    let start = Instant::now();
    let params = SinuosityParams::new(catalog.container.clone(), field)
        .with_method(method)
        .with_baseline(baseline);
    let report = sinuosity(&mut gdb, &params).context("Failed to calculate sinuosity")?;
    write_workspace(&gdb, &catalog.workspace)?;
    let elapsed = start.elapsed();

    writeln!(
        out,
        "Sinuosity ({}) written to {}.{}",
        method, report.features, report.field
    )?;
    writeln!(
        out,
        "  Features: {} ({} null)",
        report.updated,
        report.null_features.len()
    )?;
    done(out, elapsed)?;
    writeln!(out, "{}", features.display())?;
    Ok(report)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Info { workspace } => run_info(&mut out, &workspace)?,
        Commands::PruneDomains {
            workspace,
            domain_type,
            dry_run,
        } => {
            run_prune(&mut out, &workspace, &domain_type, dry_run)?;
        }
        Commands::Sinuosity {
            features,
            field,
            method,
            baseline,
        } => {
            run_sinuosity(&mut out, &features, &field, &method, &baseline)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    const PARKS_GDB: &str = r#"{
      "domains": [
        {"name": "Surface", "type": "CodedValue", "field_type": "String"},
        {"name": "Width", "type": "Range", "field_type": "Double", "range": [0.0, 10.0]}
      ],
      "feature_classes": [
        {"name": "Paths", "geometry_type": "Polyline", "has_z": false,
         "fields": [
           {"name": "Kind", "type": "String", "domain": "Surface"},
           {"name": "Wide", "type": "Double", "domain": "Width"}
         ],
         "features": [
           {"oid": 1, "shape": {"polyline": {"paths": [[{"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 4.0}, {"x": 4.5, "y": 4.0}, {"x": 3.0, "y": 4.0}]]}}}
         ]}
      ]
    }"#;

    fn workspace(dir: &Path) -> PathBuf {
        let path = dir.join("parks.gdb.json");
        std::fs::write(&path, PARKS_GDB).unwrap();
        path
    }

    fn last_line(out: &[u8]) -> String {
        String::from_utf8_lossy(out).lines().last().unwrap_or_default().to_string()
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_prune_echoes_workspace_and_warns_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace(dir.path());
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(Level::INFO)
            .finish();

        let mut out = Vec::new();
        let report = tracing::subscriber::with_default(subscriber, || {
            run_prune(&mut out, &path, "CodedValue", false)
        })
        .unwrap();

        assert_eq!(report.deleted, vec!["Surface"]);
        assert_eq!(last_line(&out), path.display().to_string());
        let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
        let first = text.lines().next().unwrap_or_default();
        assert!(first.contains("WARN"), "{text}");
        assert!(first.contains("All domains of type CodedValue will be removed"), "{text}");

        let gdb = read_geodatabase(&path).unwrap();
        assert_eq!(gdb.domains.len(), 1);
        assert!(!WorkspaceLock::lock_path(&path).exists());
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace(dir.path());
        let mut out = Vec::new();
        let report = run_prune(&mut out, &path, "Range", true).unwrap();

        assert_eq!(report.targets, vec!["Width"]);
        assert_eq!(report.detached.len(), 1);
        assert!(report.deleted.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PARKS_GDB);
        assert!(String::from_utf8_lossy(&out).contains("would be detached: 1"));
    }

    #[test]
    fn test_prune_errors_leave_workspace_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace(dir.path());
        let mut out = Vec::new();

        assert!(run_prune(&mut out, &path, "Coded Value", false).is_err());

        let _held = WorkspaceLock::acquire(&path).unwrap();
        let err = run_prune(&mut out, &path, "CodedValue", false).unwrap_err();
        assert!(format!("{err:#}").contains(".lock"), "{err:#}");

        assert!(run_info(&mut out, &dir.path().join("missing.json")).is_err());
        assert!(out.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PARKS_GDB);
    }

    #[test]
    fn test_sinuosity_echoes_feature_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace(dir.path());
        let features = path.join("Paths");
        let mut out = Vec::new();
        let report = run_sinuosity(&mut out, &features, "Sinuosity", "PLANAR", "planar").unwrap();

        assert!(report.field_created);
        assert_eq!(last_line(&out), features.display().to_string());
        let gdb = read_geodatabase(&path).unwrap();
        let paths = &gdb.feature_classes[0];
        assert_eq!(
            paths.features[0].attribute("Sinuosity").and_then(|v| v.as_f64()),
            Some(2.0)
        );
    }

    #[test]
    fn test_sinuosity_rejects_bad_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace(dir.path());
        let features = path.join("Paths");
        let mut out = Vec::new();

        assert!(run_sinuosity(&mut out, &features, "S", "geodesic", "planar").is_err());
        assert!(run_sinuosity(&mut out, &features, "S", "PLANAR", "straight").is_err());
        assert!(run_sinuosity(&mut out, &features, "S", "GEODESIC", "planar").is_err());
        assert!(out.is_empty());
        assert!(!WorkspaceLock::lock_path(&path).exists());
    }

    #[test]
    fn test_info_lists_domains_and_containers() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace(dir.path());
        let mut out = Vec::new();
        run_info(&mut out, &path).unwrap();

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Surface [CodedValue] 1 field reference(s)"), "{text}");
        assert!(text.contains("Paths (2 fields)"), "{text}");
    }

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["gdbkit", "sinuosity", "ws.json/Paths", "S"]).unwrap();
        match cli.command {
            Commands::Sinuosity { method, baseline, .. } => {
                assert_eq!(method, "PLANAR");
                assert_eq!(baseline, "planar");
            }
            _ => panic!("expected sinuosity"),
        }
        assert!(Cli::try_parse_from(["gdbkit", "prune-domains", "ws.json"]).is_err());
    }
}
