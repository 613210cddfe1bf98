//! Native workspace reading/writing
//!
//! A workspace is a single JSON document holding the whole geodatabase
//! model. Writes go to a temporary file in the target directory which is
//! then renamed over the original, so readers never observe a partial file.

use crate::error::{Error, Result};
use crate::workspace::Geodatabase;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read a workspace file into a Geodatabase
pub fn read_geodatabase<P: AsRef<Path>>(path: P) -> Result<Geodatabase> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::WorkspaceUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let gdb: Geodatabase = serde_json::from_reader(BufReader::new(file))?;
    gdb.validate()?;
    debug!(
        "Loaded {} ({} domains, {} containers)",
        path.display(),
        gdb.domains.len(),
        gdb.containers().len()
    );
    Ok(gdb)
}

/// Read a workspace from an in-memory buffer
pub fn read_geodatabase_from_buffer(data: &[u8]) -> Result<Geodatabase> {
    let gdb: Geodatabase = serde_json::from_slice(data)?;
    gdb.validate()?;
    Ok(gdb)
}

/// Atomically write a Geodatabase to a workspace file
pub fn write_geodatabase<P: AsRef<Path>>(gdb: &Geodatabase, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, gdb)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    debug!("Saved {}", path.display());
    Ok(())
}

/// Serialize a Geodatabase to an in-memory buffer
pub fn write_geodatabase_to_buffer(gdb: &Geodatabase) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(gdb)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Domain, Field, FieldType};
    use crate::workspace::Table;

    fn sample() -> Geodatabase {
        Geodatabase::new()
            .with_domain(Domain::coded("Status", FieldType::SmallInteger))
            .with_table(
                Table::new("Assets")
                    .with_field(Field::new("Status", FieldType::SmallInteger).with_domain("Status")),
            )
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.gdb.json");
        write_geodatabase(&sample(), &path).unwrap();

        let loaded = read_geodatabase(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_geodatabase(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::WorkspaceUnavailable { .. }));
    }

    #[test]
    fn test_malformed_buffer() {
        let err = read_geodatabase_from_buffer(b"{\"domains\": 3}").unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_minimal_document() {
        let gdb = read_geodatabase_from_buffer(b"{}").unwrap();
        assert!(gdb.domains.is_empty());
        let bytes = write_geodatabase_to_buffer(&gdb).unwrap();
        assert_eq!(read_geodatabase_from_buffer(&bytes).unwrap(), gdb);
    }
}
