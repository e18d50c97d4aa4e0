//! Board snapshots.
//!
//! A snapshot is one board with its columns and tasks in rank order, plus
//! metadata about when and by what it was written. Snapshots are plain JSON,
//! optionally gzipped.

use crate::types::BoardWithColumns;
use anyhow::{Result, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Snapshot format version (semver).
pub const EXPORT_VERSION: &str = "1.0.0";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub export_version: String,
    /// RFC 3339 timestamp.
    pub exported_at: String,
    pub exported_by: String,
    pub board: BoardWithColumns,
}

impl BoardSnapshot {
    pub fn new(board: BoardWithColumns) -> Self {
        Self {
            export_version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            exported_by: format!("taskify v{}", env!("CARGO_PKG_VERSION")),
            board,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to `out`, gzipped when `gzip` is set.
    pub fn write_to<W: Write>(&self, out: W, gzip: bool) -> Result<()> {
        let json = self.to_json_pretty()?;
        if gzip {
            let mut encoder = GzEncoder::new(out, Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?;
        } else {
            let mut out = out;
            out.write_all(json.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }

    /// Read a snapshot file, plain or gzipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut bytes = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

        let snapshot = if bytes.starts_with(&GZIP_MAGIC) {
            serde_json::from_reader(GzDecoder::new(bytes.as_slice()))?
        } else {
            serde_json::from_slice(&bytes)?
        };
        Self::ensure_compatible(&snapshot)?;
        Ok(snapshot)
    }

    /// Snapshots from a different major format version are refused.
    fn ensure_compatible(&self) -> Result<()> {
        let major = |version: &str| version.split('.').next().map(str::to_string);
        if major(&self.export_version) != major(EXPORT_VERSION) {
            bail!(
                "unsupported snapshot version {} (expected {}.x)",
                self.export_version,
                EXPORT_VERSION.split('.').next().unwrap_or(EXPORT_VERSION)
            );
        }
        Ok(())
    }

    pub fn task_count(&self) -> usize {
        self.board.columns.iter().map(|c| c.tasks.len()).sum()
    }
}
