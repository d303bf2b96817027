//! JSON Document Adapter
//!
//! Implements `DocumentSink` with pretty-printed JSON files. Aux documents go
//! to `<aux_dir>/<name>`; the consolidated document is written to a sibling
//! temporary file and renamed into place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use shared_types::{MigrationError, MigrationResult};
use tracing::{debug, info};

use crate::ports::DocumentSink;

/// Writes documents under an aux directory and one genesis path.
#[derive(Clone, Debug)]
pub struct JsonFileSink {
    aux_dir: PathBuf,
    genesis_path: PathBuf,
}

impl JsonFileSink {
    /// Sink writing aux documents into `aux_dir` and the consolidated
    /// document to `genesis_path`.
    pub fn new(aux_dir: impl Into<PathBuf>, genesis_path: impl Into<PathBuf>) -> Self {
        Self {
            aux_dir: aux_dir.into(),
            genesis_path: genesis_path.into(),
        }
    }

    /// Aux document directory.
    pub fn aux_dir(&self) -> &Path {
        &self.aux_dir
    }

    /// Consolidated document path.
    pub fn genesis_path(&self) -> &Path {
        &self.genesis_path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .genesis_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.genesis_path.with_file_name(name)
    }
}

fn write_pretty(path: &Path, document: &Value) -> MigrationResult<()> {
    let write_error = |source| MigrationError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let mut raw = serde_json::to_vec_pretty(document)
        .map_err(|err| write_error(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    raw.push(b'\n');
    fs::write(path, raw).map_err(write_error)
}

impl DocumentSink for JsonFileSink {
    fn write_aux(&self, name: &str, document: &Value) -> MigrationResult<()> {
        let path = self.aux_dir.join(name);
        write_pretty(&path, document)?;
        debug!(path = %path.display(), "[sink] Wrote aux document");
        Ok(())
    }

    fn discard_genesis(&self) -> MigrationResult<()> {
        match fs::remove_file(&self.genesis_path) {
            Ok(()) => {
                info!(path = %self.genesis_path.display(), "[sink] Discarded stale genesis document");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MigrationError::OutputWrite {
                path: self.genesis_path.clone(),
                source,
            }),
        }
    }

    fn write_genesis(&self, document: &Value) -> MigrationResult<()> {
        let staging = self.staging_path();
        write_pretty(&staging, document)?;
        fs::rename(&staging, &self.genesis_path).map_err(|source| MigrationError::OutputWrite {
            path: self.genesis_path.clone(),
            source,
        })?;
        info!(path = %self.genesis_path.display(), "[sink] Wrote genesis document");
        Ok(())
    }
}
