//! Output destination checks.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Symbol;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output file {} is open in another program; close it and retry", path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot prepare output location {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Locked { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// `<output_dir>/<TICKER>.xlsx`.
pub fn output_path(output_dir: &Path, symbol: &Symbol) -> PathBuf {
    output_dir.join(format!("{}.xlsx", symbol.as_str()))
}

/// Creates `output_dir` and, when the workbook already exists, opens it for
/// append to make sure it can be replaced. Runs once, before any fetching.
pub fn preflight(output_dir: &Path, symbol: &Symbol) -> Result<PathBuf, SinkError> {
    fs::create_dir_all(output_dir).map_err(|source| SinkError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_path(output_dir, symbol);
    if path.is_dir() {
        return Err(SinkError::Io {
            path,
            source: io::Error::other("destination is a directory"),
        });
    }
    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Locked {
                path: path.clone(),
                source,
            })?;
    }
    Ok(path)
}
