//! File discovery for JSON-lines sources.
//!
//! Source prefixes may be partitioned into arbitrarily nested
//! sub-directories (the event logs nest by year/month, the catalog by id
//! prefix); partitioning is transparent here and every matching file feeds
//! one logical table. Discovery order is sorted so that downstream
//! keep-first/keep-last tie-breaks are deterministic across runs.

use crate::constants::SOURCE_FILE_EXTENSION;
use crate::error::{EtlError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Discovery component for one source prefix
#[derive(Debug)]
pub struct FileDiscovery {
    source_path: PathBuf,
}

impl FileDiscovery {
    pub fn new(source_path: PathBuf) -> Self {
        Self { source_path }
    }

    /// Discover all JSON files under the source prefix.
    ///
    /// A missing prefix is `SourceNotFound`; a prefix that exists but
    /// contains no JSON files is `EmptyInput`. Both abort the run before any
    /// output is published.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.source_path.exists() {
            return Err(EtlError::SourceNotFound {
                path: self.source_path.clone(),
            });
        }

        debug!("Searching for JSON files in: {}", self.source_path.display());

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.source_path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && is_json_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        // Stable input ordering, independent of traversal details
        files.sort();

        if files.is_empty() {
            return Err(EtlError::EmptyInput {
                path: self.source_path.clone(),
            });
        }

        debug!(
            "Found {} JSON files under {}",
            files.len(),
            self.source_path.display()
        );

        Ok(files)
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == SOURCE_FILE_EXTENSION)
}
