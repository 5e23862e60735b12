//! Extractor stage: raw JSON-lines sources into in-memory tables.
//!
//! Read-only; the only failure modes are location-level (missing or empty
//! source prefixes) and unreadable files. Row-level oddities are absorbed by
//! the declared schemas and handled downstream.

pub mod discovery;
pub mod reader;

pub use discovery::FileDiscovery;
pub use reader::JsonSourceReader;

use crate::config::EtlConfig;
use crate::constants::{LOG_DATA_SUBDIR, SONG_DATA_SUBDIR};
use crate::error::Result;
use crate::schema::{log_schema, song_schema};
use polars::prelude::DataFrame;
use tracing::info;

/// One extracted source: the combined frame plus how many files fed it
#[derive(Debug)]
pub struct ExtractedSource {
    pub frame: DataFrame,
    pub files_read: usize,
}

/// Extractor facade over discovery and reading for both sources
#[derive(Debug)]
pub struct Extractor {
    config: EtlConfig,
}

impl Extractor {
    pub fn new(config: EtlConfig) -> Self {
        Self { config }
    }

    /// Extract the song catalog source
    pub async fn extract_catalog(&self) -> Result<ExtractedSource> {
        self.extract(SONG_DATA_SUBDIR, song_schema(), "catalog").await
    }

    /// Extract the event log source
    pub async fn extract_events(&self) -> Result<ExtractedSource> {
        self.extract(LOG_DATA_SUBDIR, log_schema(), "event log").await
    }

    async fn extract(
        &self,
        subdir: &str,
        schema: polars::prelude::Schema,
        label: &str,
    ) -> Result<ExtractedSource> {
        let source_path = self.config.input_path.join(subdir);
        let files = FileDiscovery::new(source_path).discover()?;
        info!("Discovered {} {} files", files.len(), label);

        let reader = JsonSourceReader::new(schema, self.config.max_concurrent_files);
        let frame = reader.read_all(&files, label).await?;

        Ok(ExtractedSource {
            frame,
            files_read: files.len(),
        })
    }
}
