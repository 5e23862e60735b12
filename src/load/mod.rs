//! Loader stage: durable, atomically published Parquet output.
//!
//! All requested tables are written into a staging directory created inside
//! the output root, and only renamed into their final locations after every
//! write has succeeded. A failure before publication leaves the prior output
//! untouched; the staging directory is removed when dropped. Downstream
//! consumers therefore never observe a half-written table.

pub mod writer;

pub use writer::TableWriter;

use crate::config::ParquetConfig;
use crate::error::{EtlError, Result};
use crate::models::{Table, TableReport};
use crate::transform::StarSchema;
use std::path::PathBuf;
use tracing::{debug, info};

/// Loader publishing derived tables under one output root
#[derive(Debug)]
pub struct Loader {
    output_root: PathBuf,
    writer: TableWriter,
}

impl Loader {
    pub fn new(output_root: PathBuf, parquet: ParquetConfig) -> Self {
        Self {
            output_root,
            writer: TableWriter::new(parquet),
        }
    }

    /// Write and publish the requested tables, returning per-table reports
    pub fn load(&self, schema: &StarSchema, tables: &[Table]) -> Result<Vec<TableReport>> {
        std::fs::create_dir_all(&self.output_root)?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.output_root)?;
        debug!("Staging output under {}", staging.path().display());

        let mut reports = Vec::new();
        for &table in tables {
            let Some(df) = schema.get(table) else {
                continue;
            };
            let table_dir = staging.path().join(table.name());
            let rows = self
                .writer
                .write_table(df, table, &table_dir)
                .map_err(|e| EtlError::WriteFailed {
                    table: table.name().to_string(),
                    reason: e.to_string(),
                })?;
            reports.push(TableReport {
                table,
                rows,
                partitioned_by: table
                    .partition_columns()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            });
        }

        // Publish only after every table wrote cleanly
        for report in &reports {
            let staged = staging.path().join(report.table.name());
            let target = self.output_root.join(report.table.name());

            if target.exists() {
                std::fs::remove_dir_all(&target).map_err(|e| EtlError::PublishFailed {
                    path: target.clone(),
                    reason: format!("failed to clear prior output: {e}"),
                })?;
            }
            std::fs::rename(&staged, &target).map_err(|e| EtlError::PublishFailed {
                path: target.clone(),
                reason: e.to_string(),
            })?;
            info!("Published {} ({} rows)", report.table, report.rows);
        }

        Ok(reports)
    }
}
